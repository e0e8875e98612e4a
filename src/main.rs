use std::io::{self, IsTerminal};
use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    style::ResetColor,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use panex::app::{App, PROCESS_LIST_WIDTH};
use panex::cli::{Args, Config};
use panex::event::AppEvent;
use panex::handlers::keyboard::handle_key_event;
use panex::handlers::mouse::handle_mouse_event;
use panex::process::ProcessManager;
use panex::ui::help_menu::HelpMenu;
use panex::ui::layout::compute_layout;
use panex::ui::output_pane::OutputPane;
use panex::ui::process_list::ProcessList;
use panex::ui::status_bar::StatusBar;

fn main() -> Result<()> {
    init_logging()?;

    let args = Args::parse();
    let config = Config::from_args(&args);

    if !io::stdin().is_terminal() {
        anyhow::bail!("panex must be run in an interactive terminal");
    }

    // Setup terminal: raw mode, alternate screen, SGR mouse reporting.
    enable_raw_mode().context("Failed to enable raw mode - are you in a terminal?")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let size = terminal.size().context("Failed to get terminal size")?;
    let panel_cols = size.width.saturating_sub(PROCESS_LIST_WIDTH + 1).max(1);
    let panel_rows = size.height.saturating_sub(1).max(1);

    let (manager, events) = ProcessManager::new(&config, panel_cols, panel_rows);
    let mut app = App::new(manager, size.width, size.height);
    app.manager.start_all();

    let result = if app.manager.running_count() == 0 {
        Err(anyhow::anyhow!("failed to start any process"))
    } else {
        run_app(&mut terminal, &mut app, &events)
    };

    shutdown(&mut terminal, &mut app);
    result
}

/// Write tracing output to the file named by `PANEX_LOG`; stdout belongs
/// to the TUI. `PANEX_LOG_FILTER` overrides the default `info` filter.
fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("PANEX_LOG") else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {path}"))?;
    let filter =
        EnvFilter::try_from_env("PANEX_LOG_FILTER").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &Receiver<AppEvent>,
) -> Result<()> {
    loop {
        // Apply everything the reader threads produced since last frame.
        for event in events.try_iter() {
            app.manager.handle_event(&event);
        }

        // Due auto-restarts and the debounced resize.
        app.tick();

        // Keep a following view glued to the bottom.
        app.pin_selected();

        terminal.draw(|f| draw_ui(f, app))?;

        // Block briefly on host input so the debounce deadline and PTY
        // events keep being serviced.
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => handle_key_event(app, key),
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                Event::Resize(cols, rows) => app.schedule_resize(cols, rows),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn draw_ui(f: &mut Frame, app: &App) {
    let (list_area, separator_area, output_area, status_area) = compute_layout(f.area());

    f.render_widget(
        ProcessList::new(&app.manager, app.selected, app.focus_mode),
        list_area,
    );
    draw_separator(f, separator_area);
    f.render_widget(OutputPane::new(app.selected_process()), output_area);

    let process = app.selected_process();
    f.render_widget(
        StatusBar::new(app.focus_mode, &process.name, process.passthrough),
        status_area,
    );

    if app.show_help {
        f.render_widget(HelpMenu::new(), HelpMenu::popup_area(f.area()));
    }
}

fn draw_separator(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(block, area);
}

/// Ordered shutdown: kill the fleet, give readers a beat to drain, stop
/// mouse reporting *before* draining pending host input (otherwise the
/// host keeps emitting reports faster than they can be read), then
/// restore the terminal.
fn shutdown(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) {
    app.manager.kill_all();
    thread::sleep(Duration::from_millis(50));

    let _ = execute!(terminal.backend_mut(), DisableMouseCapture);
    while let Ok(true) = event::poll(Duration::from_millis(0)) {
        let _ = event::read();
    }
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        ResetColor,
        cursor::Show
    );
    let _ = disable_raw_mode();
    let _ = terminal.show_cursor();
}
