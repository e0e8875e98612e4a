//! Mouse handling: wheel scrolling and click zones.
//!
//! Crossterm decodes the SGR-1006 reports; this module only decides what a
//! parsed event means for the current layout: list column selects, output
//! panel focuses, the status bar row releases focus.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, PROCESS_LIST_WIDTH, WHEEL_SCROLL_LINES};

pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_SCROLL_LINES),
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_SCROLL_LINES),
        MouseEventKind::Down(MouseButton::Left) => {
            handle_left_click(app, mouse.column, mouse.row);
        }
        _ => {}
    }
}

fn handle_left_click(app: &mut App, x: u16, y: u16) {
    let (_, host_rows) = app.host_size;
    if y + 1 >= host_rows {
        // Status bar.
        app.exit_focus();
        return;
    }
    if x < PROCESS_LIST_WIDTH {
        app.exit_focus();
        let index = y as usize;
        if index < app.manager.len() {
            app.select(index);
        }
    } else if x > PROCESS_LIST_WIDTH {
        app.enter_focus();
    }
    // A click on the separator column changes nothing.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Config};
    use crate::event::AppEvent;
    use crate::process::ProcessManager;
    use crossterm::event::KeyModifiers;

    fn app() -> App {
        let config = Config::from_args(&Args {
            names: Some("a,b,c".to_string()),
            commands: vec!["1".into(), "2".into(), "3".into()],
        });
        let (manager, _rx) = ProcessManager::new(&config, 60, 10);
        App::new(manager, 81, 11)
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn feed_lines(app: &mut App, n: usize) {
        for i in 0..n {
            app.manager.handle_event(&AppEvent::Output {
                index: 0,
                generation: 0,
                data: format!("line {i}\r\n").into_bytes(),
            });
        }
    }

    #[test]
    fn wheel_up_scrolls_and_unpins() {
        let mut app = app();
        feed_lines(&mut app, 30);
        app.pin_selected();
        handle_mouse_event(&mut app, mouse(MouseEventKind::ScrollUp, 40, 5));
        let process = app.selected_process();
        assert!(!process.auto_scroll);
        assert_eq!(process.scroll_offset, 20 - WHEEL_SCROLL_LINES);
    }

    #[test]
    fn wheel_down_back_to_bottom_repins() {
        let mut app = app();
        feed_lines(&mut app, 30);
        app.pin_selected();
        handle_mouse_event(&mut app, mouse(MouseEventKind::ScrollUp, 40, 5));
        handle_mouse_event(&mut app, mouse(MouseEventKind::ScrollDown, 40, 5));
        assert!(app.selected_process().auto_scroll);
    }

    #[test]
    fn click_in_list_selects_row_and_exits_focus() {
        let mut app = app();
        app.enter_focus();
        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 3, 2));
        assert!(!app.focus_mode);
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn click_in_list_below_entries_only_exits_focus() {
        let mut app = app();
        app.enter_focus();
        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 3, 8));
        assert!(!app.focus_mode);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn click_in_output_panel_enters_focus() {
        let mut app = app();
        handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), PROCESS_LIST_WIDTH + 1, 4),
        );
        assert!(app.focus_mode);
    }

    #[test]
    fn click_on_separator_column_is_ignored() {
        let mut app = app();
        handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), PROCESS_LIST_WIDTH, 4),
        );
        assert!(!app.focus_mode);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn click_on_status_bar_exits_focus() {
        let mut app = app();
        app.enter_focus();
        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 40, 10));
        assert!(!app.focus_mode);
    }
}
