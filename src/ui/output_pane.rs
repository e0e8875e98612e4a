//! The output panel: the selected process's screen, scrolled and styled,
//! with a right-edge scrollbar when the buffer overflows the viewport.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::process::ManagedProcess;
use crate::term;

pub struct OutputPane<'a> {
    process: &'a ManagedProcess,
}

impl<'a> OutputPane<'a> {
    pub fn new(process: &'a ManagedProcess) -> Self {
        Self { process }
    }
}

impl Widget for OutputPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let process = self.process;
        let rows = process.screen.display_rows(area.width, process.wrap);
        let total = rows.len();
        let viewport = area.height as usize;
        let offset = process.scroll_offset.min(total.saturating_sub(1));

        for (dy, cells) in rows.iter().skip(offset).take(viewport).enumerate() {
            let y = area.y + dy as u16;
            // Truncation to the panel width happens here, never at write
            // time.
            for (dx, cell) in cells.iter().take(area.width as usize).enumerate() {
                let x = area.x + dx as u16;
                if let Some(target) = buf.cell_mut((x, y)) {
                    target.set_char(cell.ch);
                    target.set_style(cell_style(cell.style));
                }
            }
        }

        if total > viewport {
            render_scrollbar(area, buf, total, viewport, offset);
        }
    }
}

fn render_scrollbar(area: Rect, buf: &mut Buffer, total: usize, viewport: usize, offset: usize) {
    let x = area.x + area.width - 1;
    let height = viewport as f64;
    let thumb_height = ((height * height / total as f64).round() as usize).max(1);
    let max_scroll = total - viewport;
    let travel = viewport.saturating_sub(thumb_height);
    let thumb_top = (travel as f64 * offset as f64 / max_scroll as f64).round() as usize;

    for dy in 0..viewport {
        let y = area.y + dy as u16;
        let (symbol, style) = if dy >= thumb_top && dy < thumb_top + thumb_height {
            ("█", Style::default().fg(Color::Gray))
        } else {
            ("│", Style::default().fg(Color::DarkGray))
        };
        if let Some(target) = buf.cell_mut((x, y)) {
            target.set_symbol(symbol);
            target.set_style(style);
        }
    }
}

/// Map an emulator cell style onto a ratatui style.
fn cell_style(style: term::Style) -> Style {
    let mut out = Style::default()
        .fg(cell_color(style.fg))
        .bg(cell_color(style.bg));
    if style.bold {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.dim {
        out = out.add_modifier(Modifier::DIM);
    }
    if style.italic {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.underline {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    if style.blink {
        out = out.add_modifier(Modifier::SLOW_BLINK);
    }
    if style.reverse {
        out = out.add_modifier(Modifier::REVERSED);
    }
    if style.hidden {
        out = out.add_modifier(Modifier::HIDDEN);
    }
    if style.strikethrough {
        out = out.add_modifier(Modifier::CROSSED_OUT);
    }
    out
}

fn cell_color(color: term::Color) -> Color {
    match color {
        term::Color::Default => Color::Reset,
        term::Color::Indexed(0) => Color::Black,
        term::Color::Indexed(1) => Color::Red,
        term::Color::Indexed(2) => Color::Green,
        term::Color::Indexed(3) => Color::Yellow,
        term::Color::Indexed(4) => Color::Blue,
        term::Color::Indexed(5) => Color::Magenta,
        term::Color::Indexed(6) => Color::Cyan,
        term::Color::Indexed(7) => Color::Gray,
        term::Color::Indexed(8) => Color::DarkGray,
        term::Color::Indexed(9) => Color::LightRed,
        term::Color::Indexed(10) => Color::LightGreen,
        term::Color::Indexed(11) => Color::LightYellow,
        term::Color::Indexed(12) => Color::LightBlue,
        term::Color::Indexed(13) => Color::LightMagenta,
        term::Color::Indexed(14) => Color::LightCyan,
        term::Color::Indexed(15) => Color::White,
        term::Color::Indexed(index) => Color::Indexed(index),
        term::Color::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}
