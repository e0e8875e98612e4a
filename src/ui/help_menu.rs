//! Help overlay listing the browse-mode keybindings.
//!
//! Toggled by `?`. Rendered as a centered popup: one binding per row,
//! keys in a fixed-width left column.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Browse-mode bindings, one row each.
const BINDINGS: &[(&str, &str)] = &[
    ("↑/k  ↓/j", "select process"),
    ("Enter  Tab", "focus selected"),
    ("r", "restart selected"),
    ("A", "restart all"),
    ("x", "kill selected"),
    ("g", "toggle pin"),
    ("t", "jump to top, pin"),
    ("b  G", "jump to bottom"),
    ("PgUp  PgDn", "scroll a page"),
    ("wheel", "scroll 3 lines"),
    ("w", "toggle line wrap"),
    ("?", "toggle this help"),
    ("q  Ctrl-C", "quit"),
];

/// Width of the key column, sized to the longest key chord.
const KEY_COLUMN: usize = 11;

/// Width of the action column, sized to the longest action text.
const ACTION_COLUMN: u16 = 17;

/// Widget that renders the help overlay.
#[derive(Default)]
pub struct HelpMenu;

impl HelpMenu {
    pub fn new() -> Self {
        Self
    }

    /// Popup rect centered in `screen`, sized to the binding table and
    /// clamped to fit.
    pub fn popup_area(screen: Rect) -> Rect {
        // Key column + separator space + action column + side borders.
        let width = (KEY_COLUMN as u16 + 2 + ACTION_COLUMN + 2).min(screen.width);
        let height = (BINDINGS.len() as u16 + 2).min(screen.height);
        Rect {
            x: screen.x + (screen.width - width) / 2,
            y: screen.y + (screen.height - height) / 2,
            width,
            height,
        }
    }

    fn rows() -> Vec<Line<'static>> {
        BINDINGS
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(
                        format!("{key:>width$}", width = KEY_COLUMN),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::raw(*action),
                ])
            })
            .collect()
    }
}

impl Widget for HelpMenu {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " Help ",
                Style::default().add_modifier(Modifier::BOLD),
            ));
        Paragraph::new(Self::rows()).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered_and_sized_to_the_table() {
        let area = HelpMenu::popup_area(Rect::new(0, 0, 100, 40));
        // 13 bindings + 2 border rows, 11 + 2 + 17 + 2 columns.
        assert_eq!(area.height, 15);
        assert_eq!(area.width, 32);
        assert_eq!(area.x, 34);
        assert_eq!(area.y, 12);
    }

    #[test]
    fn popup_clamps_to_a_small_screen() {
        let screen = Rect::new(0, 0, 20, 6);
        let area = HelpMenu::popup_area(screen);
        assert_eq!(area.width, 20);
        assert_eq!(area.height, 6);
        assert_eq!((area.x, area.y), (0, 0));
    }

    #[test]
    fn bindings_cover_the_core_keys() {
        let keys: Vec<&str> = BINDINGS.iter().map(|(key, _)| *key).collect();
        for key in ["r", "A", "x", "g", "t", "w", "?"] {
            assert!(keys.contains(&key));
        }
    }

    #[test]
    fn render_shows_keys_and_actions() {
        let area = Rect::new(0, 0, 32, 15);
        let mut buf = Buffer::empty(area);
        HelpMenu::new().render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| {
                (0..area.width).map(move |x| (x, y))
            })
            .filter_map(|pos| buf.cell(pos).map(|c| c.symbol().to_string()))
            .collect();
        assert!(text.contains("restart all"));
        assert!(text.contains("toggle pin"));
        assert!(text.contains("Help"));
    }
}
