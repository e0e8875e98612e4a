//! The one-row status bar at the bottom of the screen.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Browse-mode key summary.
const BROWSE_HELP: &str = "[↑↓/jk] select  [Tab/Enter] focus  [r] restart  [A] restart All  [x] kill  [q] quit  [?] help";

pub struct StatusBar<'a> {
    focus_mode: bool,
    process_name: &'a str,
    passthrough: bool,
}

impl<'a> StatusBar<'a> {
    pub fn new(focus_mode: bool, process_name: &'a str, passthrough: bool) -> Self {
        Self {
            focus_mode,
            process_name,
            passthrough,
        }
    }

    /// The status line text for the current mode.
    pub fn text(&self) -> String {
        if !self.focus_mode {
            return BROWSE_HELP.to_string();
        }
        // A passthrough process receives Shift-Tab, so it is not offered
        // as an exit key.
        let exit_keys = if self.passthrough {
            "Esc"
        } else {
            "Shift-Tab/Esc"
        };
        format!(
            "FOCUS: {} — Type to interact, [{}] to exit focus mode",
            self.process_name, exit_keys
        )
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = if self.focus_mode {
            Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        };
        let line = Line::from(Span::raw(self.text()));
        Paragraph::new(line).style(style).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browse_text_lists_the_bindings() {
        let bar = StatusBar::new(false, "web", false);
        let text = bar.text();
        assert!(text.contains("[r] restart"));
        assert!(text.contains("[q] quit"));
        assert!(text.contains("[?] help"));
    }

    #[test]
    fn focus_text_names_the_process() {
        let bar = StatusBar::new(true, "api", false);
        assert_eq!(
            bar.text(),
            "FOCUS: api — Type to interact, [Shift-Tab/Esc] to exit focus mode"
        );
    }

    #[test]
    fn passthrough_omits_shift_tab_from_the_exit_keys() {
        let bar = StatusBar::new(true, "helix!", true);
        assert_eq!(
            bar.text(),
            "FOCUS: helix! — Type to interact, [Esc] to exit focus mode"
        );
    }
}
