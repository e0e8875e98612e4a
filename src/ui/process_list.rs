//! The left-hand process list.
//!
//! One row per process: pin and wrap indicators, a status icon, the
//! display name. The selected row is highlighted blue while browsing and
//! dark gray while a process is focused.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::process::{ManagedProcess, ProcessManager, ProcessStatus};

pub struct ProcessList<'a> {
    manager: &'a ProcessManager,
    selected: usize,
    focus_mode: bool,
}

impl<'a> ProcessList<'a> {
    pub fn new(manager: &'a ProcessManager, selected: usize, focus_mode: bool) -> Self {
        Self {
            manager,
            selected,
            focus_mode,
        }
    }
}

impl Widget for ProcessList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (index, process) in self.manager.iter().enumerate() {
            if index as u16 >= area.height {
                break;
            }
            let y = area.y + index as u16;
            if index == self.selected {
                let highlight = if self.focus_mode {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default().bg(Color::Blue)
                };
                buf.set_style(Rect::new(area.x, y, area.width, 1), highlight);
            }
            let line = entry_line(process);
            buf.set_line(area.x, y, &line, area.width);
        }
    }
}

fn entry_line(process: &ManagedProcess) -> Line<'_> {
    let pin = if process.auto_scroll {
        Span::raw(" ")
    } else {
        Span::styled("⇅", Style::default().fg(Color::White).bg(Color::Red))
    };
    let wrap = if process.wrap {
        Span::styled("w", Style::default().fg(Color::Yellow))
    } else {
        Span::raw(" ")
    };
    let (icon, icon_color) = status_icon(process.status);
    Line::from(vec![
        pin,
        wrap,
        Span::raw(" "),
        Span::styled(icon, Style::default().fg(icon_color)),
        Span::raw(" "),
        Span::styled(
            process.name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

fn status_icon(status: ProcessStatus) -> (&'static str, Color) {
    match status {
        ProcessStatus::Starting => ("◌", Color::Yellow),
        ProcessStatus::Running => ("●", Color::Green),
        ProcessStatus::Stopped => ("○", Color::DarkGray),
        ProcessStatus::Error(_) => ("✗", Color::Red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Config};
    use crate::event::AppEvent;

    fn manager(names: &str) -> ProcessManager {
        let commands = vec!["cmd".to_string(); names.split(',').count()];
        let config = Config::from_args(&Args {
            names: Some(names.to_string()),
            commands,
        });
        ProcessManager::new(&config, 60, 10).0
    }

    fn rendered_row(buf: &Buffer, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn rows_show_icon_and_name() {
        let manager = manager("web,api");
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        ProcessList::new(&manager, 0, false).render(buf.area, &mut buf);
        assert!(rendered_row(&buf, 0, 20).contains("◌ web"));
        assert!(rendered_row(&buf, 1, 20).contains("◌ api"));
    }

    #[test]
    fn stopped_and_error_statuses_change_the_icon() {
        let mut manager = manager("ok,bad");
        manager.handle_event(&AppEvent::Exited {
            index: 0,
            generation: 0,
            code: 0,
        });
        manager.handle_event(&AppEvent::Exited {
            index: 1,
            generation: 0,
            code: 2,
        });
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        ProcessList::new(&manager, 0, false).render(buf.area, &mut buf);
        assert!(rendered_row(&buf, 0, 20).contains("○ ok"));
        assert!(rendered_row(&buf, 1, 20).contains("✗ bad"));
    }

    #[test]
    fn wrap_decorator_shows_its_indicator() {
        let manager = manager("build:w");
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        ProcessList::new(&manager, 0, false).render(buf.area, &mut buf);
        let row = rendered_row(&buf, 0, 20);
        assert!(row.contains('w'));
        assert!(row.contains("build:w"));
    }

    #[test]
    fn pinned_process_shows_the_pin_glyph() {
        let mut manager = manager("svc");
        manager.get_mut(0).auto_scroll = false;
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        ProcessList::new(&manager, 0, false).render(buf.area, &mut buf);
        assert!(rendered_row(&buf, 0, 20).starts_with('⇅'));
    }

    #[test]
    fn selection_highlight_differs_between_modes() {
        let manager = manager("a,b");
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        ProcessList::new(&manager, 1, false).render(buf.area, &mut buf);
        assert_eq!(buf.cell((0, 1)).unwrap().style().bg, Some(Color::Blue));

        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        ProcessList::new(&manager, 1, true).render(buf.area, &mut buf);
        assert_eq!(buf.cell((0, 1)).unwrap().style().bg, Some(Color::DarkGray));
    }
}
