//! View state and the operations input handlers invoke on it.
//!
//! `App` is plain data mutated only from the UI loop: the selected fleet
//! index, focus mode, the help overlay, and the debounced host resize.
//! Scroll position and the follow/pin flag live on each process entry, so
//! switching selection inherently restores the previous view.

use std::time::{Duration, Instant};

use crate::process::{ManagedProcess, ProcessManager};

/// Fixed width of the left-hand process list.
pub const PROCESS_LIST_WIDTH: u16 = 20;

/// Quiet period before a host resize is propagated to the fleet.
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Display lines moved per wheel notch.
pub const WHEEL_SCROLL_LINES: usize = 3;

struct PendingResize {
    cols: u16,
    rows: u16,
    deadline: Instant,
}

pub struct App {
    pub manager: ProcessManager,
    pub selected: usize,
    pub focus_mode: bool,
    pub show_help: bool,
    pub should_quit: bool,
    /// Host terminal size (cols, rows).
    pub host_size: (u16, u16),
    pending_resize: Option<PendingResize>,
}

impl App {
    pub fn new(manager: ProcessManager, host_cols: u16, host_rows: u16) -> Self {
        Self {
            manager,
            selected: 0,
            focus_mode: false,
            show_help: false,
            should_quit: false,
            host_size: (host_cols, host_rows),
            pending_resize: None,
        }
    }

    /// Output-panel dimensions: host minus the list, the separator column
    /// and the status bar.
    pub fn panel_size(&self) -> (u16, u16) {
        let (cols, rows) = self.host_size;
        (
            cols.saturating_sub(PROCESS_LIST_WIDTH + 1).max(1),
            rows.saturating_sub(1).max(1),
        )
    }

    pub fn selected_process(&self) -> &ManagedProcess {
        self.manager.get(self.selected)
    }

    pub fn selected_process_mut(&mut self) -> &mut ManagedProcess {
        self.manager.get_mut(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.manager.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select(&mut self, index: usize) {
        if index < self.manager.len() {
            self.selected = index;
        }
    }

    /// Record a host resize; the fleet only hears about it once events go
    /// quiet for the debounce period.
    pub fn schedule_resize(&mut self, cols: u16, rows: u16) {
        self.pending_resize = Some(PendingResize {
            cols,
            rows,
            deadline: Instant::now() + RESIZE_DEBOUNCE,
        });
    }

    /// Timer work for one loop iteration: due auto-restarts and the
    /// debounced resize.
    pub fn tick(&mut self) {
        self.manager.tick();
        if let Some(pending) = &self.pending_resize {
            if pending.deadline <= Instant::now() {
                self.host_size = (pending.cols, pending.rows);
                self.pending_resize = None;
                let (cols, rows) = self.panel_size();
                self.manager.resize_all(cols, rows);
            }
        }
    }

    /// Greatest valid scroll offset for the selected process.
    fn max_scroll(&self) -> usize {
        let (cols, rows) = self.panel_size();
        let process = self.selected_process();
        let count = process.screen.display_line_count(cols, process.wrap);
        // Strictly greater: the cursor may sit on an empty row just past
        // the last content row, and showing it makes the view flicker.
        if count > rows as usize {
            count - rows as usize
        } else {
            0
        }
    }

    /// Re-apply the follow/pin state before a frame is drawn: a following
    /// view sticks to the bottom, a pinned one is clamped into range.
    pub fn pin_selected(&mut self) {
        let max_scroll = self.max_scroll();
        let process = self.selected_process_mut();
        if process.auto_scroll {
            process.scroll_offset = max_scroll;
        } else {
            process.scroll_offset = process.scroll_offset.min(max_scroll);
        }
    }

    /// Manual scroll up always unpins from the bottom.
    pub fn scroll_up(&mut self, lines: usize) {
        let process = self.selected_process_mut();
        process.scroll_offset = process.scroll_offset.saturating_sub(lines);
        process.auto_scroll = false;
    }

    /// Manual scroll down; reaching within one line of the bottom
    /// re-enables following.
    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.max_scroll();
        let process = self.selected_process_mut();
        process.scroll_offset = (process.scroll_offset + lines).min(max_scroll);
        if process.scroll_offset + 1 >= max_scroll {
            process.auto_scroll = true;
        }
    }

    pub fn page_up(&mut self) {
        let (_, rows) = self.panel_size();
        self.scroll_up(rows as usize);
    }

    pub fn page_down(&mut self) {
        let (_, rows) = self.panel_size();
        self.scroll_down(rows as usize);
    }

    /// `t`: show the top of the buffer and hold there.
    pub fn jump_to_top(&mut self) {
        let process = self.selected_process_mut();
        process.scroll_offset = 0;
        process.auto_scroll = false;
    }

    /// `b`/`G`: back to the live tail.
    pub fn jump_to_bottom(&mut self) {
        let max_scroll = self.max_scroll();
        let process = self.selected_process_mut();
        process.scroll_offset = max_scroll;
        process.auto_scroll = true;
    }

    /// `g`: flip the pin flag in place.
    pub fn toggle_pin(&mut self) {
        let max_scroll = self.max_scroll();
        let process = self.selected_process_mut();
        process.auto_scroll = !process.auto_scroll;
        if process.auto_scroll {
            process.scroll_offset = max_scroll;
        }
    }

    pub fn toggle_wrap(&mut self) {
        let process = self.selected_process_mut();
        process.wrap = !process.wrap;
        self.pin_selected();
    }

    pub fn enter_focus(&mut self) {
        self.focus_mode = true;
        self.show_help = false;
    }

    pub fn exit_focus(&mut self) {
        self.focus_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Config};
    use crate::event::AppEvent;
    use crate::process::ProcessManager;

    /// App over two never-started processes, host 81x11: the output panel
    /// is 60x10.
    fn app() -> App {
        let config = Config::from_args(&Args {
            names: None,
            commands: vec!["first".into(), "second".into()],
        });
        let (manager, _rx) = ProcessManager::new(&config, 60, 10);
        App::new(manager, 81, 11)
    }

    fn feed(app: &mut App, index: usize, data: &[u8]) {
        app.manager.handle_event(&AppEvent::Output {
            index,
            generation: 0,
            data: data.to_vec(),
        });
    }

    fn feed_lines(app: &mut App, index: usize, n: usize) {
        for i in 0..n {
            feed(app, index, format!("line {i}\r\n").as_bytes());
        }
    }

    #[test]
    fn panel_size_subtracts_list_separator_and_status_bar() {
        assert_eq!(app().panel_size(), (60, 10));
    }

    #[test]
    fn selection_moves_and_clamps() {
        let mut app = app();
        app.select_prev();
        assert_eq!(app.selected, 0);
        app.select_next();
        assert_eq!(app.selected, 1);
        app.select_next();
        assert_eq!(app.selected, 1);
        app.select(5);
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn following_view_pins_without_showing_the_cursor_row() {
        let mut app = app();
        // Exactly fills the 10-row viewport, then the newline leaves the
        // cursor on an empty row below the content.
        feed_lines(&mut app, 0, 10);
        app.pin_selected();
        assert_eq!(app.selected_process().scroll_offset, 0);
    }

    #[test]
    fn following_view_scrolls_once_content_overflows() {
        let mut app = app();
        feed_lines(&mut app, 0, 11);
        app.pin_selected();
        assert_eq!(app.selected_process().scroll_offset, 1);
        // Pinned bottom: offset + viewport covers all display lines.
        let (cols, rows) = app.panel_size();
        let process = app.selected_process();
        assert!(
            process.scroll_offset + rows as usize
                >= process.screen.display_line_count(cols, process.wrap)
        );
    }

    #[test]
    fn scroll_up_unpins_and_scroll_back_down_repins() {
        let mut app = app();
        feed_lines(&mut app, 0, 30);
        app.pin_selected();
        assert!(app.selected_process().auto_scroll);
        app.scroll_up(WHEEL_SCROLL_LINES);
        assert!(!app.selected_process().auto_scroll);
        assert_eq!(app.selected_process().scroll_offset, 17);
        // Still above the 1-line tolerance after one notch down.
        app.scroll_down(1);
        assert!(!app.selected_process().auto_scroll);
        app.scroll_down(WHEEL_SCROLL_LINES);
        assert!(app.selected_process().auto_scroll);
    }

    #[test]
    fn scroll_down_near_bottom_counts_as_bottom() {
        let mut app = app();
        feed_lines(&mut app, 0, 30);
        app.pin_selected();
        app.scroll_up(1);
        assert!(!app.selected_process().auto_scroll);
        // One line short of the bottom is within tolerance.
        app.scroll_down(0);
        assert!(app.selected_process().auto_scroll);
    }

    #[test]
    fn jump_and_toggle_pin_variants() {
        let mut app = app();
        feed_lines(&mut app, 0, 30);
        app.jump_to_top();
        assert_eq!(app.selected_process().scroll_offset, 0);
        assert!(!app.selected_process().auto_scroll);
        app.jump_to_bottom();
        assert_eq!(app.selected_process().scroll_offset, 20);
        assert!(app.selected_process().auto_scroll);
        app.toggle_pin();
        assert!(!app.selected_process().auto_scroll);
        app.toggle_pin();
        assert!(app.selected_process().auto_scroll);
        assert_eq!(app.selected_process().scroll_offset, 20);
    }

    #[test]
    fn scroll_position_is_remembered_per_process() {
        let mut app = app();
        feed_lines(&mut app, 0, 30);
        app.scroll_up(5);
        let held = app.selected_process().scroll_offset;
        app.select_next();
        app.pin_selected();
        app.select_prev();
        app.pin_selected();
        assert_eq!(app.selected_process().scroll_offset, held);
        assert!(!app.selected_process().auto_scroll);
    }

    #[test]
    fn wrap_toggle_reclamps_the_offset() {
        let mut app = app();
        // One long line: 1 display row unwrapped, 3 rows wrapped at 60.
        feed(&mut app, 0, "x".repeat(150).as_bytes());
        assert!(!app.selected_process().wrap);
        app.toggle_wrap();
        let (cols, _) = app.panel_size();
        let process = app.selected_process();
        assert!(process.wrap);
        assert_eq!(process.screen.display_line_count(cols, true), 3);
    }

    #[test]
    fn resize_is_debounced_and_takes_the_last_dimensions() {
        let mut app = app();
        app.schedule_resize(100, 40);
        app.tick();
        // Deadline has not elapsed yet.
        assert_eq!(app.manager.get(0).screen.reported_size(), (60, 10));
        std::thread::sleep(Duration::from_millis(30));
        app.schedule_resize(120, 50);
        app.tick();
        assert_eq!(app.manager.get(0).screen.reported_size(), (60, 10));
        std::thread::sleep(Duration::from_millis(60));
        app.tick();
        // 120x50 host -> 99x49 panel, for every process.
        assert_eq!(app.host_size, (120, 50));
        assert_eq!(app.manager.get(0).screen.reported_size(), (99, 49));
        assert_eq!(app.manager.get(1).screen.reported_size(), (99, 49));
    }

    #[test]
    fn focus_transitions_close_the_help_overlay() {
        let mut app = app();
        app.show_help = true;
        app.enter_focus();
        assert!(app.focus_mode);
        assert!(!app.show_help);
        app.exit_focus();
        assert!(!app.focus_mode);
    }
}
