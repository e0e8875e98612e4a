//! The screen/scrollback model driven by the VTE parser.
//!
//! Two deliberate departures from a classic terminal grid:
//!
//! - Lines are never wrapped when written. A program that positions content
//!   by absolute column keeps its layout intact if the host terminal is
//!   later resized narrower; wrapping and truncation are render-time
//!   concerns. Lines are only capped at [`MAX_LINE_WIDTH`] cells to bound
//!   memory.
//! - The buffer is unbounded downward up to [`MAX_SCROLLBACK`] lines, with
//!   FIFO eviction from the front. The cursor row is absolute within the
//!   buffer; the "visible screen" for cursor addressing is the last
//!   `reported_rows` lines.

use std::collections::VecDeque;

use unicode_width::UnicodeWidthChar;
use vte::{Params, Parser, Perform};

use super::style::{Cell, Color, Line, Style};

/// Maximum number of buffered lines per process.
pub const MAX_SCROLLBACK: usize = 10_000;

/// Hard cap on cells per line.
pub const MAX_LINE_WIDTH: usize = 2_000;

/// Terminal screen for one process.
///
/// The parser is persistent: escape sequences may straddle `write` calls
/// and are reassembled by the `vte` state machine.
pub struct Screen {
    parser: Parser,
    grid: Grid,
}

impl Screen {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            parser: Parser::new(),
            grid: Grid::new(cols, rows),
        }
    }

    /// Feed a chunk of PTY output into the screen model.
    ///
    /// Returns the number of lines evicted from the front of the scrollback
    /// while processing this chunk; the caller must shift any scroll offset
    /// it holds by the same amount.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        for &byte in bytes {
            self.parser.advance(&mut self.grid, byte);
        }
        std::mem::take(&mut self.grid.evicted)
    }

    /// Take and clear the queued capability-query replies (DA/CPR/DSR/
    /// XTWINOPS). The process manager writes these back to the PTY.
    pub fn take_responses(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.grid.responses)
    }

    /// Reset the buffer and parser state, keeping the reported size.
    /// Used when a process restarts and begins a fresh byte stream.
    pub fn clear(&mut self) {
        let (cols, rows) = (self.grid.cols, self.grid.rows);
        self.parser = Parser::new();
        self.grid = Grid::new(cols, rows);
    }

    /// Update the dimensions advertised to the child. The buffer itself is
    /// never reflowed or truncated.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.grid.cols = cols.max(1);
        self.grid.rows = rows.max(1);
    }

    pub fn reported_size(&self) -> (u16, u16) {
        (self.grid.cols, self.grid.rows)
    }

    /// Absolute cursor position within the buffer (row, col).
    pub fn cursor(&self) -> (usize, usize) {
        (self.grid.cursor_row, self.grid.cursor_col)
    }

    pub fn lines(&self) -> &VecDeque<Line> {
        &self.grid.lines
    }

    /// Number of buffer lines up to and including the last non-empty one.
    pub fn content_line_count(&self) -> usize {
        self.grid
            .lines
            .iter()
            .rposition(|line| !line.is_empty())
            .map_or(0, |last| last + 1)
    }

    /// Number of display rows needed for the buffer at the given panel
    /// width. Trailing empty lines are never counted; in wrap mode each
    /// line contributes `ceil(cells / viewport_cols)` rows (one if empty).
    pub fn display_line_count(&self, viewport_cols: u16, wrap: bool) -> usize {
        let cols = (viewport_cols as usize).max(1);
        let content = self.content_line_count();
        let count: usize = self
            .grid
            .lines
            .iter()
            .take(content)
            .map(|line| {
                if wrap {
                    line.cells.len().div_ceil(cols).max(1)
                } else {
                    1
                }
            })
            .sum();
        count.max(1)
    }

    /// The buffer flattened into display rows: whole lines when not
    /// wrapping (render truncates), `viewport_cols`-sized chunks when
    /// wrapping. Trailing empty lines are excluded, matching
    /// [`Self::display_line_count`].
    pub fn display_rows(&self, viewport_cols: u16, wrap: bool) -> Vec<&[Cell]> {
        let cols = (viewport_cols as usize).max(1);
        let content = self.content_line_count();
        let mut rows: Vec<&[Cell]> = Vec::new();
        for line in self.grid.lines.iter().take(content) {
            if !wrap || line.cells.is_empty() {
                rows.push(&line.cells);
            } else {
                rows.extend(line.cells.chunks(cols));
            }
        }
        if rows.is_empty() {
            rows.push(&[]);
        }
        rows
    }
}

/// Grid state mutated by the parser callbacks.
struct Grid {
    lines: VecDeque<Line>,
    cursor_row: usize,
    cursor_col: usize,
    style: Style,
    cols: u16,
    rows: u16,
    responses: Vec<Vec<u8>>,
    /// Lines evicted since the owner last drained them via `write`.
    evicted: usize,
    /// Scratch buffer for flattened SGR parameters, reused per dispatch.
    sgr_buf: Vec<u16>,
}

impl Grid {
    fn new(cols: u16, rows: u16) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(Line::default());
        Self {
            lines,
            cursor_row: 0,
            cursor_col: 0,
            style: Style::default(),
            cols: cols.max(1),
            rows: rows.max(1),
            responses: Vec::new(),
            evicted: 0,
            sgr_buf: Vec::new(),
        }
    }

    /// Index of the first line of the visible screen (the last
    /// `rows` buffer lines).
    fn screen_base(&self) -> usize {
        self.lines.len().saturating_sub(self.rows as usize)
    }

    /// Make sure `cursor_row` names an existing line, appending empty
    /// lines and evicting from the front when over the scrollback cap.
    fn ensure_cursor_line(&mut self) {
        while self.lines.len() <= self.cursor_row {
            self.lines.push_back(Line::default());
        }
        while self.lines.len() > MAX_SCROLLBACK {
            self.lines.pop_front();
            self.cursor_row = self.cursor_row.saturating_sub(1);
            self.evicted += 1;
        }
    }

    fn newline(&mut self) {
        self.cursor_row += 1;
        self.ensure_cursor_line();
    }

    fn current_line(&mut self) -> &mut Line {
        self.ensure_cursor_line();
        &mut self.lines[self.cursor_row]
    }

    fn put_char(&mut self, ch: char) {
        let width = ch.width().unwrap_or(0);
        if width == 0 {
            return;
        }
        let col = self.cursor_col;
        let style = self.style;
        let line = self.current_line();
        // Pad up to the cursor with blanks so absolute-column writes land
        // where the program asked.
        while line.cells.len() < col.min(MAX_LINE_WIDTH) {
            line.cells.push(Cell::blank(Style::default()));
        }
        for i in 0..width {
            let at = col + i;
            if at >= MAX_LINE_WIDTH {
                break;
            }
            let cell = if i == 0 {
                Cell { ch, style }
            } else {
                // Spacer cell behind a wide glyph.
                Cell::blank(style)
            };
            if at < line.cells.len() {
                line.cells[at] = cell;
            } else {
                line.cells.push(cell);
            }
        }
        self.cursor_col = (col + width).min(MAX_LINE_WIDTH);
    }

    fn move_rows_up(&mut self, n: usize) {
        let base = self.screen_base();
        self.cursor_row = self.cursor_row.saturating_sub(n).max(base);
    }

    fn move_rows_down(&mut self, n: usize) {
        let bottom = self.screen_base() + self.rows as usize - 1;
        self.cursor_row = (self.cursor_row + n).min(bottom);
        self.ensure_cursor_line();
    }

    /// CUP/HVP: 1-indexed row within the visible screen, 1-indexed column.
    fn move_to(&mut self, row: u16, col: u16) {
        let row_off = (row.max(1) - 1).min(self.rows - 1) as usize;
        self.cursor_row = self.screen_base() + row_off;
        self.ensure_cursor_line();
        self.cursor_col = (col.max(1) as usize - 1).min(MAX_LINE_WIDTH - 1);
    }

    fn erase_in_line(&mut self, mode: u16) {
        let col = self.cursor_col;
        let line = self.current_line();
        match mode {
            // Cursor to end: an absent tail renders identically to blank
            // cells, and keeps trailing-empty detection exact.
            0 => line.cells.truncate(col),
            1 => {
                let end = (col + 1).min(line.cells.len());
                for cell in &mut line.cells[..end] {
                    *cell = Cell::blank(Style::default());
                }
            }
            2 => line.cells.clear(),
            _ => {}
        }
    }

    fn erase_in_display(&mut self, mode: u16) {
        let base = self.screen_base();
        let row = self.cursor_row;
        match mode {
            0 => {
                self.erase_in_line(0);
                for line in self.lines.iter_mut().skip(row + 1) {
                    line.cells.clear();
                }
            }
            1 => {
                for line in self.lines.iter_mut().take(row).skip(base) {
                    line.cells.clear();
                }
                self.erase_in_line(1);
            }
            2 => {
                for line in self.lines.iter_mut().skip(base) {
                    line.cells.clear();
                }
            }
            _ => {}
        }
    }

    fn apply_sgr(&mut self, params: &Params) {
        self.sgr_buf.clear();
        for group in params.iter() {
            self.sgr_buf.extend_from_slice(group);
        }
        if self.sgr_buf.is_empty() {
            self.style = Style::default();
            return;
        }
        let mut i = 0;
        while i < self.sgr_buf.len() {
            match self.sgr_buf[i] {
                0 => self.style = Style::default(),
                1 => self.style.bold = true,
                2 => self.style.dim = true,
                3 => self.style.italic = true,
                4 => self.style.underline = true,
                5 => self.style.blink = true,
                7 => self.style.reverse = true,
                8 => self.style.hidden = true,
                9 => self.style.strikethrough = true,
                22 => {
                    self.style.bold = false;
                    self.style.dim = false;
                }
                23 => self.style.italic = false,
                24 => self.style.underline = false,
                25 => self.style.blink = false,
                27 => self.style.reverse = false,
                28 => self.style.hidden = false,
                29 => self.style.strikethrough = false,
                p @ 30..=37 => self.style.fg = Color::Indexed((p - 30) as u8),
                39 => self.style.fg = Color::Default,
                p @ 40..=47 => self.style.bg = Color::Indexed((p - 40) as u8),
                49 => self.style.bg = Color::Default,
                p @ 90..=97 => self.style.fg = Color::Indexed((p - 90 + 8) as u8),
                p @ 100..=107 => self.style.bg = Color::Indexed((p - 100 + 8) as u8),
                p @ (38 | 48) => {
                    let (color, used) = extended_color(&self.sgr_buf[i + 1..]);
                    if let Some(color) = color {
                        if p == 38 {
                            self.style.fg = color;
                        } else {
                            self.style.bg = color;
                        }
                    }
                    i += used;
                }
                _ => {}
            }
            i += 1;
        }
    }

    fn device_status_report(&mut self, kind: u16) {
        match kind {
            5 => self.responses.push(b"\x1b[0n".to_vec()),
            6 => {
                let row = self.cursor_row.saturating_sub(self.screen_base());
                let reply = format!("\x1b[{};{}R", row + 1, self.cursor_col + 1);
                self.responses.push(reply.into_bytes());
            }
            _ => {}
        }
    }
}

/// Parse the tail of `38;5;n` / `38;2;r;g;b` (or the `:` subparameter
/// forms, which flatten identically). Returns the color and how many
/// parameters were consumed; an unrecognized form consumes the rest so the
/// remaining values are not misread as attributes.
fn extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    match rest.first() {
        Some(5) if rest.len() >= 2 => (Some(Color::Indexed(rest[1].min(255) as u8)), 2),
        Some(2) if rest.len() >= 4 => (
            Some(Color::Rgb(
                rest[1].min(255) as u8,
                rest[2].min(255) as u8,
                rest[3].min(255) as u8,
            )),
            4,
        ),
        _ => (None, rest.len()),
    }
}

/// First value of the nth parameter group, with `0` mapped to `default`
/// (CSI counts treat a zero parameter as one).
fn param_or(params: &Params, index: usize, default: u16) -> u16 {
    params
        .iter()
        .nth(index)
        .and_then(|group| group.first())
        .copied()
        .filter(|&v| v != 0)
        .unwrap_or(default)
}

/// First value of the nth parameter group, zero included (erase selectors).
fn raw_param(params: &Params, index: usize) -> u16 {
    params
        .iter()
        .nth(index)
        .and_then(|group| group.first())
        .copied()
        .unwrap_or(0)
}

impl Perform for Grid {
    fn print(&mut self, ch: char) {
        self.put_char(ch);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x08 => self.cursor_col = self.cursor_col.saturating_sub(1),
            0x09 => self.cursor_col = ((self.cursor_col / 8 + 1) * 8).min(MAX_LINE_WIDTH),
            0x0a => self.newline(),
            0x0d => self.cursor_col = 0,
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        // Private-mode and intermediate-marked sequences are consumed
        // without effect; they must never leak into the grid as glyphs.
        if !intermediates.is_empty() {
            return;
        }
        match action {
            'A' => self.move_rows_up(param_or(params, 0, 1) as usize),
            'B' => self.move_rows_down(param_or(params, 0, 1) as usize),
            'C' => {
                let n = param_or(params, 0, 1) as usize;
                self.cursor_col = (self.cursor_col + n).min(MAX_LINE_WIDTH - 1);
            }
            'D' => {
                let n = param_or(params, 0, 1) as usize;
                self.cursor_col = self.cursor_col.saturating_sub(n);
            }
            'E' => {
                self.move_rows_down(param_or(params, 0, 1) as usize);
                self.cursor_col = 0;
            }
            'F' => {
                self.move_rows_up(param_or(params, 0, 1) as usize);
                self.cursor_col = 0;
            }
            'G' => {
                self.cursor_col = (param_or(params, 0, 1) as usize - 1).min(MAX_LINE_WIDTH - 1);
            }
            'H' | 'f' => self.move_to(param_or(params, 0, 1), param_or(params, 1, 1)),
            'J' => self.erase_in_display(raw_param(params, 0)),
            'K' => self.erase_in_line(raw_param(params, 0)),
            'm' => self.apply_sgr(params),
            'n' => self.device_status_report(raw_param(params, 0)),
            'c' => {
                // Primary DA. "VT100 with advanced video option".
                if raw_param(params, 0) == 0 {
                    self.responses.push(b"\x1b[?1;2c".to_vec());
                }
            }
            't' => {
                // XTWINOPS: only the text-area size report is answered.
                if raw_param(params, 0) == 18 {
                    let reply = format!("\x1b[8;{};{}t", self.rows, self.cols);
                    self.responses.push(reply.into_bytes());
                }
            }
            _ => {}
        }
    }

    // OSC, DCS and bare ESC sequences are recognized by the state machine
    // and dropped here.
    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}
    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}
    fn put(&mut self, _byte: u8) {}
    fn unhook(&mut self) {}
}
