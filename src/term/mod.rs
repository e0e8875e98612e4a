//! Per-process terminal emulation.
//!
//! Each managed process owns a [`Screen`]: a scrollback buffer fed by the
//! raw byte stream coming off the PTY. The byte-level state machine is
//! `vte`; the grid semantics (cursor motion, erase, SGR, capability
//! replies) live here.

mod screen;
mod style;

pub use screen::{Screen, MAX_LINE_WIDTH, MAX_SCROLLBACK};
pub use style::{Cell, Color, Line, Style};
