//! panex library crate.
//!
//! Core pieces of the multiplexer:
//! - Process fleet management over PTYs (`process`)
//! - Per-process terminal emulation (`term`)
//! - View state and input handling (`app`, `handlers`)
//! - Rendering widgets (`ui`)

pub mod app;
pub mod cli;
pub mod event;
pub mod handlers;
pub mod process;
pub mod term;
pub mod ui;
