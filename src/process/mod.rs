//! Process ownership: one PTY-backed child per fleet entry, plus the
//! manager that multiplexes their output and drives their lifecycle.

mod manager;
mod pty;

pub use manager::{ManagedProcess, ProcessManager, ProcessStatus};
