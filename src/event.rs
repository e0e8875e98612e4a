//! The unified event stream produced by PTY reader threads.
//!
//! Readers never touch shared state; everything they observe is sent here
//! and applied by the UI loop. Every event carries the generation of the
//! process instance that produced it so late events from a dead reader can
//! be discarded after a restart.

/// Events multiplexed from all reader threads onto one channel.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Bytes read from a process's PTY.
    Output {
        index: usize,
        generation: u64,
        data: Vec<u8>,
    },
    /// The reader hit EOF or a read error and reaped the child.
    /// `code` is best-effort; `-1` when unavailable.
    Exited {
        index: usize,
        generation: u64,
        code: i32,
    },
}

impl AppEvent {
    /// The fleet index this event belongs to.
    pub fn index(&self) -> usize {
        match self {
            AppEvent::Output { index, .. } | AppEvent::Exited { index, .. } => *index,
        }
    }

    /// The process generation that produced this event.
    pub fn generation(&self) -> u64 {
        match self {
            AppEvent::Output { generation, .. } | AppEvent::Exited { generation, .. } => {
                *generation
            }
        }
    }
}
