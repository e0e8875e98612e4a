//! The process fleet: spawning, event dispatch, restart and kill.
//!
//! The manager owns every [`ManagedProcess`] in CLI order and is only ever
//! touched from the UI loop. Reader threads communicate exclusively through
//! the event channel; every event is generation-checked before it is
//! applied, which closes the race between a dead reader's tail events and
//! a freshly restarted instance under the same name.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cli::{CommandSpec, Config};
use crate::event::AppEvent;
use crate::term::Screen;

use super::pty::PtyProcess;

/// Delay before an `auto_restart` process is started again after a
/// non-zero exit.
const RESTART_DELAY: Duration = Duration::from_secs(1);

/// Lifecycle state of one fleet entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Starting,
    Running,
    Stopped,
    Error(i32),
}

/// One process entry: identity, lifecycle, and its terminal screen.
pub struct ManagedProcess {
    pub name: String,
    pub passthrough: bool,
    pub wrap: bool,
    pub spec: CommandSpec,
    /// Bumped on every start; events carrying an older value are stale.
    pub generation: u64,
    pub status: ProcessStatus,
    pub screen: Screen,
    /// Topmost visible display line in the output panel.
    pub scroll_offset: usize,
    /// Follow new output (true) or hold position (pinned, false).
    pub auto_scroll: bool,
    pub exit_code: Option<i32>,
    pty: Option<PtyProcess>,
    /// Set by an explicit kill; suppresses a pending auto-restart.
    killed_by_user: bool,
    restart_at: Option<Instant>,
}

impl ManagedProcess {
    pub fn is_running(&self) -> bool {
        self.pty.is_some()
    }
}

/// Owns the fleet and the sending half of the event channel.
pub struct ProcessManager {
    processes: Vec<ManagedProcess>,
    events_tx: Sender<AppEvent>,
    cols: u16,
    rows: u16,
}

impl ProcessManager {
    /// Build the fleet (without starting anything) and hand back the
    /// receiving half of the event channel for the UI loop.
    pub fn new(config: &Config, cols: u16, rows: u16) -> (Self, Receiver<AppEvent>) {
        let (events_tx, events_rx) = mpsc::channel();
        let processes = config
            .entries
            .iter()
            .map(|entry| ManagedProcess {
                name: entry.name.clone(),
                passthrough: entry.passthrough,
                wrap: entry.wrap,
                spec: entry.spec.clone(),
                generation: 0,
                status: ProcessStatus::Starting,
                screen: Screen::new(cols, rows),
                scroll_offset: 0,
                auto_scroll: true,
                exit_code: None,
                pty: None,
                killed_by_user: false,
                restart_at: None,
            })
            .collect();
        let manager = Self {
            processes,
            events_tx,
            cols,
            rows,
        };
        (manager, events_rx)
    }

    /// Number of fleet entries. Never zero: the CLI requires at least one
    /// command.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn get(&self, index: usize) -> &ManagedProcess {
        &self.processes[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut ManagedProcess {
        &mut self.processes[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedProcess> {
        self.processes.iter()
    }

    /// Number of entries that spawned successfully.
    pub fn running_count(&self) -> usize {
        self.processes.iter().filter(|p| p.is_running()).count()
    }

    pub fn start_all(&mut self) {
        for index in 0..self.processes.len() {
            self.start(index);
        }
    }

    /// (Re)spawn one entry. An existing handle is killed first; the
    /// generation bump invalidates the old reader's future events. On
    /// spawn failure the reason lands in the screen so the operator sees
    /// it in the output panel.
    pub fn start(&mut self, index: usize) {
        let (cols, rows) = (self.cols, self.rows);
        let events = self.events_tx.clone();
        let process = &mut self.processes[index];

        if let Some(pty) = process.pty.take() {
            pty.kill();
        }
        process.generation += 1;
        process.status = ProcessStatus::Starting;
        process.exit_code = None;
        process.killed_by_user = false;
        process.restart_at = None;

        match PtyProcess::spawn(&process.spec, cols, rows, index, process.generation, events) {
            Ok(pty) => {
                info!(name = %process.name, generation = process.generation, "started");
                process.pty = Some(pty);
                process.status = ProcessStatus::Running;
            }
            Err(err) => {
                warn!(name = %process.name, %err, "spawn failed");
                process.status = ProcessStatus::Error(-1);
                process.exit_code = Some(-1);
                let message = format!("panex: failed to start '{}': {err}\r\n", process.name);
                process.screen.write(message.as_bytes());
            }
        }
    }

    /// Kill, clear the buffer, start fresh.
    pub fn restart(&mut self, index: usize) {
        let process = &mut self.processes[index];
        if let Some(pty) = process.pty.take() {
            pty.kill();
        }
        process.screen.clear();
        process.scroll_offset = 0;
        process.auto_scroll = true;
        self.start(index);
    }

    /// Kill every handle first, then start everything. Killing up front
    /// overlaps the grace periods instead of serializing them.
    pub fn restart_all(&mut self) {
        for process in &mut self.processes {
            if let Some(pty) = process.pty.take() {
                pty.kill();
            }
            process.screen.clear();
            process.scroll_offset = 0;
            process.auto_scroll = true;
        }
        self.start_all();
    }

    /// Kill one entry. The entry itself stays so its last output remains
    /// readable; a pending auto-restart is cancelled.
    pub fn kill(&mut self, index: usize) {
        let process = &mut self.processes[index];
        process.killed_by_user = true;
        process.restart_at = None;
        if let Some(pty) = process.pty.take() {
            info!(name = %process.name, "killed by user");
            pty.kill();
        }
    }

    pub fn kill_all(&mut self) {
        for index in 0..self.processes.len() {
            self.kill(index);
        }
    }

    /// Forward input to a process. Writes to a dead PTY are dropped.
    pub fn write(&mut self, index: usize, data: &[u8]) {
        let process = &mut self.processes[index];
        if let Some(pty) = &mut process.pty {
            if let Err(err) = pty.write(data) {
                warn!(name = %process.name, %err, "PTY write failed");
            }
        }
    }

    /// Propagate new output-panel dimensions to every screen and PTY.
    pub fn resize_all(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        for process in &mut self.processes {
            process.screen.resize(cols, rows);
            if let Some(pty) = &process.pty {
                if let Err(err) = pty.resize(cols, rows) {
                    warn!(name = %process.name, %err, "PTY resize failed");
                }
            }
        }
    }

    /// Apply one event from a reader thread. Stale generations are
    /// discarded without effect.
    pub fn handle_event(&mut self, event: &AppEvent) {
        let index = event.index();
        let Some(process) = self.processes.get_mut(index) else {
            return;
        };
        if event.generation() != process.generation {
            debug!(
                name = %process.name,
                event_generation = event.generation(),
                current = process.generation,
                "dropping stale event"
            );
            return;
        }
        match event {
            AppEvent::Output { data, .. } => {
                let evicted = process.screen.write(data);
                if evicted > 0 {
                    process.scroll_offset = process.scroll_offset.saturating_sub(evicted);
                }
                // Capability-query replies go straight back to the child,
                // never to the renderer.
                for reply in process.screen.take_responses() {
                    if let Some(pty) = &mut process.pty {
                        if let Err(err) = pty.write(&reply) {
                            warn!(name = %process.name, %err, "query reply write failed");
                        }
                    }
                }
            }
            AppEvent::Exited { code, .. } => {
                info!(name = %process.name, code, "exited");
                process.pty = None;
                process.exit_code = Some(*code);
                process.status = if *code == 0 {
                    ProcessStatus::Stopped
                } else {
                    ProcessStatus::Error(*code)
                };
                if process.spec.auto_restart && *code != 0 && !process.killed_by_user {
                    process.restart_at = Some(Instant::now() + RESTART_DELAY);
                }
            }
        }
    }

    /// Fire due auto-restarts. Called once per UI-loop iteration.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let due: Vec<usize> = self
            .processes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.restart_at.is_some_and(|at| at <= now))
            .map(|(i, _)| i)
            .collect();
        for index in due {
            info!(name = %self.processes[index].name, "auto-restarting");
            self.restart(index);
        }
    }

    #[cfg(test)]
    fn restart_pending(&self, index: usize) -> bool {
        self.processes[index].restart_at.is_some()
    }
}
