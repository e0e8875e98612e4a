//! One PTY-backed child process.
//!
//! Opens the pseudo-terminal, spawns the platform shell as a session
//! leader (the shell's PID is its process-group ID), and runs a reader
//! thread that forwards output as generation-tagged events. Killing is
//! fire-and-forget: SIGTERM to the process group, a short grace period,
//! then SIGKILL.

use std::io::{Read, Write};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tracing::debug;

use crate::cli::CommandSpec;
use crate::event::AppEvent;

/// Grace between SIGTERM and SIGKILL when tearing a process group down.
const KILL_GRACE: Duration = Duration::from_millis(50);

/// A live PTY and its child process group.
pub struct PtyProcess {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Arc<Mutex<Box<dyn Child + Send + Sync>>>,
    pid: Option<u32>,
}

impl PtyProcess {
    /// Open a PTY at `(cols, rows)` and spawn `spec` in it. The reader
    /// thread forwards `(index, generation)`-tagged output and exit events
    /// on `events` until EOF, then reaps the child.
    pub fn spawn(
        spec: &CommandSpec,
        cols: u16,
        rows: u16,
        index: usize,
        generation: u64,
        events: Sender<AppEvent>,
    ) -> Result<Self> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to open PTY")?;

        let mut cmd = shell_command(&spec.command);
        if let Some(cwd) = &spec.cwd {
            cmd.cwd(cwd);
        }
        cmd.env("TERM", "xterm-256color");
        cmd.env("COLORTERM", "truecolor");
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn: {}", spec.command))?;
        // Drop the slave side so the master reader sees EOF when the child
        // exits.
        drop(pair.slave);

        let pid = child.process_id();
        debug!(index, generation, ?pid, command = %spec.command, "spawned");

        let writer = pair.master.take_writer().context("Failed to open PTY writer")?;
        let mut reader = pair
            .master
            .try_clone_reader()
            .context("Failed to open PTY reader")?;

        let child = Arc::new(Mutex::new(child));
        let reaper = Arc::clone(&child);
        thread::spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let event = AppEvent::Output {
                            index,
                            generation,
                            data: buf[..n].to_vec(),
                        };
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                }
            }
            let code = reaper
                .lock()
                .ok()
                .and_then(|mut child| child.wait().ok())
                .map_or(-1, |status| status.exit_code() as i32);
            debug!(index, generation, code, "reader finished");
            let _ = events.send(AppEvent::Exited {
                index,
                generation,
                code,
            });
        });

        Ok(Self {
            master: pair.master,
            writer,
            child,
            pid,
        })
    }

    /// Forward input bytes to the child.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Resize the PTY; the child gets SIGWINCH.
    pub fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to resize PTY")?;
        Ok(())
    }

    /// Terminate the child's process group. Non-blocking: SIGTERM now, a
    /// detached thread delivers SIGKILL after the grace period. The reader
    /// thread observes EOF and reaps. Children that re-parent into their
    /// own process group are not guaranteed to die.
    pub fn kill(&self) {
        #[cfg(unix)]
        {
            if let Some(pid) = self.pid {
                use nix::sys::signal::{killpg, Signal};
                use nix::unistd::Pid;

                let pgid = Pid::from_raw(pid as i32);
                debug!(%pgid, "killing process group");
                let _ = killpg(pgid, Signal::SIGTERM);
                thread::spawn(move || {
                    thread::sleep(KILL_GRACE);
                    let _ = killpg(pgid, Signal::SIGKILL);
                });
                return;
            }
        }

        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
        }
    }
}

/// The platform shell wrapping one command line.
#[cfg(unix)]
fn shell_command(command: &str) -> CommandBuilder {
    let shell = if std::path::Path::new("/bin/bash").exists() {
        "/bin/bash"
    } else {
        "/bin/sh"
    };
    let mut cmd = CommandBuilder::new(shell);
    cmd.arg("-c");
    cmd.arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> CommandBuilder {
    let mut cmd = CommandBuilder::new("powershell.exe");
    cmd.arg("-Command");
    cmd.arg(command);
    cmd
}
