//! The editor process whose unexpected exit signals the bug under test

use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use tracing::{debug, warn};

use crate::error::{Result, TesterError};

pub struct WatchedProcess {
    child: Child,
    command: String,
}

impl WatchedProcess {
    /// Launch the editor in `project_dir` with its output discarded.
    pub fn spawn(command: &[String], project_dir: &Path) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| TesterError::InvalidConfig("editor command is empty".to_string()))?;
        let command_line = command.join(" ");

        let child = Command::new(program)
            .args(args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| TesterError::EditorSpawn {
                command: command_line.clone(),
                source,
            })?;

        debug!(pid = child.id(), command = %command_line, "spawned editor");
        Ok(Self {
            child,
            command: command_line,
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Non-blocking liveness check. `None` while the process is still running.
    pub fn exit_status(&mut self) -> Result<Option<ExitStatus>> {
        self.child.try_wait().map_err(TesterError::Poll)
    }

    /// Kill and reap the process if it is still alive. Returns whether it was killed.
    pub fn kill_if_running(&mut self) -> Result<bool> {
        if self.exit_status()?.is_some() {
            return Ok(false);
        }

        debug!(pid = self.child.id(), "killing editor");
        // The process may exit between the poll and the kill.
        if let Err(e) = self.child.kill() {
            if self.exit_status()?.is_some() {
                return Ok(false);
            }
            return Err(TesterError::Poll(e));
        }
        self.child.wait().map_err(TesterError::Poll)?;
        Ok(true)
    }
}

impl Drop for WatchedProcess {
    fn drop(&mut self) {
        if let Err(e) = self.kill_if_running() {
            warn!(pid = self.child.id(), error = %e, "failed to clean up editor");
        }
    }
}
