//! tmux client used to locate panes and reach attached terminals.
//!
//! The hook runs detached from any terminal, so every interaction with the
//! user's screen goes through the tmux server. `Tmux` is the seam between the
//! notification logic and the real server; `TmuxCli` shells out to `tmux`.

use std::ffi::OsString;
use std::process::Command;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TmuxError {
    #[error("tmux command '{command}' failed: {message}")]
    CommandFailed {
        command: String,
        args: Vec<String>,
        message: String,
        stderr: Option<String>,
    },
}

impl TmuxError {
    fn command_failed(
        program: &OsString,
        args: &[&str],
        message: impl Into<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::CommandFailed {
            command: program.to_string_lossy().into_owned(),
            args: args.iter().map(|s| s.to_string()).collect(),
            message: message.into(),
            stderr,
        }
    }
}

pub type Result<T> = std::result::Result<T, TmuxError>;

/// Operations the hook needs from a tmux server.
pub trait Tmux {
    /// Expands `format` in the context of `target` (`display-message -p -t`).
    fn display_message(&self, target: &str, format: &str) -> Result<String>;

    /// Lists every pane of every session, one `format` line per pane.
    fn list_panes(&self, format: &str) -> Result<String>;

    /// Lists attached clients, one `format` line per client.
    fn list_clients(&self, format: &str) -> Result<String>;

    /// Runs a shell command inside the server (`run-shell [-t target] command`).
    fn run_shell(&self, target: Option<&str>, command: &str) -> Result<()>;

    /// Returns true if a server is running with at least one session.
    fn has_sessions(&self) -> bool;
}

/// `Tmux` implementation backed by the `tmux` executable.
#[derive(Debug, Clone)]
pub struct TmuxCli {
    program: OsString,
}

impl Default for TmuxCli {
    fn default() -> Self {
        Self::with_program("tmux")
    }
}

impl TmuxCli {
    /// Uses `program` instead of `tmux` from PATH.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run a tmux command and return trimmed stdout on success.
    fn run_output(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| TmuxError::command_failed(&self.program, args, e.to_string(), None))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(TmuxError::command_failed(
                &self.program,
                args,
                "command exited with non-zero status",
                Some(stderr),
            ))
        }
    }
}

impl Tmux for TmuxCli {
    fn display_message(&self, target: &str, format: &str) -> Result<String> {
        self.run_output(&["display-message", "-p", "-t", target, format])
    }

    fn list_panes(&self, format: &str) -> Result<String> {
        self.run_output(&["list-panes", "-a", "-F", format])
    }

    fn list_clients(&self, format: &str) -> Result<String> {
        self.run_output(&["list-clients", "-F", format])
    }

    fn run_shell(&self, target: Option<&str>, command: &str) -> Result<()> {
        let args: Vec<&str> = match target {
            Some(target) => vec!["run-shell", "-t", target, command],
            None => vec!["run-shell", command],
        };
        self.run_output(&args).map(|_| ())
    }

    fn has_sessions(&self) -> bool {
        self.run_output(&["list-sessions"]).is_ok()
    }
}
