//! Test doubles shared across modules.

pub mod factories;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::infra::tmux::{Result, Tmux, TmuxError};

/// In-memory `Tmux` that serves canned output and records every call.
///
/// Queries without canned output fail, so a fresh `FakeTmux` behaves like
/// an unreachable server.
#[derive(Debug, Default)]
pub struct FakeTmux {
    /// Map of (target, format) -> display-message output
    displays: HashMap<(String, String), String>,
    panes: Option<String>,
    clients: Option<String>,
    server_running: bool,
    run_shell_fails: bool,
    /// Track calls for assertions, e.g. "list-panes <format>"
    calls: Mutex<Vec<String>>,
}

impl FakeTmux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display(mut self, target: &str, format: &str, output: &str) -> Self {
        self.displays
            .insert((target.to_string(), format.to_string()), output.to_string());
        self
    }

    /// Output of `list-panes`, one pane per line.
    pub fn with_panes(mut self, listing: &str) -> Self {
        self.panes = Some(listing.to_string());
        self
    }

    /// Output of `list-clients`, one client tty per line.
    pub fn with_clients(mut self, listing: &str) -> Self {
        self.clients = Some(listing.to_string());
        self
    }

    /// Makes `has_sessions` report a live server.
    pub fn with_server(mut self) -> Self {
        self.server_running = true;
        self
    }

    /// Makes every `run_shell` call fail.
    pub fn with_failing_run_shell(mut self) -> Self {
        self.run_shell_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands passed to `run_shell`, without the target.
    pub fn shell_commands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.strip_prefix("run-shell "))
            .map(|c| match c.strip_prefix("-t ") {
                Some(rest) => rest.split_once(' ').map_or("", |(_, cmd)| cmd).to_string(),
                None => c.to_string(),
            })
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn unanswered(args: &[&str]) -> TmuxError {
        TmuxError::CommandFailed {
            command: "tmux".to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            message: "no canned output".to_string(),
            stderr: None,
        }
    }
}

impl Tmux for FakeTmux {
    fn display_message(&self, target: &str, format: &str) -> Result<String> {
        self.record(format!("display-message -t {target} {format}"));
        self.displays
            .get(&(target.to_string(), format.to_string()))
            .cloned()
            .ok_or_else(|| Self::unanswered(&["display-message", "-p", "-t", target, format]))
    }

    fn list_panes(&self, format: &str) -> Result<String> {
        self.record(format!("list-panes {format}"));
        self.panes
            .clone()
            .ok_or_else(|| Self::unanswered(&["list-panes", "-a", "-F", format]))
    }

    fn list_clients(&self, format: &str) -> Result<String> {
        self.record(format!("list-clients {format}"));
        self.clients
            .clone()
            .ok_or_else(|| Self::unanswered(&["list-clients", "-F", format]))
    }

    fn run_shell(&self, target: Option<&str>, command: &str) -> Result<()> {
        match target {
            Some(target) => self.record(format!("run-shell -t {target} {command}")),
            None => self.record(format!("run-shell {command}")),
        }
        if self.run_shell_fails {
            return Err(Self::unanswered(&["run-shell", command]));
        }
        Ok(())
    }

    fn has_sessions(&self) -> bool {
        self.record("list-sessions".to_string());
        self.server_running
    }
}
