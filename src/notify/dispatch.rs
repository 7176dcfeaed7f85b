//! Alerts the user about a stored notification.
//!
//! The hook runs detached from any terminal, so the bell is sent through
//! several independent routes and the popup is opened through tmux itself.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::error::{NotifyError, Result};
use super::types::Notification;
use crate::infra::tmux::Tmux;
use crate::shared::command::is_executable;
use crate::shared::config::PopupConfig;

/// ASCII BEL.
const BEL: &[u8] = b"\x07";

/// tmux format listing the terminal device of each attached client.
const CLIENT_TTY_FORMAT: &str = "#{client_tty}";

/// A way of making the user's terminal ring.
pub trait BellRoute {
    fn name(&self) -> &'static str;

    /// Rings the bell. `Ok(false)` means the route does not apply here.
    fn ring(&self) -> Result<bool>;
}

/// Prints BEL from inside the tmux server, which forwards it to every client.
pub struct TmuxBroadcastBell<'a> {
    tmux: &'a dyn Tmux,
}

impl<'a> TmuxBroadcastBell<'a> {
    pub fn new(tmux: &'a dyn Tmux) -> Self {
        Self { tmux }
    }
}

impl BellRoute for TmuxBroadcastBell<'_> {
    fn name(&self) -> &'static str {
        "tmux-broadcast"
    }

    fn ring(&self) -> Result<bool> {
        self.tmux.run_shell(Some(":"), r"printf '\a'")?;
        Ok(true)
    }
}

/// Writes BEL directly to the terminal device of every attached tmux client.
pub struct ClientTtyBell<'a> {
    tmux: &'a dyn Tmux,
}

impl<'a> ClientTtyBell<'a> {
    pub fn new(tmux: &'a dyn Tmux) -> Self {
        Self { tmux }
    }
}

impl BellRoute for ClientTtyBell<'_> {
    fn name(&self) -> &'static str {
        "client-tty"
    }

    fn ring(&self) -> Result<bool> {
        let clients = self.tmux.list_clients(CLIENT_TTY_FORMAT)?;
        let ttys: Vec<&Path> = clients
            .lines()
            .map(str::trim)
            .filter(|tty| !tty.is_empty())
            .map(Path::new)
            .filter(|tty| tty.exists())
            .collect();

        if ttys.is_empty() {
            return Ok(false);
        }

        let mut rung = 0;
        for tty in ttys {
            match write_bel(tty) {
                Ok(()) => {
                    debug!(tty = %tty.display(), "bell sent to client tty");
                    rung += 1;
                }
                Err(e) => warn!(error = %e, "failed to ring client tty"),
            }
        }

        if rung == 0 {
            return Err(NotifyError::NoClientTerminal);
        }
        Ok(true)
    }
}

/// Writes BEL to the terminal of the SSH session the agent runs in.
pub struct SshTtyBell {
    tty: Option<PathBuf>,
}

impl SshTtyBell {
    pub fn new(tty: Option<PathBuf>) -> Self {
        Self { tty }
    }
}

impl BellRoute for SshTtyBell {
    fn name(&self) -> &'static str {
        "ssh-tty"
    }

    fn ring(&self) -> Result<bool> {
        match self.tty.as_deref().filter(|tty| tty.exists()) {
            Some(tty) => write_bel(tty).map(|()| true),
            None => Ok(false),
        }
    }
}

fn write_bel(tty: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(tty)
        .map_err(|e| NotifyError::io(tty, e))?;
    file.write_all(BEL)
        .and_then(|()| file.flush())
        .map_err(|e| NotifyError::io(tty, e))
}

/// Shows a stored notification to the user.
pub trait PopupPresenter {
    /// Opens the presenter for notification `id` on the pane at `location`.
    fn present(&self, id: &str, location: &str) -> Result<()>;
}

/// Opens the popup script in a `tmux display-popup`.
///
/// The popup is launched via `run-shell` so that it runs in the server's
/// context; a popup started directly from the detached hook has no client
/// to attach to.
pub struct TmuxPopup<'a> {
    tmux: &'a dyn Tmux,
    script: Option<PathBuf>,
    width: String,
    height: String,
    title: String,
}

impl<'a> TmuxPopup<'a> {
    pub fn from_config(tmux: &'a dyn Tmux, config: &PopupConfig) -> Self {
        Self {
            tmux,
            script: config.script_path(),
            width: config.width.clone(),
            height: config.height.clone(),
            title: config.title.clone(),
        }
    }

    fn checked_script(&self) -> Result<&Path> {
        let script = self
            .script
            .as_deref()
            .ok_or(NotifyError::PopupScriptNotConfigured)?;
        if !script.exists() {
            return Err(NotifyError::PopupScriptNotFound(script.to_path_buf()));
        }
        if !is_executable(script) {
            return Err(NotifyError::PopupScriptNotExecutable(script.to_path_buf()));
        }
        Ok(script)
    }

    /// Builds the shell-quoted `tmux display-popup` command line.
    fn popup_command(&self, script: &Path, id: &str, location: &str) -> Result<String> {
        let script = script.to_string_lossy();
        let args: [&str; 13] = [
            "tmux",
            "display-popup",
            "-E",
            "-t",
            location,
            "-w",
            self.width.as_str(),
            "-h",
            self.height.as_str(),
            "-T",
            self.title.as_str(),
            script.as_ref(),
            id,
        ];
        shlex::try_join(args).map_err(|_| {
            let offending = args
                .iter()
                .find(|arg| shlex::try_quote(arg).is_err())
                .map_or_else(String::new, |arg| (*arg).to_string());
            NotifyError::UnquotableArgument(offending)
        })
    }
}

impl PopupPresenter for TmuxPopup<'_> {
    fn present(&self, id: &str, location: &str) -> Result<()> {
        let script = self.checked_script()?;
        let command = self.popup_command(script, id, location)?;
        debug!(%command, "opening popup");
        self.tmux.run_shell(Some(location), &command)?;
        Ok(())
    }
}

/// What happened to the popup during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupOutcome {
    Shown,
    /// Popups are turned off in the config.
    Disabled,
    NotImmediate,
    ServerNotRunning,
    /// No pane was resolved for the notification.
    NoSession,
    Failed(String),
}

/// Summary of the side effects of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Names of the bell routes that rang.
    pub bells_rung: Vec<&'static str>,
    pub server_running: bool,
    pub popup: PopupOutcome,
}

/// Runs the bell routes and the popup presenter for a notification.
pub struct Dispatcher<'a> {
    tmux: &'a dyn Tmux,
    bells: Vec<Box<dyn BellRoute + 'a>>,
    popup: Option<Box<dyn PopupPresenter + 'a>>,
}

impl<'a> Dispatcher<'a> {
    /// `popup: None` disables popups.
    pub fn new(
        tmux: &'a dyn Tmux,
        bells: Vec<Box<dyn BellRoute + 'a>>,
        popup: Option<Box<dyn PopupPresenter + 'a>>,
    ) -> Self {
        Self { tmux, bells, popup }
    }

    /// The three bell routes in their usual order.
    pub fn default_bells(tmux: &'a dyn Tmux, ssh_tty: Option<PathBuf>) -> Vec<Box<dyn BellRoute + 'a>> {
        vec![
            Box::new(TmuxBroadcastBell::new(tmux)),
            Box::new(ClientTtyBell::new(tmux)),
            Box::new(SshTtyBell::new(ssh_tty)),
        ]
    }

    /// Rings every bell route, checks the server, then opens the popup if
    /// the notification is immediate, the server is live and a pane is known.
    /// Never fails: each failure only skips its own step.
    pub fn dispatch(&self, notification: &Notification) -> DispatchReport {
        let bells_rung = self.ring_bells();
        let server_running = self.tmux.has_sessions();
        let popup = self.open_popup(notification, server_running);

        info!(
            id = %notification.id,
            bells = bells_rung.len(),
            server_running,
            popup = ?popup,
            "dispatched notification"
        );
        DispatchReport {
            bells_rung,
            server_running,
            popup,
        }
    }

    fn ring_bells(&self) -> Vec<&'static str> {
        let mut rung = Vec::new();
        for route in &self.bells {
            match route.ring() {
                Ok(true) => rung.push(route.name()),
                Ok(false) => debug!(route = route.name(), "bell route not applicable"),
                Err(e) => warn!(route = route.name(), error = %e, "bell route failed"),
            }
        }
        if rung.is_empty() && !self.bells.is_empty() {
            warn!("no bell route succeeded");
        }
        rung
    }

    fn open_popup(&self, notification: &Notification, server_running: bool) -> PopupOutcome {
        let Some(presenter) = &self.popup else {
            return PopupOutcome::Disabled;
        };
        if !notification.is_immediate {
            return PopupOutcome::NotImmediate;
        }
        if !server_running {
            return PopupOutcome::ServerNotRunning;
        }
        let Some(location) = notification.location() else {
            return PopupOutcome::NoSession;
        };

        match presenter.present(&notification.id, location) {
            Ok(()) => PopupOutcome::Shown,
            Err(e) => {
                warn!(error = %e, "failed to open popup");
                PopupOutcome::Failed(e.to_string())
            }
        }
    }
}
