//! Centralized reader for the environment variables the hook consults.
//!
//! Environment variable names are defined as private constants here;
//! external code accesses values through the `EnvVars` struct.

const SKIP: &str = "TMUX_NOTIFY_SKIP";
const CACHE_DIR: &str = "TMUX_NOTIFY_CACHE_DIR";
const LOG: &str = "TMUX_NOTIFY_LOG";
const TMUX_PANE: &str = "TMUX_PANE";
const SSH_TTY: &str = "SSH_TTY";
const CLAUDE_PROJECT_DIR: &str = "CLAUDE_PROJECT_DIR";

/// Snapshot of the relevant environment variables at load time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvVars {
    /// When set, the hook exits immediately without doing anything.
    pub skip: bool,

    /// Overrides the notification store directory.
    pub cache_dir: Option<String>,

    /// Log level or `EnvFilter` directive for the diagnostic log.
    pub log: Option<String>,

    /// Pane handle exported by tmux to processes running inside a pane (e.g. `%12`).
    pub tmux_pane: Option<String>,

    /// Terminal device of the SSH session, if the agent runs over SSH.
    pub ssh_tty: Option<String>,

    /// Project directory exported by Claude Code to hook processes.
    pub claude_project_dir: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

impl EnvVars {
    /// Read all relevant environment variables from the current process.
    pub fn load() -> Self {
        Self {
            skip: std::env::var(SKIP).is_ok(),
            cache_dir: non_empty_var(CACHE_DIR),
            log: non_empty_var(LOG),
            tmux_pane: non_empty_var(TMUX_PANE),
            ssh_tty: non_empty_var(SSH_TTY),
            claude_project_dir: non_empty_var(CLAUDE_PROJECT_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_all_variables() {
        temp_env::with_vars(
            [
                (SKIP, Some("1")),
                (CACHE_DIR, Some("/tmp/notifications")),
                (LOG, Some("debug")),
                (TMUX_PANE, Some("%3")),
                (SSH_TTY, Some("/dev/pts/4")),
                (CLAUDE_PROJECT_DIR, Some("/repo")),
            ],
            || {
                let env = EnvVars::load();
                assert!(env.skip);
                assert_eq!(env.cache_dir.as_deref(), Some("/tmp/notifications"));
                assert_eq!(env.log.as_deref(), Some("debug"));
                assert_eq!(env.tmux_pane.as_deref(), Some("%3"));
                assert_eq!(env.ssh_tty.as_deref(), Some("/dev/pts/4"));
                assert_eq!(env.claude_project_dir.as_deref(), Some("/repo"));
            },
        );
    }

    #[test]
    fn empty_values_are_treated_as_unset() {
        temp_env::with_vars(
            [
                (SKIP, None),
                (TMUX_PANE, Some("")),
                (SSH_TTY, Some("")),
                (CACHE_DIR, None),
            ],
            || {
                let env = EnvVars::load();
                assert!(!env.skip);
                assert_eq!(env.tmux_pane, None);
                assert_eq!(env.ssh_tty, None);
                assert_eq!(env.cache_dir, None);
            },
        );
    }
}
