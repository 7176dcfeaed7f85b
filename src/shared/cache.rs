use std::path::PathBuf;

use super::dirs;
use super::env_var::EnvVars;

/// Store location relative to the home directory, where the popup script
/// looks records up. `XDG_CACHE_HOME` is not consulted.
const STORE_DIR_NAME: &str = ".cache/claude-notifications";

/// File name of the diagnostic log inside the store directory.
pub const LOG_FILE_NAME: &str = "hook-debug.log";

/// Directory holding one JSON file per notification.
/// Returns ~/.cache/claude-notifications unless `TMUX_NOTIFY_CACHE_DIR` is set.
pub fn store_dir(env: &EnvVars) -> Option<PathBuf> {
    if let Some(dir) = &env.cache_dir {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|home| home.join(STORE_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn store_dir_prefers_env_override() {
        let env = EnvVars {
            cache_dir: Some("/override/store".to_string()),
            ..EnvVars::default()
        };
        assert_eq!(store_dir(&env), Some(PathBuf::from("/override/store")));
    }

    #[rstest]
    #[case::xdg_unset(None)]
    #[case::xdg_elsewhere(Some("/xdg"))]
    fn store_dir_defaults_to_home_cache(#[case] xdg: Option<&str>) {
        temp_env::with_vars(
            [("XDG_CACHE_HOME", xdg), ("HOME", Some("/home/u"))],
            || {
                assert_eq!(
                    store_dir(&EnvVars::default()),
                    Some(PathBuf::from("/home/u/.cache/claude-notifications"))
                );
            },
        );
    }

    #[test]
    fn store_dir_is_none_without_home() {
        temp_env::with_vars([("HOME", None::<&str>)], || {
            assert_eq!(store_dir(&EnvVars::default()), None);
        });
    }
}
