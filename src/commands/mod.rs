pub mod config;
pub mod hook;
pub mod list;
pub mod show;
pub mod sweep;

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::notify::{NotificationStore, NotifyError};
use crate::shared::cache;
use crate::shared::config::{Config, load_config};
use crate::shared::env_var::EnvVars;
use crate::shared::logging;

/// Environment, configuration and store location shared by every command.
#[derive(Debug)]
pub struct Context {
    pub env: EnvVars,
    pub config: Config,
    pub store_dir: Option<PathBuf>,
}

impl Context {
    /// Reads the environment and config file, then installs the diagnostic log.
    /// A config file that fails to load is replaced by the defaults.
    pub fn load(env: EnvVars) -> Self {
        let (config, config_error) = match load_config() {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        };
        let store_dir = cache::store_dir(&env);

        logging::init(
            store_dir.as_deref(),
            logging::resolve_level(&env, &config.log),
            config.log.format,
        );
        if let Some(e) = config_error {
            warn!(error = %format!("{e:#}"), "failed to load config, using defaults");
        }

        Self {
            env,
            config,
            store_dir,
        }
    }

    pub fn open_store(&self) -> Result<NotificationStore, NotifyError> {
        let dir = self
            .store_dir
            .clone()
            .ok_or(NotifyError::StoreDirNotFound)?;
        let store = NotificationStore::open(dir)?;
        debug!(dir = %store.dir().display(), "opened notification store");
        Ok(store)
    }
}
