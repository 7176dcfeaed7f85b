use std::path::PathBuf;

use thiserror::Error;

use crate::infra::tmux::TmuxError;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("No input from stdin")]
    EmptyInput,

    #[error("Failed to parse hook event JSON: {0}")]
    InvalidInput(#[source] serde_json::Error),

    #[error("Hook event must be a JSON object, got {0}")]
    InputNotObject(&'static str),

    #[error("Failed to determine notification store directory (HOME is not set)")]
    StoreDirNotFound,

    #[error("Invalid notification ID: {0}")]
    InvalidId(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt notification record {path}: {source}")]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize notification: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("No popup script configured")]
    PopupScriptNotConfigured,

    #[error("Popup script not found: {0}")]
    PopupScriptNotFound(PathBuf),

    #[error("Popup script is not executable: {0}")]
    PopupScriptNotExecutable(PathBuf),

    #[error("Cannot quote popup argument {0:?} for the shell")]
    UnquotableArgument(String),

    #[error("No attached client terminal accepted the bell")]
    NoClientTerminal,

    #[error(transparent)]
    Tmux(#[from] TmuxError),
}

impl NotifyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;
