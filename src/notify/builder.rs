use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::debug;
use uuid::Uuid;

use super::kind;
use super::transcript::{self, truncate_with_marker};
use super::types::{HookEvent, Notification, PLACEHOLDER_MESSAGE, SessionContext, UNKNOWN_KIND};
use crate::shared::config::DEFAULT_MAX_MESSAGE_CHARS;

/// Inputs to `build` that do not come from the event itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Character cap for the message text.
    pub max_message_chars: usize,
    /// Working directory recorded when the event carries none (`CLAUDE_PROJECT_DIR`).
    pub project_dir: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            project_dir: None,
        }
    }
}

/// Builds the notification for `event`, stamped with the current time.
pub fn build(
    event: &HookEvent,
    session: Option<SessionContext>,
    options: &BuildOptions,
) -> Notification {
    build_at(event, session, options, Utc::now())
}

/// Builds the notification for `event` as of `now`.
pub fn build_at(
    event: &HookEvent,
    session: Option<SessionContext>,
    options: &BuildOptions,
    now: DateTime<Utc>,
) -> Notification {
    let kind = resolve_kind(event);
    let message = resolve_message(event, options.max_message_chars);
    let is_immediate = kind::classify(&kind, &message);
    debug!(kind = %kind, is_immediate, "classified notification");

    let working_directory = event
        .cwd
        .clone()
        .or_else(|| options.project_dir.clone())
        .unwrap_or_default();

    Notification {
        id: Uuid::new_v4().to_string(),
        // Stored with microsecond precision; truncate so the record round-trips.
        timestamp: now.trunc_subsecs(6),
        kind,
        message,
        working_directory,
        session_id: event.session_id.clone().unwrap_or_default(),
        is_immediate,
        read: false,
        transcript_path: event.transcript_path.clone().unwrap_or_default(),
        session,
    }
}

/// Explicit notification type, then hook event name, then `"unknown"`.
fn resolve_kind(event: &HookEvent) -> String {
    [&event.notification_type, &event.hook_event_name]
        .into_iter()
        .flatten()
        .find(|k| !k.is_empty())
        .cloned()
        .unwrap_or_else(|| UNKNOWN_KIND.to_string())
}

/// Event message, then the transcript's last assistant text, then the placeholder.
fn resolve_message(event: &HookEvent, max_chars: usize) -> String {
    if let Some(message) = event
        .message
        .as_deref()
        .filter(|m| !m.is_empty() && *m != PLACEHOLDER_MESSAGE)
    {
        return truncate_with_marker(message, max_chars);
    }

    debug!("event has no useful message, reading transcript");
    event
        .transcript_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .and_then(|p| transcript::last_assistant_message(Path::new(p), max_chars))
        .unwrap_or_else(|| PLACEHOLDER_MESSAGE.to_string())
}
