//! Test factories for creating notifications with sensible defaults.
//!
//! Use `notification_with()` to customize specific fields.

use chrono::{DateTime, SubsecRound, Utc};

use crate::notify::types::{Notification, SessionContext};

/// Create a Notification with default test values.
pub fn notification() -> Notification {
    notification_at("test-id", Utc::now().trunc_subsecs(6))
}

/// Create a Notification with the given ID and creation time.
pub fn notification_at(id: &str, timestamp: DateTime<Utc>) -> Notification {
    Notification {
        id: id.to_string(),
        timestamp,
        kind: "idle_prompt".to_string(),
        message: "Claude is waiting for your input".to_string(),
        working_directory: "/repo".to_string(),
        session_id: "session-1".to_string(),
        is_immediate: false,
        read: false,
        transcript_path: String::new(),
        session: None,
    }
}

/// Create a Notification with customizations applied via closure.
pub fn notification_with(f: impl FnOnce(&mut Notification)) -> Notification {
    let mut n = notification();
    f(&mut n);
    n
}

/// An immediate notification resolved to `location`.
pub fn immediate_at(location: &str) -> Notification {
    notification_with(|n| {
        n.kind = "error".to_string();
        n.is_immediate = true;
        n.session = Some(SessionContext::from_location(location, "zsh", "%1"));
    })
}
