//! Urgency classification of notification kinds.

/// Stop events that do not mention a failure are surfaced as well.
///
/// Together with `Stop` being part of the always-immediate set this makes the
/// failure heuristic below redundant; both paths are kept so that a later
/// decision to downgrade clean stops only needs to flip this constant.
const SURFACE_CLEAN_STOPS: bool = true;

/// Message fragments (lowercase) that mark a stop event as a failure.
const FAILURE_MARKERS: [&str; 2] = ["error", "failed"];

/// Category of a notification, parsed from the event's type or hook name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    PermissionPrompt,
    IdlePrompt,
    AuthRequired,
    ElicitationDialog,
    Error,
    /// The agent finished its turn (`Stop` hook event).
    Stop,
    /// Any other kind, kept verbatim.
    Other(String),
}

impl NotificationKind {
    /// Parses a kind string. Only the stop kind is matched case-insensitively.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "permission_prompt" => Self::PermissionPrompt,
            "idle_prompt" => Self::IdlePrompt,
            "auth_required" => Self::AuthRequired,
            "elicitation_dialog" => Self::ElicitationDialog,
            "error" => Self::Error,
            _ if kind.eq_ignore_ascii_case("stop") => Self::Stop,
            _ => Self::Other(kind.to_string()),
        }
    }

    /// Kinds that always warrant an interactive alert.
    pub fn is_always_immediate(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// Decides whether a notification should pop up right away.
pub fn is_immediate(kind: &NotificationKind, message: &str) -> bool {
    let in_fixed_set = kind.is_always_immediate();
    let stop_forced = *kind == NotificationKind::Stop
        && (mentions_failure(message) || SURFACE_CLEAN_STOPS);
    in_fixed_set || stop_forced
}

/// Convenience wrapper over `NotificationKind::parse` and `is_immediate`.
pub fn classify(kind: &str, message: &str) -> bool {
    is_immediate(&NotificationKind::parse(kind), message)
}

fn mentions_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    FAILURE_MARKERS.iter().any(|marker| lower.contains(marker))
}
