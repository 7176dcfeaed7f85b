use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{NotifyError, Result};

/// Message used when neither the event nor the transcript provides any text.
pub const PLACEHOLDER_MESSAGE: &str = "No message";

/// Kind used when the event names neither a notification type nor a hook event.
pub const UNKNOWN_KIND: &str = "unknown";

/// Fields the hook reads from the event Claude Code writes to stdin.
///
/// Every field is optional. Unknown keys and values of the wrong JSON type
/// are ignored so that a payload from a newer Claude Code still produces a
/// notification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HookEvent {
    pub notification_type: Option<String>,
    pub hook_event_name: Option<String>,
    pub message: Option<String>,
    pub cwd: Option<String>,
    pub session_id: Option<String>,
    pub transcript_path: Option<String>,
}

impl HookEvent {
    /// Parses the raw stdin payload. Only a JSON object is accepted.
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(NotifyError::EmptyInput);
        }

        let value: Value = serde_json::from_str(raw).map_err(NotifyError::InvalidInput)?;
        let Value::Object(fields) = value else {
            return Err(NotifyError::InputNotObject(json_type_name(&value)));
        };

        Ok(Self {
            notification_type: string_field(&fields, "notification_type"),
            hook_event_name: string_field(&fields, "hook_event_name"),
            message: string_field(&fields, "message"),
            cwd: string_field(&fields, "cwd"),
            session_id: string_field(&fields, "session_id"),
            transcript_path: string_field(&fields, "transcript_path"),
        })
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A resolved tmux pane. Serialized under the `tmux` key of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Always `<session_name>:<window_index>.<pane_index>`.
    pub location: String,
    pub session_name: String,
    pub window_index: String,
    pub window_name: String,
    pub pane_index: String,
    pub pane_id: String,
}

impl SessionContext {
    /// Builds a context from a `session:window.pane` location reported by tmux.
    /// Missing window or pane components default to `0`.
    pub fn from_location(
        location: &str,
        window_name: impl Into<String>,
        pane_id: impl Into<String>,
    ) -> Self {
        let (session_name, window_pane) = location.split_once(':').unwrap_or((location, "0.0"));
        let (window_index, pane_index) = window_pane.split_once('.').unwrap_or((window_pane, "0"));
        let window_index = if window_index.is_empty() { "0" } else { window_index };
        let pane_index = if pane_index.is_empty() { "0" } else { pane_index };

        Self {
            location: format!("{session_name}:{window_index}.{pane_index}"),
            session_name: session_name.to_string(),
            window_index: window_index.to_string(),
            window_name: window_name.into(),
            pane_index: pane_index.to_string(),
            pane_id: pane_id.into(),
        }
    }
}

/// A notification record, stored as `<id>.json` in the notification store.
///
/// Field names on disk match what the popup script reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(rename = "cwd")]
    pub working_directory: String,
    pub session_id: String,
    pub is_immediate: bool,
    /// Set by the popup script once the user has seen the notification.
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub transcript_path: String,
    #[serde(rename = "tmux", default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionContext>,
}

impl Notification {
    /// Returns the pane location to show the popup in, if one was resolved.
    pub fn location(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.location.as_str())
    }
}

/// RFC 3339 timestamps with microsecond precision, readable by Python's
/// `datetime.fromisoformat`. Naive timestamps (no offset) written by older
/// hooks are read as local time.
pub(crate) mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn from_json_reads_known_fields() {
        let raw = r#"{
            "notification_type": "permission_prompt",
            "hook_event_name": "Notification",
            "message": "Claude needs your permission",
            "cwd": "/repo",
            "session_id": "abc",
            "transcript_path": "/tmp/t.jsonl",
            "extra": {"ignored": true}
        }"#;

        let event = HookEvent::from_json(raw).unwrap();

        assert_eq!(event.notification_type.as_deref(), Some("permission_prompt"));
        assert_eq!(event.hook_event_name.as_deref(), Some("Notification"));
        assert_eq!(event.message.as_deref(), Some("Claude needs your permission"));
        assert_eq!(event.cwd.as_deref(), Some("/repo"));
        assert_eq!(event.session_id.as_deref(), Some("abc"));
        assert_eq!(event.transcript_path.as_deref(), Some("/tmp/t.jsonl"));
    }

    #[test]
    fn from_json_accepts_empty_object() {
        assert_eq!(HookEvent::from_json("{}").unwrap(), HookEvent::default());
    }

    #[test]
    fn from_json_ignores_values_of_wrong_type() {
        let event = HookEvent::from_json(r#"{"message": 42, "cwd": null}"#).unwrap();
        assert_eq!(event.message, None);
        assert_eq!(event.cwd, None);
    }

    #[rstest]
    #[case::empty("", "No input")]
    #[case::whitespace("  \n", "No input")]
    #[case::truncated(r#"{"message": "#, "Failed to parse")]
    #[case::array("[1, 2]", "an array")]
    #[case::string(r#""hello""#, "a string")]
    fn from_json_rejects_malformed_input(#[case] raw: &str, #[case] expected: &str) {
        let err = HookEvent::from_json(raw).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "expected {expected:?} in {err}"
        );
    }

    #[rstest]
    #[case::full("main:1.2", "main:1.2", "main", "1", "2")]
    #[case::missing_pane("main:3", "main:3.0", "main", "3", "0")]
    #[case::missing_window_and_pane("main", "main:0.0", "main", "0", "0")]
    #[case::empty_components("main:.", "main:0.0", "main", "0", "0")]
    fn session_context_from_location(
        #[case] reported: &str,
        #[case] location: &str,
        #[case] session: &str,
        #[case] window: &str,
        #[case] pane: &str,
    ) {
        let ctx = SessionContext::from_location(reported, "editor", "%5");

        assert_eq!(ctx.location, location);
        assert_eq!(ctx.session_name, session);
        assert_eq!(ctx.window_index, window);
        assert_eq!(ctx.pane_index, pane);
        assert_eq!(ctx.window_name, "editor");
        assert_eq!(ctx.pane_id, "%5");
    }

    #[test]
    fn notification_serializes_with_popup_field_names() {
        let notification = Notification {
            id: "n-1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            kind: "error".to_string(),
            message: "build failed".to_string(),
            working_directory: "/repo".to_string(),
            session_id: "s-1".to_string(),
            is_immediate: true,
            read: false,
            transcript_path: String::new(),
            session: Some(SessionContext::from_location("main:0.1", "zsh", "%2")),
        };

        let value = serde_json::to_value(&notification).unwrap();

        assert_eq!(value["type"], "error");
        assert_eq!(value["cwd"], "/repo");
        assert_eq!(value["timestamp"], "2026-10-18T09:30:00.000000+00:00");
        assert_eq!(value["tmux"]["location"], "main:0.1");
        assert_eq!(value["tmux"]["pane_id"], "%2");
    }

    #[test]
    fn notification_without_session_omits_tmux_key() {
        let raw = r#"{"id":"n","timestamp":"2026-10-18T09:30:00+00:00","type":"unknown",
            "message":"No message","cwd":"","session_id":"","is_immediate":false}"#;

        let notification: Notification = serde_json::from_str(raw).unwrap();
        assert!(!notification.read);
        assert_eq!(notification.session, None);
        assert_eq!(notification.location(), None);

        let value = serde_json::to_value(&notification).unwrap();
        assert!(value.get("tmux").is_none());
    }

    #[rstest]
    #[case::utc_offset("2026-10-18T09:30:00.123456+00:00")]
    #[case::zulu("2026-10-18T09:30:00.123456Z")]
    #[case::other_offset("2026-10-18T18:30:00.123456+09:00")]
    fn timestamp_parses_rfc3339(#[case] raw: &str) {
        let expected = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(timestamp::parse(raw), Some(expected));
    }

    #[test]
    fn timestamp_parses_naive_local_time() {
        let parsed = timestamp::parse("2026-10-18T09:30:00.5").unwrap();
        let local = parsed.with_timezone(&chrono::Local);
        assert_eq!(
            local.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            "2026-10-18T09:30:00.500"
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::garbage("yesterday")]
    #[case::date_only("2026-10-18")]
    fn timestamp_rejects_invalid(#[case] raw: &str) {
        assert_eq!(timestamp::parse(raw), None);
    }
}
