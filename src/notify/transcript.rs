//! Fallback message source: the agent's `.jsonl` transcript.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

/// Appended to text cut at the character limit.
pub const TRUNCATION_MARKER: &str = "...";

/// Transcript record; only assistant records are inspected.
#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    #[serde(rename = "type")]
    entry_type: Option<String>,
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: Option<String>,
    text: Option<String>,
}

/// Keeps the first `max_chars` characters of `text`, appending
/// `TRUNCATION_MARKER` if anything was cut.
pub fn truncate_with_marker(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Returns the text of the most recent assistant message in the transcript.
///
/// Records are scanned from the end. Assistant records without a non-empty
/// text block (e.g. tool calls only) are skipped, as are lines that are not
/// valid records. A missing or unreadable file yields `None`.
pub fn last_assistant_message(path: &Path, max_chars: usize) -> Option<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "transcript not readable");
            return None;
        }
    };

    let text = content.lines().rev().find_map(assistant_text);
    if text.is_none() {
        debug!(path = %path.display(), "no assistant message in transcript");
    }
    text.map(|t| truncate_with_marker(&t, max_chars))
}

/// Extracts the first non-empty text block of an assistant record.
fn assistant_text(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let entry = serde_json::from_str::<TranscriptEntry>(line).ok()?;
    if entry.entry_type.as_deref() != Some("assistant") {
        return None;
    }

    entry
        .message?
        .content?
        .into_iter()
        .filter(|block| block.block_type.as_deref() == Some("text"))
        .find_map(|block| block.text.filter(|text| !text.is_empty()))
}
