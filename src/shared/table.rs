//! Fixed-width column helpers for terminal tables.
//!
//! Widths are display widths, so CJK text lines up with ASCII.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Terminal width used when stdout is not a terminal.
const FALLBACK_TERMINAL_WIDTH: usize = 80;

/// Current terminal width in columns.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| usize::from(w))
        .unwrap_or(FALLBACK_TERMINAL_WIDTH)
}

/// Width left for a flexible last column after `fixed` columns, but at least `min`.
pub fn remaining_width(term_width: usize, fixed: usize, min: usize) -> usize {
    term_width.saturating_sub(fixed).max(min)
}

/// Longest prefix of `s` that fits in `max_width` display columns.
pub fn truncate_to_width(s: &str, max_width: usize) -> &str {
    let mut width = 0;
    for (i, c) in s.char_indices() {
        width += c.width().unwrap_or(0);
        if width > max_width {
            return &s[..i];
        }
    }
    s
}

/// Pads `s` with spaces to exactly `width` columns, or cuts it and appends
/// an ellipsis when it is too long. Below 3 columns no ellipsis is added.
pub fn pad_or_truncate(s: &str, width: usize) -> String {
    let display_width = s.width();
    if display_width <= width {
        return format!("{s}{}", " ".repeat(width - display_width));
    }
    if width < ELLIPSIS.len() {
        return truncate_to_width(s, width).to_string();
    }

    let cut = truncate_to_width(s, width - ELLIPSIS.len());
    // A wide char at the cut can leave one column unused.
    let padding = width - ELLIPSIS.len() - cut.width();
    format!("{cut}{ELLIPSIS}{}", " ".repeat(padding))
}

/// Collapses runs of whitespace (including newlines) into single spaces.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
