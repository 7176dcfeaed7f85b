//! Resolves the tmux pane a notification belongs to.
//!
//! Claude Code runs hooks as detached processes, so the pane is found
//! indirectly: from the `TMUX_PANE` handle when the hook inherited one, or
//! else by matching the event's working directory against every pane.

use tracing::{debug, warn};

use super::types::SessionContext;
use crate::infra::tmux::Tmux;

/// tmux format for a pane's `session:window.pane` location.
const LOCATION_FORMAT: &str = "#{session_name}:#{window_index}.#{pane_index}";

/// tmux format for a window's display name.
const WINDOW_NAME_FORMAT: &str = "#{window_name}";

/// tmux format for one `list-panes -a` line. The window name goes last
/// because it is the field most likely to contain the separator.
const PANE_LIST_FORMAT: &str =
    "#{session_name}:#{window_index}.#{pane_index}|#{pane_current_path}|#{pane_id}|#{window_name}";

/// Resolves the pane to alert, trying the execution handle first and the
/// working directory second. Returns `None` when neither yields a pane.
pub fn resolve_session(
    tmux: &dyn Tmux,
    pane_handle: Option<&str>,
    fallback_cwd: Option<&str>,
) -> Option<SessionContext> {
    if let Some(handle) = pane_handle.filter(|h| !h.is_empty()) {
        if let Some(ctx) = resolve_from_handle(tmux, handle) {
            debug!(location = %ctx.location, "resolved pane from TMUX_PANE");
            return Some(ctx);
        }
        debug!(handle, "TMUX_PANE did not resolve, falling back to cwd lookup");
    }

    let cwd = fallback_cwd.filter(|c| !c.is_empty())?;
    let ctx = find_pane_by_cwd(tmux, cwd);
    match &ctx {
        Some(ctx) => debug!(location = %ctx.location, cwd, "resolved pane from cwd"),
        None => debug!(cwd, "no pane matches cwd"),
    }
    ctx
}

/// Queries the location and window name of `handle`. Both queries must succeed.
fn resolve_from_handle(tmux: &dyn Tmux, handle: &str) -> Option<SessionContext> {
    let location = tmux
        .display_message(handle, LOCATION_FORMAT)
        .inspect_err(|e| warn!(error = %e, "failed to query pane location"))
        .ok()?;
    let window_name = tmux
        .display_message(handle, WINDOW_NAME_FORMAT)
        .inspect_err(|e| warn!(error = %e, "failed to query window name"))
        .ok()?;

    if location.is_empty() {
        return None;
    }
    Some(SessionContext::from_location(&location, window_name, handle))
}

/// Returns the first listed pane whose working directory is `cwd` or one of its ancestors.
fn find_pane_by_cwd(tmux: &dyn Tmux, cwd: &str) -> Option<SessionContext> {
    let listing = tmux
        .list_panes(PANE_LIST_FORMAT)
        .inspect_err(|e| warn!(error = %e, "failed to list panes"))
        .ok()?;

    listing.lines().find_map(|line| {
        let pane = parse_pane_line(line)?;
        cwd_matches(pane.cwd, cwd)
            .then(|| SessionContext::from_location(pane.location, pane.window_name, pane.pane_id))
    })
}

/// One line of `list-panes` output in `PANE_LIST_FORMAT`.
#[derive(Debug, PartialEq, Eq)]
struct PaneLine<'a> {
    location: &'a str,
    cwd: &'a str,
    pane_id: &'a str,
    window_name: &'a str,
}

fn parse_pane_line(line: &str) -> Option<PaneLine<'_>> {
    if line.is_empty() {
        return None;
    }
    let mut parts = line.splitn(4, '|');
    let location = parts.next()?;
    let cwd = parts.next()?;
    Some(PaneLine {
        location,
        cwd,
        pane_id: parts.next().unwrap_or_default(),
        window_name: parts.next().unwrap_or_default(),
    })
}

/// True if `pane_cwd` equals `cwd` or is a directory containing it.
///
/// Compared as strings so that `/repo2` never matches `/repo`. Panes with an
/// unknown (empty) directory never match.
fn cwd_matches(pane_cwd: &str, cwd: &str) -> bool {
    if pane_cwd.is_empty() {
        return false;
    }
    pane_cwd == cwd
        || cwd
            .strip_prefix(pane_cwd)
            .is_some_and(|rest| rest.starts_with('/'))
}
