use std::io::{self, Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use super::Context;
use crate::notify::Notification;
use crate::shared::env_var::EnvVars;
use crate::shared::table::{pad_or_truncate, remaining_width, single_line, terminal_width};

const TIME_WIDTH: usize = 8;
const KIND_WIDTH: usize = 18;
/// NOW column: "yes" for immediate notifications
const NOW_WIDTH: usize = 3;
const LOCATION_WIDTH: usize = 16;
const MIN_MESSAGE_WIDTH: usize = 20;
/// Spaces between columns
const COLUMN_SPACES: usize = 4;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Only show notifications the popup has not marked as read
    #[arg(long)]
    pub unread: bool,
}

/// Lists stored notifications, newest first.
pub fn run(args: &ListArgs) -> Result<()> {
    let ctx = Context::load(EnvVars::load());
    let store = ctx.open_store()?;

    let notifications = visible(store.list()?, args.unread);

    let mut stdout = io::stdout().lock();
    render_notifications(&mut stdout, &notifications, Utc::now(), terminal_width())?;
    Ok(())
}

fn visible(notifications: Vec<Notification>, unread_only: bool) -> Vec<Notification> {
    notifications
        .into_iter()
        .filter(|n| !unread_only || !n.read)
        .collect()
}

/// Renders notifications as a table. Separated from run() to enable testing.
fn render_notifications<W: Write>(
    writer: &mut W,
    notifications: &[Notification],
    now: DateTime<Utc>,
    term_width: usize,
) -> Result<()> {
    if notifications.is_empty() {
        writeln!(writer, "No notifications.")?;
        return Ok(());
    }

    let message_width = remaining_width(
        term_width,
        TIME_WIDTH + KIND_WIDTH + NOW_WIDTH + LOCATION_WIDTH + COLUMN_SPACES,
        MIN_MESSAGE_WIDTH,
    );

    write_row(
        writer,
        ["TIME", "KIND", "NOW", "LOCATION", "MESSAGE"],
        message_width,
    )?;
    for n in notifications {
        let time = format_relative_time(n.timestamp, now);
        let now_flag = if n.is_immediate { "yes" } else { "" };
        let location = n.location().unwrap_or("-");
        let message = single_line(&n.message);
        write_row(
            writer,
            [time.as_str(), n.kind.as_str(), now_flag, location, message.as_str()],
            message_width,
        )?;
    }

    Ok(())
}

fn write_row<W: Write>(writer: &mut W, cells: [&str; 5], message_width: usize) -> Result<()> {
    let [time, kind, now_flag, location, message] = cells;
    let line = format!(
        "{} {} {} {} {}",
        pad_or_truncate(time, TIME_WIDTH),
        pad_or_truncate(kind, KIND_WIDTH),
        pad_or_truncate(now_flag, NOW_WIDTH),
        pad_or_truncate(location, LOCATION_WIDTH),
        pad_or_truncate(message, message_width),
    );
    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}

/// Formats a datetime as a relative time string from a given reference time.
fn format_relative_time(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(dt).num_seconds();
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if seconds < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}
