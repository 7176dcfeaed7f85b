use anyhow::Result;
use chrono::Utc;
use clap::Args;

use super::Context;
use crate::notify::SweepReport;
use crate::shared::config::retention_period;
use crate::shared::env_var::EnvVars;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct SweepArgs {
    /// Remove notifications older than this many hours (default: notification.retention_hours)
    #[arg(long)]
    pub max_age_hours: Option<u64>,
}

/// Removes expired and unreadable notifications now instead of on the next hook run.
pub fn run(args: &SweepArgs) -> Result<()> {
    let ctx = Context::load(EnvVars::load());
    let store = ctx.open_store()?;

    let max_age = args
        .max_age_hours
        .map_or_else(|| ctx.config.notification.retention(), retention_period);
    let report = store.sweep(max_age, Utc::now())?;

    println!("{}", summary(&report));
    Ok(())
}

fn summary(report: &SweepReport) -> String {
    let mut line = format!(
        "Removed {} notification(s) ({} expired, {} unreadable), kept {}.",
        report.removed(),
        report.expired,
        report.corrupted,
        report.kept
    );
    if report.failed > 0 {
        line.push_str(&format!(" {} could not be removed.", report.failed));
    }
    line
}
