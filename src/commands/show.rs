use anyhow::{Result, bail};
use clap::Args;

use super::Context;
use crate::notify::NotificationStore;
use crate::shared::env_var::EnvVars;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct ShowArgs {
    /// Notification ID (the file name without `.json`)
    pub id: String,
}

/// Prints one stored notification as JSON.
pub fn run(args: &ShowArgs) -> Result<()> {
    let ctx = Context::load(EnvVars::load());
    let store = ctx.open_store()?;
    println!("{}", render(&store, &args.id)?);
    Ok(())
}

fn render(store: &NotificationStore, id: &str) -> Result<String> {
    let Some(notification) = store.load(id)? else {
        bail!(
            "notification {id} not found in {}",
            store.dir().display()
        );
    };
    Ok(serde_json::to_string_pretty(&notification)?)
}
