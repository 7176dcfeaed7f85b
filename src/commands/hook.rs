use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Args;
use tracing::{debug, error, info, warn};

use super::Context;
use crate::infra::tmux::{Tmux, TmuxCli};
use crate::notify::dispatch::{BellRoute, PopupPresenter};
use crate::notify::{
    BuildOptions, DispatchReport, Dispatcher, HookEvent, Notification, NotificationStore,
    SweepReport, TmuxPopup, builder, locator,
};
use crate::shared::config::Config;
use crate::shared::env_var::EnvVars;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct HookArgs {}

/// Everything one hook invocation did.
#[derive(Debug)]
pub struct HookReport {
    pub notification: Notification,
    pub path: PathBuf,
    pub dispatch: DispatchReport,
    /// `None` if the sweep itself failed.
    pub sweep: Option<SweepReport>,
}

/// Runs the hook: reads one event from stdin and alerts the user about it.
///
/// Malformed input exits successfully so that the agent never treats it as
/// a crash. Only a failure after the event was parsed exits non-zero.
pub fn run(_args: &HookArgs) -> ExitCode {
    let env = EnvVars::load();
    if env.skip {
        return ExitCode::SUCCESS;
    }

    let ctx = Context::load(env);
    info!("hook started");

    let mut raw = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut raw) {
        warn!(error = %e, "failed to read stdin");
        return ExitCode::SUCCESS;
    }

    handle_input(&raw, &ctx, &TmuxCli::default())
}

/// Parses `raw` and runs the pipeline, mapping the outcome to an exit code.
fn handle_input(raw: &str, ctx: &Context, tmux: &dyn Tmux) -> ExitCode {
    debug!(raw, "received hook input");
    let event = match HookEvent::from_json(raw) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "ignoring unusable hook input");
            return ExitCode::SUCCESS;
        }
    };

    let result = ctx
        .open_store()
        .context("failed to open notification store")
        .and_then(|store| process_event(&event, &ctx.env, &ctx.config, tmux, &store));

    match result {
        Ok(report) => {
            info!(
                id = %report.notification.id,
                path = %report.path.display(),
                bells = ?report.dispatch.bells_rung,
                server_running = report.dispatch.server_running,
                popup = ?report.dispatch.popup,
                removed = report.sweep.as_ref().map_or(0, SweepReport::removed),
                "hook finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "hook failed");
            ExitCode::FAILURE
        }
    }
}

/// Resolves the pane, builds and stores the notification, alerts the user,
/// then sweeps expired records.
pub fn process_event(
    event: &HookEvent,
    env: &EnvVars,
    config: &Config,
    tmux: &dyn Tmux,
    store: &NotificationStore,
) -> Result<HookReport> {
    let session = locator::resolve_session(tmux, env.tmux_pane.as_deref(), event.cwd.as_deref());

    let options = BuildOptions {
        max_message_chars: config.notification.max_message_chars,
        project_dir: env.claude_project_dir.clone(),
    };
    let notification = builder::build(event, session, &options);

    let path = store
        .save(&notification)
        .context("failed to save notification")?;
    info!(
        id = %notification.id,
        kind = %notification.kind,
        is_immediate = notification.is_immediate,
        path = %path.display(),
        "saved notification"
    );

    let dispatch = build_dispatcher(tmux, env, config).dispatch(&notification);

    let sweep = store
        .sweep(config.notification.retention(), Utc::now())
        .inspect_err(|e| warn!(error = %e, "failed to sweep notification store"))
        .ok();

    Ok(HookReport {
        notification,
        path,
        dispatch,
        sweep,
    })
}

fn build_dispatcher<'a>(tmux: &'a dyn Tmux, env: &EnvVars, config: &Config) -> Dispatcher<'a> {
    let bells: Vec<Box<dyn BellRoute + 'a>> = if config.sound.enabled {
        Dispatcher::default_bells(tmux, env.ssh_tty.as_deref().map(PathBuf::from))
    } else {
        Vec::new()
    };

    let popup: Option<Box<dyn PopupPresenter + 'a>> = if config.popup.enabled {
        Some(Box::new(TmuxPopup::from_config(tmux, &config.popup)))
    } else {
        None
    };

    Dispatcher::new(tmux, bells, popup)
}
