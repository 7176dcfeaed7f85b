use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::commands::config::ConfigCommands;
use crate::commands::hook::HookArgs;
use crate::commands::list::ListArgs;
use crate::commands::show::ShowArgs;
use crate::commands::sweep::SweepArgs;

#[derive(Parser)]
#[command(
    name = "tmux-notify",
    version,
    about,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Handle one Claude Code hook event read from stdin
    Hook(HookArgs),

    /// List stored notifications
    List(ListArgs),

    /// Print one stored notification as JSON
    Show(ShowArgs),

    /// Remove expired notifications now
    Sweep(SweepArgs),

    /// Configuration file tools
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}
