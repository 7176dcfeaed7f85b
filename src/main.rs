mod cli;
mod commands;
mod infra;
mod notify;
mod shared;
#[cfg(test)]
mod testing;

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};

fn main() -> ExitCode {
    let Cli { command } = Cli::parse();

    let result = match command {
        // The hook maps its own failures to exit codes.
        Commands::Hook(args) => return commands::hook::run(&args),
        Commands::List(args) => commands::list::run(&args),
        Commands::Show(args) => commands::show::run(&args),
        Commands::Sweep(args) => commands::sweep::run(&args),
        Commands::Config(config_cmd) => config_cmd.run(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tmux-notify", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
