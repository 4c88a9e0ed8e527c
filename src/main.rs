use anyhow::Result;
use colored::Colorize;

use bt_ladder::cli::Command;
use bt_ladder::{handle_bootstrap, handle_completions, handle_rank, handle_summary, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Rank { input, fit } => handle_rank(input, fit),
        Command::Bootstrap {
            input,
            fit,
            resampling,
        } => handle_bootstrap(input, fit, resampling),
        Command::Summary { input } => handle_summary(input),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
