pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod matrix;
pub mod rating;
pub mod services;

use std::io::Write;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use serde::Serialize;

use crate::cli::{BootstrapArgs, Command, FitArgs, InputArgs};
use crate::config::settings::AppConfig;
use crate::services::analysis::AnalysisService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_rank(input: &InputArgs, fit: &FitArgs) -> Result<()> {
    let config = load_config(input, |config| fit.apply(config))?;
    let service = AnalysisService::new(config)?;
    let records = AnalysisService::load_records(&input.input)?;
    print_json(&service.rank(&records)?)
}

pub fn handle_bootstrap(input: &InputArgs, fit: &FitArgs, resampling: &BootstrapArgs) -> Result<()> {
    let config = load_config(input, |config| {
        fit.apply(config);
        resampling.apply(config);
    })?;
    let service = AnalysisService::new(config)?;
    let records = AnalysisService::load_records(&input.input)?;
    print_json(&service.bootstrap(&records)?)
}

pub fn handle_summary(input: &InputArgs) -> Result<()> {
    let config = load_config(input, |_| {})?;
    let service = AnalysisService::new(config)?;
    let records = AnalysisService::load_records(&input.input)?;
    print_json(&service.summarize(&records)?)
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

/// Settings file (or defaults) with command-line overrides applied on top
fn load_config(input: &InputArgs, overrides: impl FnOnce(&mut AppConfig)) -> Result<AppConfig> {
    let mut config = match &input.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::new(),
    };
    input.apply(&mut config);
    overrides(&mut config);
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}
