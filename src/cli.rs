use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::config::settings::AppConfig;
use crate::rating::weighting::DEFAULT_CAP_GAMES;
use crate::rating::{ResampleMode, Solver, Weighting};

#[derive(Parser, Debug)]
#[command(author, version, about = "Bradley-Terry ladder ratings with bootstrap uncertainty")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Fit the model and print point-estimate rankings as JSON
    Rank {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        fit: FitArgs,
    },
    /// Fit with bootstrap resampling and print export records as JSON
    Bootstrap {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        fit: FitArgs,
        #[command(flatten)]
        resampling: BootstrapArgs,
    },
    /// Print head-to-head coverage and fit diagnostics as JSON
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct InputArgs {
    /// JSON array of competitor records
    #[arg(short, long)]
    pub input: PathBuf,
    /// JSON settings file; omitted keys keep their defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Minimum recorded games for a competitor to be rated
    #[arg(long)]
    pub min_games: Option<u32>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct FitArgs {
    /// Optimizer
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
    /// Per-matchup weighting policy
    #[arg(long, value_enum)]
    pub weighting: Option<WeightingArg>,
    /// Games per matchup above which `cap` weighting scales counts down
    /// [default: the configured cap, else 50]
    #[arg(long)]
    pub max_games: Option<u32>,
    /// Ridge penalty strength
    #[arg(long)]
    pub regularization: Option<f64>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct BootstrapArgs {
    /// Number of resampled fits
    #[arg(short = 'b', long)]
    pub iterations: Option<usize>,
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Share of games drawn per matchup in subsample mode
    #[arg(long)]
    pub fraction: Option<f64>,
    /// Seed of the first draw
    #[arg(long)]
    pub seed: Option<u64>,
    /// Run draws on all cores
    #[arg(long)]
    pub parallel: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodArg {
    Lbfgs,
    Gd,
    Newton,
}

impl From<MethodArg> for Solver {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Lbfgs => Solver::QuasiNewton,
            MethodArg::Gd => Solver::GradientDescent,
            MethodArg::Newton => Solver::NewtonRaphson,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightingArg {
    None,
    Equal,
    Sqrt,
    Cap,
}

impl WeightingArg {
    pub fn into_weighting(self, max_games: u32) -> Weighting {
        match self {
            WeightingArg::None => Weighting::None,
            WeightingArg::Equal => Weighting::EqualWeight,
            WeightingArg::Sqrt => Weighting::Sqrt,
            WeightingArg::Cap => Weighting::Cap { max_games },
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Resample,
    Subsample,
}

impl From<ModeArg> for ResampleMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Resample => ResampleMode::Resample,
            ModeArg::Subsample => ResampleMode::Subsample,
        }
    }
}

impl InputArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(min_games) = self.min_games {
            config.min_games = min_games;
        }
    }
}

impl FitArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(method) = self.method {
            config.fit.solver = method.into();
        }
        let configured_cap = config.fit.weighting.cap_games();
        if let Some(weighting) = self.weighting {
            let max_games = self.max_games.or(configured_cap).unwrap_or(DEFAULT_CAP_GAMES);
            config.fit.weighting = weighting.into_weighting(max_games);
        } else if let (Some(max_games), Some(_)) = (self.max_games, configured_cap) {
            config.fit.weighting = Weighting::Cap { max_games };
        }
        if let Some(regularization) = self.regularization {
            config.fit.regularization = regularization;
        }
    }
}

impl BootstrapArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(iterations) = self.iterations {
            config.bootstrap.iterations = iterations;
        }
        if let Some(mode) = self.mode {
            config.bootstrap.mode = mode.into();
        }
        if let Some(fraction) = self.fraction {
            config.bootstrap.fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.bootstrap.seed_offset = seed;
        }
        if self.parallel {
            config.bootstrap.parallel = true;
        }
    }
}
