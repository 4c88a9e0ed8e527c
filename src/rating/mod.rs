pub mod bootstrap;
pub mod bradley_terry;
mod convergence;
pub mod evaluation;
pub mod likelihood;
mod normalization;
pub mod rankings;
pub mod scale;
pub mod solvers;
pub mod stats;
pub mod types;
pub mod weighting;

pub use bootstrap::{BootstrapResult, ResampleMode, run_bootstrap, sample_matrices};
pub use bradley_terry::{BradleyTerry, fit_wins};
pub use evaluation::{GamesBin, PredictionMetrics, uncertainty_by_games};
pub use scale::{RatingUncertainty, delta_method_std, to_ratings, win_probability};
pub use solvers::Solver;
pub use types::{
    Comparison, ConvergenceInfo, FitResult, Interval, RankingRow, SortOrder,
};
pub use weighting::Weighting;
