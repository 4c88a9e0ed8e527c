use ndarray::Array1;
use serde::Serialize;

use super::solvers::Solver;

/// One binary observation: competitor `i` beat (`won`) or lost to `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub i: usize,
    pub j: usize,
    pub won: bool,
}

impl Comparison {
    pub fn new(i: usize, j: usize, won: bool) -> Self {
        Self { i, j, won }
    }

    pub fn outcome(&self) -> f64 {
        if self.won { 1.0 } else { 0.0 }
    }
}

/// How a solver run ended
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceInfo {
    pub solver: Solver,
    pub iterations: usize,
    pub converged: bool,
    /// Penalized negative log-likelihood at the returned parameters
    pub objective: f64,
    /// Newton-Raphson hit a singular Hessian and finished with gradient descent
    pub fell_back: bool,
    pub comparisons: usize,
}

/// Fitted strength vector.
///
/// `strengths` are positive and sum to the number of competitors;
/// `log_strengths` are their natural logs.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub strengths: Array1<f64>,
    pub log_strengths: Array1<f64>,
    pub convergence: ConvergenceInfo,
}

impl FitResult {
    pub fn len(&self) -> usize {
        self.strengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

/// Interval estimate for one competitor on some scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub std: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// One line of a ranking table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub index: usize,
    pub name: String,
    pub strength: f64,
    pub log_strength: f64,
    pub rating: f64,
    pub total_wins: u32,
    pub total_losses: u32,
    pub total_games: u32,
    pub win_rate: f64,
    pub imported_elo: Option<f64>,
    pub imported_glicko: Option<f64>,
    /// Bootstrap spread of the strength, when uncertainty was computed
    pub strength_uncertainty: Option<Interval>,
    /// Bootstrap spread on the rating scale, when uncertainty was computed
    pub rating_uncertainty: Option<Interval>,
}
