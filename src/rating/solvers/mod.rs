//! Minimizers for the penalized Bradley-Terry objective.
//!
//! All three start from `θ = 0` and share [`Objective`]; they differ only
//! in how they step. None of them fails: non-convergence is reported on the
//! returned [`Minimum`] and logged.

pub mod gradient_descent;
pub mod newton;
pub mod quasi_newton;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::likelihood::Objective;
use crate::config::settings::FitSettings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solver {
    /// L-BFGS with a backtracking line search
    #[default]
    #[serde(alias = "lbfgs", alias = "logistic")]
    QuasiNewton,
    #[serde(alias = "gd")]
    GradientDescent,
    /// Fisher scoring with the exact Hessian
    #[serde(alias = "newton")]
    NewtonRaphson,
}

impl Solver {
    pub fn minimize(self, objective: &Objective<'_>, settings: &FitSettings) -> Minimum {
        match self {
            Solver::QuasiNewton => quasi_newton::minimize(objective, &settings.quasi_newton),
            Solver::GradientDescent => {
                gradient_descent::minimize(objective, &settings.gradient_descent)
            }
            Solver::NewtonRaphson => {
                newton::minimize(objective, &settings.newton, &settings.gradient_descent)
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Solver::QuasiNewton => "quasi_newton",
            Solver::GradientDescent => "gradient_descent",
            Solver::NewtonRaphson => "newton_raphson",
        }
    }
}

/// Parameters a solver stopped at
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub theta: Array1<f64>,
    pub objective: f64,
    pub iterations: usize,
    pub converged: bool,
    pub fell_back: bool,
}
