use argmin::core::{CostFunction, Error, Executor, Gradient, State, TerminationReason};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use log::{debug, warn};
use nalgebra::DVector;
use ndarray::Array1;

use super::Minimum;
use crate::config::settings::QuasiNewtonSettings;
use crate::rating::convergence::max_abs;
use crate::rating::likelihood::Objective;

type Theta = DVector<f64>;
type LineSearch = MoreThuenteLineSearch<Theta, Theta, f64>;
type Lbfgs = LBFGS<LineSearch, Theta, Theta, f64>;

/// Adapts [`Objective`] to argmin's parameter type.
struct Problem<'o, 'c> {
    objective: &'o Objective<'c>,
}

impl CostFunction for Problem<'_, '_> {
    type Param = Theta;
    type Output = f64;

    fn cost(&self, theta: &Theta) -> Result<f64, Error> {
        Ok(self.objective.value(&to_array(theta)))
    }
}

impl Gradient for Problem<'_, '_> {
    type Param = Theta;
    type Gradient = Theta;

    fn gradient(&self, theta: &Theta) -> Result<Theta, Error> {
        Ok(to_vector(&self.objective.gradient(&to_array(theta))))
    }
}

fn to_array(theta: &Theta) -> Array1<f64> {
    Array1::from(theta.as_slice().to_vec())
}

fn to_vector(values: &Array1<f64>) -> Theta {
    DVector::from_iterator(values.len(), values.iter().copied())
}

/// L-BFGS with a More-Thuente line search, starting from `θ = 0`.
///
/// Stops when the gradient norm drops below `gradient_tolerance` or the
/// objective changes by less than `objective_tolerance` between iterations.
pub fn minimize(objective: &Objective<'_>, settings: &QuasiNewtonSettings) -> Minimum {
    let origin = Array1::<f64>::zeros(objective.dim());
    let (value, grad) = objective.value_and_gradient(&origin);
    if max_abs(&grad) < settings.gradient_tolerance {
        debug!("L-BFGS started at a stationary point");
        return Minimum {
            theta: origin,
            objective: value,
            iterations: 0,
            converged: true,
            fell_back: false,
        };
    }

    match run(objective, settings) {
        Ok(minimum) => minimum,
        Err(e) => {
            warn!("L-BFGS failed ({e}), keeping the starting point");
            Minimum {
                theta: origin,
                objective: value,
                iterations: 0,
                converged: false,
                fell_back: false,
            }
        }
    }
}

fn run(objective: &Objective<'_>, settings: &QuasiNewtonSettings) -> Result<Minimum, Error> {
    let solver: Lbfgs = LBFGS::new(MoreThuenteLineSearch::new(), settings.history)
        .with_tolerance_grad(settings.gradient_tolerance)?
        .with_tolerance_cost(settings.objective_tolerance)?;
    let init = DVector::zeros(objective.dim());

    let result = Executor::new(Problem { objective }, solver)
        .configure(|state| state.param(init).max_iters(settings.max_iterations as u64))
        .run()?;
    let state = result.state();

    let iterations = state.get_iter() as usize;
    let converged = matches!(
        state.get_termination_reason(),
        Some(TerminationReason::SolverConverged)
    );
    let theta = state
        .get_best_param()
        .map(to_array)
        .ok_or_else(|| Error::msg("L-BFGS returned no parameters"))?;
    let value = state.get_best_cost();

    if converged {
        debug!("L-BFGS converged in {} iterations, NLL = {:.4}", iterations, value);
    } else {
        warn!(
            "L-BFGS did not converge after {} iterations ({:?})",
            iterations,
            state.get_termination_status()
        );
    }

    Ok(Minimum {
        theta,
        objective: value,
        iterations,
        converged,
        fell_back: false,
    })
}
