use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use super::{Minimum, gradient_descent};
use crate::config::settings::{GradientDescentSettings, NewtonSettings};
use crate::rating::convergence::{has_converged, max_change, should_continue};
use crate::rating::likelihood::Objective;

/// Newton-Raphson on the exact Hessian.
///
/// A singular or non-finite step abandons Newton and reruns gradient
/// descent from zero with `fallback`; the result is flagged `fell_back`.
pub fn minimize(
    objective: &Objective<'_>,
    settings: &NewtonSettings,
    fallback: &GradientDescentSettings,
) -> Minimum {
    let n = objective.dim();
    let mut theta = Array1::<f64>::zeros(n);
    let mut converged = false;
    let mut iteration = 0;

    while should_continue(iteration, settings.max_iterations) {
        let grad = objective.gradient(&theta);
        let hess = objective.hessian(&theta);

        let Some(step) = newton_step(&hess, &grad) else {
            warn!(
                "Singular Hessian at Newton iteration {}, falling back to gradient descent",
                iteration
            );
            let mut result = gradient_descent::minimize(objective, fallback);
            result.fell_back = true;
            return result;
        };

        let next_theta = &theta - &step;
        let diff = max_change(&theta, &next_theta);
        let done = has_converged(&theta, &next_theta, settings.tolerance);
        theta = next_theta;
        iteration += 1;

        debug!("    Iteration {}: max_diff = {:.2e}", iteration, diff);
        if done {
            converged = true;
            break;
        }
    }

    if converged {
        debug!("Newton-Raphson converged in {} iterations", iteration);
    } else {
        warn!(
            "Newton-Raphson did not converge after {} iterations",
            settings.max_iterations
        );
    }

    Minimum {
        objective: objective.value(&theta),
        theta,
        iterations: iteration,
        converged,
        fell_back: false,
    }
}

/// Solves `H·δ = g`. `None` when `H` is singular or `δ` is not finite.
fn newton_step(hess: &Array2<f64>, grad: &Array1<f64>) -> Option<Array1<f64>> {
    let n = grad.len();
    let h = DMatrix::from_fn(n, n, |r, c| hess[[r, c]]);
    let g = DVector::from_iterator(n, grad.iter().copied());

    let delta = match h.clone().cholesky() {
        Some(chol) => chol.solve(&g),
        None => h.lu().solve(&g)?,
    };

    if delta.iter().all(|d| d.is_finite()) {
        Some(Array1::from_iter(delta.iter().copied()))
    } else {
        None
    }
}
