use log::{debug, warn};
use ndarray::Array1;

use super::Minimum;
use crate::config::settings::GradientDescentSettings;
use crate::rating::convergence::{has_converged, max_change, should_continue};
use crate::rating::likelihood::Objective;

/// Fixed-step gradient descent from `θ = 0`.
///
/// Always returns the last iterate, converged or not.
pub fn minimize(objective: &Objective<'_>, settings: &GradientDescentSettings) -> Minimum {
    descend(objective, settings, Array1::zeros(objective.dim()))
}

pub(super) fn descend(
    objective: &Objective<'_>,
    settings: &GradientDescentSettings,
    start: Array1<f64>,
) -> Minimum {
    let mut theta = start;
    let mut converged = false;
    let mut iteration = 0;

    while should_continue(iteration, settings.max_iterations) {
        let grad = objective.gradient(&theta);
        let next_theta = &theta - &(grad * settings.learning_rate);

        let diff = max_change(&theta, &next_theta);
        let done = has_converged(&theta, &next_theta, settings.tolerance);
        theta = next_theta;
        iteration += 1;

        if iteration % 100 == 0 {
            debug!("    Iteration {}: max_diff = {:.2e}", iteration, diff);
        }
        if done {
            converged = true;
            break;
        }
    }

    if converged {
        debug!("Gradient descent converged in {} iterations", iteration);
    } else {
        warn!(
            "Gradient descent did not converge after {} iterations",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::types::Comparison;

    fn lopsided() -> Vec<Comparison> {
        (0..30)
            .flat_map(|k| [Comparison::new(0, 1, k % 5 != 0), Comparison::new(1, 0, k % 5 == 0)])
            .collect()
    }

    #[test]
    fn test_stops_at_max_iterations() {
        let comparisons = lopsided();
        let objective = Objective::new(&comparisons, 2, 0.01);
        let settings = GradientDescentSettings {
            learning_rate: 0.0001,
            max_iterations: 7,
            tolerance: 1e-12,
        };
        let result = minimize(&objective, &settings);

        assert!(!result.converged);
        assert_eq!(result.iterations, 7);
        assert!(result.theta[0] > 0.0 && result.theta[1] < 0.0);
    }

    #[test]
    fn test_converges_with_reasonable_step() {
        let comparisons = lopsided();
        let objective = Objective::new(&comparisons, 2, 0.01);
        let settings = GradientDescentSettings {
            learning_rate: 0.02,
            max_iterations: 10_000,
            tolerance: 1e-9,
        };
        let result = minimize(&objective, &settings);

        assert!(result.converged);
        // 24 of 30 won in each listing, so p(0 beats 1) sits just under 0.8
        let p = crate::rating::likelihood::sigmoid(result.theta[0] - result.theta[1]);
        assert!(p > 0.75 && p < 0.8);
    }

    #[test]
    fn test_no_comparisons_converges_immediately() {
        let objective = Objective::new(&[], 3, 0.01);
        let result = minimize(&objective, &GradientDescentSettings::default());
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.objective, 0.0);
    }
}
