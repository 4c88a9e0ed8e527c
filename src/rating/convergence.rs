use ndarray::Array1;

pub fn has_converged(old_theta: &Array1<f64>, new_theta: &Array1<f64>, tolerance: f64) -> bool {
    max_change(old_theta, new_theta) < tolerance
}

/// Largest absolute per-parameter change between two iterates
pub fn max_change(old_theta: &Array1<f64>, new_theta: &Array1<f64>) -> f64 {
    old_theta
        .iter()
        .zip(new_theta.iter())
        .map(|(old, new)| (new - old).abs())
        .fold(0.0, f64::max)
}

pub fn max_abs(values: &Array1<f64>) -> f64 {
    values.iter().map(|v| v.abs()).fold(0.0, f64::max)
}

pub fn should_continue(iteration: usize, max_iterations: usize) -> bool {
    iteration < max_iterations
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_max_change() {
        assert_eq!(max_change(&array![1.0, 2.0], &array![1.5, 1.0]), 1.0);
        assert!(has_converged(&array![1.0], &array![1.0 + 1e-9], 1e-6));
        assert!(!has_converged(&array![1.0], &array![1.1], 1e-6));
    }

    #[test]
    fn test_should_continue() {
        assert!(should_continue(0, 1));
        assert!(!should_continue(1, 1));
    }

    #[test]
    fn test_max_abs() {
        assert_eq!(max_abs(&array![0.5, -2.0, 1.0]), 2.0);
        assert_eq!(max_abs(&Array1::zeros(0)), 0.0);
    }
}
