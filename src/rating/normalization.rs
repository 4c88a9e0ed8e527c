use ndarray::Array1;

/// Maps log-strengths to strengths summing to the number of competitors.
///
/// Returns `(strengths, log_strengths)`; the log values are recomputed
/// from the rescaled strengths so the two stay consistent.
pub fn normalize_strengths(theta: &Array1<f64>) -> (Array1<f64>, Array1<f64>) {
    if theta.is_empty() {
        return (Array1::zeros(0), Array1::zeros(0));
    }

    let strengths = rescale_to_count(&exponentiate(theta));
    let log_strengths = strengths.mapv(f64::ln);
    (strengths, log_strengths)
}

/// `exp(θ - max θ)`, the common factor cancels in the rescale
fn exponentiate(theta: &Array1<f64>) -> Array1<f64> {
    let max = theta.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    theta.mapv(|t| (t - max).exp())
}

fn rescale_to_count(strengths: &Array1<f64>) -> Array1<f64> {
    let n = strengths.len() as f64;
    let sum = strengths.sum();
    strengths.mapv(|s| s * n / sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_sums_to_count() {
        let (strengths, log_strengths) = normalize_strengths(&array![0.4, -1.2, 2.0, 0.0]);
        assert_abs_diff_eq!(strengths.sum(), 4.0, epsilon = 1e-12);
        for (s, l) in strengths.iter().zip(log_strengths.iter()) {
            assert_abs_diff_eq!(s.ln(), *l, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_preserves_ratios() {
        let (strengths, _) = normalize_strengths(&array![1.0, 0.0]);
        assert_abs_diff_eq!(strengths[0] / strengths[1], 1f64.exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_theta_gives_unit_strengths() {
        let (strengths, log_strengths) = normalize_strengths(&Array1::zeros(3));
        assert_eq!(strengths, array![1.0, 1.0, 1.0]);
        assert_eq!(log_strengths, array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_large_theta_does_not_overflow() {
        let (strengths, _) = normalize_strengths(&array![800.0, 0.0]);
        assert!(strengths.iter().all(|s| s.is_finite()));
        assert_abs_diff_eq!(strengths.sum(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty() {
        let (strengths, log_strengths) = normalize_strengths(&Array1::zeros(0));
        assert!(strengths.is_empty() && log_strengths.is_empty());
    }
}
