//! Conversion from Bradley-Terry strengths to an Elo-like rating scale.
//!
//! `R_i = scale·(log10 s_i − mean(log10 s)) + center`. With the default
//! scale of 400 a 400-point gap means 10:1 odds, exactly as in Elo.

use std::f64::consts::LN_10;

use ndarray::{Array1, Array2, Axis};

use super::stats::ColumnSummary;
use crate::config::settings::ScaleSettings;
use crate::errors::{RatingError, RatingResult};

pub fn to_ratings(strengths: &Array1<f64>, scale: &ScaleSettings) -> Array1<f64> {
    if strengths.is_empty() {
        return Array1::zeros(0);
    }
    let log10 = strengths.mapv(f64::log10);
    let mean = log10.mean().unwrap_or(0.0);
    log10.mapv(|l| scale.scale * (l - mean) + scale.center)
}

/// First-order propagation of a strength std onto the rating scale,
/// `σ_R = scale / (s·ln 10) · σ_s`.
pub fn delta_method_std(
    strengths: &Array1<f64>,
    strength_std: &Array1<f64>,
    scale: &ScaleSettings,
) -> RatingResult<Array1<f64>> {
    check_len("delta_method_std", strengths.len(), strength_std.len())?;
    Ok(ndarray::Zip::from(strengths)
        .and(strength_std)
        .map_collect(|&s, &sd| scale.scale / (s * LN_10) * sd))
}

/// Rating-scale spread from converting every bootstrap draw separately
#[derive(Debug, Clone, PartialEq)]
pub struct RatingUncertainty {
    /// Ratings of the point estimate
    pub ratings: Array1<f64>,
    pub std: Array1<f64>,
    pub ci_lower: Array1<f64>,
    pub ci_upper: Array1<f64>,
    /// Every draw on the rating scale, draws × competitors
    pub samples: Array2<f64>,
}

/// Converts each row of `strength_samples` with [`to_ratings`] and
/// summarizes the converted draws per competitor.
pub fn bootstrap_rating_uncertainty(
    strength_samples: &Array2<f64>,
    point_strengths: &Array1<f64>,
    scale: &ScaleSettings,
) -> RatingResult<RatingUncertainty> {
    check_len(
        "bootstrap_rating_uncertainty",
        point_strengths.len(),
        strength_samples.ncols(),
    )?;

    let mut samples = Array2::zeros(strength_samples.raw_dim());
    for (row, mut out) in strength_samples
        .axis_iter(Axis(0))
        .zip(samples.axis_iter_mut(Axis(0)))
    {
        out.assign(&to_ratings(&row.to_owned(), scale));
    }

    let summary = ColumnSummary::from_samples(&samples);
    Ok(RatingUncertainty {
        ratings: to_ratings(point_strengths, scale),
        std: summary.std,
        ci_lower: summary.ci_lower,
        ci_upper: summary.ci_upper,
        samples,
    })
}

/// `P(i beats j) = s_i / (s_i + s_j)`.
pub fn win_probability(strengths: &Array1<f64>, i: usize, j: usize) -> RatingResult<f64> {
    let len = strengths.len();
    for index in [i, j] {
        if index >= len {
            return Err(RatingError::IndexOutOfRange { index, len });
        }
    }
    if i == j {
        return Err(RatingError::SelfComparison { index: i });
    }
    Ok(strengths[i] / (strengths[i] + strengths[j]))
}

fn check_len(stage: &'static str, expected: usize, actual: usize) -> RatingResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(RatingError::DimensionMismatch {
            stage,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::likelihood::sigmoid;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    #[test]
    fn test_ten_to_one_is_400_points() {
        let ratings = to_ratings(&array![10.0, 1.0], &ScaleSettings::default());
        assert_abs_diff_eq!(ratings[0] - ratings[1], 400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ratings.mean().unwrap(), 1500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_custom_center_and_scale() {
        let scale = ScaleSettings {
            center: 0.0,
            scale: 100.0,
        };
        let ratings = to_ratings(&array![1.0, 1.0, 1.0], &scale);
        assert_eq!(ratings, array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_delta_method() {
        let std = delta_method_std(&array![1.0, 2.0], &array![0.1, 0.1], &ScaleSettings::default())
            .unwrap();
        assert_relative_eq!(std[0], 400.0 / LN_10 * 0.1, max_relative = 1e-12);
        assert_relative_eq!(std[1], std[0] / 2.0, max_relative = 1e-12);

        let err = delta_method_std(&array![1.0], &array![0.1, 0.2], &ScaleSettings::default());
        assert!(matches!(err, Err(RatingError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_win_probability() {
        let strengths = array![3.0, 1.0];
        let p = win_probability(&strengths, 0, 1).unwrap();
        assert_abs_diff_eq!(p, 0.75, epsilon = 1e-15);
        assert_abs_diff_eq!(
            p,
            sigmoid(strengths[0].ln() - strengths[1].ln()),
            epsilon = 1e-12
        );
        assert_eq!(
            win_probability(&strengths, 1, 1),
            Err(RatingError::SelfComparison { index: 1 })
        );
        assert_eq!(
            win_probability(&strengths, 0, 5),
            Err(RatingError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_identical_draws_have_zero_spread() {
        let samples = array![[2.0, 1.0], [2.0, 1.0], [2.0, 1.0]];
        let result =
            bootstrap_rating_uncertainty(&samples, &array![2.0, 1.0], &ScaleSettings::default())
                .unwrap();
        assert_eq!(result.std, array![0.0, 0.0]);
        assert_abs_diff_eq!(result.ci_lower[0], result.ratings[0], epsilon = 1e-9);
        assert_abs_diff_eq!(result.ci_upper[1], result.ratings[1], epsilon = 1e-9);
        assert_eq!(result.samples.dim(), (3, 2));
    }
}
