use ndarray::{Array1, Array2, ArrayView1, Axis};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// True when every value is bit-for-bit the same as the first.
pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0].to_bits() == w[1].to_bits())
}

/// Population standard deviation (divides by `n`). Exactly zero when all
/// values are equal.
pub fn std_dev(values: &[f64]) -> f64 {
    if is_constant(values) {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Percentile `q` in `[0, 100]`, linearly interpolated between the two
/// nearest ranks. NaN for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

pub const CI_LOWER_PERCENTILE: f64 = 2.5;
pub const CI_UPPER_PERCENTILE: f64 = 97.5;

/// Per-column summary of a draws × competitors sample matrix
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
    pub ci_lower: Array1<f64>,
    pub ci_upper: Array1<f64>,
    /// Columns whose samples are all identical
    pub constant: Vec<bool>,
}

impl ColumnSummary {
    pub fn from_samples(samples: &Array2<f64>) -> Self {
        let columns: Vec<Vec<f64>> = samples.axis_iter(Axis(1)).map(column_values).collect();

        Self {
            mean: columns.iter().map(|c| mean(c)).collect(),
            std: columns.iter().map(|c| std_dev(c)).collect(),
            ci_lower: columns
                .iter()
                .map(|c| percentile(c, CI_LOWER_PERCENTILE))
                .collect(),
            ci_upper: columns
                .iter()
                .map(|c| percentile(c, CI_UPPER_PERCENTILE))
                .collect(),
            constant: columns.iter().map(|c| is_constant(c)).collect(),
        }
    }
}

fn column_values(column: ArrayView1<'_, f64>) -> Vec<f64> {
    column.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_population_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(std_dev(&values), 2.0);
        assert_eq!(std_dev(&[3.0, 3.0, 3.0]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_identical_samples_have_exactly_zero_std() {
        // sum / n is one ulp off for this value, so a naive std is ~1e-19
        let value = 3.2159011854740014e-3;
        let values = vec![value; 12];
        assert!(is_constant(&values));
        assert_eq!(std_dev(&values), 0.0);

        let samples = Array2::from_elem((12, 2), value);
        let summary = ColumnSummary::from_samples(&samples);
        assert_eq!(summary.std, array![0.0, 0.0]);
        assert_eq!(summary.constant, vec![true, true]);
    }

    #[test]
    fn test_percentile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        // rank 0.025 * 3 = 0.075
        assert_abs_diff_eq!(percentile(&values, 2.5), 1.075, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&values, 97.5), 3.925, epsilon = 1e-12);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&values), 2.5);
    }

    #[test]
    fn test_percentile_single_and_empty() {
        assert_eq!(percentile(&[7.0], 97.5), 7.0);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_column_summary() {
        let samples = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let summary = ColumnSummary::from_samples(&samples);
        assert_eq!(summary.mean, array![2.0, 5.0]);
        assert_abs_diff_eq!(summary.std[0], (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(summary.std[1], 0.0);
        assert_eq!(summary.constant, vec![false, true]);
        assert_eq!(summary.ci_lower[1], 5.0);
        assert_abs_diff_eq!(summary.ci_upper[0], 2.95, epsilon = 1e-12);
    }
}
