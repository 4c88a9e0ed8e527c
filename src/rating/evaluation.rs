use ndarray::{Array1, Array2};
use serde::Serialize;

use super::stats::{mean, median};
use super::types::RankingRow;
use crate::matrix::Matrices;

const LOG_EPSILON: f64 = 1e-10;
const ACCURACY_MARGIN: f64 = 0.1;

/// Game-count bin edges used when none are given
pub const DEFAULT_GAME_BINS: [u32; 6] = [0, 10, 20, 50, 100, 200];

fn pair_probability(strengths: &Array1<f64>, i: usize, j: usize) -> f64 {
    strengths[i] / (strengths[i] + strengths[j])
}

/// `Σ wins[i, j]·ln(p_ij)` over every ordered pair with at least one win.
pub fn log_likelihood(wins: &Array2<u32>, strengths: &Array1<f64>) -> f64 {
    let n = strengths.len();
    let mut ll = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j && wins[[i, j]] > 0 {
                let p = pair_probability(strengths, i, j);
                ll += f64::from(wins[[i, j]]) * (p + LOG_EPSILON).ln();
            }
        }
    }
    ll
}

/// How closely predicted win probabilities track observed win rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// Share of matchups predicted within 0.1 of the observed rate
    pub accuracy_10pct: f64,
    pub n_matchups: usize,
}

/// Compares `p_ij` with `wins[i, j] / games[i, j]` over ordered pairs
/// with at least `min_games` games.
pub fn evaluate_predictions(
    matrices: &Matrices,
    strengths: &Array1<f64>,
    min_games: u32,
) -> PredictionMetrics {
    let n = strengths.len();
    let mut errors = Vec::new();

    for i in 0..n {
        for j in 0..n {
            let games = matrices.games[[i, j]];
            if i == j || games == 0 || games < min_games {
                continue;
            }
            let actual = f64::from(matrices.wins[[i, j]]) / f64::from(games);
            errors.push(pair_probability(strengths, i, j) - actual);
        }
    }

    if errors.is_empty() {
        return PredictionMetrics {
            mae: 0.0,
            rmse: 0.0,
            accuracy_10pct: 0.0,
            n_matchups: 0,
        };
    }

    let count = errors.len() as f64;
    let within = errors.iter().filter(|e| e.abs() < ACCURACY_MARGIN).count();
    PredictionMetrics {
        mae: errors.iter().map(|e| e.abs()).sum::<f64>() / count,
        rmse: (errors.iter().map(|e| e * e).sum::<f64>() / count).sqrt(),
        accuracy_10pct: within as f64 / count,
        n_matchups: errors.len(),
    }
}

/// Strength uncertainty of the competitors whose game count falls in
/// `[lower, upper)`; `upper` is `None` for the last, open bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamesBin {
    /// `"lower-upper"`, or `"lower+"` for the open bin
    pub label: String,
    pub lower: u32,
    pub upper: Option<u32>,
    pub competitors: usize,
    pub mean_std: f64,
    pub median_std: f64,
}

fn bin_label(lower: u32, upper: Option<u32>) -> String {
    match upper {
        Some(upper) => format!("{lower}-{upper}"),
        None => format!("{lower}+"),
    }
}

/// Groups ranking rows by total games and summarizes their bootstrap
/// strength std. Rows without uncertainty and empty bins are skipped.
pub fn uncertainty_by_games(rows: &[RankingRow], edges: &[u32]) -> Vec<GamesBin> {
    let mut edges = edges.to_vec();
    edges.sort_unstable();
    edges.dedup();

    edges
        .iter()
        .enumerate()
        .filter_map(|(k, &lower)| {
            let upper = edges.get(k + 1).copied();
            let stds: Vec<f64> = rows
                .iter()
                .filter(|row| row.total_games >= lower && upper.is_none_or(|u| row.total_games < u))
                .filter_map(|row| row.strength_uncertainty.map(|u| u.std))
                .collect();
            if stds.is_empty() {
                return None;
            }
            Some(GamesBin {
                label: bin_label(lower, upper),
                lower,
                upper,
                competitors: stds.len(),
                mean_std: mean(&stds),
                median_std: median(&stds),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::types::Interval;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn row(total_games: u32, std: Option<f64>) -> RankingRow {
        RankingRow {
            rank: 1,
            index: 0,
            name: "x".into(),
            strength: 1.0,
            log_strength: 0.0,
            rating: 1500.0,
            total_wins: total_games,
            total_losses: 0,
            total_games,
            win_rate: 1.0,
            imported_elo: None,
            imported_glicko: None,
            strength_uncertainty: std.map(|std| Interval {
                std,
                ci_lower: 1.0 - std,
                ci_upper: 1.0 + std,
            }),
            rating_uncertainty: None,
        }
    }

    #[test]
    fn test_log_likelihood() {
        let wins = array![[0, 3], [1, 0]];
        let strengths = array![3.0, 1.0];
        let expected = 3.0 * (0.75f64 + 1e-10).ln() + (0.25f64 + 1e-10).ln();
        assert_abs_diff_eq!(log_likelihood(&wins, &strengths), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_evaluate_predictions() {
        let matrices = Matrices {
            wins: array![[0, 3], [1, 0]],
            games: array![[0, 4], [4, 0]],
        };
        let metrics = evaluate_predictions(&matrices, &array![3.0, 1.0], 0);
        assert_eq!(metrics.n_matchups, 2);
        assert_abs_diff_eq!(metrics.mae, 0.0, epsilon = 1e-12);
        assert_eq!(metrics.accuracy_10pct, 1.0);

        let metrics = evaluate_predictions(&matrices, &array![1.0, 1.0], 0);
        assert_abs_diff_eq!(metrics.mae, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.rmse, 0.25, epsilon = 1e-12);
        assert_eq!(metrics.accuracy_10pct, 0.0);
    }

    #[test]
    fn test_evaluate_predictions_threshold_excludes_all() {
        let matrices = Matrices {
            wins: array![[0, 3], [1, 0]],
            games: array![[0, 4], [4, 0]],
        };
        let metrics = evaluate_predictions(&matrices, &array![3.0, 1.0], 5);
        assert_eq!(metrics.n_matchups, 0);
        assert_eq!(metrics.mae, 0.0);
    }

    #[test]
    fn test_uncertainty_by_games() {
        let rows = vec![
            row(5, Some(0.2)),
            row(8, Some(0.4)),
            row(60, Some(0.05)),
            row(500, Some(0.01)),
            row(500, None),
        ];
        let bins = uncertainty_by_games(&rows, &DEFAULT_GAME_BINS);

        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].label, "0-10");
        assert_eq!(bins[0].competitors, 2);
        assert_abs_diff_eq!(bins[0].mean_std, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(bins[0].median_std, 0.3, epsilon = 1e-12);
        assert_eq!(bins[1].label, "50-100");
        assert_eq!(bins[2].label, "200+");
        assert_eq!(bins[2].competitors, 1);

        let json = serde_json::to_value(&bins[2]).unwrap();
        assert_eq!(json["label"], "200+");
        assert!(json["upper"].is_null());
    }
}
