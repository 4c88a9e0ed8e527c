use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::types::Comparison;

/// Cap used when `cap` weighting is chosen without a limit
pub const DEFAULT_CAP_GAMES: u32 = 50;

/// How strongly a matchup's game volume is allowed to pull on the fit.
///
/// Counts are rounded half-to-even, matching the rounding the reference
/// rankings were published with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Every game is one observation
    #[default]
    None,
    /// At most one observation per direction
    EqualWeight,
    /// Roughly sqrt(total) observations, split by win rate
    Sqrt,
    /// Raw counts, scaled down proportionally above `max_games`
    Cap { max_games: u32 },
}

impl Weighting {
    pub fn cap_games(self) -> Option<u32> {
        match self {
            Weighting::Cap { max_games } => Some(max_games),
            _ => None,
        }
    }

    /// Observations to emit as (wins of i over j, wins of j over i).
    pub fn matchup_counts(self, n_ij: u32, n_ji: u32) -> (u32, u32) {
        let total = n_ij + n_ji;
        if total == 0 {
            return (0, 0);
        }

        match self {
            Weighting::None => (n_ij, n_ji),
            Weighting::EqualWeight => (n_ij.min(1), n_ji.min(1)),
            Weighting::Sqrt => {
                let sqrt_total = f64::from(total).sqrt();
                (
                    sqrt_share(n_ij, total, sqrt_total),
                    sqrt_share(n_ji, total, sqrt_total),
                )
            }
            Weighting::Cap { max_games } if max_games > 0 && total > max_games => {
                let scale = f64::from(max_games) / f64::from(total);
                (
                    round_count(f64::from(n_ij) * scale),
                    round_count(f64::from(n_ji) * scale),
                )
            }
            Weighting::Cap { .. } => (n_ij, n_ji),
        }
    }

    /// Flattens a wins matrix into comparison records.
    ///
    /// Pairs with fewer than `min_games` decisive games, or none at all, are
    /// skipped. Both orderings of a pair are emitted, each carrying the same
    /// underlying games.
    pub fn build_comparisons(self, wins: &Array2<u32>, min_games: u32) -> Vec<Comparison> {
        let n = wins.nrows();
        let mut comparisons = Vec::new();

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let n_ij = wins[[i, j]];
                let n_ji = wins[[j, i]];
                let total = n_ij + n_ji;
                if total == 0 || total < min_games {
                    continue;
                }

                let (use_ij, use_ji) = self.matchup_counts(n_ij, n_ji);
                comparisons.extend((0..use_ij).map(|_| Comparison::new(i, j, true)));
                comparisons.extend((0..use_ji).map(|_| Comparison::new(i, j, false)));
            }
        }

        debug!(
            "Built dataset with {} pairwise comparisons ({:?} weighting)",
            comparisons.len(),
            self
        );
        comparisons
    }
}

fn sqrt_share(wins: u32, total: u32, sqrt_total: f64) -> u32 {
    if wins == 0 {
        return 0;
    }
    let rate = f64::from(wins) / f64::from(total);
    round_count(rate * sqrt_total).max(1)
}

fn round_count(value: f64) -> u32 {
    value.round_ties_even() as u32
}
