use ndarray::Array2;
use serde::Serialize;

/// Coverage statistics of a games matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixSummary {
    pub competitors: usize,
    /// Ordered pairs, diagonal excluded
    pub possible_matchups: usize,
    pub matchups_with_games: usize,
    pub matchups_meeting_threshold: usize,
    pub min_games: u32,
    pub total_games: u64,
    /// Mean over non-empty matchups; 0 when there are none
    pub mean_games_per_matchup: f64,
    /// Share of possible matchups with at least one game, in percent
    pub coverage_pct: f64,
}

impl MatrixSummary {
    pub fn from_games(games: &Array2<u32>, min_games: u32) -> Self {
        let n = games.nrows();
        let with_games: Vec<u32> = games.iter().copied().filter(|&g| g > 0).collect();
        let total_games: u64 = with_games.iter().map(|&g| u64::from(g)).sum();
        let mean_games_per_matchup = if with_games.is_empty() {
            0.0
        } else {
            total_games as f64 / with_games.len() as f64
        };

        let possible_matchups = n * n.saturating_sub(1);
        let coverage_pct = if possible_matchups == 0 {
            0.0
        } else {
            100.0 * with_games.len() as f64 / possible_matchups as f64
        };

        Self {
            competitors: n,
            possible_matchups,
            matchups_with_games: with_games.len(),
            matchups_meeting_threshold: with_games.iter().filter(|&&g| g >= min_games).count(),
            min_games,
            total_games,
            mean_games_per_matchup,
            coverage_pct,
        }
    }
}
