use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use ndarray::Array2;
use serde_json::Value;

use super::keys::normalize_key;
use super::summary::MatrixSummary;
use crate::domain::{CompetitorRecord, MatchRecord};
use crate::errors::{RatingError, RatingResult};

/// A competitor admitted into the analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Competitor {
    pub name: String,
    pub key: String,
    pub total_games: u32,
    pub elo: Option<f64>,
    pub glicko: Option<f64>,
    pub rating_deviation: Option<f64>,
}

/// Dense count matrices indexed by the store's competitor ordering.
///
/// `wins[[i, j]]` is how often i beat j, `games[[i, j]]` every game between
/// them (ties included) as recorded by i. The diagonal is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrices {
    pub wins: Array2<u32>,
    pub games: Array2<u32>,
}

impl Matrices {
    pub fn zeros(n: usize) -> Self {
        Self {
            wins: Array2::zeros((n, n)),
            games: Array2::zeros((n, n)),
        }
    }

    pub fn len(&self) -> usize {
        self.wins.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decisive games between i and j, counted from the wins matrix
    pub fn decisive(&self, i: usize, j: usize) -> u32 {
        self.wins[[i, j]] + self.wins[[j, i]]
    }
}

/// Which of the three head-to-head views to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    WinPct,
    Games,
    Wins,
}

/// Head-to-head store: the filtered competitor list plus its matrices.
#[derive(Debug, Clone)]
pub struct HeadToHead {
    competitors: Vec<Competitor>,
    index: HashMap<String, usize>,
    matrices: Matrices,
    win_pct: Array2<f64>,
    min_games: u32,
}

impl HeadToHead {
    /// Builds the store from ingestion records, keeping competitors with at
    /// least `min_games` recorded games.
    pub fn from_records(records: &[CompetitorRecord], min_games: u32) -> Self {
        let mut admitted: Vec<(Competitor, HashMap<String, MatchRecord>)> = Vec::new();
        let mut seen = HashSet::new();

        for record in records {
            let opponents = decode_opponents(record);
            let total_games = games_played(record, &opponents);

            if total_games < min_games {
                continue;
            }
            if !seen.insert(record.name.clone()) {
                warn!("Duplicate competitor {}, keeping the first row", record.name);
                continue;
            }

            let competitor = Competitor {
                name: record.name.clone(),
                key: normalize_key(&record.name),
                total_games,
                elo: record.elo,
                glicko: record.glicko,
                rating_deviation: record.rating_deviation,
            };
            admitted.push((competitor, opponents));
        }

        admitted.sort_by(|(a, _), (b, _)| by_elo_descending(a.elo, b.elo));

        info!(
            "Loaded {} competitors with at least {} games",
            admitted.len(),
            min_games
        );

        let (matrices, win_pct) = build_matrices(&admitted);
        let competitors: Vec<Competitor> = admitted.into_iter().map(|(c, _)| c).collect();
        let index = competitors
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.name.clone(), idx))
            .collect();

        Self {
            competitors,
            index,
            matrices,
            win_pct,
            min_games,
        }
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    pub fn min_games(&self) -> u32 {
        self.min_games
    }

    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    pub fn names(&self) -> Vec<&str> {
        self.competitors.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn competitor(&self, index: usize) -> RatingResult<&Competitor> {
        self.competitors
            .get(index)
            .ok_or(RatingError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    pub fn index_of(&self, name: &str) -> RatingResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| RatingError::UnknownCompetitor(name.to_string()))
    }

    pub fn matrices(&self) -> &Matrices {
        &self.matrices
    }

    pub fn wins(&self) -> &Array2<u32> {
        &self.matrices.wins
    }

    pub fn games(&self) -> &Array2<u32> {
        &self.matrices.games
    }

    pub fn win_pct(&self) -> &Array2<f64> {
        &self.win_pct
    }

    /// Any of the three views as floats (counts converted losslessly)
    pub fn matrix(&self, kind: MatrixKind) -> Array2<f64> {
        match kind {
            MatrixKind::WinPct => self.win_pct.clone(),
            MatrixKind::Games => self.matrices.games.mapv(f64::from),
            MatrixKind::Wins => self.matrices.wins.mapv(f64::from),
        }
    }

    /// Owned copy of the count matrices for resampling
    pub fn snapshot(&self) -> Matrices {
        self.matrices.clone()
    }

    pub fn total_wins(&self, index: usize) -> RatingResult<u32> {
        self.competitor(index)?;
        Ok(self.matrices.wins.row(index).sum())
    }

    pub fn total_losses(&self, index: usize) -> RatingResult<u32> {
        self.competitor(index)?;
        Ok(self.matrices.wins.column(index).sum())
    }

    /// Decisive games played inside the admitted field
    pub fn total_games(&self, index: usize) -> RatingResult<u32> {
        Ok(self.total_wins(index)? + self.total_losses(index)?)
    }

    pub fn summary(&self) -> MatrixSummary {
        MatrixSummary::from_games(&self.matrices.games, self.min_games)
    }
}

fn games_played(record: &CompetitorRecord, opponents: &HashMap<String, MatchRecord>) -> u32 {
    if record.total_games > 0 {
        record.total_games
    } else {
        opponents.values().map(MatchRecord::total).sum()
    }
}

fn by_elo_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Decodes a record's opponent map, treating anything unreadable as empty.
fn decode_opponents(record: &CompetitorRecord) -> HashMap<String, MatchRecord> {
    let value = match &record.h2h {
        None | Some(Value::Null) => return HashMap::new(),
        Some(Value::String(encoded)) if encoded.trim().is_empty() => return HashMap::new(),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(value) => value,
            Err(e) => {
                warn!("Error parsing H2H data for {}: {}", record.name, e);
                return HashMap::new();
            }
        },
        Some(value) => value.clone(),
    };

    let Value::Object(entries) = value else {
        warn!("H2H data for {} is not an object, ignoring it", record.name);
        return HashMap::new();
    };

    let mut opponents: HashMap<String, MatchRecord> = HashMap::new();
    for (opponent, raw) in entries {
        match serde_json::from_value::<MatchRecord>(raw) {
            Ok(parsed) => {
                let entry = opponents.entry(normalize_key(&opponent)).or_default();
                entry.w += parsed.w;
                entry.l += parsed.l;
                entry.t += parsed.t;
            }
            Err(e) => warn!(
                "Malformed record for {} against {}, treating as no games: {}",
                record.name, opponent, e
            ),
        }
    }
    opponents
}

fn build_matrices(
    admitted: &[(Competitor, HashMap<String, MatchRecord>)],
) -> (Matrices, Array2<f64>) {
    let n = admitted.len();
    let mut matrices = Matrices::zeros(n);
    let mut win_pct = Array2::from_elem((n, n), f64::NAN);

    for (i, (_, opponents)) in admitted.iter().enumerate() {
        for (j, (other, _)) in admitted.iter().enumerate() {
            if i == j {
                continue;
            }
            let record = opponents.get(&other.key).copied().unwrap_or_default();
            let total = record.total();

            matrices.wins[[i, j]] = record.w;
            matrices.games[[i, j]] = total;
            if total > 0 {
                win_pct[[i, j]] = record.win_pct();
            }
        }
    }

    debug!("Built {}x{} head-to-head matrices", n, n);
    (matrices, win_pct)
}
