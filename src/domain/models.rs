use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Win/loss/tie counts against one opponent, from the owner's perspective
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub l: u32,
    #[serde(default)]
    pub t: u32,
}

impl MatchRecord {
    pub fn new(w: u32, l: u32, t: u32) -> Self {
        Self { w, l, t }
    }

    pub fn total(&self) -> u32 {
        self.w + self.l + self.t
    }

    /// Share of decisive games won; 0.5 when every game was a tie
    pub fn win_pct(&self) -> f64 {
        let decisive = self.w + self.l;
        if decisive == 0 {
            0.5
        } else {
            self.w as f64 / decisive as f64
        }
    }
}

/// One ladder row as handed over by ingestion.
///
/// `h2h` is kept as raw JSON: ladders export it either as an object keyed by
/// opponent or as that object encoded into a string column. Decoding happens
/// in the head-to-head store so a broken entry only empties that row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorRecord {
    #[serde(alias = "username", alias = "Username")]
    pub name: String,
    #[serde(default)]
    pub total_games: u32,
    #[serde(default, alias = "h2h_data", alias = "H2H_Data")]
    pub h2h: Option<serde_json::Value>,
    #[serde(default, alias = "Elo")]
    pub elo: Option<f64>,
    #[serde(default, alias = "Glicko")]
    pub glicko: Option<f64>,
    #[serde(default, alias = "Rating_Deviation")]
    pub rating_deviation: Option<f64>,
}

impl CompetitorRecord {
    pub fn new(name: impl Into<String>, total_games: u32) -> Self {
        Self {
            name: name.into(),
            total_games,
            h2h: None,
            elo: None,
            glicko: None,
            rating_deviation: None,
        }
    }

    /// Adds a record against `opponent`, keyed exactly as given
    pub fn with_opponent(mut self, opponent: &str, record: MatchRecord) -> Self {
        let mut map = match self.h2h.take() {
            Some(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        map.insert(
            opponent.to_string(),
            serde_json::json!({ "w": record.w, "l": record.l, "t": record.t }),
        );
        self.h2h = Some(serde_json::Value::Object(map));
        self
    }

    pub fn with_elo(mut self, elo: f64) -> Self {
        self.elo = Some(elo);
        self
    }
}

/// Flat per-competitor result ready to be merged into a leaderboard document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub name: String,
    pub rank: usize,
    pub bt_strength: f64,
    pub bt_std: f64,
    pub rating: f64,
    pub rating_std: f64,
    pub rating_ci_lower: f64,
    pub rating_ci_upper: f64,
    pub games_played: u32,
    pub min_games_threshold: u32,
    /// Strength did not move across any bootstrap draw
    pub zero_variance: bool,
    pub calculated_at: DateTime<Utc>,
}
