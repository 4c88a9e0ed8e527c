use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;

use crate::config::settings::AppConfig;
use crate::domain::{CompetitorRecord, ExportRecord};
use crate::errors::{with_parse_context, with_read_context, with_stage_context};
use crate::matrix::{HeadToHead, MatrixSummary};
use crate::rating::evaluation::DEFAULT_GAME_BINS;
use crate::rating::{
    BradleyTerry, ConvergenceInfo, GamesBin, PredictionMetrics, RankingRow, SortOrder,
    uncertainty_by_games,
};

/// Fewer admitted competitors than this and nothing is rated
pub const MIN_COMPETITORS: usize = 3;

/// Diagnostics for one fit over the admitted field
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub matrix: MatrixSummary,
    pub solver: String,
    pub iterations: usize,
    pub converged: bool,
    pub log_likelihood: f64,
    pub predictions: PredictionMetrics,
}

/// Bootstrap export plus the uncertainty breakdown by games played
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub records: Vec<ExportRecord>,
    pub uncertainty_by_games: Vec<GamesBin>,
}

pub struct AnalysisService {
    config: AppConfig,
}

impl AnalysisService {
    pub fn new(config: AppConfig) -> Result<Self> {
        with_stage_context(config.validate(), "settings validation")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn load_records(path: &Path) -> Result<Vec<CompetitorRecord>> {
        let contents = with_read_context(std::fs::read_to_string(path), path)?;
        let records: Vec<CompetitorRecord> =
            with_parse_context(serde_json::from_str(&contents), "competitor records")?;
        info!("  → Loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn build_store(&self, records: &[CompetitorRecord]) -> HeadToHead {
        HeadToHead::from_records(records, self.config.min_games)
    }

    /// Point-estimate rankings, strongest first.
    pub fn rank(&self, records: &[CompetitorRecord]) -> Result<Vec<RankingRow>> {
        info!("=== Ranking ===");
        let h2h = self.build_store(records);
        if !self.has_enough_competitors(&h2h) {
            return Ok(Vec::new());
        }

        let mut model = with_stage_context(
            BradleyTerry::new(&h2h, self.config.fit.clone()),
            "model setup",
        )?;
        model.fit();
        let rows = with_stage_context(
            model.rankings(&self.config.scale, SortOrder::Descending),
            "ranking",
        )?;
        info!("  → Ranked {} competitors", rows.len());
        Ok(rows)
    }

    /// Bootstrap fit converted to flat export records, best rank first.
    pub fn bootstrap(&self, records: &[CompetitorRecord]) -> Result<BootstrapReport> {
        info!("=== Bootstrap ===");
        let h2h = self.build_store(records);
        if !self.has_enough_competitors(&h2h) {
            return Ok(BootstrapReport {
                records: Vec::new(),
                uncertainty_by_games: Vec::new(),
            });
        }

        let mut model = with_stage_context(
            BradleyTerry::new(&h2h, self.config.fit.clone()),
            "model setup",
        )?;
        let result = with_stage_context(model.fit_bootstrap(&self.config.bootstrap), "bootstrap")?;
        let rows = with_stage_context(
            model.rankings_with_uncertainty(&result, &self.config.scale, SortOrder::Descending),
            "rating conversion",
        )?;

        let calculated_at = Utc::now();
        let export: Vec<ExportRecord> = rows
            .iter()
            .map(|row| self.export_record(row, result.zero_variance[row.index], calculated_at))
            .collect();

        self.log_export(&export);
        Ok(BootstrapReport {
            records: export,
            uncertainty_by_games: uncertainty_by_games(&rows, &DEFAULT_GAME_BINS),
        })
    }

    /// Matrix coverage plus fit diagnostics, without resampling.
    pub fn summarize(&self, records: &[CompetitorRecord]) -> Result<AnalysisSummary> {
        info!("=== Summary ===");
        let h2h = self.build_store(records);
        let mut model = with_stage_context(
            BradleyTerry::new(&h2h, self.config.fit.clone()),
            "model setup",
        )?;
        let convergence: ConvergenceInfo = model.fit().convergence.clone();

        Ok(AnalysisSummary {
            matrix: h2h.summary(),
            solver: convergence.solver.as_str().to_string(),
            iterations: convergence.iterations,
            converged: convergence.converged,
            log_likelihood: with_stage_context(model.log_likelihood(), "log-likelihood")?,
            predictions: with_stage_context(
                model.evaluate_predictions(self.config.min_games),
                "prediction evaluation",
            )?,
        })
    }

    fn has_enough_competitors(&self, h2h: &HeadToHead) -> bool {
        if h2h.len() < MIN_COMPETITORS {
            warn!(
                "Only {} competitors with >= {} games, skipping",
                h2h.len(),
                self.config.min_games
            );
            return false;
        }
        true
    }

    fn export_record(
        &self,
        row: &RankingRow,
        zero_variance: bool,
        calculated_at: chrono::DateTime<Utc>,
    ) -> ExportRecord {
        let strength = row.strength_uncertainty;
        let rating = row.rating_uncertainty;
        ExportRecord {
            name: row.name.clone(),
            rank: row.rank,
            bt_strength: row.strength,
            bt_std: strength.map_or(0.0, |u| u.std),
            rating: row.rating,
            rating_std: rating.map_or(0.0, |u| u.std),
            rating_ci_lower: rating.map_or(row.rating, |u| u.ci_lower),
            rating_ci_upper: rating.map_or(row.rating, |u| u.ci_upper),
            games_played: row.total_games,
            min_games_threshold: self.config.min_games,
            zero_variance,
            calculated_at,
        }
    }

    fn log_export(&self, export: &[ExportRecord]) {
        let (min, max) = export
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.rating), hi.max(r.rating))
            });
        let mean_std = export.iter().map(|r| r.rating_std).sum::<f64>() / export.len().max(1) as f64;
        info!("  → Computed ratings for {} competitors", export.len());
        info!("  Rating range: [{:.1}, {:.1}]", min, max);
        info!("  Mean uncertainty: {:.1} rating points", mean_std);
    }
}
