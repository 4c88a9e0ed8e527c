use log::{debug, info, warn};
use ndarray::{Array1, Array2};

use super::bootstrap::{BootstrapResult, run_bootstrap};
use super::evaluation::{self, PredictionMetrics};
use super::likelihood::Objective;
use super::normalization::normalize_strengths;
use super::rankings::{Uncertainty, build_rankings};
use super::scale::{self, to_ratings};
use super::types::{ConvergenceInfo, FitResult, RankingRow, SortOrder};
use crate::config::settings::{BootstrapSettings, FitSettings, ScaleSettings};
use crate::errors::{RatingError, RatingResult};
use crate::matrix::HeadToHead;

/// Fits strengths to a square wins matrix.
pub fn fit_wins(wins: &Array2<u32>, settings: &FitSettings) -> RatingResult<FitResult> {
    settings.validate()?;
    if wins.nrows() != wins.ncols() {
        return Err(RatingError::DimensionMismatch {
            stage: "fit",
            expected: wins.nrows(),
            actual: wins.ncols(),
        });
    }
    Ok(fit_validated(wins, settings))
}

/// Fit without re-checking settings, for callers that already validated.
pub(crate) fn fit_validated(wins: &Array2<u32>, settings: &FitSettings) -> FitResult {
    let n = wins.nrows();
    let comparisons = settings
        .weighting
        .build_comparisons(wins, settings.min_matchup_games);
    let objective = Objective::new(&comparisons, n, settings.regularization);
    let minimum = settings.solver.minimize(&objective, settings);

    if minimum.fell_back {
        warn!("Fit finished with gradient descent after a singular Hessian");
    }

    let (strengths, log_strengths) = normalize_strengths(&minimum.theta);
    FitResult {
        strengths,
        log_strengths,
        convergence: ConvergenceInfo {
            solver: settings.solver,
            iterations: minimum.iterations,
            converged: minimum.converged,
            objective: minimum.objective,
            fell_back: minimum.fell_back,
            comparisons: comparisons.len(),
        },
    }
}

/// Bradley-Terry model over a head-to-head store.
///
/// Holds the most recent fit; everything that reads strengths fails with
/// [`RatingError::NotFitted`] until [`BradleyTerry::fit`] or
/// [`BradleyTerry::fit_bootstrap`] has run.
pub struct BradleyTerry<'a> {
    h2h: &'a HeadToHead,
    settings: FitSettings,
    fit: Option<FitResult>,
}

impl<'a> BradleyTerry<'a> {
    pub fn new(h2h: &'a HeadToHead, settings: FitSettings) -> RatingResult<Self> {
        settings.validate()?;
        Ok(Self {
            h2h,
            settings,
            fit: None,
        })
    }

    pub fn settings(&self) -> &FitSettings {
        &self.settings
    }

    pub fn is_fitted(&self) -> bool {
        self.fit.is_some()
    }

    pub fn fit(&mut self) -> &FitResult {
        info!(
            "Fitting Bradley-Terry model ({}) for {} competitors",
            self.settings.solver.as_str(),
            self.h2h.len()
        );
        let result = fit_validated(self.h2h.wins(), &self.settings);
        debug!(
            "Fit used {} comparisons, {} iterations, NLL = {:.4}",
            result.convergence.comparisons, result.convergence.iterations, result.convergence.objective
        );
        self.fit.insert(result)
    }

    pub fn fit_result(&self) -> RatingResult<&FitResult> {
        self.fit.as_ref().ok_or(RatingError::NotFitted {
            operation: "fit_result",
        })
    }

    fn fitted(&self, operation: &'static str) -> RatingResult<&FitResult> {
        self.fit.as_ref().ok_or(RatingError::NotFitted { operation })
    }

    pub fn strengths(&self) -> RatingResult<&Array1<f64>> {
        Ok(&self.fitted("strengths")?.strengths)
    }

    pub fn predict_win_probability(&self, i: usize, j: usize) -> RatingResult<f64> {
        let fit = self.fitted("predict_win_probability")?;
        scale::win_probability(&fit.strengths, i, j)
    }

    /// Probability by competitor name
    pub fn predict_by_name(&self, a: &str, b: &str) -> RatingResult<f64> {
        let i = self.h2h.index_of(a)?;
        let j = self.h2h.index_of(b)?;
        self.predict_win_probability(i, j)
    }

    pub fn ratings(&self, scale: &ScaleSettings) -> RatingResult<Array1<f64>> {
        Ok(to_ratings(&self.fitted("ratings")?.strengths, scale))
    }

    pub fn rankings(&self, scale: &ScaleSettings, order: SortOrder) -> RatingResult<Vec<RankingRow>> {
        let fit = self.fitted("rankings")?;
        build_rankings(self.h2h, fit, scale, order, None)
    }

    /// Rankings with bootstrap spread on both the strength and rating scale.
    pub fn rankings_with_uncertainty(
        &self,
        bootstrap: &BootstrapResult,
        scale: &ScaleSettings,
        order: SortOrder,
    ) -> RatingResult<Vec<RankingRow>> {
        let fit = self.fitted("rankings_with_uncertainty")?;
        let ratings = bootstrap.rating_uncertainty(scale)?;
        let uncertainty = Uncertainty {
            bootstrap,
            ratings: &ratings,
        };
        build_rankings(self.h2h, fit, scale, order, Some(uncertainty))
    }

    pub fn log_likelihood(&self) -> RatingResult<f64> {
        let fit = self.fitted("log_likelihood")?;
        Ok(evaluation::log_likelihood(self.h2h.wins(), &fit.strengths))
    }

    pub fn evaluate_predictions(&self, min_games: u32) -> RatingResult<PredictionMetrics> {
        let fit = self.fitted("evaluate_predictions")?;
        Ok(evaluation::evaluate_predictions(
            self.h2h.matrices(),
            &fit.strengths,
            min_games,
        ))
    }

    /// Runs the bootstrap over the store's matrices and keeps the
    /// full-data point fit as the model's current fit.
    pub fn fit_bootstrap(&mut self, settings: &BootstrapSettings) -> RatingResult<BootstrapResult> {
        let result = run_bootstrap(self.h2h.matrices(), &self.settings, settings)?;
        self.fit = Some(result.point.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompetitorRecord, MatchRecord};
    use crate::rating::solvers::Solver;
    use ndarray::array;

    fn three_way() -> HeadToHead {
        let records = vec![
            CompetitorRecord::new("A", 20)
                .with_opponent("B", MatchRecord::new(7, 3, 0))
                .with_opponent("C", MatchRecord::new(8, 2, 0)),
            CompetitorRecord::new("B", 20)
                .with_opponent("A", MatchRecord::new(3, 7, 0))
                .with_opponent("C", MatchRecord::new(6, 4, 0)),
            CompetitorRecord::new("C", 20)
                .with_opponent("A", MatchRecord::new(2, 8, 0))
                .with_opponent("B", MatchRecord::new(4, 6, 0)),
        ];
        HeadToHead::from_records(&records, 0)
    }

    #[test]
    fn test_not_fitted_errors() {
        let h2h = three_way();
        let model = BradleyTerry::new(&h2h, FitSettings::default()).unwrap();
        assert_eq!(
            model.predict_win_probability(0, 1),
            Err(RatingError::NotFitted {
                operation: "predict_win_probability"
            })
        );
        assert!(model.rankings(&ScaleSettings::default(), SortOrder::Descending).is_err());
        assert!(model.ratings(&ScaleSettings::default()).is_err());
        assert!(model.log_likelihood().is_err());
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_fit_orders_and_normalizes() {
        let h2h = three_way();
        let mut model = BradleyTerry::new(&h2h, FitSettings::default()).unwrap();
        let fit = model.fit().clone();

        assert!((fit.strengths.sum() - 3.0).abs() < 1e-9);
        assert!(fit.convergence.converged);
        let a = h2h.index_of("A").unwrap();
        let b = h2h.index_of("B").unwrap();
        let c = h2h.index_of("C").unwrap();
        assert!(fit.strengths[a] > fit.strengths[b]);
        assert!(fit.strengths[b] > fit.strengths[c]);

        let p_ab = model.predict_by_name("A", "B").unwrap();
        let p_ba = model.predict_by_name("B", "A").unwrap();
        assert!((p_ab + p_ba - 1.0).abs() < 1e-12);
        assert_eq!(
            model.predict_win_probability(a, a),
            Err(RatingError::SelfComparison { index: a })
        );
        assert!(model.log_likelihood().unwrap() < 0.0);
    }

    #[test]
    fn test_no_comparisons_gives_unit_strengths() {
        let fit = fit_wins(&Array2::zeros((4, 4)), &FitSettings::default()).unwrap();
        assert_eq!(fit.strengths, array![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(fit.convergence.comparisons, 0);
    }

    #[test]
    fn test_empty_field() {
        let fit = fit_wins(&Array2::zeros((0, 0)), &FitSettings::default()).unwrap();
        assert!(fit.is_empty());
    }

    #[test]
    fn test_newton_fallback_on_disconnected_competitor() {
        let settings = FitSettings {
            solver: Solver::NewtonRaphson,
            regularization: 0.0,
            ..FitSettings::default()
        };
        let wins = array![[0, 6, 0], [4, 0, 0], [0, 0, 0]];
        let fit = fit_wins(&wins, &settings).unwrap();

        assert!(fit.convergence.fell_back);
        assert!(fit.strengths.iter().all(|s| s.is_finite() && *s > 0.0));
        assert!((fit.strengths.sum() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = FitSettings {
            regularization: -0.5,
            ..FitSettings::default()
        };
        assert!(fit_wins(&Array2::zeros((2, 2)), &settings).is_err());

        let h2h = three_way();
        assert!(BradleyTerry::new(&h2h, settings).is_err());
    }

    #[test]
    fn test_fit_bootstrap_leaves_store_untouched() {
        let h2h = three_way();
        let before = h2h.snapshot();
        let mut model = BradleyTerry::new(&h2h, FitSettings::default()).unwrap();
        let settings = BootstrapSettings {
            iterations: 10,
            ..BootstrapSettings::default()
        };
        let result = model.fit_bootstrap(&settings).unwrap();

        assert_eq!(h2h.matrices(), &before);
        assert_eq!(model.fit_result().unwrap(), &result.point);
        let rows = model
            .rankings_with_uncertainty(&result, &ScaleSettings::default(), SortOrder::Descending)
            .unwrap();
        assert_eq!(rows[0].name, "A");
        assert!(rows.iter().all(|r| r.rating_uncertainty.is_some()));
    }
}
