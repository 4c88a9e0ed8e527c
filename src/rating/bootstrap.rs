use log::{debug, info};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::bradley_terry::fit_validated;
use super::scale::{self, RatingUncertainty};
use super::stats::ColumnSummary;
use super::types::FitResult;
use crate::config::settings::{BootstrapSettings, FitSettings, ScaleSettings};
use crate::errors::{RatingError, RatingResult};
use crate::matrix::Matrices;

/// How each matchup's games are redrawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMode {
    /// Draw as many games as were played, with replacement
    #[default]
    Resample,
    /// Draw a fraction of the games without replacement
    Subsample,
}

impl ResampleMode {
    pub fn as_str(&self) -> &str {
        match self {
            ResampleMode::Resample => "resample",
            ResampleMode::Subsample => "subsample",
        }
    }
}

/// Redraws every ordered matchup's decisive games from `wins`.
///
/// Each direction `(i, j)` is drawn on its own from `wins[i, j]` ones and
/// `wins[j, i]` zeros. The synthetic `games[i, j]` is the sample size.
pub fn sample_matrices(wins: &Array2<u32>, mode: ResampleMode, fraction: f64, seed: u64) -> Matrices {
    let n = wins.nrows();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sample = Matrices::zeros(n);

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let ones = wins[[i, j]] as usize;
            let total = ones + wins[[j, i]] as usize;
            if total == 0 {
                continue;
            }

            let (drawn_ones, drawn) = match mode {
                ResampleMode::Resample => {
                    let hits = (0..total).filter(|_| rng.gen_range(0..total) < ones).count();
                    (hits, total)
                }
                ResampleMode::Subsample => {
                    let size = subsample_size(total, fraction);
                    let picked = rand::seq::index::sample(&mut rng, total, size);
                    (picked.iter().filter(|&k| k < ones).count(), size)
                }
            };

            sample.wins[[i, j]] = drawn_ones as u32;
            sample.games[[i, j]] = drawn as u32;
        }
    }
    sample
}

fn subsample_size(total: usize, fraction: f64) -> usize {
    let size = (total as f64 * fraction).round_ties_even() as usize;
    size.clamp(1, total)
}

/// Bootstrap draws plus their per-competitor summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapResult {
    pub mode: ResampleMode,
    /// Draws × competitors
    pub strength_samples: Array2<f64>,
    pub log_strength_samples: Array2<f64>,
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
    pub ci_lower: Array1<f64>,
    pub ci_upper: Array1<f64>,
    /// Competitors whose strength never moved across draws
    pub zero_variance: Vec<bool>,
    /// Fit on the observed matrices
    pub point: FitResult,
}

impl BootstrapResult {
    pub fn iterations(&self) -> usize {
        self.strength_samples.nrows()
    }

    pub fn len(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Every draw converted to ratings, summarized per competitor
    pub fn rating_uncertainty(&self, scale: &ScaleSettings) -> RatingResult<RatingUncertainty> {
        scale::bootstrap_rating_uncertainty(&self.strength_samples, &self.point.strengths, scale)
    }

    /// Rating std from the delta method around the point strengths
    pub fn delta_rating_std(&self, scale: &ScaleSettings) -> RatingResult<Array1<f64>> {
        scale::delta_method_std(&self.point.strengths, &self.std, scale)
    }
}

/// Refits on `settings.iterations` redrawn copies of `matrices`, then
/// once on `matrices` themselves for the point estimate.
///
/// `matrices` is only read; each draw works on its own snapshot.
pub fn run_bootstrap(
    matrices: &Matrices,
    fit: &FitSettings,
    settings: &BootstrapSettings,
) -> RatingResult<BootstrapResult> {
    fit.validate()?;
    settings.validate()?;
    check_square(&matrices.wins)?;

    let n = matrices.len();
    info!(
        "Bootstrap: {} {} draws over {} competitors ({})",
        settings.iterations,
        settings.mode.as_str(),
        n,
        fit.solver.as_str()
    );

    let draws: Vec<FitResult> = if settings.parallel {
        (0..settings.iterations)
            .into_par_iter()
            .map(|b| fit_draw(matrices, fit, settings, b))
            .collect()
    } else {
        (0..settings.iterations)
            .map(|b| {
                if (b + 1) % 10 == 0 {
                    info!("  Bootstrap sample {}/{}", b + 1, settings.iterations);
                }
                fit_draw(matrices, fit, settings, b)
            })
            .collect()
    };

    let mut strength_samples = Array2::zeros((settings.iterations, n));
    let mut log_strength_samples = Array2::zeros((settings.iterations, n));
    for (b, draw) in draws.iter().enumerate() {
        strength_samples.row_mut(b).assign(&draw.strengths);
        log_strength_samples.row_mut(b).assign(&draw.log_strengths);
    }

    info!("  Fitting on full data");
    let point = fit_validated(&matrices.wins, fit);

    let summary = ColumnSummary::from_samples(&strength_samples);
    let zero_variance = summary.constant.clone();
    let degenerate = zero_variance.iter().filter(|&&z| z).count();
    if degenerate > 0 {
        debug!("{} competitors have zero bootstrap variance", degenerate);
    }

    Ok(BootstrapResult {
        mode: settings.mode,
        strength_samples,
        log_strength_samples,
        mean: summary.mean,
        std: summary.std,
        ci_lower: summary.ci_lower,
        ci_upper: summary.ci_upper,
        zero_variance,
        point,
    })
}

fn fit_draw(matrices: &Matrices, fit: &FitSettings, settings: &BootstrapSettings, b: usize) -> FitResult {
    let seed = settings.seed_offset.wrapping_add(b as u64);
    let sample = sample_matrices(&matrices.wins, settings.mode, settings.fraction, seed);
    fit_validated(&sample.wins, fit)
}

fn check_square(wins: &Array2<u32>) -> RatingResult<()> {
    if wins.nrows() == wins.ncols() {
        Ok(())
    } else {
        Err(RatingError::DimensionMismatch {
            stage: "bootstrap",
            expected: wins.nrows(),
            actual: wins.ncols(),
        })
    }
}
