use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::errors::{RatingError, RatingResult, with_parse_context, with_read_context};
use crate::rating::ResampleMode;
use crate::rating::solvers::Solver;
use crate::rating::weighting::Weighting;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuasiNewtonSettings {
    pub max_iterations: usize,
    /// Curvature pairs kept by L-BFGS
    pub history: usize,
    pub gradient_tolerance: f64,
    pub objective_tolerance: f64,
}

impl Default for QuasiNewtonSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            history: 10,
            gradient_tolerance: 1e-5,
            objective_tolerance: 2.220446049250313e-9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradientDescentSettings {
    pub learning_rate: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for GradientDescentSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            max_iterations: 1000,
            tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewtonSettings {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// Everything one maximum-likelihood fit needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitSettings {
    #[serde(alias = "method")]
    pub solver: Solver,
    /// Ridge strength λ in `½·λ·‖θ‖²`
    pub regularization: f64,
    /// Matchups with fewer decisive games are left out of the fit
    pub min_matchup_games: u32,
    pub weighting: Weighting,
    pub quasi_newton: QuasiNewtonSettings,
    pub gradient_descent: GradientDescentSettings,
    pub newton: NewtonSettings,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            solver: Solver::default(),
            regularization: 0.01,
            min_matchup_games: 0,
            weighting: Weighting::default(),
            quasi_newton: QuasiNewtonSettings::default(),
            gradient_descent: GradientDescentSettings::default(),
            newton: NewtonSettings::default(),
        }
    }
}

impl FitSettings {
    pub fn validate(&self) -> RatingResult<()> {
        if !(self.regularization >= 0.0 && self.regularization.is_finite()) {
            return Err(invalid("regularization", "must be a finite value >= 0"));
        }
        if let Weighting::Cap { max_games: 0 } = self.weighting {
            return Err(invalid("weighting.cap.max_games", "must be at least 1"));
        }
        if !(self.gradient_descent.learning_rate > 0.0) {
            return Err(invalid("gradient_descent.learning_rate", "must be > 0"));
        }
        if !(self.gradient_descent.tolerance > 0.0) {
            return Err(invalid("gradient_descent.tolerance", "must be > 0"));
        }
        if !(self.newton.tolerance > 0.0) {
            return Err(invalid("newton.tolerance", "must be > 0"));
        }
        if self.quasi_newton.history == 0 {
            return Err(invalid("quasi_newton.history", "must be at least 1"));
        }
        if !(self.quasi_newton.gradient_tolerance > 0.0) {
            return Err(invalid("quasi_newton.gradient_tolerance", "must be > 0"));
        }
        if self.quasi_newton.objective_tolerance < 0.0 {
            return Err(invalid("quasi_newton.objective_tolerance", "must be >= 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapSettings {
    pub iterations: usize,
    pub mode: ResampleMode,
    /// Share of each matchup's games drawn in subsample mode
    pub fraction: f64,
    /// Iteration `b` is seeded with `seed_offset + b`
    pub seed_offset: u64,
    pub parallel: bool,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            iterations: 100,
            mode: ResampleMode::default(),
            fraction: 1.0,
            seed_offset: 0,
            parallel: false,
        }
    }
}

impl BootstrapSettings {
    pub fn validate(&self) -> RatingResult<()> {
        if self.iterations == 0 {
            return Err(invalid("bootstrap.iterations", "must be at least 1"));
        }
        if !(self.fraction > 0.0 && self.fraction <= 1.0) {
            return Err(invalid("bootstrap.fraction", "must be in (0, 1]"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleSettings {
    pub center: f64,
    /// Rating points per factor of ten in strength
    pub scale: f64,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            center: 1500.0,
            scale: 400.0,
        }
    }
}

impl ScaleSettings {
    pub fn validate(&self) -> RatingResult<()> {
        if !self.center.is_finite() {
            return Err(invalid("scale.center", "must be finite"));
        }
        if self.scale == 0.0 || !self.scale.is_finite() {
            return Err(invalid("scale.scale", "must be finite and non-zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Competitors with fewer recorded games are not loaded
    pub min_games: u32,
    pub fit: FitSettings,
    pub bootstrap: BootstrapSettings,
    pub scale: ScaleSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            min_games: 10,
            fit: FitSettings::default(),
            bootstrap: BootstrapSettings::default(),
            scale: ScaleSettings::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = with_parse_context(serde_json::from_str(json), "settings")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = with_read_context(std::fs::read_to_string(path), path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> RatingResult<()> {
        self.fit.validate()?;
        self.bootstrap.validate()?;
        self.scale.validate()
    }
}

fn invalid(field: &'static str, reason: &str) -> RatingError {
    RatingError::InvalidSettings {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.min_games, 10);
        assert_eq!(config.fit.regularization, 0.01);
        assert_eq!(config.fit.solver, Solver::QuasiNewton);
        assert_eq!(config.fit.gradient_descent.learning_rate, 0.001);
        assert_eq!(config.fit.newton.max_iterations, 100);
        assert_eq!(config.bootstrap.iterations, 100);
        assert_eq!(config.scale.center, 1500.0);
        assert_eq!(config.scale.scale, 400.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_json_str(
            r#"{"min_games": 50, "fit": {"method": "newton", "weighting": {"cap": {"max_games": 30}}}}"#,
        )
        .unwrap();
        assert_eq!(config.min_games, 50);
        assert_eq!(config.fit.solver, Solver::NewtonRaphson);
        assert_eq!(config.fit.weighting, Weighting::Cap { max_games: 30 });
        assert_eq!(config.fit.regularization, 0.01);
        assert_eq!(config.bootstrap, BootstrapSettings::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(AppConfig::from_json_str(r#"{"min_gams": 5}"#).is_err());
        assert!(AppConfig::from_json_str(r#"{"fit": {"lamda": 0.1}}"#).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_json_str(r#"{"bootstrap": {"fraction": 0.0}}"#).unwrap_err();
        assert!(err.to_string().contains("bootstrap.fraction"));

        let mut config = AppConfig::new();
        config.fit.regularization = -1.0;
        assert!(matches!(
            config.validate(),
            Err(RatingError::InvalidSettings {
                field: "regularization",
                ..
            })
        ));

        config = AppConfig::new();
        config.scale.scale = 0.0;
        assert!(config.validate().is_err());

        config = AppConfig::new();
        config.bootstrap.iterations = 0;
        assert!(config.validate().is_err());

        config = AppConfig::new();
        config.fit.weighting = Weighting::Cap { max_games: 0 };
        assert!(config.validate().is_err());
    }
}
