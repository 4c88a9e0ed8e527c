use std::path::Path;

use anyhow::Context as _;
use thiserror::Error;

/// Errors raised by the rating core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RatingError {
    /// An operation that needs fitted strengths was called before `fit`
    #[error("{operation} requires a fitted model, call fit first")]
    NotFitted { operation: &'static str },

    #[error("Unknown competitor: {0}")]
    UnknownCompetitor(String),

    #[error("Competitor index {index} out of range for {len} competitors")]
    IndexOutOfRange { index: usize, len: usize },

    /// Win probability of a competitor against itself is undefined
    #[error("Win probability of competitor {index} against itself is undefined")]
    SelfComparison { index: usize },

    #[error("Invalid setting `{field}`: {reason}")]
    InvalidSettings { field: &'static str, reason: String },

    #[error("Dimension mismatch in {stage}: expected {expected}, got {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type RatingResult<T> = Result<T, RatingError>;

/// Add context to file read errors
pub fn read_context(path: &Path) -> String {
    format!("Failed to read {}", path.display())
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Add context to a failed pipeline stage
pub fn stage_context(stage: &str) -> String {
    format!("Failed during {}", stage)
}

/// Wrap result with read context
pub fn with_read_context<T, E>(result: Result<T, E>, path: &Path) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(read_context(path))
}

/// Wrap result with parse context
pub fn with_parse_context<T, E>(result: Result<T, E>, data_type: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(parse_context(data_type))
}

/// Wrap result with stage context
pub fn with_stage_context<T, E>(result: Result<T, E>, stage: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(stage_context(stage))
}
