pub mod models;

pub use models::{CompetitorRecord, ExportRecord, MatchRecord};
