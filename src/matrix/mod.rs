pub mod keys;
pub mod store;
pub mod summary;

pub use keys::normalize_key;
pub use store::{Competitor, HeadToHead, Matrices, MatrixKind};
pub use summary::MatrixSummary;
