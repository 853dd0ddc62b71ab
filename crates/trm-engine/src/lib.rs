//! # TRM Engine
//!
//! Runs classification strategies over an inventory, scores risk and
//! derives the metrics, filters and export bundles built on top of them.

pub mod dataset;
pub mod metrics;
pub mod orchestration;
pub mod risk;

pub use dataset::*;
pub use metrics::*;
pub use orchestration::*;
pub use risk::*;

use trm_core::Strategy;

/// Engine operation result type
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No classifier registered for strategy '{0}'")]
    StrategyUnavailable(Strategy),

    #[error("Record {index} has no product name")]
    MissingProductName { index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
