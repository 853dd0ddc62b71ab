//! # TRM - Technology Reference Model inventory classification
//!
//! TRM places software inventory records into a fixed taxonomy of technology
//! domains and flags each record with a risk level. Two classification
//! strategies share one contract: every record ends up with a
//! taxonomy-valid `(domain, subdomain)` pair.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trm::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let taxonomy = Arc::new(Taxonomy::standard());
//!     let engine = ClassificationEngine::new(taxonomy, ModelSettings::from_env());
//!
//!     let mut records = load_records("inventory.json")?;
//!     engine.process(&mut records, &[Strategy::RuleBased]).await?;
//!
//!     let metrics = aggregate(&records);
//!     println!("{} of {} records are high risk", metrics.count(RiskLevel::HighRisk), metrics.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`trm-core`**: taxonomy, software records and label types
//! - **`trm-rules`**: classifier trait, registry and keyword rules
//! - **`trm-llm`**: completion client and the model classifier with rule fallback
//! - **`trm-engine`**: orchestration, risk scoring, metrics, filtering and export
//! - **`trm-cli`**: the `trm` command-line tool
//!
//! ## Feature Flags
//!
//! - `full` (default): all crates
//! - `core`, `rules`, `llm`, `engine`, `cli`: each layer with the layers below it

#[cfg(feature = "trm-core")]
pub use trm_core as core;

#[cfg(feature = "trm-rules")]
pub use trm_rules as rules;

#[cfg(feature = "trm-llm")]
pub use trm_llm as llm;

#[cfg(feature = "trm-engine")]
pub use trm_engine as engine;

#[cfg(feature = "trm-cli")]
pub use trm_cli as cli;

// Convenience re-exports for common types (feature-gated)
#[cfg(feature = "trm-core")]
pub use trm_core::{Classification, LifecycleStatus, RiskLevel, SoftwareRecord, Strategy, Taxonomy};

#[cfg(feature = "trm-rules")]
pub use trm_rules::{Classifier, ClassifierRegistry, RuleClassifier};

#[cfg(feature = "trm-llm")]
pub use trm_llm::{CompletionClient, ModelClassifier, ModelSettings};

#[cfg(feature = "trm-engine")]
pub use trm_engine::{aggregate, flag_risk, ClassificationEngine, EngineError, RiskMetrics};

// Commonly used external dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;

/// Prelude module for convenient imports
///
/// ```rust
/// use trm::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "trm-core")]
    pub use trm_core::*;

    #[cfg(feature = "trm-rules")]
    pub use trm_rules::{ClassificationInput, Classifier, ClassifierRegistry, RuleClassifier};

    #[cfg(feature = "trm-llm")]
    pub use trm_llm::{CompletionClient, CompletionRequest, ModelClassifier, ModelSettings};

    #[cfg(feature = "trm-engine")]
    pub use trm_engine::*;

    pub use anyhow::Result;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
}

/// Current version of TRM
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version and enabled layers as plain data
pub fn system_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "modules": {
            "core": cfg!(feature = "trm-core"),
            "rules": cfg!(feature = "trm-rules"),
            "llm": cfg!(feature = "trm-llm"),
            "engine": cfg!(feature = "trm-engine"),
            "cli": cfg!(feature = "trm-cli")
        }
    })
}
