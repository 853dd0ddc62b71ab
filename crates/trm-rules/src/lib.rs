//! # TRM Rules
//!
//! Classifier trait shared by every classification strategy, a registry to
//! select classifiers per strategy, and the deterministic keyword classifier.

pub mod keyword;
pub mod traits;

pub use keyword::*;
pub use traits::*;
