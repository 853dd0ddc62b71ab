//! # TRM Core
//!
//! Technology reference model taxonomy and the software inventory record
//! model shared by every classifier and by the risk engine.

pub mod model;
pub mod taxonomy;

pub use model::*;
pub use taxonomy::*;
