//! # TRM CLI Library
//!
//! Batch commands for classifying, scoring and filtering a software
//! inventory, plus an interactive shell that keeps the loaded dataset
//! between commands.

pub mod commands;
pub mod interactive;

pub use commands::*;
pub use interactive::*;
