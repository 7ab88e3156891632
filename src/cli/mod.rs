//! CLI interface and argument parsing
//!
//! This module handles command-line parsing and drives the executor for
//! each requested task.

pub mod app;

// Re-export main types
pub use app::*;
