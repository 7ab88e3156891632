//! Task execution engine
//!
//! This module handles the execution of tasks: variable resolution, command
//! side effects and recursive task invocation.

pub mod command;
pub mod context;
pub mod executor;
pub mod interpolate;
pub mod result;

// Re-export main types
pub use command::*;
pub use context::*;
pub use executor::*;
pub use interpolate::*;
pub use result::*;
