//! Script model, parsing and validation
//!
//! This module turns Taskrfile text into a `Script` and offers optional
//! static checks over the result.

pub mod parse;
pub mod types;
pub mod validate;

// Re-export main types
pub use parse::*;
pub use types::*;
pub use validate::*;
