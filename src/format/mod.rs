//! Text helpers shared by sorting and checking.
//!
//! - [`whitespace`]: Line separator inference and whitespace-insensitive comparison
//! - [`diff`]: Unified diff between original and sorted content

pub mod diff;
pub mod whitespace;

pub use diff::{unified_diff, PASSED_IN_CONTENT};
pub use whitespace::{infer_line_separator, line_separator, remove_whitespace};
