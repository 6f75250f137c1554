//! Error types and result aliases for impsort.
//!
//! - [`SortError`]: the terminal failure kinds of a single sort/check invocation
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used by the binary and
//!   other glue code that only needs to report errors

use anyhow::Result as AnyhowResult;

pub type Result<T> = AnyhowResult<T>;

/// Reasons a sort or check invocation stops without producing output.
///
/// None of these are retried; they are surfaced to the immediate caller.
#[derive(Debug, thiserror::Error)]
pub enum SortError {
    #[error("{source_name} contains a file skip comment and was skipped")]
    SkippedByComment { source_name: String },

    #[error("{source_name} was skipped due to being listed in the skip settings")]
    SkippedByConfig { source_name: String },

    #[error("{source_name} has syntax errors before sorting; refusing to modify it")]
    PreexistingSyntaxError { source_name: String },

    #[error("sorting imports of {source_name} introduced syntax errors; output discarded")]
    TransformIntroducedSyntaxError { source_name: String },

    #[error("unable to determine the text encoding of {path}")]
    EncodingUndetectable { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SortError {
    /// Whether the file was intentionally excluded rather than failing
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            SortError::SkippedByComment { .. } | SortError::SkippedByConfig { .. }
        )
    }
}
