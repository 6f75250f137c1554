//! Lexical scanning of Python source for import sections.
//!
//! This module provides the line-level machinery used by both sorting modes:
//! - [`LexicalContext`]: Tracks quoted and triple-quoted literals across lines
//! - [`Segmenter`]: Groups a line stream into import [`Section`]s and passthrough lines
//! - [`patterns`]: Import statement prefixes and precompiled regex patterns
//!
//! The scan is deliberately minimal: it distinguishes code from strings and
//! comments and finds statement boundaries, without parsing Python.

pub mod literal;
pub mod patterns;
pub mod segment;

pub use literal::{find_comment, split_comment, LexicalContext, QuoteDelimiter};
pub use segment::{Block, Section, Segmenter, TopBannerState};
