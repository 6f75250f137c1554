//! Sorting orchestration.
//!
//! This module ties segmentation and sorting together:
//!
//! **Whole-content mode** ([`sort_imports`]):
//! - Honour the file skip comment and the path skip settings
//! - In atomic mode, validate the syntax before and after sorting
//! - Segment the content and sort every import section
//!
//! **Streaming mode** ([`sort_stream`]):
//! - Same segmentation and sorting, one section buffered at a time
//! - No skip or syntax checks
//!
//! [`check_imports`] compares content with its sorted form without
//! modifying it, and the file façade ([`sort_file`], [`check_file`]) adds
//! path-scoped configuration and text decoding on top.

pub mod check;
pub mod file;
pub mod pipeline;
pub mod syntax;

pub use check::{check_imports, check_imports_to};
pub use file::{
    check_file, check_file_with_config, sort_file, sort_file_with_config, SortedFile, SourceFile,
};
pub use pipeline::{sort_imports, sort_imports_with, sort_stream, sort_stream_with};
pub use syntax::{is_valid_syntax, LexicalValidator, SyntaxValidator};
