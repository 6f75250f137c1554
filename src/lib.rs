//! impsort - Python import sorter
//!
//! Sorts the import sections of a source file while leaving every other byte
//! untouched. Import-like text inside string literals and comments is never
//! mistaken for code, and re-sorting sorted output is a no-op.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod directive;
pub mod error;
pub mod format;
pub mod parser;
pub mod process;
pub mod sort;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use directive::{find_directive, parse_directive, DirectiveOverrides};
pub use error::{Result, SortError};
pub use format::{unified_diff, PASSED_IN_CONTENT};
pub use process::{
    check_file, check_imports, sort_file, sort_imports, sort_imports_with, sort_stream,
    sort_stream_with, LexicalValidator, SyntaxValidator,
};
pub use sort::{ImportSorter, SortTransform};
