//! Sorting of a single import section.
//!
//! The [`SortTransform`] trait is the boundary between segmentation and the
//! actual ordering of imports: it receives the raw text of one section and
//! returns its replacement. [`ImportSorter`] is the default implementation.
//!
//! Contract for implementors: the section may start with blank/comment lines
//! and may end with one non-import line that closed it; text outside the
//! import statements must be reproduced unchanged, and sorting already
//! sorted text must be a no-op.

pub mod imports;
pub mod statement;

use crate::config::Config;

pub use imports::ImportSorter;
pub use statement::{ImportKind, ImportStatement};

/// Replaces the text of an import section with its sorted form
pub trait SortTransform {
    fn sort_section(&self, section: &str, config: &Config, extension: &str) -> String;
}

impl<F> SortTransform for F
where
    F: Fn(&str, &Config, &str) -> String,
{
    fn sort_section(&self, section: &str, config: &Config, extension: &str) -> String {
        self(section, config, extension)
    }
}
