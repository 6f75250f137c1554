//! Check mode: report whether content is already sorted, never modify it

use std::io::{self, Write};
use std::path::Path;

use super::pipeline::{sort_imports, source_name};
use crate::config::Config;
use crate::error::SortError;
use crate::format::{line_separator, remove_whitespace, unified_diff};

/// Whether `original` and `sorted` are equal for check purposes
fn is_equivalent(original: &str, sorted: &str, config: &Config) -> bool {
    if config.ignore_whitespace {
        let separator = line_separator(config.line_ending.as_deref(), original);
        let left = remove_whitespace(original, separator);
        let right = remove_whitespace(sorted, separator);
        left.trim() == right.trim()
    } else {
        original.trim() == sorted.trim()
    }
}

/// Check whether the imports of `content` are sorted, reporting on stdout
///
/// Returns `Ok(true)` when sorting would not change the content.
/// Skip and syntax errors from sorting are propagated, not turned into `false`;
/// `disregard_skip` checks the content even when it would be skipped.
pub fn check_imports(
    content: &str,
    extension: &str,
    config: &Config,
    file_path: Option<&Path>,
    show_diff: bool,
    disregard_skip: bool,
) -> Result<bool, SortError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    check_imports_to(
        content,
        extension,
        config,
        file_path,
        show_diff,
        disregard_skip,
        &mut out,
    )
}

/// [`check_imports`] writing its report to `out`
pub fn check_imports_to<W: Write>(
    content: &str,
    extension: &str,
    config: &Config,
    file_path: Option<&Path>,
    show_diff: bool,
    disregard_skip: bool,
    out: &mut W,
) -> Result<bool, SortError> {
    let sorted = sort_imports(content, extension, config, file_path, disregard_skip)?;
    let name = source_name(file_path);

    if is_equivalent(content, &sorted, config) {
        if config.verbose {
            writeln!(out, "SUCCESS: {name} Everything Looks Good!")?;
        }
        return Ok(true);
    }

    writeln!(out, "ERROR: {name} Imports are incorrectly sorted.")?;
    if show_diff {
        write!(out, "{}", unified_diff(content, &sorted, file_path))?;
    }
    Ok(false)
}
