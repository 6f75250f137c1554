//! Regex patterns and prefixes for Python import statements
//!
//! All patterns are compiled once at first use via `LazyLock`.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. All patterns in this module are
/// constants covered by the tests below.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

/// Prefixes (of the trimmed line) that start an import statement
pub const IMPORT_PREFIXES: &[&str] = &["from ", "from.import", "import ", "import*"];

/// Comment marker
pub const COMMENT_MARKER: char = '#';

/// `import a, b.c as d`
pub static STRAIGHT_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^import\s*(?P<names>.+?)\s*$"));

/// `from .pkg import a, b` (also `from.import a`)
pub static FROM_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^from\s*(?P<module>\S+?)\s*import\b\s*(?P<names>.*?)\s*$"));

/// `name` or `name as alias`, dotted names allowed
pub static IMPORT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^(?P<name>\*|[\w.]+)(?:\s+as\s+(?P<alias>\w+))?$")
});

/// Whether a trimmed line starts an import statement
#[must_use]
pub fn is_import_start(trimmed: &str) -> bool {
    IMPORT_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

/// Open minus close parentheses
#[must_use]
pub fn paren_balance(text: &str) -> isize {
    text.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}
