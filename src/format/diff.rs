//! Unified diff rendering between original and sorted content

use std::path::Path;

use similar::TextDiff;

/// Lines of context around each hunk
const CONTEXT_RADIUS: usize = 3;

/// Source name used when the content did not come from a file
pub const PASSED_IN_CONTENT: &str = "Passed in content";

/// Render a unified diff from `original` to `formatted`
///
/// The sides are labelled `<name>:before` and `<name>:after`. Returns an
/// empty string when both texts are identical.
#[must_use]
pub fn unified_diff(original: &str, formatted: &str, file_path: Option<&Path>) -> String {
    if original == formatted {
        return String::new();
    }

    let name = file_path.map_or_else(
        || PASSED_IN_CONTENT.to_string(),
        |p| p.display().to_string(),
    );
    let before = format!("{name}:before");
    let after = format!("{name}:after");

    let diff = TextDiff::from_lines(original, formatted);
    diff.unified_diff()
        .context_radius(CONTEXT_RADIUS)
        .header(&before, &after)
        .to_string()
}
