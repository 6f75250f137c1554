//! Inline directive parsing for `# impsort:` comments
//!
//! Supports in-file configuration overrides via special comments:
//! `# impsort: --atomic --line-length 100 --force-single-line`

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::config::Config;

/// Pattern to match impsort directives
static IMPSORT_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^\s*#\s*impsort:\s*(.*?)\s*$")
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("Invalid directive pattern: {e}"))
});

/// Parsed directive options that can override config
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveOverrides {
    pub atomic: Option<bool>,
    pub line_length: Option<usize>,
    pub force_single_line: Option<bool>,
    pub ignore_whitespace: Option<bool>,
}

impl DirectiveOverrides {
    /// Check if any overrides are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atomic.is_none()
            && self.line_length.is_none()
            && self.force_single_line.is_none()
            && self.ignore_whitespace.is_none()
    }

    /// Write the overrides into `config`
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(v) = self.atomic {
            config.atomic = v;
        }
        if let Some(v) = self.line_length {
            config.line_length = v;
        }
        if let Some(v) = self.force_single_line {
            config.force_single_line = v;
        }
        if let Some(v) = self.ignore_whitespace {
            config.ignore_whitespace = v;
        }
    }
}

/// Check if a line contains an impsort directive
#[must_use]
pub fn is_directive_line(line: &str) -> bool {
    IMPSORT_DIRECTIVE_RE.is_match(line)
}

/// Parse an impsort directive line and return option overrides
///
/// # Returns
/// * `Some(DirectiveOverrides)` if the line is a directive with known options
/// * `None` otherwise
#[must_use]
pub fn parse_directive(line: &str) -> Option<DirectiveOverrides> {
    let caps = IMPSORT_DIRECTIVE_RE.captures(line)?;
    let args_str = caps.get(1)?.as_str();
    parse_directive_args(args_str)
}

/// Parse directive arguments into overrides
fn parse_directive_args(args_str: &str) -> Option<DirectiveOverrides> {
    let mut overrides = DirectiveOverrides::default();
    let mut tokens = args_str.split_whitespace();

    while let Some(token) = tokens.next() {
        match token {
            "-a" | "--atomic" => overrides.atomic = Some(true),
            "--no-atomic" => overrides.atomic = Some(false),
            "-l" | "--line-length" => {
                overrides.line_length = tokens.next().and_then(|v| v.parse().ok());
            }
            "--force-single-line" => overrides.force_single_line = Some(true),
            "--ignore-whitespace" => overrides.ignore_whitespace = Some(true),
            _ => {
                // Unknown option, skip
            }
        }
    }

    if overrides.is_empty() {
        None
    } else {
        Some(overrides)
    }
}

/// Scan content for impsort directives and return the first found
///
/// Only the first directive line is used (subsequent ones are ignored).
#[must_use]
pub fn find_directive(content: &str) -> Option<DirectiveOverrides> {
    content
        .lines()
        .find(|line| is_directive_line(line))
        .and_then(parse_directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_directive_line() {
        assert!(is_directive_line("# impsort: --atomic"));
        assert!(is_directive_line("    #impsort: -l 100"));
        assert!(is_directive_line("# IMPSORT: --atomic"));
        assert!(!is_directive_line("# this is a regular comment"));
        assert!(!is_directive_line("x = 1  # impsort: --atomic"));
    }

    #[test]
    fn test_parse_directive_line_length() {
        let overrides = parse_directive("# impsort: -l 100").unwrap();
        assert_eq!(overrides.line_length, Some(100));
        assert_eq!(overrides.atomic, None);
    }

    #[test]
    fn test_parse_directive_multiple() {
        let overrides =
            parse_directive("# impsort: --atomic --line-length 120 --force-single-line").unwrap();
        assert_eq!(overrides.atomic, Some(true));
        assert_eq!(overrides.line_length, Some(120));
        assert_eq!(overrides.force_single_line, Some(true));
    }

    #[test]
    fn test_parse_invalid_directive() {
        assert!(parse_directive("# impsort:").is_none());
        assert!(parse_directive("# impsort: --unknown").is_none());
    }

    #[test]
    fn test_find_directive_uses_first() {
        let content = "import os\n# impsort: --no-atomic\n# impsort: --atomic\n";
        let overrides = find_directive(content).unwrap();
        assert_eq!(overrides.atomic, Some(false));
    }

    #[test]
    fn test_find_directive_none() {
        assert!(find_directive("import os\n# plain\n").is_none());
    }

    #[test]
    fn test_apply_to_config() {
        let mut config = Config::default();
        let overrides = parse_directive("# impsort: --atomic -l 40 --ignore-whitespace").unwrap();
        overrides.apply_to(&mut config);
        assert!(config.atomic);
        assert!(config.ignore_whitespace);
        assert_eq!(config.line_length, 40);
        assert!(!config.force_single_line);
    }
}
