//! Line separator inference and whitespace normalization

/// Guess the line separator used by `content`
///
/// `\r\n` wins over a bare `\r`, which wins over `\n` (also the default).
#[must_use]
pub fn infer_line_separator(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else if content.contains('\r') {
        "\r"
    } else {
        "\n"
    }
}

/// Separator from the config if set, inferred from `content` otherwise
#[must_use]
pub fn line_separator<'a>(configured: Option<&'a str>, content: &str) -> &'a str {
    configured.unwrap_or_else(|| infer_line_separator(content))
}

/// Remove every line separator and whitespace character from `content`
///
/// Two texts that differ only in blank lines, indentation or line-ending
/// style compare equal after this.
#[must_use]
pub fn remove_whitespace(content: &str, line_separator: &str) -> String {
    content
        .replace(line_separator, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
