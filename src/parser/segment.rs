/// `Segmenter` - splits a line stream into import sections and passthrough lines
///
/// This module handles:
/// - Tracking string literals across lines so import-like text inside them is ignored
/// - The comment banner at the top of a file (line 1 onwards), which is never sorted
/// - Collecting contiguous import statements, blank lines and comments into a [`Section`]
/// - Parenthesized and backslash-continued import statements spanning several lines
///
/// Only one section is buffered at a time; everything else is handed back line by line.
use std::io::{BufRead, BufReader};

use super::literal::{split_comment, LexicalContext};
use super::patterns::{is_import_start, paren_balance, COMMENT_MARKER};
use crate::config::Config;
use crate::error::SortError;

/// Maximum number of physical lines pulled for one continued import statement.
/// This prevents memory exhaustion from pathological unbalanced input.
const MAX_CONTINUATION_LINES: usize = 10_000;

/// Accumulated run of blank lines, comments and import statements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// The raw text, line terminators included
    pub text: String,
    /// Whether at least one import statement was seen
    pub contains_imports: bool,
}

impl Section {
    fn push(&mut self, line: &str) {
        self.text.push_str(line);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Unit handed back by [`Segmenter::next_block`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A line to be written through unchanged
    Passthrough(String),
    /// A closed section; when it was closed by a code line, that line is its last line
    Section(Section),
}

/// Leading comment block starting at line index 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopBannerState {
    pub in_banner: bool,
    pub banner_start: Option<usize>,
    pub banner_end: Option<usize>,
}

impl TopBannerState {
    fn enter(&mut self, index: usize) {
        self.in_banner = true;
        self.banner_start = Some(index);
    }

    fn leave(&mut self, index: usize) {
        self.in_banner = false;
        self.banner_end = Some(index.saturating_sub(1));
    }
}

/// `Segmenter` reads physical lines from a reader and groups them into blocks
pub struct Segmenter<R: BufRead> {
    reader: R,
    /// Index of the next physical line to be read
    line_index: usize,
    context: LexicalContext,
    banner: TopBannerState,
    /// Heading comments (`# Heading`) that end the top banner
    section_comments: Vec<String>,
}

impl<R: BufRead> Segmenter<R> {
    /// Create a new `Segmenter`
    ///
    /// # Arguments
    /// * `reader` - The underlying reader
    /// * `config` - Provides the import headings that terminate a top banner
    pub fn new(reader: R, config: &Config) -> Self {
        Self {
            reader,
            line_index: 0,
            context: LexicalContext::new(),
            banner: TopBannerState::default(),
            section_comments: config.section_comments(),
        }
    }

    /// Number of physical lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.line_index
    }

    /// State of the top-of-file comment banner
    pub fn banner(&self) -> TopBannerState {
        self.banner
    }

    /// Read the next physical line, terminator included
    fn read_line(&mut self) -> Result<Option<String>, SortError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_index += 1;
        Ok(Some(line))
    }

    fn is_section_comment(&self, line: &str) -> bool {
        let content = line.trim_end_matches(['\n', '\r']);
        self.section_comments.iter().any(|c| c == content)
    }

    /// Update banner and literal state for one line
    ///
    /// Returns true when the line cannot belong to an import section.
    fn track_line(&mut self, line: &str, index: usize) -> bool {
        if index == 1 && line.starts_with(COMMENT_MARKER) {
            self.banner.enter(index);
        } else if self.banner.in_banner
            && (!line.starts_with(COMMENT_MARKER) || self.is_section_comment(line))
        {
            self.banner.leave(index);
        }

        if !self.banner.in_banner && (line.contains('"') || line.contains('\'')) {
            self.context.scan_line(line);
        }

        self.context.in_literal() || self.banner.in_banner
    }

    /// Pull raw lines into `section` while the statement's parentheses stay open
    fn read_parenthesized(
        &mut self,
        first_code: &str,
        section: &mut Section,
    ) -> Result<(), SortError> {
        let mut depth = paren_balance(first_code);
        let mut pulled = 0;
        while depth > 0 && pulled < MAX_CONTINUATION_LINES {
            let Some(next) = self.read_line()? else {
                break;
            };
            depth += paren_balance(next.trim());
            section.push(&next);
            pulled += 1;
        }
        Ok(())
    }

    /// Pull raw lines into `section` while they end with a `\` continuation
    fn read_backslash_continued(&mut self, section: &mut Section) -> Result<(), SortError> {
        let mut pulled = 0;
        while pulled < MAX_CONTINUATION_LINES {
            let Some(next) = self.read_line()? else {
                break;
            };
            section.push(&next);
            pulled += 1;
            if !next.trim().ends_with('\\') {
                break;
            }
        }
        Ok(())
    }

    /// Read the next block
    ///
    /// Returns None at EOF
    pub fn next_block(&mut self) -> Result<Option<Block>, SortError> {
        let mut section = Section::default();

        loop {
            let index = self.line_index;
            let Some(line) = self.read_line()? else {
                return Ok(if section.is_empty() {
                    None
                } else {
                    Some(Block::Section(section))
                });
            };

            if !self.track_line(&line, index) {
                let stripped = line.trim();
                if stripped.is_empty() || stripped.starts_with(COMMENT_MARKER) {
                    section.push(&line);
                    continue;
                }

                if is_import_start(stripped) {
                    section.push(&line);
                    section.contains_imports = true;

                    let (code, _) = split_comment(stripped);
                    let code = code.trim_end();
                    // Parentheses first, then backslashes; both may apply
                    if paren_balance(code) > 0 {
                        self.read_parenthesized(code, &mut section)?;
                    }
                    if code.ends_with('\\') {
                        self.read_backslash_continued(&mut section)?;
                    }
                    continue;
                }
            }

            // Ordinary code, or a line inside a literal or the top banner
            if section.is_empty() {
                return Ok(Some(Block::Passthrough(line)));
            }
            section.push(&line);
            return Ok(Some(Block::Section(section)));
        }
    }
}

/// Helper to create a `Segmenter` from a string (for whole-content sorting and tests)
impl<'a> Segmenter<BufReader<&'a [u8]>> {
    #[must_use]
    pub fn from_string(s: &'a str, config: &Config) -> Self {
        Self::new(BufReader::new(s.as_bytes()), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(input: &str, config: &Config) -> Vec<Block> {
        let mut segmenter = Segmenter::from_string(input, config);
        let mut result = Vec::new();
        while let Some(block) = segmenter.next_block().unwrap() {
            result.push(block);
        }
        result
    }

    fn section(text: &str, contains_imports: bool) -> Block {
        Block::Section(Section {
            text: text.to_string(),
            contains_imports,
        })
    }

    fn pass(text: &str) -> Block {
        Block::Passthrough(text.to_string())
    }

    #[test]
    fn test_imports_then_code() {
        let result = blocks("import b\nimport a\nx = 1\n", &Config::default());
        assert_eq!(result, vec![section("import b\nimport a\nx = 1\n", true)]);
    }

    #[test]
    fn test_code_only_is_passthrough() {
        let result = blocks("x = 1\ny = 2\n", &Config::default());
        assert_eq!(result, vec![pass("x = 1\n"), pass("y = 2\n")]);
    }

    #[test]
    fn test_section_flushed_at_eof() {
        let result = blocks("x = 1\nimport b\nimport a", &Config::default());
        assert_eq!(
            result,
            vec![pass("x = 1\n"), section("import b\nimport a", true)]
        );
    }

    #[test]
    fn test_comment_only_section_has_no_imports() {
        let result = blocks("# one\n\n# two\nx = 1\n", &Config::default());
        assert_eq!(result, vec![section("# one\n\n# two\nx = 1\n", false)]);
    }

    #[test]
    fn test_import_inside_triple_quoted_string() {
        let input = "doc = \"\"\"\nimport b\nimport a\n\"\"\"\n";
        let result = blocks(input, &Config::default());
        assert_eq!(
            result,
            vec![
                pass("doc = \"\"\"\n"),
                pass("import b\n"),
                pass("import a\n"),
                pass("\"\"\"\n"),
            ]
        );
    }

    #[test]
    fn test_literal_opening_closes_section() {
        let input = "import b\nx = '''\nimport a\n'''\n";
        let result = blocks(input, &Config::default());
        assert_eq!(
            result,
            vec![
                section("import b\nx = '''\n", true),
                pass("import a\n"),
                pass("'''\n"),
            ]
        );
    }

    #[test]
    fn test_parenthesized_import() {
        let input = "from x import (\n    b,\n    a,\n)\ny = 1\n";
        let result = blocks(input, &Config::default());
        assert_eq!(result, vec![section(input, true)]);
    }

    #[test]
    fn test_parenthesized_import_comment_ignored_on_first_line() {
        // The `(` inside the comment must not start a continuation
        let input = "import a  # see (docs\nx = 1\n";
        let result = blocks(input, &Config::default());
        assert_eq!(result, vec![section(input, true)]);
    }

    #[test]
    fn test_unterminated_parenthesis_stops_at_eof() {
        let input = "from x import (\n    a,\n";
        let result = blocks(input, &Config::default());
        assert_eq!(result, vec![section(input, true)]);
    }

    #[test]
    fn test_backslash_continuation() {
        let input = "from x import a, \\\n    b, \\\n    c\nz = 1\n";
        let result = blocks(input, &Config::default());
        assert_eq!(result, vec![section(input, true)]);
    }

    #[test]
    fn test_parenthesis_then_backslash_continuation() {
        // `(` is balanced on the next line, then the trailing `\` pulls one more
        let input = "from x import (a, \\\n    b)\ny = 1\nimport c\nz = 2\n";
        let result = blocks(input, &Config::default());
        // `y = 1` is part of the statement, so `import c` stays in the same section
        assert_eq!(result, vec![section(input, true)]);

        let input = "from x import (a, \\\n    b)\n";
        let mut segmenter = Segmenter::from_string(input, &Config::default());
        assert_eq!(segmenter.next_block().unwrap(), Some(section(input, true)));
        assert_eq!(segmenter.lines_read(), 2);
    }

    #[test]
    fn test_line_ending_banner_is_scanned_for_literals() {
        // The line that closes the banner may open a literal
        let input = concat!(
            "#!/usr/bin/env python\n",
            "# Copyright\n",
            "doc = \"\"\"\n",
            "import b\n",
            "import a\n",
            "\"\"\"\n",
        );
        let result = blocks(input, &Config::default());
        assert_eq!(
            result,
            vec![
                section("#!/usr/bin/env python\n# Copyright\n", false),
                pass("doc = \"\"\"\n"),
                pass("import b\n"),
                pass("import a\n"),
                pass("\"\"\"\n"),
            ]
        );
    }

    #[test]
    fn test_top_banner_is_passthrough() {
        let input = "#!/usr/bin/env python\n# Copyright\n# License\nimport b\nimport a\n";
        let mut segmenter = Segmenter::from_string(input, &Config::default());
        assert_eq!(
            segmenter.next_block().unwrap(),
            Some(section("#!/usr/bin/env python\n# Copyright\n", false))
        );
        assert!(segmenter.banner().in_banner);
        assert_eq!(segmenter.next_block().unwrap(), Some(pass("# License\n")));
        assert_eq!(
            segmenter.next_block().unwrap(),
            Some(section("import b\nimport a\n", true))
        );
        let banner = segmenter.banner();
        assert!(!banner.in_banner);
        assert_eq!(banner.banner_start, Some(1));
        assert_eq!(banner.banner_end, Some(2));
        assert_eq!(segmenter.lines_read(), 5);
    }

    #[test]
    fn test_banner_needs_comment_on_line_one() {
        let input = "import b\nx = 1\n# comment\nimport a\n";
        let mut segmenter = Segmenter::from_string(input, &Config::default());
        while segmenter.next_block().unwrap().is_some() {}
        assert_eq!(segmenter.banner().banner_start, None);
    }

    #[test]
    fn test_banner_ends_at_heading_comment() {
        let mut config = Config::default();
        config
            .import_headings
            .insert("stdlib".to_string(), "Standard Library".to_string());
        let input = "\n# License\n# Standard Library\nimport os\n";
        let mut segmenter = Segmenter::from_string(input, &config);
        assert_eq!(
            segmenter.next_block().unwrap(),
            Some(section("\n# License\n", false))
        );
        assert_eq!(
            segmenter.next_block().unwrap(),
            Some(section("# Standard Library\nimport os\n", true))
        );
        assert_eq!(segmenter.banner().banner_end, Some(1));
    }

    #[test]
    fn test_continuation_lines_count_as_physical_lines() {
        // Line index 1 is pulled as a continuation, so line 2 cannot open a banner
        let input = "from x import (\n    a)\n# comment\nimport b\n";
        let mut segmenter = Segmenter::from_string(input, &Config::default());
        let block = segmenter.next_block().unwrap().unwrap();
        assert_eq!(block, section(input, true));
        assert!(!segmenter.banner().in_banner);
        assert_eq!(segmenter.banner().banner_start, None);
    }

    #[test]
    fn test_import_like_string_line_is_code() {
        let input = "s = \"import b\\nimport a\"\n";
        let result = blocks(input, &Config::default());
        assert_eq!(result, vec![pass(input)]);
    }

    #[test]
    fn test_indented_imports() {
        let input = "try:\n    import b\n    import a\nexcept ImportError:\n    pass\n";
        let result = blocks(input, &Config::default());
        assert_eq!(
            result,
            vec![
                pass("try:\n"),
                section("    import b\n    import a\nexcept ImportError:\n", true),
                pass("    pass\n"),
            ]
        );
    }
}
