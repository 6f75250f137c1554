//! `LexicalContext` - tracks whether a scan is inside a string literal
//!
//! Python literals may be delimited by `'`, `"`, `'''` or `"""`. Triple-quoted
//! literals (and, leniently, single-quoted ones) can span several physical
//! lines, so the context is carried from one line to the next by the caller.
//! Import-like text inside a literal must never be treated as code.

/// Delimiter of the literal the scanner is currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteDelimiter {
    #[default]
    None,
    Single,       // '...'
    Double,       // "..."
    TripleSingle, // '''...'''
    TripleDouble, // """..."""
}

impl QuoteDelimiter {
    /// The characters that close this literal
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteDelimiter::None => "",
            QuoteDelimiter::Single => "'",
            QuoteDelimiter::Double => "\"",
            QuoteDelimiter::TripleSingle => "'''",
            QuoteDelimiter::TripleDouble => "\"\"\"",
        }
    }

    fn len(self) -> usize {
        self.as_str().len()
    }

    #[must_use]
    pub fn is_triple(self) -> bool {
        matches!(
            self,
            QuoteDelimiter::TripleSingle | QuoteDelimiter::TripleDouble
        )
    }

    /// Delimiter opened by the quote at the start of `rest`, if any
    fn opened_by(rest: &[u8]) -> Option<Self> {
        match rest {
            [b'\'', b'\'', b'\'', ..] => Some(QuoteDelimiter::TripleSingle),
            [b'"', b'"', b'"', ..] => Some(QuoteDelimiter::TripleDouble),
            [b'\'', ..] => Some(QuoteDelimiter::Single),
            [b'"', ..] => Some(QuoteDelimiter::Double),
            _ => None,
        }
    }
}

/// What a single-line scan ran into besides quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineScan {
    /// Byte offset of a `#` comment outside any literal
    pub comment_at: Option<usize>,
}

/// Literal state carried across lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexicalContext {
    delimiter: QuoteDelimiter,
}

impl LexicalContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a scan already inside a literal (for multiline literals)
    #[must_use]
    pub fn with_delimiter(delimiter: QuoteDelimiter) -> Self {
        Self { delimiter }
    }

    /// Check if we're currently inside a literal
    #[must_use]
    pub fn in_literal(&self) -> bool {
        self.delimiter != QuoteDelimiter::None
    }

    #[must_use]
    pub fn delimiter(&self) -> QuoteDelimiter {
        self.delimiter
    }

    /// Advance the context over one physical line
    ///
    /// `\` skips the following character both inside and outside literals.
    /// A `#` outside a literal ends the scan of this line only; the context
    /// is otherwise left as it was at that point.
    pub fn scan_line(&mut self, line: &str) -> LineScan {
        self.scan_line_with(line, |_, _| {})
    }

    /// Like [`scan_line`](Self::scan_line), reporting every code byte
    /// (outside literals and comments) with its offset to `on_code`
    pub fn scan_line_with<F>(&mut self, line: &str, mut on_code: F) -> LineScan
    where
        F: FnMut(usize, u8),
    {
        let bytes = line.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let c = bytes[pos];
            if c == b'\\' {
                pos += 2;
                continue;
            }

            if self.in_literal() {
                let close = self.delimiter.as_str().as_bytes();
                if bytes[pos..].starts_with(close) {
                    pos += self.delimiter.len();
                    self.delimiter = QuoteDelimiter::None;
                    continue;
                }
            } else if let Some(opened) = QuoteDelimiter::opened_by(&bytes[pos..]) {
                self.delimiter = opened;
                pos += opened.len();
                continue;
            } else if c == b'#' {
                return LineScan {
                    comment_at: Some(pos),
                };
            } else {
                on_code(pos, c);
            }
            pos += 1;
        }

        LineScan::default()
    }
}

/// Byte offset of the first `#` outside any literal in a self-contained line
#[must_use]
pub fn find_comment(line: &str) -> Option<usize> {
    LexicalContext::new().scan_line(line).comment_at
}

/// Split a line into its code and trailing comment (which keeps its `#`)
#[must_use]
pub fn split_comment(line: &str) -> (&str, &str) {
    match find_comment(line) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    }
}
