//! Syntax validation backing atomic mode
//!
//! The check is lexical: literals must terminate, brackets must pair up,
//! and the file must not end on a line continuation. It catches the ways a
//! misplaced section boundary can corrupt a file without parsing Python.

use crate::parser::literal::{LexicalContext, QuoteDelimiter};

/// Decides whether source text is well formed enough to be written back
pub trait SyntaxValidator {
    fn is_valid(&self, source: &str, extension: &str) -> bool;
}

/// Default [`SyntaxValidator`] based on the lexical scanner
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalValidator;

fn closing_for(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        _ => b'}',
    }
}

impl SyntaxValidator for LexicalValidator {
    fn is_valid(&self, source: &str, _extension: &str) -> bool {
        let mut context = LexicalContext::new();
        let mut brackets: Vec<u8> = Vec::new();
        let mut mismatched = false;
        let mut continued = false;

        for line in source.split_inclusive('\n') {
            let scan = context.scan_line_with(line, |_, c| match c {
                b'(' | b'[' | b'{' => brackets.push(c),
                b')' | b']' | b'}' => {
                    if brackets.pop().map(closing_for) != Some(c) {
                        mismatched = true;
                    }
                }
                _ => {}
            });
            if mismatched {
                return false;
            }

            let body = line.trim_end_matches(['\n', '\r']);
            let code = scan.comment_at.map_or(body, |pos| &body[..pos.min(body.len())]);
            continued = code.trim_end().ends_with('\\');

            // Only triple-quoted literals may run past the end of a line
            let delimiter = context.delimiter();
            if matches!(delimiter, QuoteDelimiter::Single | QuoteDelimiter::Double)
                && !body.ends_with('\\')
            {
                return false;
            }
        }

        !context.in_literal() && brackets.is_empty() && !continued
    }
}

/// Check `source` with the default validator
#[must_use]
pub fn is_valid_syntax(source: &str, extension: &str) -> bool {
    LexicalValidator.is_valid(source, extension)
}
