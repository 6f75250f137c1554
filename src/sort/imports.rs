//! Default section sorter
//!
//! Lays out one import section as:
//! - the blank/comment lines preceding the first import, unchanged
//! - every import statement, merged, de-duplicated and sorted
//! - everything after the last import statement, unchanged

use std::collections::BTreeMap;

use super::statement::{sort_names, ImportKind, ImportStatement};
use super::SortTransform;
use crate::config::Config;
use crate::format::line_separator;
use crate::parser::literal::split_comment;
use crate::parser::patterns::{is_import_start, paren_balance, COMMENT_MARKER};

/// Physical lines of a section, classified
#[derive(Debug)]
enum Unit<'a> {
    Blank(&'a str),
    Comment(&'a str),
    Import(Vec<&'a str>),
    Other(&'a str),
}

impl Unit<'_> {
    fn push_text(&self, out: &mut String) {
        match self {
            Unit::Blank(line) | Unit::Comment(line) | Unit::Other(line) => out.push_str(line),
            Unit::Import(lines) => lines.iter().for_each(|line| out.push_str(line)),
        }
    }
}

/// Group the physical lines of a section into units
///
/// Continuations follow the same rules as segmentation: open parentheses
/// first, then trailing backslashes. Once a non-import line is seen, every
/// remaining line is left alone.
fn split_units(section: &str) -> Vec<Unit<'_>> {
    let mut lines = section.split_inclusive('\n');
    let mut units = Vec::new();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            units.push(Unit::Blank(line));
        } else if trimmed.starts_with(COMMENT_MARKER) {
            units.push(Unit::Comment(line));
        } else if is_import_start(trimmed) {
            let mut statement = vec![line];
            let code = split_comment(trimmed).0.trim_end();

            let mut depth = paren_balance(code);
            while depth > 0 {
                let Some(next) = lines.next() else {
                    break;
                };
                depth += paren_balance(next.trim());
                statement.push(next);
            }
            if code.ends_with('\\') {
                while let Some(next) = lines.next() {
                    statement.push(next);
                    if !next.trim().ends_with('\\') {
                        break;
                    }
                }
            }
            units.push(Unit::Import(statement));
        } else {
            units.push(Unit::Other(line));
            units.extend(lines.by_ref().map(Unit::Other));
        }
    }

    units
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Split, merge and order parsed statements
fn normalize(statements: Vec<ImportStatement>, config: &Config) -> Vec<ImportStatement> {
    let mut result = Vec::new();
    let mut merged_from: BTreeMap<String, ImportStatement> = BTreeMap::new();

    for statement in statements {
        if !statement.is_plain() {
            result.push(statement);
            continue;
        }
        match statement.kind {
            ImportKind::Straight => {
                result.extend(
                    statement
                        .names
                        .iter()
                        .map(|name| statement.with_names(vec![name.clone()])),
                );
            }
            ImportKind::From if !statement.names.iter().any(|n| n == "*") => {
                merged_from
                    .entry(statement.module.clone())
                    .and_modify(|existing| {
                        existing.names.extend(statement.names.iter().cloned());
                    })
                    .or_insert_with(|| statement.with_names(statement.names.clone()));
            }
            _ => result.push(statement),
        }
    }

    for (_, mut statement) in merged_from {
        sort_names(&mut statement.names, true);
        if config.force_single_line {
            result.extend(
                statement
                    .names
                    .iter()
                    .map(|name| statement.with_names(vec![name.clone()])),
            );
        } else {
            result.push(statement);
        }
    }

    result.sort_by(ImportStatement::compare);
    result.dedup();
    result
}

/// Statements that share one indentation and are ordered together
struct Run<'a> {
    indent: &'a str,
    statements: Vec<ImportStatement>,
}

impl Run<'_> {
    fn render_into(self, out: &mut String, separator: &str, config: &Config) {
        for statement in normalize(self.statements, config) {
            for line in statement.render(self.indent, config) {
                out.push_str(&line);
                out.push_str(separator);
            }
        }
    }
}

/// Default [`SortTransform`]: canonical ordering of the statements in a section
///
/// Statements are only reordered within a run of imports at the same
/// indentation. A change of indentation or an unparsable statement ends the
/// run and stays where it is, together with the lines just above it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportSorter;

impl ImportSorter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SortTransform for ImportSorter {
    fn sort_section(&self, section: &str, config: &Config, _extension: &str) -> String {
        let units = split_units(section);
        let is_import = |u: &Unit<'_>| matches!(u, Unit::Import(_));
        let (Some(first), Some(last)) = (
            units.iter().position(is_import),
            units.iter().rposition(is_import),
        ) else {
            return section.to_string();
        };

        let separator = line_separator(config.line_ending.as_deref(), section);
        let mut output = String::with_capacity(section.len());
        for unit in &units[..first] {
            unit.push_text(&mut output);
        }

        let mut run: Option<Run<'_>> = None;
        let mut pending: Vec<&Unit<'_>> = Vec::new();
        for unit in &units[first..=last] {
            let Unit::Import(lines) = unit else {
                pending.push(unit);
                continue;
            };
            let indent = leading_whitespace(lines[0]);
            let mut statement = ImportStatement::parse(lines);
            let opaque = statement.kind == ImportKind::Opaque;

            match run.as_mut() {
                Some(current) if !opaque && current.indent == indent => {
                    statement.above = pending
                        .drain(..)
                        .filter_map(|u| match u {
                            Unit::Comment(line) | Unit::Other(line) => {
                                Some(line.trim_end_matches(['\n', '\r']).to_string())
                            }
                            _ => None,
                        })
                        .collect();
                    current.statements.push(statement);
                }
                _ => {
                    if let Some(done) = run.take() {
                        done.render_into(&mut output, separator, config);
                    }
                    for above in pending.drain(..) {
                        above.push_text(&mut output);
                    }
                    if opaque {
                        unit.push_text(&mut output);
                    } else {
                        run = Some(Run {
                            indent,
                            statements: vec![statement],
                        });
                    }
                }
            }
        }
        if let Some(done) = run {
            done.render_into(&mut output, separator, config);
        }

        let trailing = &units[last + 1..];
        if trailing.is_empty() && !section.ends_with('\n') && output.ends_with(separator) {
            output.truncate(output.len() - separator.len());
        }
        for unit in trailing {
            unit.push_text(&mut output);
        }

        output
    }
}
