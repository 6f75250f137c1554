//! A single logical import statement: parsing, ordering keys and rendering

use std::cmp::Ordering;

use crate::config::Config;
use crate::parser::literal::split_comment;
use crate::parser::patterns::{FROM_IMPORT_RE, IMPORT_NAME_RE, STRAIGHT_IMPORT_RE};

/// Module whose from-imports must stay ahead of every other statement
const FUTURE_MODULE: &str = "__future__";

/// Shape of an import statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportKind {
    /// `import a, b.c as d`
    Straight,
    /// `from m import a, b`
    From,
    /// Import-prefixed text we could not parse; reproduced verbatim
    Opaque,
}

/// One logical import statement, possibly spread over several physical lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub kind: ImportKind,
    /// Source module of a from-import; empty otherwise
    pub module: String,
    /// Imported names (`a`, `b as c`, dotted modules for straight imports)
    pub names: Vec<String>,
    /// Comment lines directly above the statement, kept verbatim
    pub above: Vec<String>,
    /// Trailing comment text without its `#`
    pub inline: Option<String>,
    /// Physical lines without terminators, used for opaque statements
    pub raw: Vec<String>,
}

fn trim_terminator(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Split a comma separated name list, normalizing inner whitespace
fn parse_names(list: &str) -> Option<Vec<String>> {
    let mut names = Vec::new();
    for part in list.split(',') {
        let name = part.split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            continue;
        }
        if !IMPORT_NAME_RE.is_match(&name) {
            return None;
        }
        names.push(name);
    }
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Constants first, then classes, then everything else
fn name_type_rank(name: &str) -> u8 {
    let base = name.split(" as ").next().unwrap_or(name);
    if base.len() > 1
        && base.chars().any(char::is_alphabetic)
        && base == base.to_uppercase()
    {
        0
    } else if base.chars().next().is_some_and(char::is_uppercase) {
        1
    } else {
        2
    }
}

fn compare_names(a: &str, b: &str, by_type: bool) -> Ordering {
    let type_order = if by_type {
        name_type_rank(a).cmp(&name_type_rank(b))
    } else {
        Ordering::Equal
    };
    type_order
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Sort and de-duplicate names in place
pub(crate) fn sort_names(names: &mut Vec<String>, by_type: bool) {
    names.sort_by(|a, b| compare_names(a, b, by_type));
    names.dedup();
}

impl ImportStatement {
    /// Parse the physical lines of one statement (terminators allowed)
    #[must_use]
    pub fn parse(lines: &[&str]) -> Self {
        let mut code_parts = Vec::new();
        let mut comments = Vec::new();

        for line in lines {
            let (code, comment) = split_comment(trim_terminator(line));
            let code = code.trim().trim_end_matches('\\').trim();
            if !code.is_empty() {
                code_parts.push(code);
            }
            let text = comment.trim_start_matches('#').trim();
            if !text.is_empty() {
                comments.push(text.to_string());
            }
        }

        let logical = code_parts.join(" ");
        let inline = if comments.is_empty() {
            None
        } else {
            Some(comments.join("; "))
        };

        let parsed = if let Some(caps) = FROM_IMPORT_RE.captures(&logical) {
            let list = caps["names"].trim();
            let list = list
                .strip_prefix('(')
                .and_then(|l| l.strip_suffix(')'))
                .unwrap_or(list);
            if list.contains(['(', ')']) {
                None
            } else {
                parse_names(list)
                    .map(|names| (ImportKind::From, caps["module"].to_string(), names))
            }
        } else if let Some(caps) = STRAIGHT_IMPORT_RE.captures(&logical) {
            parse_names(&caps["names"])
                .map(|names| (ImportKind::Straight, String::new(), names))
        } else {
            None
        };

        let raw: Vec<String> = lines
            .iter()
            .map(|line| trim_terminator(line).to_string())
            .collect();

        match parsed {
            Some((kind, module, mut names)) => {
                sort_names(&mut names, kind == ImportKind::From);
                Self {
                    kind,
                    module,
                    names,
                    above: Vec::new(),
                    inline,
                    raw,
                }
            }
            None => Self {
                kind: ImportKind::Opaque,
                module: String::new(),
                names: Vec::new(),
                above: Vec::new(),
                inline,
                raw,
            },
        }
    }

    /// Whether the statement carries no comments and may be split or merged
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.kind != ImportKind::Opaque && self.above.is_empty() && self.inline.is_none()
    }

    #[must_use]
    pub fn is_future(&self) -> bool {
        self.kind == ImportKind::From && self.module == FUTURE_MODULE
    }

    /// Copy of this statement importing only `names`, without comments
    #[must_use]
    pub fn with_names(&self, names: Vec<String>) -> Self {
        Self {
            kind: self.kind,
            module: self.module.clone(),
            names,
            above: Vec::new(),
            inline: None,
            raw: Vec::new(),
        }
    }

    /// Name the statement is ordered by
    fn order_module(&self) -> &str {
        match self.kind {
            ImportKind::Straight => self.names.first().map_or("", String::as_str),
            ImportKind::From => &self.module,
            ImportKind::Opaque => self.raw.first().map_or("", |l| l.trim()),
        }
    }

    /// Total order used when laying out a section
    ///
    /// `__future__` first, then straight imports, then absolute and finally
    /// relative from-imports, each alphabetical ignoring case.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        let module = self.order_module();
        let other_module = other.order_module();
        other
            .is_future()
            .cmp(&self.is_future())
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| module.starts_with('.').cmp(&other_module.starts_with('.')))
            .then_with(|| module.to_lowercase().cmp(&other_module.to_lowercase()))
            .then_with(|| module.cmp(other_module))
            .then_with(|| {
                let names = self.names.join(",").to_lowercase();
                names.cmp(&other.names.join(",").to_lowercase())
            })
            .then_with(|| self.names.cmp(&other.names))
            .then_with(|| self.inline.cmp(&other.inline))
            .then_with(|| self.above.cmp(&other.above))
            .then_with(|| self.raw.cmp(&other.raw))
    }

    /// Render the statement as lines without terminators
    #[must_use]
    pub fn render(&self, indent: &str, config: &Config) -> Vec<String> {
        let mut lines = self.above.clone();
        let comment = self
            .inline
            .as_ref()
            .map(|c| format!("  # {c}"))
            .unwrap_or_default();

        match self.kind {
            ImportKind::Straight => {
                lines.push(format!("{indent}import {}{comment}", self.names.join(", ")));
            }
            ImportKind::From => {
                let single = format!(
                    "{indent}from {} import {}{comment}",
                    self.module,
                    self.names.join(", ")
                );
                let is_star = self.names.iter().any(|n| n == "*");
                if is_star || single.chars().count() <= config.line_length {
                    lines.push(single);
                } else {
                    lines.push(format!("{indent}from {} import ({comment}", self.module));
                    for name in &self.names {
                        lines.push(format!("{indent}{}{name},", config.indent));
                    }
                    lines.push(format!("{indent})"));
                }
            }
            ImportKind::Opaque => lines.extend(self.raw.iter().cloned()),
        }

        lines
    }
}
