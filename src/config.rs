//! Configuration management for impsort.
//!
//! This module provides the [`Config`] struct which controls sorting behavior.
//! Configuration can be loaded from:
//! - TOML files (`impsort.toml`, `.impsort.toml`)
//! - CLI arguments (which override file settings)
//! - In-file directives (`# impsort: --atomic`)
//!
//! Config files are auto-discovered by searching parent directories from the file
//! being sorted up to the filesystem root, plus the user's home directory.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["impsort.toml", ".impsort.toml"];

/// Marker that excludes a whole file when it appears anywhere in its content
pub const DEFAULT_FILE_SKIP_COMMENT: &str = "isort:skip_file";

/// Directory and file names skipped unless the user overrides `skip`
const DEFAULT_SKIP: &[&str] = &[
    ".bzr",
    ".direnv",
    ".eggs",
    ".git",
    ".hg",
    ".mypy_cache",
    ".nox",
    ".pants.d",
    ".svn",
    ".tox",
    ".venv",
    "__pypackages__",
    "_build",
    "buck-out",
    "build",
    "dist",
    "node_modules",
    "venv",
];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

// Serde default functions
fn default_line_length() -> usize {
    79
}
fn default_indent() -> String {
    "    ".to_string()
}
fn default_file_skip_comment() -> String {
    DEFAULT_FILE_SKIP_COMMENT.to_string()
}
fn default_skip() -> Vec<String> {
    DEFAULT_SKIP.iter().map(ToString::to_string).collect()
}

/// Main configuration struct for impsort
///
/// Built once per invocation and shared read-only by every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Refuse to write output unless it is still syntactically valid (default: false)
    #[serde(default)]
    pub atomic: bool,

    /// Report successes and skips, not only failures (default: false)
    #[serde(default)]
    pub verbose: bool,

    /// Suppress everything but errors (default: false)
    #[serde(default)]
    pub quiet: bool,

    /// Compare ignoring all whitespace in check mode (default: false)
    #[serde(default)]
    pub ignore_whitespace: bool,

    /// Line separator to emit; inferred from the content when unset
    #[serde(default)]
    pub line_ending: Option<String>,

    /// Maximum line length before from-imports are wrapped (default: 79)
    #[serde(default = "default_line_length")]
    pub line_length: usize,

    /// Indentation used for wrapped import names (default: 4 spaces)
    #[serde(default = "default_indent")]
    pub indent: String,

    /// Emit one `from` statement per imported name (default: false)
    #[serde(default)]
    pub force_single_line: bool,

    /// Heading comment per import category, e.g. `stdlib = "Standard Library"`
    #[serde(default)]
    pub import_headings: BTreeMap<String, String>,

    /// Comment that excludes the whole file from sorting
    #[serde(default = "default_file_skip_comment")]
    pub file_skip_comment: String,

    /// File or directory names to skip
    #[serde(default = "default_skip")]
    pub skip: Vec<String>,

    /// Glob patterns of paths to skip
    #[serde(default)]
    pub skip_glob: Vec<String>,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub atomic: Option<bool>,
    pub verbose: Option<bool>,
    pub quiet: Option<bool>,
    pub ignore_whitespace: Option<bool>,
    pub line_ending: Option<String>,
    pub line_length: Option<usize>,
    pub indent: Option<String>,
    pub force_single_line: Option<bool>,
    #[serde(default)]
    pub import_headings: BTreeMap<String, String>,
    pub file_skip_comment: Option<String>,
    pub skip: Option<Vec<String>>,
    #[serde(default)]
    pub extend_skip: Vec<String>,
    #[serde(default)]
    pub skip_glob: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            atomic: false,
            verbose: false,
            quiet: false,
            ignore_whitespace: false,
            line_ending: None,
            line_length: 79,
            indent: default_indent(),
            force_single_line: false,
            import_headings: BTreeMap::new(),
            file_skip_comment: default_file_skip_comment(),
            skip: default_skip(),
            skip_glob: Vec::new(),
        }
    }
}

impl Config {
    /// Minimum reasonable line length (must fit at least `from x import (`)
    const MIN_LINE_LENGTH: usize = 10;
    /// Maximum reasonable line length
    const MAX_LINE_LENGTH: usize = 1000;
    /// Line separators accepted for `line_ending`
    const LINE_ENDINGS: &'static [&'static str] = &["\n", "\r\n", "\r"];

    /// Validate configuration values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.line_length < Self::MIN_LINE_LENGTH {
            return Some(format!(
                "line_length {} is below minimum of {}",
                self.line_length,
                Self::MIN_LINE_LENGTH
            ));
        }
        if self.line_length > Self::MAX_LINE_LENGTH {
            return Some(format!(
                "line_length {} exceeds maximum of {}",
                self.line_length,
                Self::MAX_LINE_LENGTH
            ));
        }
        if let Some(ending) = &self.line_ending {
            if !Self::LINE_ENDINGS.contains(&ending.as_str()) {
                return Some(format!("line_ending {ending:?} is not one of \\n, \\r\\n, \\r"));
            }
        }
        if self.indent.chars().any(|c| c != ' ' && c != '\t') {
            return Some(format!(
                "indent {:?} must only contain spaces or tabs",
                self.indent
            ));
        }
        if let Some(bad) = self.skip_glob.iter().find(|p| Pattern::new(p).is_err()) {
            return Some(format!("skip_glob pattern {bad:?} is not a valid glob"));
        }
        None
    }

    /// Heading comments as they appear in source, e.g. `# Standard Library`
    ///
    /// A top-of-file comment banner ends at the first of these.
    #[must_use]
    pub fn section_comments(&self) -> Vec<String> {
        self.import_headings
            .values()
            .map(|heading| format!("# {heading}"))
            .collect()
    }

    /// Whether `path` is excluded by the `skip` or `skip_glob` settings
    #[must_use]
    pub fn is_skipped(&self, path: &Path) -> bool {
        for component in path.components() {
            if let Component::Normal(c) = component {
                let name = c.to_string_lossy();
                if self.skip.iter().any(|s| s == name.as_ref()) {
                    return true;
                }
            }
        }

        if self.skip_glob.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();
        let file_name = path.file_name().map(|f| f.to_string_lossy());
        self.skip_glob
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|pattern| {
                pattern.matches(&path_str)
                    || file_name
                        .as_ref()
                        .is_some_and(|name| pattern.matches(name.as_ref()))
            })
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.atomic {
            self.atomic = v;
        }
        if let Some(v) = partial.verbose {
            self.verbose = v;
        }
        if let Some(v) = partial.quiet {
            self.quiet = v;
        }
        if let Some(v) = partial.ignore_whitespace {
            self.ignore_whitespace = v;
        }
        if let Some(v) = &partial.line_ending {
            self.line_ending = Some(v.clone());
        }
        if let Some(v) = partial.line_length {
            self.line_length = v;
        }
        if let Some(v) = &partial.indent {
            self.indent.clone_from(v);
        }
        if let Some(v) = partial.force_single_line {
            self.force_single_line = v;
        }
        if let Some(v) = &partial.file_skip_comment {
            self.file_skip_comment.clone_from(v);
        }
        if let Some(v) = &partial.skip {
            self.skip.clone_from(v);
        }
        for name in &partial.extend_skip {
            if !self.skip.contains(name) {
                self.skip.push(name.clone());
            }
        }
        for pattern in &partial.skip_glob {
            if !self.skip_glob.contains(pattern) {
                self.skip_glob.push(pattern.clone());
            }
        }
        // Merge headings (partial values override)
        for (k, v) in &partial.import_headings {
            self.import_headings.insert(k.clone(), v.clone());
        }
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the file's directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Root first, so closer configs override
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        Self::default().merged_with_discovered(start_path)
    }

    /// Layer every config discovered near `path` on top of `self`
    ///
    /// This is how a path-scoped config is derived from a base config.
    #[must_use]
    pub fn for_path(&self, path: &Path) -> Self {
        self.clone().merged_with_discovered(path)
    }

    fn merged_with_discovered(mut self, start_path: &Path) -> Self {
        for path in &Self::discover_config_files(start_path) {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => self.apply_partial(&partial),
                    Err(e) => eprintln!("Warning: failed to parse {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
            }
        }
        self
    }
}
