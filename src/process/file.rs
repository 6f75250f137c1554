//! File façade: path-scoped config, text decoding, sort and check entry points

use std::fs;
use std::path::{Path, PathBuf};

use super::check::check_imports;
use super::pipeline::sort_imports;
use crate::config::Config;
use crate::directive::find_directive;
use crate::error::SortError;

/// Extension assumed for files without one
pub const DEFAULT_EXTENSION: &str = "py";

const UTF8_BOM: &str = "\u{feff}";

/// A source file decoded as text
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Text without a leading byte order mark
    pub contents: String,
    pub extension: String,
    /// Whether the file started with a UTF-8 byte order mark
    pub has_bom: bool,
}

impl SourceFile {
    /// Read and decode `path`
    ///
    /// Content that is not UTF-8 or contains NUL bytes fails with
    /// [`SortError::EncodingUndetectable`].
    pub fn read(path: &Path) -> Result<Self, SortError> {
        let bytes = fs::read(path)?;
        let undetectable = || SortError::EncodingUndetectable {
            path: path.display().to_string(),
        };

        if bytes.contains(&0) {
            return Err(undetectable());
        }
        let text = String::from_utf8(bytes).map_err(|_| undetectable())?;
        let (contents, has_bom) = match text.strip_prefix(UTF8_BOM) {
            Some(rest) => (rest.to_string(), true),
            None => (text, false),
        };

        let extension = path.extension().map_or_else(
            || DEFAULT_EXTENSION.to_string(),
            |e| e.to_string_lossy().into_owned(),
        );

        Ok(Self {
            path: path.to_path_buf(),
            contents,
            extension,
            has_bom,
        })
    }

    /// `config` with this file's `# impsort:` directive applied
    #[must_use]
    pub fn with_directives(&self, config: &Config) -> Config {
        let mut config = config.clone();
        if let Some(overrides) = find_directive(&self.contents) {
            overrides.apply_to(&mut config);
        }
        config
    }

    /// Write `text` back to this file, restoring the byte order mark
    pub fn write(&self, text: &str) -> Result<(), SortError> {
        if self.has_bom {
            fs::write(&self.path, format!("{UTF8_BOM}{text}"))?;
        } else {
            fs::write(&self.path, text)?;
        }
        Ok(())
    }
}

/// Outcome of sorting one file, not yet written anywhere
#[derive(Debug, Clone)]
pub struct SortedFile {
    pub source: SourceFile,
    pub sorted: String,
}

impl SortedFile {
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.source.contents != self.sorted
    }

    /// Replace the file's content with the sorted text when it differs
    ///
    /// Returns whether the file was written.
    pub fn write_back(&self) -> Result<bool, SortError> {
        if !self.is_changed() {
            return Ok(false);
        }
        self.source.write(&self.sorted)?;
        Ok(true)
    }
}

/// Sort the imports of the file at `path`
///
/// Config files discovered near `path` are layered over `base`. The file
/// itself is left untouched; see [`SortedFile::write_back`].
pub fn sort_file(
    path: &Path,
    base: &Config,
    disregard_skip: bool,
) -> Result<SortedFile, SortError> {
    sort_file_with_config(path, &base.for_path(path), disregard_skip)
}

/// [`sort_file`] with an already resolved config (no discovery)
pub fn sort_file_with_config(
    path: &Path,
    config: &Config,
    disregard_skip: bool,
) -> Result<SortedFile, SortError> {
    let source = SourceFile::read(path)?;
    let config = source.with_directives(config);
    let sorted = sort_imports(
        &source.contents,
        &source.extension,
        &config,
        Some(path),
        disregard_skip,
    )?;
    Ok(SortedFile { source, sorted })
}

/// Check whether the file at `path` is sorted, reporting on stdout
///
/// Config files discovered near `path` are layered over `base`.
pub fn check_file(
    path: &Path,
    base: &Config,
    show_diff: bool,
    disregard_skip: bool,
) -> Result<bool, SortError> {
    check_file_with_config(path, &base.for_path(path), show_diff, disregard_skip)
}

/// [`check_file`] with an already resolved config (no discovery)
pub fn check_file_with_config(
    path: &Path,
    config: &Config,
    show_diff: bool,
    disregard_skip: bool,
) -> Result<bool, SortError> {
    let source = SourceFile::read(path)?;
    let config = source.with_directives(config);
    check_imports(
        &source.contents,
        &source.extension,
        &config,
        Some(path),
        show_diff,
        disregard_skip,
    )
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_source_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "mod.pyi", b"import os\n");
        let source = SourceFile::read(&path).unwrap();
        assert_eq!(source.contents, "import os\n");
        assert_eq!(source.extension, "pyi");
        assert!(!source.has_bom);
    }

    #[test]
    fn test_default_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "script", b"import os\n");
        assert_eq!(SourceFile::read(&path).unwrap().extension, "py");
    }

    #[test]
    fn test_binary_content_is_undetectable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "blob.py", b"import os\n\0\x01");
        let err = SourceFile::read(&path).unwrap_err();
        assert!(matches!(err, SortError::EncodingUndetectable { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_undetectable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "latin.py", b"x = '\xe9'\n");
        let err = SourceFile::read(&path).unwrap_err();
        assert!(matches!(err, SortError::EncodingUndetectable { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = SourceFile::read(&dir.path().join("missing.py")).unwrap_err();
        assert!(matches!(err, SortError::Io(_)));
    }

    #[test]
    fn test_sort_file_and_write_back() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "mod.py", b"import b\nimport a\n");
        let sorted = sort_file(&path, &Config::default(), false).unwrap();
        assert!(sorted.is_changed());
        assert_eq!(fs::read_to_string(&path).unwrap(), "import b\nimport a\n");

        assert!(sorted.write_back().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "import a\nimport b\n");

        let again = sort_file(&path, &Config::default(), false).unwrap();
        assert!(!again.is_changed());
        assert!(!again.write_back().unwrap());
    }

    #[test]
    fn test_bom_preserved() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bom.py", "\u{feff}import b\nimport a\n".as_bytes());
        let sorted = sort_file(&path, &Config::default(), false).unwrap();
        assert_eq!(sorted.sorted, "import a\nimport b\n");
        sorted.write_back().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\u{feff}import a\nimport b\n"
        );
    }

    #[test]
    fn test_directive_enables_atomic() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "broken.py", b"# impsort: --atomic\nimport a\nx = (\n");
        let err = sort_file(&path, &Config::default(), false).unwrap_err();
        assert!(matches!(err, SortError::PreexistingSyntaxError { .. }));
    }

    #[test]
    fn test_discovered_config_applies() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "impsort.toml", b"force_single_line = true\n");
        let path = write_file(&dir, "mod.py", b"from m import b, a\n");
        let sorted = sort_file(&path, &Config::default(), false).unwrap();
        assert_eq!(sorted.sorted, "from m import a\nfrom m import b\n");
    }

    #[test]
    fn test_resolved_config_skips_discovery() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "impsort.toml", b"force_single_line = true\n");
        let path = write_file(&dir, "mod.py", b"from m import b, a\n");
        let sorted = sort_file_with_config(&path, &Config::default(), false).unwrap();
        assert_eq!(sorted.sorted, "from m import a, b\n");
    }

    #[test]
    fn test_skip_comment_in_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "skip.py", b"# isort:skip_file\nimport b\nimport a\n");
        let err = sort_file(&path, &Config::default(), false).unwrap_err();
        assert!(err.is_skip());
        assert!(sort_file(&path, &Config::default(), true).is_ok());
    }

    #[test]
    fn test_check_file() {
        let dir = TempDir::new().unwrap();
        let sorted = write_file(&dir, "sorted.py", b"import a\nimport b\n");
        let unsorted = write_file(&dir, "unsorted.py", b"import b\nimport a\n");
        assert!(check_file(&sorted, &Config::default(), false, false).unwrap());
        assert!(!check_file(&unsorted, &Config::default(), false, false).unwrap());
    }

    #[test]
    fn test_check_file_disregard_skip() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "skip.py", b"# isort:skip_file\nimport b\nimport a\n");
        let err = check_file(&path, &Config::default(), false, false).unwrap_err();
        assert!(matches!(err, SortError::SkippedByComment { .. }));
        assert!(!check_file(&path, &Config::default(), false, true).unwrap());
    }
}
