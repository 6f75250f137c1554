//! Segment-and-transform pipeline
//!
//! Both modes run the same [`Segmenter`] and hand every import-bearing
//! [`Section`](crate::parser::Section) to a [`SortTransform`]:
//! - whole-content: skip checks, optional syntax validation before and after
//! - streaming: blocks are written as soon as they are closed, no validation

use std::io::{self, BufRead, Write};
use std::path::Path;

use super::syntax::{LexicalValidator, SyntaxValidator};
use crate::config::Config;
use crate::error::SortError;
use crate::format::PASSED_IN_CONTENT;
use crate::parser::{Block, Segmenter};
use crate::sort::{ImportSorter, SortTransform};

/// Name used in errors and reports for the input
pub(crate) fn source_name(file_path: Option<&Path>) -> String {
    file_path.map_or_else(
        || PASSED_IN_CONTENT.to_string(),
        |path| path.display().to_string(),
    )
}

/// Drive a segmenter to EOF, emitting every block in order
fn run_segments<R, T, E>(
    mut segmenter: Segmenter<R>,
    transform: &T,
    config: &Config,
    extension: &str,
    mut emit: E,
) -> Result<(), SortError>
where
    R: BufRead,
    T: SortTransform + ?Sized,
    E: FnMut(&str) -> io::Result<()>,
{
    while let Some(block) = segmenter.next_block()? {
        match block {
            Block::Passthrough(line) => emit(&line)?,
            Block::Section(section) if section.contains_imports => {
                emit(&transform.sort_section(&section.text, config, extension))?;
            }
            Block::Section(section) => emit(&section.text)?,
        }
    }
    Ok(())
}

/// Sort the imports of a whole in-memory source with the default sorter
///
/// Fails with a skip error when the content carries the file skip comment
/// or the path is excluded by configuration (unless `disregard_skip`), and
/// in atomic mode with a syntax error before or after sorting.
pub fn sort_imports(
    content: &str,
    extension: &str,
    config: &Config,
    file_path: Option<&Path>,
    disregard_skip: bool,
) -> Result<String, SortError> {
    sort_imports_with(
        content,
        extension,
        config,
        file_path,
        disregard_skip,
        &ImportSorter,
        &LexicalValidator,
    )
}

/// [`sort_imports`] with a caller supplied transform and validator
pub fn sort_imports_with<T, V>(
    content: &str,
    extension: &str,
    config: &Config,
    file_path: Option<&Path>,
    disregard_skip: bool,
    transform: &T,
    validator: &V,
) -> Result<String, SortError>
where
    T: SortTransform + ?Sized,
    V: SyntaxValidator + ?Sized,
{
    if !disregard_skip {
        if !config.file_skip_comment.is_empty() && content.contains(&config.file_skip_comment) {
            return Err(SortError::SkippedByComment {
                source_name: source_name(file_path),
            });
        }
        if file_path.is_some_and(|path| config.is_skipped(path)) {
            return Err(SortError::SkippedByConfig {
                source_name: source_name(file_path),
            });
        }
    }

    if config.atomic && !validator.is_valid(content, extension) {
        return Err(SortError::PreexistingSyntaxError {
            source_name: source_name(file_path),
        });
    }

    let mut result = String::with_capacity(content.len());
    run_segments(
        Segmenter::from_string(content, config),
        transform,
        config,
        extension,
        |text| {
            result.push_str(text);
            Ok(())
        },
    )?;

    if config.atomic && !validator.is_valid(&result, extension) {
        return Err(SortError::TransformIntroducedSyntaxError {
            source_name: source_name(file_path),
        });
    }

    Ok(result)
}

/// Sort imports while streaming from `input` to `output`
///
/// Only one section is held in memory at a time. No skip or syntax checks
/// are made; use [`sort_imports`] when those are needed.
pub fn sort_stream<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    extension: &str,
    config: &Config,
) -> Result<(), SortError> {
    sort_stream_with(input, output, extension, config, &ImportSorter)
}

/// [`sort_stream`] with a caller supplied transform
pub fn sort_stream_with<R, W, T>(
    input: R,
    output: &mut W,
    extension: &str,
    config: &Config,
    transform: &T,
) -> Result<(), SortError>
where
    R: BufRead,
    W: Write,
    T: SortTransform + ?Sized,
{
    run_segments(
        Segmenter::new(input, config),
        transform,
        config,
        extension,
        |text| output.write_all(text.as_bytes()),
    )?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor};
    use std::path::PathBuf;

    use super::*;

    fn sort(content: &str) -> String {
        sort_imports(content, "py", &Config::default(), None, false).unwrap()
    }

    fn stream(content: &str, config: &Config) -> String {
        let reader = BufReader::new(Cursor::new(content.as_bytes()));
        let mut output = Vec::new();
        sort_stream(reader, &mut output, "py", config).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_sorts_simple_imports() {
        assert_eq!(sort("import b\nimport a\n"), "import a\nimport b\n");
    }

    #[test]
    fn test_skip_comment() {
        let err = sort_imports(
            "import b\n# isort:skip_file\nimport a\n",
            "py",
            &Config::default(),
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, SortError::SkippedByComment { .. }));
        assert!(err.is_skip());
        assert!(err.to_string().contains(PASSED_IN_CONTENT));
    }

    #[test]
    fn test_disregard_skip() {
        let result = sort_imports(
            "# isort:skip_file\nimport b\nimport a\n",
            "py",
            &Config::default(),
            Some(Path::new("build/module.py")),
            true,
        )
        .unwrap();
        assert_eq!(result, "# isort:skip_file\nimport a\nimport b\n");
    }

    #[test]
    fn test_skip_by_config() {
        let path = PathBuf::from("project/.venv/lib/site.py");
        let err = sort_imports("import os\n", "py", &Config::default(), Some(&path), false)
            .unwrap_err();
        assert!(matches!(err, SortError::SkippedByConfig { .. }));
        assert!(err.to_string().contains("site.py"));
    }

    #[test]
    fn test_import_text_in_literal_unchanged() {
        let input = "s = \"import b\\nimport a\"\n";
        assert_eq!(sort(input), input);
    }

    #[test]
    fn test_import_text_in_triple_literal_unchanged() {
        let input = "doc = \"\"\"\nimport b\nimport a\n\"\"\"\nimport d\nimport c\n";
        assert_eq!(
            sort(input),
            "doc = \"\"\"\nimport b\nimport a\n\"\"\"\nimport c\nimport d\n"
        );
    }

    #[test]
    fn test_parenthesized_import_is_one_section() {
        let seen = std::cell::RefCell::new(Vec::new());
        let recorder = |section: &str, _: &Config, _: &str| {
            seen.borrow_mut().push(section.to_string());
            section.to_string()
        };
        let input = "from x import (\n    b,\n    a,\n)\n";
        let result = sort_imports_with(
            input,
            "py",
            &Config::default(),
            None,
            false,
            &recorder,
            &LexicalValidator,
        )
        .unwrap();
        assert_eq!(result, input);
        assert_eq!(*seen.borrow(), vec![input.to_string()]);
        assert_eq!(sort(input), "from x import a, b\n");
    }

    #[test]
    fn test_no_imports_is_passthrough() {
        let input = concat!(
            "#!/usr/bin/env python\n",
            "\"\"\"Doc.\"\"\"\n",
            "\nx = 1\n\n\n",
            "def f():\n",
            "    return x\n",
        );
        assert_eq!(sort(input), input);
    }

    #[test]
    fn test_comment_only_section_not_transformed() {
        let panicking = |_: &str, _: &Config, _: &str| -> String {
            panic!("sections without imports must not be transformed")
        };
        let input = "x = 1\n# a comment\n\ny = 2\n";
        let result = sort_imports_with(
            input,
            "py",
            &Config::default(),
            None,
            false,
            &panicking,
            &LexicalValidator,
        )
        .unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_idempotent() {
        let input = concat!(
            "\"\"\"Module.\"\"\"\n",
            "import sys\nimport os\nfrom b import y, x\n\n",
            "print(os, sys)\n\n",
            "def f():\n",
            "    import json\n",
            "    import abc\n",
            "    return json\n",
        );
        let once = sort(input);
        assert_eq!(sort(&once), once);
    }

    #[test]
    fn test_atomic_rejects_preexisting_error() {
        let config = Config {
            atomic: true,
            ..Default::default()
        };
        let err = sort_imports("import b\nx = (\n", "py", &config, None, false).unwrap_err();
        assert!(matches!(err, SortError::PreexistingSyntaxError { .. }));
        assert!(err.to_string().contains("before sorting"));
    }

    #[test]
    fn test_atomic_rejects_introduced_error() {
        let config = Config {
            atomic: true,
            ..Default::default()
        };
        let breaking = |section: &str, _: &Config, _: &str| format!("{section}(\n");
        let err = sort_imports_with(
            "import b\nimport a\n",
            "py",
            &config,
            None,
            false,
            &breaking,
            &LexicalValidator,
        )
        .unwrap_err();
        assert!(matches!(err, SortError::TransformIntroducedSyntaxError { .. }));
        assert!(err.to_string().contains("introduced"));
    }

    #[test]
    fn test_atomic_accepts_valid_source() {
        let config = Config {
            atomic: true,
            ..Default::default()
        };
        let input = "import b\nimport a\nx = (1,\n     2)\n";
        let result = sort_imports(input, "py", &config, None, false).unwrap();
        assert_eq!(result, "import a\nimport b\nx = (1,\n     2)\n");
    }

    #[test]
    fn test_non_atomic_ignores_syntax() {
        assert_eq!(sort("import b\nimport a\nx = (\n"), "import a\nimport b\nx = (\n");
    }

    #[test]
    fn test_stream_matches_whole_content() {
        let inputs = [
            "import b\nimport a\n",
            "# banner\n# more\nimport z\nimport y\n\nx = 1\nimport c\nimport b\n",
            "from x import (\n    b,\n    a,\n)\nprint(1)\n",
            "s = '''\nimport b\n'''\nimport b, a\n",
            "def f():\n    import b\n    import a\n    return a\n",
            "import b\r\nimport a\r\nx = 1\r\n",
            "x = 1",
            "",
        ];
        for input in inputs {
            assert_eq!(stream(input, &Config::default()), sort(input), "input: {input:?}");
        }
    }

    #[test]
    fn test_stream_ignores_skip_comment() {
        let input = "# isort:skip_file\nimport b\nimport a\n";
        assert_eq!(
            stream(input, &Config::default()),
            "# isort:skip_file\nimport a\nimport b\n"
        );
    }

    #[test]
    fn test_stream_with_custom_transform() {
        let upper = |section: &str, _: &Config, _: &str| section.to_uppercase();
        let reader = BufReader::new(Cursor::new("x = 1\nimport os\n".as_bytes()));
        let mut output = Vec::new();
        sort_stream_with(reader, &mut output, "py", &Config::default(), &upper).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "x = 1\nIMPORT OS\n");
    }
}
