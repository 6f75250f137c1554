//! Command-line interface for impsort.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to sort
    pub inputs: Vec<PathBuf>,

    /// Only report whether files are sorted
    pub check_only: bool,

    /// Print a unified diff instead of rewriting files
    pub diff: bool,

    /// Refuse to write output that is not syntactically valid
    pub atomic: bool,

    /// Write sorted output to stdout instead of in-place
    pub stdout: bool,

    /// Report successes and skipped files
    pub verbose: bool,

    /// Only report errors
    pub quiet: bool,

    /// Print configuration and discovery details
    pub debug: bool,

    /// Ignore whitespace differences in check mode
    pub ignore_whitespace: bool,

    /// Maximum line length
    pub line_length: Option<usize>,

    /// Line separator to emit (`\n`, `\r\n` or `\r`)
    pub line_ending: Option<String>,

    /// One `from` import per imported name
    pub force_single_line: bool,

    /// Explicit config file (disables auto-discovery)
    pub settings_path: Option<PathBuf>,

    /// Additional file or directory names to skip
    pub skip: Vec<String>,

    /// Additional glob patterns to skip
    pub skip_glob: Vec<String>,

    /// Sort files even when skip settings or skip comments apply
    pub disregard_skip: bool,

    /// Number of parallel jobs (0 = auto)
    pub jobs: Option<usize>,
}

/// Line separator for a `--line-ending` value
fn line_ending_for(name: &str) -> Option<&'static str> {
    match name {
        "lf" => Some("\n"),
        "crlf" => Some("\r\n"),
        "cr" => Some("\r"),
        _ => None,
    }
}

/// Build the CLI command structure
#[must_use]
pub fn build_cli() -> Command {
    Command::new("impsort")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sorts Python imports while leaving the rest of the file untouched")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to sort ('-' for stdin)")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("check-only")
                .short('c')
                .long("check-only")
                .help("Check whether files are sorted without modifying them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("diff")
                .short('d')
                .long("diff")
                .help("Print a unified diff of the changes instead of applying them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("atomic")
                .short('a')
                .long("atomic")
                .help("Only write output that is still syntactically valid")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .help("Write sorted output to stdout instead of in-place")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Report successes and skipped files")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only report errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Print configuration and discovery details")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore-whitespace")
                .long("ignore-whitespace")
                .help("Ignore whitespace differences when checking")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("line-length")
                .short('l')
                .long("line-length")
                .help("Maximum line length before imports are wrapped [default: 79]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("line-ending")
                .long("line-ending")
                .help("Line separator to emit [default: inferred from the file]")
                .value_name("STYLE")
                .value_parser(["lf", "crlf", "cr"]),
        )
        .arg(
            Arg::new("force-single-line")
                .long("force-single-line")
                .help("Emit one 'from' import per imported name")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("settings-path")
                .long("settings-path")
                .help("Path to config file (disables auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("skip")
                .short('s')
                .long("skip")
                .help("File or directory name to skip (can be repeated)")
                .value_name("NAME")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("skip-glob")
                .long("skip-glob")
                .help("Glob pattern of paths to skip (can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("disregard-skip")
                .long("disregard-skip")
                .help("Sort files even if they are skipped by config or a skip comment")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default()
    };

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        check_only: matches.get_flag("check-only"),
        diff: matches.get_flag("diff"),
        atomic: matches.get_flag("atomic"),
        stdout: matches.get_flag("stdout"),
        verbose: matches.get_flag("verbose"),
        quiet: matches.get_flag("quiet"),
        debug: matches.get_flag("debug"),
        ignore_whitespace: matches.get_flag("ignore-whitespace"),
        line_length: matches.get_one::<usize>("line-length").copied(),
        line_ending: matches
            .get_one::<String>("line-ending")
            .and_then(|name| line_ending_for(name))
            .map(ToString::to_string),
        force_single_line: matches.get_flag("force-single-line"),
        settings_path: matches.get_one::<PathBuf>("settings-path").cloned(),
        skip: strings("skip"),
        skip_glob: strings("skip-glob"),
        disregard_skip: matches.get_flag("disregard-skip"),
        jobs: matches.get_one::<usize>("jobs").copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_builds() {
        let cmd = build_cli();
        assert_eq!(cmd.get_name(), "impsort");
        cmd.debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = parse_args_from(vec!["impsort"]);
        assert!(args.inputs.is_empty());
        assert!(!args.check_only);
        assert!(!args.atomic);
        assert!(!args.stdout);
        assert_eq!(args.line_length, None);
        assert_eq!(args.line_ending, None);
        assert!(args.skip.is_empty());
        assert_eq!(args.jobs, None);
    }

    #[test]
    fn test_check_mode_flags() {
        let args = parse_args_from(vec!["impsort", "-c", "-d", "--ignore-whitespace", "a.py"]);
        assert!(args.check_only);
        assert!(args.diff);
        assert!(args.ignore_whitespace);
        assert_eq!(args.inputs, vec![PathBuf::from("a.py")]);
    }

    #[test]
    fn test_line_options() {
        let args = parse_args_from(vec![
            "impsort",
            "-l",
            "100",
            "--line-ending",
            "crlf",
            "--force-single-line",
            "src",
        ]);
        assert_eq!(args.line_length, Some(100));
        assert_eq!(args.line_ending.as_deref(), Some("\r\n"));
        assert!(args.force_single_line);
    }

    #[test]
    fn test_invalid_line_ending_rejected() {
        let result = build_cli().try_get_matches_from(vec!["impsort", "--line-ending", "unix"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repeated_skip_options() {
        let args = parse_args_from(vec![
            "impsort",
            "--skip",
            "generated",
            "-s",
            "vendor",
            "--skip-glob",
            "*_pb2.py",
            "--disregard-skip",
            ".",
        ]);
        assert_eq!(args.skip, vec!["generated", "vendor"]);
        assert_eq!(args.skip_glob, vec!["*_pb2.py"]);
        assert!(args.disregard_skip);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = build_cli().try_get_matches_from(vec!["impsort", "-v", "-q"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_path_and_jobs() {
        let args = parse_args_from(vec![
            "impsort",
            "--settings-path",
            "custom.toml",
            "-j",
            "1",
            "-a",
            "x.py",
        ]);
        assert_eq!(args.settings_path, Some(PathBuf::from("custom.toml")));
        assert_eq!(args.jobs, Some(1));
        assert!(args.atomic);
    }
}
