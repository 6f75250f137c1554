//! impsort - Sorts Python imports, leaving everything else byte-identical

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, BufReader, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use impsort::process::{check_file_with_config, sort_file_with_config, sort_imports, sort_stream};
use impsort::{check_imports, parse_args, unified_diff, CliArgs, Config, Result, SortError};
use rayon::prelude::*;
use walkdir::WalkDir;

/// Python file extensions to process
const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi", "pyx", "pxd"];

/// Default maximum file size in bytes (100 MB)
/// Files larger than this are skipped to prevent memory exhaustion
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileStatus {
    Unchanged,
    /// Rewritten in place, or reported as unsorted in check/diff mode
    Changed,
    Skipped,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = parse_args();

    // Check if we should read from stdin
    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    // If no inputs and running interactively, print usage; otherwise read from stdin
    if args.inputs.is_empty() && io::stdin().is_terminal() {
        print_usage();
        return Ok(());
    }

    // Reporting options and stdin use the config of the current directory
    let cwd_config = build_config(&args, None)?;

    if use_stdin {
        let unsorted = process_stdin(&cwd_config, &args)?;
        if unsorted {
            std::process::exit(1);
        }
        return Ok(());
    }

    // For an explicit settings file, we use one config for all files
    // For auto-discovery, each file gets its own config
    let base_config = args.settings_path.is_some().then(|| cwd_config.clone());

    // Configure thread pool if --jobs specified
    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                eprintln!("Warning: failed to configure thread pool: {e}");
            }
        }
    }

    // Collect all files to process
    let files = collect_files(&args, &cwd_config);

    if files.is_empty() {
        if !cwd_config.quiet {
            eprintln!("No Python files found to sort.");
        }
        return Ok(());
    }

    // Process files
    let use_sequential = args.stdout || args.jobs == Some(1);
    let failed = if use_sequential {
        process_files_sequential(&files, base_config.as_ref(), &args)
    } else {
        process_files_parallel(&files, base_config.as_ref(), &cwd_config, &args)
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Build configuration from CLI args and config files
///
/// With `--settings-path` only that file is read. Otherwise config files are
/// discovered from `for_path` (or the current directory) upwards. CLI
/// arguments override both.
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.settings_path {
        if args.debug {
            eprintln!(
                "[DEBUG] Using explicit config file: {}",
                config_path.display()
            );
        }
        Config::from_toml_file(config_path)?
    } else {
        let start = for_path.map_or_else(
            || std::env::current_dir().unwrap_or_default(),
            Path::to_path_buf,
        );
        if args.debug {
            let discovered = Config::discover_config_files(&start);
            if discovered.is_empty() {
                eprintln!("[DEBUG] No config files discovered for: {}", start.display());
            } else {
                eprintln!("[DEBUG] Discovered config files for {}:", start.display());
                for f in &discovered {
                    eprintln!("[DEBUG]   - {}", f.display());
                }
            }
        }
        Config::from_discovered_files(&start)
    };

    // Override with CLI arguments
    if args.atomic {
        config.atomic = true;
    }
    if args.verbose {
        config.verbose = true;
        config.quiet = false;
    }
    if args.quiet {
        config.quiet = true;
        config.verbose = false;
    }
    if args.ignore_whitespace {
        config.ignore_whitespace = true;
    }
    if let Some(line_length) = args.line_length {
        config.line_length = line_length;
    }
    if let Some(line_ending) = &args.line_ending {
        config.line_ending = Some(line_ending.clone());
    }
    if args.force_single_line {
        config.force_single_line = true;
    }
    for name in &args.skip {
        if !config.skip.contains(name) {
            config.skip.push(name.clone());
        }
    }
    for pattern in &args.skip_glob {
        if !config.skip_glob.contains(pattern) {
            config.skip_glob.push(pattern.clone());
        }
    }

    if args.debug && for_path.is_none() {
        print_config_debug(&config);
    }

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

/// Print configuration values in debug mode
fn print_config_debug(config: &Config) {
    eprintln!("[DEBUG] Configuration:");
    eprintln!("[DEBUG]   atomic: {}", config.atomic);
    eprintln!("[DEBUG]   verbose: {}", config.verbose);
    eprintln!("[DEBUG]   quiet: {}", config.quiet);
    eprintln!("[DEBUG]   ignore_whitespace: {}", config.ignore_whitespace);
    eprintln!("[DEBUG]   line_ending: {:?}", config.line_ending);
    eprintln!("[DEBUG]   line_length: {}", config.line_length);
    eprintln!("[DEBUG]   indent: {:?}", config.indent);
    eprintln!("[DEBUG]   force_single_line: {}", config.force_single_line);
    eprintln!("[DEBUG]   file_skip_comment: {:?}", config.file_skip_comment);
    if !config.import_headings.is_empty() {
        eprintln!("[DEBUG]   import_headings: {:?}", config.import_headings);
    }
    eprintln!("[DEBUG]   skip: {:?}", config.skip);
    if !config.skip_glob.is_empty() {
        eprintln!("[DEBUG]   skip_glob: {:?}", config.skip_glob);
    }
}

/// Collect all files to process, recursing into directories
///
/// Files named explicitly are always kept (their skip settings are applied
/// when they are sorted, so they can be reported); files found while walking
/// a directory are dropped when skipped, and skipped directories are pruned.
fn collect_files(args: &CliArgs, config: &Config) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in &args.inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            // Note: WalkDir detects symlink loops when follow_links(true) and
            // returns errors for them. We skip errors via filter_map(ok).
            let walker = WalkDir::new(input)
                .follow_links(true)
                .max_depth(256)
                .into_iter()
                .filter_entry(|entry| {
                    entry.depth() == 0
                        || args.disregard_skip
                        || !config.is_skipped(Path::new(entry.file_name()))
                })
                .filter_map(std::result::Result::ok);

            for entry in walker {
                let path = entry.path();
                if path.is_file()
                    && is_python_file(path)
                    && (args.disregard_skip || !config.is_skipped(path))
                {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            eprintln!("Warning: {} does not exist", input.display());
        }
    }

    files
}

/// Check if a file has a Python extension
fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PYTHON_EXTENSIONS.contains(&ext))
}

/// Resolve the config for `path` and process it
fn process_path(path: &Path, base_config: Option<&Config>, args: &CliArgs) -> Result<FileStatus> {
    match base_config {
        Some(config) => process_single_file(path, config, args),
        None => process_single_file(path, &build_config(args, Some(path))?, args),
    }
}

/// Process files sequentially (for stdout output)
///
/// Returns whether any file failed or was found unsorted in check mode.
fn process_files_sequential(
    files: &[PathBuf],
    base_config: Option<&Config>,
    args: &CliArgs,
) -> bool {
    let mut failed = false;
    for path in files {
        match process_path(path, base_config, args) {
            Ok(FileStatus::Changed) if args.check_only => failed = true,
            Ok(_) => {}
            Err(e) => {
                failed = true;
                eprintln!("Error sorting {}: {e}", path.display());
            }
        }
    }
    failed
}

/// Process files in parallel using Rayon
///
/// Returns whether any file failed or was found unsorted in check mode.
fn process_files_parallel(
    files: &[PathBuf],
    base_config: Option<&Config>,
    report_config: &Config,
    args: &CliArgs,
) -> bool {
    let unchanged_count = AtomicUsize::new(0);
    let changed_count = AtomicUsize::new(0);
    let skipped_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);

    files
        .par_iter()
        .for_each(|path| match process_path(path, base_config, args) {
            Ok(FileStatus::Unchanged) => {
                unchanged_count.fetch_add(1, Ordering::Relaxed);
            }
            Ok(FileStatus::Changed) => {
                changed_count.fetch_add(1, Ordering::Relaxed);
            }
            Ok(FileStatus::Skipped) => {
                skipped_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error_count.fetch_add(1, Ordering::Relaxed);
                eprintln!("Error sorting {}: {e}", path.display());
            }
        });

    let unchanged = unchanged_count.load(Ordering::Relaxed);
    let changed = changed_count.load(Ordering::Relaxed);
    let skipped = skipped_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);

    if !report_config.quiet {
        let total = unchanged + changed + skipped + errors;
        let changed_label = if args.check_only { "unsorted" } else { "fixed" };
        eprintln!(
            "{total} files processed: {changed} {changed_label}, {unchanged} unchanged, \
             {skipped} skipped, {errors} errors."
        );
    }

    errors > 0 || (args.check_only && changed > 0)
}

/// Report a skip, which only counts as a failure when not intentional
fn skipped(path: &Path, error: SortError, config: &Config) -> Result<FileStatus> {
    if error.is_skip() {
        if config.verbose {
            eprintln!("Skipped {}", path.display());
        }
        Ok(FileStatus::Skipped)
    } else {
        Err(error.into())
    }
}

/// Process a single file
fn process_single_file(path: &Path, config: &Config, args: &CliArgs) -> Result<FileStatus> {
    // Check file size BEFORE reading to prevent memory exhaustion
    let file_size = std::fs::metadata(path)?.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        if !config.quiet {
            eprintln!(
                "Skipping {} ({} MB exceeds limit of {} MB)",
                path.display(),
                file_size / (1024 * 1024),
                DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
            );
        }
        return Ok(FileStatus::Skipped);
    }

    if args.check_only {
        return match check_file_with_config(path, config, args.diff, args.disregard_skip) {
            Ok(true) => Ok(FileStatus::Unchanged),
            Ok(false) => Ok(FileStatus::Changed),
            Err(e) => skipped(path, e, config),
        };
    }

    let sorted = match sort_file_with_config(path, config, args.disregard_skip) {
        Ok(sorted) => sorted,
        Err(e) => return skipped(path, e, config),
    };

    if args.stdout {
        io::stdout().write_all(sorted.sorted.as_bytes())?;
        return Ok(if sorted.is_changed() {
            FileStatus::Changed
        } else {
            FileStatus::Unchanged
        });
    }

    if args.diff {
        if sorted.is_changed() {
            print!(
                "{}",
                unified_diff(&sorted.source.contents, &sorted.sorted, Some(path))
            );
            return Ok(FileStatus::Changed);
        }
        return Ok(FileStatus::Unchanged);
    }

    if sorted.write_back()? {
        if !config.quiet {
            eprintln!("Fixing {}", path.display());
        }
        Ok(FileStatus::Changed)
    } else {
        Ok(FileStatus::Unchanged)
    }
}

/// Process input from stdin, output to stdout
///
/// Streams line by line unless a whole-content feature (atomic mode or
/// check mode) needs the complete input. Returns whether check mode found
/// the input unsorted.
fn process_stdin(config: &Config, args: &CliArgs) -> Result<bool> {
    if !config.atomic && !args.check_only && !args.diff {
        let stdin = io::stdin();
        let mut stdout = io::stdout().lock();
        sort_stream(BufReader::new(stdin.lock()), &mut stdout, "py", config)?;
        return Ok(false);
    }

    let mut contents = String::new();
    io::stdin().read_to_string(&mut contents)?;

    #[allow(clippy::cast_possible_truncation)]
    let size = contents.len() as u64;
    if size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "stdin input too large ({} MB exceeds limit of {} MB)",
            size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    if args.check_only {
        let checked = check_imports(
            &contents,
            "py",
            config,
            None,
            args.diff,
            args.disregard_skip,
        );
        return match checked {
            Ok(sorted) => Ok(!sorted),
            Err(e) if e.is_skip() => Ok(false),
            Err(e) => Err(e.into()),
        };
    }

    let sorted = match sort_imports(&contents, "py", config, None, args.disregard_skip) {
        Ok(sorted) => sorted,
        Err(e) if e.is_skip() => contents.clone(),
        Err(e) => return Err(e.into()),
    };

    if args.diff {
        print!("{}", unified_diff(&contents, &sorted, None));
    } else {
        io::stdout().write_all(sorted.as_bytes())?;
    }
    Ok(false)
}

fn print_usage() {
    println!(
        "impsort v{} - Python import sorter",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Sorts import sections and leaves every other line untouched.");
    println!();
    println!("Usage:");
    println!("  impsort [OPTIONS] <FILE|DIR>...");
    println!("  impsort [OPTIONS] -              # Read from stdin");
    println!("  cat mod.py | impsort             # Pipe input");
    println!();
    println!("Examples:");
    println!("  impsort mod.py                   # Sort a single file in-place");
    println!("  impsort src/                     # Sort every Python file under src/");
    println!("  impsort -c --diff src/           # Report unsorted files with diffs");
    println!("  impsort --atomic mod.py          # Refuse output with syntax errors");
    println!("  impsort --stdout mod.py          # Output to stdout");
    println!();
    println!("Options:");
    println!("  -c, --check-only                 Check without modifying files");
    println!("  -d, --diff                       Show a unified diff instead of writing");
    println!("  -a, --atomic                     Only write syntactically valid output");
    println!("      --stdout                     Write output to stdout");
    println!("  -l, --line-length <NUM>          Max line length [default: 79]");
    println!("      --line-ending <lf|crlf|cr>   Line separator [default: inferred]");
    println!("      --force-single-line          One 'from' import per name");
    println!("      --ignore-whitespace          Ignore whitespace when checking");
    println!("  -s, --skip <NAME>                Skip a file or directory name");
    println!("      --skip-glob <PATTERN>        Skip paths matching a glob");
    println!("      --disregard-skip             Sort skipped files anyway");
    println!("      --settings-path <FILE>       Use a specific config file");
    println!("  -j, --jobs <NUM>                 Parallel jobs (0=auto, 1=sequential)");
    println!("  -v, --verbose                    Report successes and skips");
    println!("  -q, --quiet                      Only report errors");
    println!("  -D, --debug                      Print debug information");
    println!();
    println!("Config files: impsort.toml, .impsort.toml (searched in parent directories)");
}
