//! xamlfmt - Deterministic formatter for XAML markup

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, BufReader, Cursor, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use glob::Pattern;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use xamlfmt::process::{check_document, format_file, CheckOutcome};
use xamlfmt::{build_cli, parse_args, CliArgs, Config, Dialect, PartialConfig, Result};

/// XAML file extensions to process
const XAML_EXTENSIONS: &[&str] = &["xaml", "axaml"];

/// Files larger than this are skipped
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileStatus {
    Unchanged,
    Changed,
    Skipped,
}

fn main() -> Result<ExitCode> {
    let args = parse_args();
    init_logging(&args);

    if let Some(error) = args.validate() {
        anyhow::bail!("{error}");
    }

    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    if args.inputs.is_empty() && io::stdin().is_terminal() {
        build_cli().print_help()?;
        return Ok(ExitCode::SUCCESS);
    }

    if use_stdin {
        let config = build_config(&args, None)?;
        return process_stdin(&config, &args);
    }

    // An explicit config file applies to every input; otherwise each file
    // discovers its own.
    let base_config = if args.config.is_some() {
        Some(build_config(&args, None)?)
    } else {
        None
    };

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                tracing::warn!("failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args);
    if files.is_empty() {
        tracing::info!("No XAML files found to format.");
        return Ok(ExitCode::SUCCESS);
    }

    if args.write_to_stdout && files.len() != 1 {
        anyhow::bail!("--write-to-stdout accepts a single input file");
    }

    let failed = if args.write_to_stdout || args.jobs == Some(1) {
        process_files_sequential(&files, base_config.as_ref(), &args)
    } else {
        process_files_parallel(&files, base_config.as_ref(), &args)
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Install the stderr subscriber; `RUST_LOG` takes precedence over flags
fn init_logging(args: &CliArgs) {
    let default_level = if args.debug {
        "xamlfmt=debug"
    } else if args.silent {
        "xamlfmt=warn"
    } else {
        "xamlfmt=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Build configuration from CLI args and config files
///
/// If `for_path` is provided and no explicit config file is specified,
/// the nearest config file above that path is used.
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(config_path) = &args.config {
        tracing::debug!("Using explicit config file: {}", config_path.display());
        let partial = PartialConfig::from_file(config_path)?;
        Config::resolve(Some(&partial), &args.overrides)
    } else {
        let start = match for_path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir().unwrap_or_default(),
        };
        Config::from_discovered_file(&start, &args.overrides)
    };

    tracing::debug!("Configuration: {config:?}");

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

/// Collect all files to process, handling directories and recursive flag
fn collect_files(args: &CliArgs) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("ignoring invalid exclude pattern {p}: {e}");
                None
            }
        })
        .collect();

    let mut files = Vec::new();

    for input in &args.inputs {
        if input.is_file() {
            if (args.ignore_extension || is_xaml_file(input, &args.extensions))
                && !is_excluded(input, &exclude_patterns)
            {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            let max_depth = if args.recursive { 256 } else { 1 };
            // Symlink loops surface as walk errors and are skipped.
            for entry in WalkDir::new(input)
                .follow_links(true)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_map(std::result::Result::ok)
            {
                let path = entry.path();
                if path.is_file()
                    && is_xaml_file(path, &args.extensions)
                    && !is_excluded(path, &exclude_patterns)
                {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            tracing::warn!("{}: no such file or directory", input.display());
        }
    }

    files
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();

    patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path.components().any(|component| match component {
                std::path::Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                _ => false,
            })
    })
}

/// Check if a file has a XAML extension or one of the custom extensions
fn is_xaml_file(path: &Path, custom_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            XAML_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
                || custom_extensions.iter().any(|custom| {
                    let custom_ext = custom.strip_prefix('.').unwrap_or(custom);
                    ext.eq_ignore_ascii_case(custom_ext)
                })
        })
}

/// Resolve the config for one file and process it
fn run_file(path: &Path, base_config: Option<&Config>, args: &CliArgs) -> Result<FileStatus> {
    match base_config {
        Some(config) => process_single_file(path, config, args),
        None => {
            let config = build_config(args, Some(path))?;
            process_single_file(path, &config, args)
        }
    }
}

/// Record one file's result; returns whether it counts as a failure
fn report(path: &Path, result: &Result<FileStatus>, args: &CliArgs) -> bool {
    match result {
        Ok(status) => {
            let failed = args.passive && *status == FileStatus::Changed;
            if args.passive && *status != FileStatus::Skipped {
                println!("{} {}", if failed { "FAIL" } else { "PASS" }, path.display());
            }
            failed
        }
        Err(e) => {
            if args.passive {
                println!("FAIL {}", path.display());
            }
            tracing::error!("{}: {e:#}", path.display());
            true
        }
    }
}

/// Process files one after another; returns whether any file failed
fn process_files_sequential(files: &[PathBuf], base_config: Option<&Config>, args: &CliArgs) -> bool {
    let mut failures = 0;
    for path in files {
        let result = run_file(path, base_config, args);
        if report(path, &result, args) {
            failures += 1;
        }
    }
    print_summary(files.len(), failures, args);
    failures > 0
}

/// Process files in parallel using Rayon; returns whether any file failed
fn process_files_parallel(files: &[PathBuf], base_config: Option<&Config>, args: &CliArgs) -> bool {
    let changed_count = AtomicUsize::new(0);
    let failure_count = AtomicUsize::new(0);

    files.par_iter().for_each(|path| {
        let result = run_file(path, base_config, args);
        if matches!(result, Ok(FileStatus::Changed)) {
            changed_count.fetch_add(1, Ordering::Relaxed);
        }
        if report(path, &result, args) {
            failure_count.fetch_add(1, Ordering::Relaxed);
        }
    });

    let failures = failure_count.load(Ordering::Relaxed);
    if !args.passive {
        tracing::info!(
            "Processed {} files, {} reformatted.",
            files.len(),
            changed_count.load(Ordering::Relaxed)
        );
    }
    print_summary(files.len(), failures, args);
    failures > 0
}

fn print_summary(total: usize, failures: usize, args: &CliArgs) {
    if args.passive {
        println!("{} of {total} files passed.", total - failures);
    } else if failures > 0 {
        tracing::warn!("{failures} of {total} files could not be formatted.");
    }
}

/// Process a single file
fn process_single_file(path: &Path, config: &Config, args: &CliArgs) -> Result<FileStatus> {
    let file_size = std::fs::metadata(path)?.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        tracing::warn!(
            "Skipping {} ({} MB exceeds limit of {} MB)",
            path.display(),
            file_size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
        return Ok(FileStatus::Skipped);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let dialect = Dialect::for_path(path, config);
    let name = path.display().to_string();

    if args.passive {
        let outcome = check_document(&contents, config, &dialect)
            .with_context(|| format!("failed to style {name}"))?;
        return Ok(match outcome {
            CheckOutcome::Unchanged => FileStatus::Unchanged,
            CheckOutcome::Changed { .. } => FileStatus::Changed,
        });
    }

    let mut output = Vec::new();
    let changed = format_file(
        BufReader::new(Cursor::new(contents.as_bytes())),
        &mut output,
        config,
        &dialect,
        &name,
    )?;

    if args.write_to_stdout {
        io::stdout().write_all(&output)?;
    } else if changed {
        tracing::info!("Formatting: {name}");
        std::fs::write(path, &output)
            .with_context(|| format!("failed to write {name}"))?;
    } else {
        tracing::debug!("Unchanged: {name}");
    }

    Ok(if changed {
        FileStatus::Changed
    } else {
        FileStatus::Unchanged
    })
}

/// Process input from stdin, output to stdout
fn process_stdin(config: &Config, args: &CliArgs) -> Result<ExitCode> {
    let mut contents = Vec::new();
    io::stdin().read_to_end(&mut contents)?;

    #[allow(clippy::cast_possible_truncation)]
    let stdin_size = contents.len() as u64;
    if stdin_size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "stdin input too large ({} MB exceeds limit of {} MB)",
            stdin_size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    let dialect = Dialect::xaml(config);

    if args.passive {
        let text = String::from_utf8(contents).context("stdin: input is not valid UTF-8")?;
        let outcome = check_document(&text, config, &dialect)
            .context("failed to style stdin")?;
        let passed = outcome == CheckOutcome::Unchanged;
        println!("{} stdin", if passed { "PASS" } else { "FAIL" });
        return Ok(if passed {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let mut output = Vec::new();
    format_file(
        BufReader::new(Cursor::new(&contents)),
        &mut output,
        config,
        &dialect,
        "stdin",
    )?;
    io::stdout().write_all(&output)?;

    Ok(ExitCode::SUCCESS)
}
