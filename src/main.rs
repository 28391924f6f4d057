use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use file_audit_rs::logging::init_logging;
use file_audit_rs::prelude::*;

/// Exit code for a completed run where something failed verification
const EXIT_VERIFY_FAILED: u8 = 1;
/// Exit code when the input itself is unusable
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "file_audit_rs")]
#[command(about = "Duplicate-key scanning and SHA-256 manifest verification", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report keys that occur more than once in a line-delimited file
    Dups {
        /// File with one key per line
        file: PathBuf,

        /// Also write the duplicate list to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify files against a JSON manifest of SHA-256 digests
    Verify {
        /// Manifest file: {"path": "sha256-hex", ...}
        manifest: PathBuf,

        /// Resolve relative manifest paths against this directory
        #[arg(long)]
        root: Option<PathBuf>,

        /// Verify entries in parallel
        #[arg(long)]
        parallel: bool,

        /// Number of parallel worker threads (default: number of CPUs)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Read buffer size in bytes
        #[arg(long, default_value_t = 64 * 1024)]
        buffer_size: usize,

        /// Run in batch mode (no progress bar)
        #[arg(long)]
        batch: bool,

        /// Also write a summary report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a manifest for the files in a directory
    Manifest {
        /// Directory to hash
        directory: PathBuf,

        /// Scan directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Write the manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Dups { file, output } => run_dups(file, output),
        Command::Verify {
            manifest,
            root,
            parallel,
            workers,
            buffer_size,
            batch,
            output,
        } => {
            if let Some(workers) = workers {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build_global()
                    .context("Failed to build thread pool")?;
            }
            let options = VerifyOptions {
                buffer_size,
                parallel: parallel || workers.is_some(),
            };
            run_verify(manifest, root, options, batch, output)
        }
        Command::Manifest {
            directory,
            recursive,
            output,
        } => run_manifest(directory, recursive, output),
    }
}

fn run_dups(file: PathBuf, output: Option<PathBuf>) -> Result<ExitCode> {
    let duplicates = find_duplicates_in_file(&file)?;

    for key in &duplicates {
        println!("{}", key);
    }
    tracing::info!(count = duplicates.len(), file = %file.display(), "duplicate keys found");

    if let Some(path) = output {
        write_duplicate_report(&path, &duplicates)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    Ok(ExitCode::SUCCESS)
}

fn run_verify(
    manifest_path: PathBuf,
    root: Option<PathBuf>,
    options: VerifyOptions,
    batch: bool,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let manifest = Manifest::from_path(&manifest_path)?;
    let source = match root {
        Some(root) => FsSource::with_root(root),
        None => FsSource::new(),
    };

    let progress = if batch {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(manifest.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let report = verify_with_progress(&manifest, &source, &options, &progress);
    progress.finish_and_clear();

    write_diagnostics(io::stdout().lock(), &report).context("Failed to write diagnostics")?;

    if let Some(path) = output {
        write_report(&path, &report)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    if report.all_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_VERIFY_FAILED))
    }
}

fn run_manifest(directory: PathBuf, recursive: bool, output: Option<PathBuf>) -> Result<ExitCode> {
    let manifest = Manifest::build(&directory, recursive)?;
    let json = manifest.to_json_pretty()?;

    match output {
        Some(path) => fs::write(&path, json + "\n")
            .with_context(|| format!("Failed to write manifest {}", path.display()))?,
        None => println!("{}", json),
    }

    Ok(ExitCode::SUCCESS)
}
