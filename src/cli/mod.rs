//! # CLI Module
//!
//! Command-line interface for perceptual image hashing.
//!
//! ## Usage
//! ```bash
//! # Print the average hash of one image
//! imagehash photo.jpg
//!
//! # Hash several images with the wavelet hash
//! imagehash --hash wavelet a.png b.png
//!
//! # Preview renaming to the hash, keeping the original name as a prefix
//! imagehash --rename --dry-run --template '{path}/{name}-{hash}{ext}' *.jpg
//!
//! # JSON output for scripting
//! imagehash --output json *.jpg
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use imagehash_cli::core::batch::{BatchProcessor, BatchResult, FailurePolicy};
use imagehash_cli::core::hasher::{HashAlgorithmKind, DEFAULT_HASH_SIZE};
use imagehash_cli::core::reporter::{write_report, OutputFormat};
use imagehash_cli::core::template::Template;
use imagehash_cli::error::Result;
use imagehash_cli::events::{BatchEvent, Event, EventChannel, HashEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use tracing::{debug, warn};

/// Command line image hash
#[derive(Parser, Debug)]
#[command(name = "imagehash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Hash algorithm: average, perceptual, difference or wavelet
    #[arg(
        long = "hash",
        value_name = "ALGORITHM",
        default_value = "average",
        env = "IMAGEHASH_ALGORITHM",
        value_parser = parse_algorithm
    )]
    algorithm: HashAlgorithmKind,

    /// Rename each file after its hash
    #[arg(long)]
    rename: bool,

    /// Show the renames without performing them
    #[arg(long)]
    dry_run: bool,

    /// Template for rename (e.g. {path}/{hash}{ext})
    #[arg(long, env = "IMAGEHASH_TEMPLATE")]
    template: Option<String>,

    /// Hash size; 8 gives 64-bit hashes
    #[arg(long, default_value_t = DEFAULT_HASH_SIZE)]
    hash_size: u32,

    /// Carry on past files that can't be hashed or renamed
    #[arg(long)]
    keep_going: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputArg,

    /// Show a progress bar for multi-file batches
    #[arg(long)]
    progress: bool,

    /// Verbose logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    /// Image files to hash
    #[arg(value_name = "IMAGE", required = true, value_parser = existing_path)]
    images: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    /// Bare hash, or one `path<TAB>hash` line per file
    Text,
    /// JSON document for scripting
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(output: OutputArg) -> Self {
        match output {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

fn parse_algorithm(name: &str) -> Result<HashAlgorithmKind> {
    name.parse()
}

fn existing_path(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("path '{}' does not exist", value))
    }
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    imagehash_cli::init_tracing(cli.verbose);

    match run_batch(cli) {
        Ok(code) => code,
        Err(error) => {
            print_error(&error.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run_batch(cli: Cli) -> Result<ExitCode> {
    if cli.dry_run && !cli.rename {
        warn!("--dry-run has no effect without --rename");
    }

    let total = cli.images.len();
    let policy = if cli.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };

    let processor = BatchProcessor::builder()
        .paths(cli.images)
        .algorithm(cli.algorithm)
        .hash_size(cli.hash_size)
        .rename(cli.rename)
        .dry_run(cli.dry_run)
        .template(cli.template.map(Template::from))
        .failure_policy(policy)
        .build()?;

    debug!(files = total, algorithm = %cli.algorithm, "starting batch");

    let (sender, receiver) = EventChannel::new();

    let progress = (cli.progress && total > 1).then(|| {
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    });

    let progress_clone = progress.clone();

    // Announcements and progress are drawn off the processing thread
    let event_thread = thread::spawn(move || {
        let term = Term::stderr();
        for event in receiver.iter() {
            match event {
                Event::Rename(rename) => {
                    if let Some(line) = rename.announcement() {
                        match &progress_clone {
                            Some(pb) => pb.println(line),
                            None => {
                                term.write_line(&line).ok();
                            }
                        }
                    }
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.completed as u64);
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Batch(BatchEvent::Completed { .. } | BatchEvent::Aborted { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = processor.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let result = result?;

    if let Err(error) = write_report(&result, cli.output.into(), io::stdout().lock()) {
        print_error(&format!("could not write output: {}", error));
        return Ok(ExitCode::FAILURE);
    }

    Ok(exit_code(&result))
}

fn exit_code(result: &BatchResult) -> ExitCode {
    for failure in &result.failures {
        print_error(&failure.message);
    }

    if result.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_error(message: &str) {
    Term::stderr()
        .write_line(&format!("{} {}", style("error:").red().bold(), message))
        .ok();
}
