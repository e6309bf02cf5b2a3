//! # CLI Module
//!
//! Command-line interface for the duplicate quarantine pipeline.
//!
//! ## Usage
//! ```bash
//! # Find duplicates and move them into ~/Photos/dupe
//! photo-quarantine scan ~/Photos
//!
//! # Looser matching, report only
//! photo-quarantine scan ~/Photos --threshold 0.9 --dry-run
//!
//! # JSON output
//! photo-quarantine scan ~/Photos --output json
//!
//! # Keep the largest file of every quarantined group
//! photo-quarantine prune ~/Photos/dupe
//!
//! # Strip the S<n>__ prefixes again
//! photo-quarantine rename ~/Photos/dupe
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_quarantine::core::pipeline::{Pipeline, PipelineResult, DEFAULT_THRESHOLD};
use photo_quarantine::core::quarantine::{PruneReport, QuarantineCurator, RenameReport};
use photo_quarantine::error::Result;
use photo_quarantine::events::{
    Event, EventChannel, HashEvent, NullSink, PipelineEvent, PipelinePhase, TracingLog,
};
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Quarantine - set perceptual duplicates aside for review
#[derive(Parser, Debug)]
#[command(name = "photo-quarantine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find duplicate photos in a folder and move them into `dupe`
    Scan {
        /// Folder to scan (not recursive)
        folder: PathBuf,

        /// Similarity needed to join a group (0.0-1.0, higher = stricter)
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        /// Hashing threads (default: CPU cores - 2)
        #[arg(long)]
        threads: Option<usize>,

        /// Report groups without moving any file
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Keep only the largest file of every S<n>__ group
    Prune {
        /// Quarantine folder
        folder: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Strip S<n>__ prefixes from file names
    Rename {
        /// Quarantine folder
        folder: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            folder,
            threshold,
            threads,
            dry_run,
            output,
            verbose,
        } => run_scan(folder, threshold, threads, dry_run, output, verbose),
        Commands::Prune { folder, output } => run_prune(&folder, output),
        Commands::Rename { folder, output } => run_rename(&folder, output),
    }
}

fn run_scan(
    folder: PathBuf,
    threshold: f64,
    threads: Option<usize>,
    dry_run: bool,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    // Print header
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Quarantine").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    // Build pipeline
    let mut builder = Pipeline::builder()
        .folder(&folder)
        .threshold(threshold)
        .dry_run(dry_run);
    if let Some(threads) = threads {
        builder = builder.workers(threads);
    }
    let pipeline = builder.build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(phase_label(phase));
                    }
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(p.total as u64);
                        pb.set_position(p.completed as u64);
                    }
                }
                Event::Hash(HashEvent::Skipped { path, message }) => {
                    if verbose {
                        if let Some(ref pb) = progress_clone {
                            pb.println(format!(
                                "  {} {}: {}",
                                style("skipped").yellow(),
                                display_path(&path),
                                message
                            ));
                        }
                    }
                }
                Event::Log { line } => {
                    tracing::debug!("{}", line);
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = result?;

    // Output results
    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, dry_run, verbose),
        OutputFormat::Json => print_json(&scan_json(&result, threshold, dry_run)),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn run_prune(folder: &Path, output: OutputFormat) -> Result<()> {
    let report = QuarantineCurator::prune(folder, &TracingLog)?;

    match output {
        OutputFormat::Pretty => print_prune_report(&Term::stdout(), &report),
        OutputFormat::Json => print_json(&serde_json::json!(report)),
        OutputFormat::Minimal => println!("{} {}", report.groups_kept, report.files_deleted),
    }

    Ok(())
}

fn run_rename(folder: &Path, output: OutputFormat) -> Result<()> {
    let report = QuarantineCurator::rename(folder, &NullSink)?;

    match output {
        OutputFormat::Pretty => print_rename_report(&Term::stdout(), &report),
        OutputFormat::Json => print_json(&serde_json::json!(report)),
        OutputFormat::Minimal => println!("{}", report.renamed),
    }

    Ok(())
}

fn phase_label(phase: PipelinePhase) -> &'static str {
    match phase {
        PipelinePhase::Hashing => "Hashing",
        PipelinePhase::Grouping => "Grouping",
        PipelinePhase::Quarantining => "Moving to dupe",
    }
}

fn print_pretty_results(term: &Term, result: &PipelineResult, dry_run: bool, verbose: bool) {
    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} photos hashed in {:.1}s",
        style(result.hashed).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if !result.skipped.is_empty() {
        term.write_line(&format!(
            "  {} photos could not be read",
            style(result.skipped.len()).yellow()
        ))
        .ok();
    }

    term.write_line(&format!(
        "  {} groups, {} photos",
        style(result.groups.len()).cyan(),
        style(result.grouped_photos()).cyan()
    ))
    .ok();

    if verbose {
        term.write_line(&format!(
            "  {}",
            style(format!(
                "decode {} ms, resize {} ms, dct {} ms",
                result.timings.decode.as_millis(),
                result.timings.resize.as_millis(),
                result.timings.dct.as_millis()
            ))
            .dim()
        ))
        .ok();
    }

    term.write_line("").ok();

    if result.groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("🎉").green()))
            .ok();
        return;
    }

    term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
        .ok();
    term.write_line("").ok();

    for group in &result.groups {
        term.write_line(&format!(
            "  {} {} ({} photos)",
            style(format!("Group {}:", group.id)).bold(),
            style(group.match_type).yellow(),
            group.len()
        ))
        .ok();

        for photo in &group.members {
            let marker = if photo == group.pivot() {
                style("★").green().to_string()
            } else {
                style("○").dim().to_string()
            };
            term.write_line(&format!("    {} {}", marker, display_path(photo)))
                .ok();
        }

        term.write_line("").ok();
    }

    // Footer
    match &result.moved {
        Some(moved) => {
            term.write_line(&format!(
                "{} {} files moved to {} (groups S{} onward)",
                style("→").cyan(),
                moved.files_moved,
                display_path(&moved.dupe_dir),
                moved.first_index
            ))
            .ok();
            for error in &moved.errors {
                term.write_line(&format!("  {} {}", style("✗").red(), error))
                    .ok();
            }
        }
        None if dry_run => {
            term.write_line(&format!(
                "{}",
                style("Dry run: no files were moved.").dim()
            ))
            .ok();
        }
        None => {}
    }
}

fn scan_json(result: &PipelineResult, threshold: f64, dry_run: bool) -> serde_json::Value {
    serde_json::json!({
        "threshold": threshold,
        "dry_run": dry_run,
        "total_photos": result.total_photos,
        "hashed": result.hashed,
        "skipped": result.skipped.iter().map(|s| {
            serde_json::json!({ "path": s.path, "reason": s.reason })
        }).collect::<Vec<_>>(),
        "groups": result.groups,
        "moved": result.moved,
        "timings_ms": {
            "decode": result.timings.decode.as_millis() as u64,
            "resize": result.timings.resize.as_millis() as u64,
            "dct": result.timings.dct.as_millis() as u64,
        },
        "duration_ms": result.duration_ms,
    })
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize output: {}", e),
    }
}

fn print_minimal_results(result: &PipelineResult) {
    for group in &result.groups {
        let paths: Vec<String> = group
            .members
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        println!("{}\t{}", group.id, paths.join("\t"));
    }
}

fn print_prune_report(term: &Term, report: &PruneReport) {
    for line in &report.logs {
        term.write_line(&format!("  {}", line)).ok();
    }
    for error in &report.errors {
        term.write_line(&format!("  {} {}", style("✗").red(), error))
            .ok();
    }
    term.write_line(&format!(
        "{} {} groups kept, {} files deleted",
        style("✓").green().bold(),
        style(report.groups_kept).cyan(),
        style(report.files_deleted).cyan()
    ))
    .ok();
}

fn print_rename_report(term: &Term, report: &RenameReport) {
    for line in &report.logs {
        term.write_line(&format!("  {}", line)).ok();
    }
    for error in &report.errors {
        term.write_line(&format!("  {} {}", style("!").yellow(), error))
            .ok();
    }
    term.write_line(&format!(
        "{} {} files renamed",
        style("✓").green().bold(),
        style(report.renamed).cyan()
    ))
    .ok();
}

/// `~/...` for paths under the home directory
fn display_path(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => match path.strip_prefix(&home) {
            Ok(relative) => format!("~/{}", relative.display()),
            Err(_) => path.display().to_string(),
        },
        None => path.display().to_string(),
    }
}
