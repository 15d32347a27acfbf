//! filetally - Inventory the kinds of files under a directory tree.
//!
//! Usage:
//!   filetally [PATH]                 Summarize PATH
//!   filetally scan [PATH]            Summarize with options
//!   filetally export [PATH]          Export the report as JSON
//!   filetally explain DESCRIPTION    Show how a description is normalized
//!   filetally --help                 Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use filetally_classify::{Normalizer, Vocabulary};
use filetally_core::{ClassifierConfig, ScanConfig, TallyReport};
use filetally_scan::{FileCommandSniffer, Tally, TallyEvent, TreeScanner};

#[derive(Parser)]
#[command(
    name = "filetally",
    version,
    about = "Inventory the kinds of files under a directory tree",
    long_about = "filetally walks a directory tree, describes every regular file with \
                  file(1), folds the descriptions into distinct kinds and counts them.\n\n\
                  Run `filetally [PATH]` for a quick summary, or use subcommands for \
                  more control."
)]
struct Cli {
    /// Path to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan and show a summary
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        walk: WalkArgs,

        /// Number of file kinds to list
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// List every file kind
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Export the report to JSON
    Export {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        walk: WalkArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show segments, fingerprints and the canonical form of a description
    Explain {
        /// Description as printed by file(1)
        description: String,

        /// Use the extended marker vocabulary
        #[arg(short, long)]
        extended: bool,
    },
}

#[derive(Args, Clone, Default)]
struct WalkArgs {
    /// Maximum depth to descend
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,

    /// Glob of entry names to skip (repeatable)
    #[arg(short, long = "ignore")]
    ignore: Vec<String>,

    /// Fold debug-info, strip and linkage details into flags
    #[arg(short = 'x', long)]
    extended: bool,

    /// Print every audited architecture hit with its path
    #[arg(long)]
    audit: bool,

    /// Program used to describe files [default: file]
    #[arg(long)]
    magic: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Command::Scan {
            path,
            walk,
            top,
            all,
            format,
        }) => {
            run_scan(&path, &walk, if all { None } else { Some(top) }, format)?;
        }
        Some(Command::Export { path, walk, output }) => {
            run_export(&path, &walk, output)?;
        }
        Some(Command::Explain {
            description,
            extended,
        }) => {
            run_explain(&description, extended);
        }
        None => {
            run_scan(&cli.path, &WalkArgs::default(), Some(20), OutputFormat::Text)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("FILETALLY_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Walk a tree and build the report.
fn collect(path: &Path, walk: &WalkArgs) -> Result<TallyReport> {
    let path = path.canonicalize().context("Invalid path")?;

    let scan_config = ScanConfig::builder()
        .root(&path)
        .max_depth(walk.max_depth)
        .include_hidden(!walk.no_hidden)
        .ignore_patterns(walk.ignore.clone())
        .build()
        .context("Invalid scan options")?;
    let classifier_config = ClassifierConfig::builder()
        .extended_markers(walk.extended)
        .build()
        .context("Invalid classifier options")?;

    let program = walk.magic.as_deref().unwrap_or("file");
    let sniffer = FileCommandSniffer::with_program(program);
    sniffer
        .probe()
        .with_context(|| format!("Cannot run `{program}`"))?;

    let audit = walk.audit;
    let tally = Tally::with_config(classifier_config).on_event(move |event| match event {
        TallyEvent::ArchitectureDetected {
            path, description, ..
        } => {
            if audit {
                println!("{}\n    {}", description, path.display());
            }
        }
        TallyEvent::SniffFailed { error, .. } => {
            eprintln!("### error: {error}");
        }
    });

    eprintln!("Scanning {}...", path.display());

    let scanner = TreeScanner::new();
    let report = scanner
        .scan_with(&scan_config, &sniffer, tally)
        .context("Scan failed")?;

    Ok(report)
}

/// Run a scan and display the summary.
fn run_scan(path: &Path, walk: &WalkArgs, top_n: Option<usize>, format: OutputFormat) -> Result<()> {
    let report = collect(path, walk)?;

    match format {
        OutputFormat::Text => print_summary(&report, top_n),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Export the report to JSON.
fn run_export(path: &Path, walk: &WalkArgs, output: Option<PathBuf>) -> Result<()> {
    let report = collect(path, walk)?;
    let json = serde_json::to_string_pretty(&report)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .with_context(|| format!("Cannot write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Print how a description is segmented and normalized.
fn run_explain(description: &str, extended: bool) {
    let normalizer = Normalizer::new(Vocabulary::with_extended(extended));

    println!("{:<40} {:<18} {:<36} policy", "segment", "fingerprint", "class");
    println!("{}", "─".repeat(104));
    for verdict in normalizer.verdicts(description) {
        println!(
            "{:<40} {} {:<36} {}",
            truncate(&format!("{:?}", verdict.segment.text), 40),
            verdict.segment.fingerprint,
            verdict.class.to_string(),
            verdict.policy
        );
    }

    let normalized = normalizer.normalize(description);
    let flags = normalized.classification;
    println!();
    println!("  canonical: {:?}", normalized.description);
    println!("fingerprint: {}", normalized.fingerprint);
    println!(
        "      flags: executable={} debug_info={} strip={} linkage={} arch={}",
        flags.executable,
        flags.has_debug_info,
        flags.strip_status,
        flags.linkage,
        flags
            .architecture
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
}

/// Print the counters and the most common kinds.
fn print_summary(report: &TallyReport, top_n: Option<usize>) {
    let counts = &report.counts;

    println!();
    println!("{}", "─".repeat(70));
    println!(" {}", report.root_path.display());
    println!(
        " {} kinds across {} files, scanned in {:.2}s",
        report.distinct_types(),
        report.classified_files(),
        report.scan_duration.as_secs_f64()
    );
    println!("{}", "─".repeat(70));
    println!();

    println!("           file count: {}", counts.files);

    let shown = match top_n {
        Some(n) => report.top(n),
        None => &report.types[..],
    };
    for kind in shown {
        println!("{:5}\t{}", kind.count, kind.description);
    }
    let remaining = report.types.len() - shown.len();
    if remaining > 0 {
        println!("  ... and {} more kinds", remaining);
    }

    println!("        symlink count: {}", counts.symlinks);
    println!("      directory count: {}", counts.directories);
    println!(" unreadable dir count: {}", counts.unreadable_directories);
    println!("        unknown count: {}", counts.unknown);

    if report.has_warnings() {
        println!();
        println!("{} warning(s) during scan", report.warnings.len());
    }
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max_len - 1).collect();
        cut.push('…');
        cut
    }
}
