//! cocomerge: resolve and merge per-image COCO annotation files.
//!
//! Labeling tools often export one small COCO document per image, each
//! numbering its images, categories and annotations from scratch. cocomerge
//! turns a directory of such files into one dataset in two stages:
//!
//! 1. [`resolve`] rewrites each file so annotations refer to their image by
//!    file name and their category by name (`a.json` -> `a.json1`).
//! 2. [`merge`] combines the resolved files, handing out fresh dense ids,
//!    deduplicating categories by name and re-keying annotations.
//!
//! # Modules
//!
//! - [`coco`]: document model and JSON I/O
//! - [`resolve`]: id-to-name resolution of single documents
//! - [`merge`]: multi-document merge with global id assignment
//! - [`discover`]: input file discovery
//! - [`report`]: per-run summaries
//! - [`error`]: error types

pub mod coco;
pub mod discover;
pub mod error;
pub mod merge;
pub mod policy;
pub mod report;
pub mod resolve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::CocoMergeError;
pub use policy::ReferencePolicy;

use merge::MergeOptions;
use report::RunReport;
use resolve::ResolveOptions;

/// The cocomerge CLI application.
#[derive(Parser)]
#[command(name = "cocomerge")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace image/category ids with names in every '*.json' file.
    Resolve(ResolveArgs),
    /// Merge every resolved '*.json1' file into one COCO dataset.
    Merge(MergeArgs),
    /// Run resolve, then merge, on one directory.
    Pipeline(MergeArgs),
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Directory holding the annotation files.
    dir: PathBuf,

    /// Fail on the first annotation whose image or category cannot be found.
    #[arg(long)]
    strict: bool,

    /// Format of the run report printed to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

impl CommonArgs {
    fn policy(&self) -> ReferencePolicy {
        if self.strict {
            ReferencePolicy::Strict
        } else {
            ReferencePolicy::Lenient
        }
    }
}

#[derive(clap::Args)]
struct ResolveArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args)]
struct MergeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output path of the merged dataset.
    #[arg(long, env = "COCOMERGE_OUTPUT", default_value = merge::DEFAULT_OUTPUT)]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the cocomerge CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CocoMergeError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Resolve(args)) => {
            let report = run_resolve(&args.common)?;
            emit_report(&report, args.common.report)
        }
        Some(Commands::Merge(args)) => {
            let report = run_merge(&args)?;
            emit_report(&report, args.common.report)
        }
        Some(Commands::Pipeline(args)) => {
            let resolve = run_resolve(&args.common)?;
            let merge = run_merge(&args)?;
            match args.common.report {
                ReportFormat::Json => print_json(&PipelineReport {
                    resolve: &resolve,
                    merge: &merge,
                }),
                ReportFormat::Text => {
                    print!("{}{}", resolve, merge);
                    Ok(())
                }
            }
        }
        None => {
            println!("cocomerge {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Resolve and merge per-image COCO annotation files.");
            println!();
            println!("Run 'cocomerge --help' for usage information.");
            Ok(())
        }
    }
}

fn run_resolve(args: &CommonArgs) -> Result<RunReport, CocoMergeError> {
    let inputs = discover::discover_files(&args.dir, resolve::RAW_EXTENSION)?;
    log_inputs(&args.dir, inputs.len(), resolve::RAW_EXTENSION);

    let options = ResolveOptions {
        policy: args.policy(),
    };
    resolve::resolve_files(&inputs, &options)
}

fn run_merge(args: &MergeArgs) -> Result<RunReport, CocoMergeError> {
    let inputs = discover::discover_files(&args.common.dir, resolve::RESOLVED_EXTENSION)?;
    log_inputs(&args.common.dir, inputs.len(), resolve::RESOLVED_EXTENSION);

    let options = MergeOptions {
        policy: args.common.policy(),
    };
    merge::merge_files(&inputs, &args.output, &options)
}

fn log_inputs(dir: &Path, count: usize, extension: &str) {
    if count == 0 {
        log::warn!("no '*.{}' files found in {}", extension, dir.display());
    } else {
        log::info!("found {} '*.{}' file(s) in {}", count, extension, dir.display());
    }
}

/// Both stage reports of a `pipeline` run, printed as one JSON object.
#[derive(Serialize)]
struct PipelineReport<'a> {
    resolve: &'a RunReport,
    merge: &'a RunReport,
}

fn emit_report(report: &RunReport, format: ReportFormat) -> Result<(), CocoMergeError> {
    match format {
        ReportFormat::Json => print_json(report),
        ReportFormat::Text => {
            print!("{}", report);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CocoMergeError> {
    let json =
        serde_json::to_string_pretty(value).map_err(|source| CocoMergeError::DocumentWrite {
            path: PathBuf::from("<stdout>"),
            source,
        })?;
    println!("{}", json);
    Ok(())
}
