//! Regionkit: region geometry and annotation-state engine.
//!
//! Regionkit is the data model and algorithm core behind an interactive
//! annotation editor: drawable regions (boxes, ellipses, polygons,
//! freehand masks, key points, text spans) with normalized geometry, the
//! coordinate transforms between the fixed 0–100 domain and the current
//! canvas pixel space, snapshot-based undo/redo, the wire-format results
//! codec, and the relation graph between regions. Rendering, pointer
//! routing, and network I/O live in the host editor; this crate is what
//! they call into.
//!
//! # Modules
//!
//! - [`geom`]: coordinate spaces, typed points, derived bounding boxes
//! - [`region`]: region entities and their geometry variants
//! - [`history`]: snapshot undo/redo with gesture freezing
//! - [`relations`]: the undirected region relation graph
//! - [`wire`]: the durable results codec
//! - [`tree`]: the aggregate annotation tree
//! - [`registry`]: the closed control-kind registry
//! - [`validation`]: annotation validation and error reporting
//! - [`error`]: error types for regionkit operations

pub mod error;
pub mod geom;
pub mod history;
pub mod region;
pub mod registry;
pub mod relations;
pub mod tree;
pub mod validation;
pub mod wire;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use geom::ItemViewport;
use tree::AnnotationTree;

pub use error::RegionKitError;

/// The regionkit CLI application.
#[derive(Parser)]
#[command(name = "regionkit")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a results file for errors and warnings.
    Validate(ValidateArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Results JSON file to validate.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the regionkit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), RegionKitError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            // No subcommand: just print help hint and exit successfully
            println!("regionkit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Region geometry and annotation-state engine.");
            println!();
            println!("Run 'regionkit --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), RegionKitError> {
    // Load the results and reconstruct the annotation; any malformed
    // record aborts here with a descriptive error.
    let results = wire::read_results_json(&args.input)?;
    let mut tree = AnnotationTree::new("image", ItemViewport::new(1, 1));
    tree.deserialize(&results)?;

    // Validate
    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_tree(&tree, &opts);

    // Output results
    match args.output.as_str() {
        "json" => {
            // Simple JSON output for programmatic use
            println!("{{");
            println!("  \"error_count\": {},", report.error_count());
            println!("  \"warning_count\": {},", report.warning_count());
            println!("  \"issues\": [");
            for (i, issue) in report.issues.iter().enumerate() {
                let comma = if i < report.issues.len() - 1 { "," } else { "" };
                println!("    {{");
                println!("      \"severity\": \"{:?}\",", issue.severity);
                println!("      \"code\": \"{:?}\",", issue.code);
                println!(
                    "      \"message\": \"{}\",",
                    issue.message.replace('"', "\\\"")
                );
                println!("      \"context\": \"{}\"", issue.context);
                println!("    }}{}", comma);
            }
            println!("  ]");
            println!("}}");
        }
        _ => {
            // Default text output
            print!("{}", report);
        }
    }

    // Determine exit status
    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(RegionKitError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}
