use anyhow::Context;
use clap::Parser;
use sheet_flatten::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheet-flatten")]
#[command(about = "Dissolve merged cells and flatten the header row of a spreadsheet.")]
#[command(long_about = "Sheet Flatten - merged header cleanup for Excel files

STEPS:
  1. Every merged range on the active sheet is dissolved; the top-left value
     is copied into each cell of the range.
     → <name>_unmerged.xlsx
  2. The de-merged sheet is loaded as a table and its first data row becomes
     the column names (blank cells become Column_<n>).
     → <name>_処理済_<YYYYMMDD-HHMMSS>.xlsx

SUPPORTED INPUT:
  .xlsx, .xlsm, .xls  (output files are always written as .xlsx)

EXAMPLES:
  sheet-flatten sales.xlsx
  sheet-flatten sales.xlsx --preview-rows 10 --verbose
  RUST_LOG=sheet_flatten=debug sheet-flatten sales.xlsx")]
#[command(version)]
struct Cli {
    /// Path to the spreadsheet to process
    input: Option<PathBuf>,

    /// Number of rows shown in the console preview (0 disables it)
    #[arg(short, long, default_value = "5", env = "SHEET_FLATTEN_PREVIEW_ROWS")]
    preview_rows: usize,

    /// Delete the intermediate _unmerged file after a successful run
    #[arg(long, env = "SHEET_FLATTEN_DISCARD_INTERMEDIATE")]
    discard_intermediate: bool,

    /// Show per-stage progress
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "sheet_flatten=info"
    } else {
        "sheet_flatten=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    // No input: fail silently with status 1
    let Ok(input) = cli::require_input(args.input) else {
        std::process::exit(1);
    };

    cli::process(
        input.clone(),
        args.preview_rows,
        args.discard_intermediate,
        args.verbose,
    )
    .with_context(|| format!("Failed to process {}", input.display()))
}
