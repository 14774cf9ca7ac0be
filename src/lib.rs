//! Sheet Flatten - merged header cleanup for Excel files
//!
//! This library dissolves merged cell ranges in a spreadsheet and collapses a
//! single header row into column names.
//!
//! # Stages
//!
//! - Merge resolution: every merged range on the active sheet takes its anchor
//!   (top-left) value in every cell, written to `<stem>_unmerged.xlsx`
//! - Header flattening: the de-merged sheet is loaded as a table and its first
//!   row becomes the column labels, written to `<stem>_処理済_<timestamp>.xlsx`
//!
//! # Example
//!
//! ```no_run
//! use sheet_flatten::pipeline::{run, PipelineConfig, SystemClock};
//! use std::path::Path;
//!
//! let outcome = run(Path::new("sales.xlsx"), &PipelineConfig::default(), &SystemClock)?;
//!
//! println!("Labels: {:?}", outcome.table.labels());
//! println!("Written: {}", outcome.output_path.display());
//! # Ok::<(), sheet_flatten::error::FlattenError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod naming;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use error::{FlattenError, FlattenResult};
pub use types::{CellValue, MergeRange, Sheet, Table, Workbook};
