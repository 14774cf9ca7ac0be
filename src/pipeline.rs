//! End-to-end run: resolve merges, reload, flatten, write the timestamped file

use crate::core::{flatten, MergeResolver};
use crate::error::FlattenResult;
use crate::excel::{ExcelExporter, WorkbookReader};
use crate::naming;
use crate::types::Table;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Timestamp layout embedded in output file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Source of the wall-clock time stamped into output names
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Run options
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Delete the `_unmerged` workbook once the final file is written
    pub discard_intermediate: bool,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub intermediate_path: PathBuf,
    /// False when the intermediate file was discarded after the run
    pub intermediate_kept: bool,
    pub output_path: PathBuf,
    pub timestamp: String,
    pub merges_resolved: usize,
    pub table: Table,
}

/// Load the active sheet of a workbook file as a table
pub fn load_table(path: &Path) -> FlattenResult<Table> {
    let workbook = WorkbookReader::new(path).read()?;
    Ok(workbook
        .active_sheet()
        .map(Table::from_sheet)
        .unwrap_or_default())
}

pub fn run(input: &Path, config: &PipelineConfig, clock: &dyn Clock) -> FlattenResult<PipelineOutcome> {
    let resolved = MergeResolver::new(input).resolve()?;

    let loaded = load_table(&resolved.output_path)?;
    info!(rows = loaded.height(), columns = loaded.width(), "intermediate table loaded");

    let table = flatten(loaded)?;

    let timestamp = format_timestamp(clock.now());
    let output_path = naming::processed_path(input, &timestamp)?;
    ExcelExporter::new().export_table(&table, &output_path)?;
    info!(output = %output_path.display(), rows = table.height(), "flattened table written");

    let intermediate_kept = if config.discard_intermediate {
        fs::remove_file(&resolved.output_path)?;
        false
    } else {
        true
    };

    Ok(PipelineOutcome {
        intermediate_path: resolved.output_path,
        intermediate_kept,
        output_path,
        timestamp,
        merges_resolved: resolved.ranges.len(),
        table,
    })
}
