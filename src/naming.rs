//! Output file naming derived from the input path

use crate::error::{FlattenError, FlattenResult};
use crate::excel::SpreadsheetFormat;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const UNMERGED_SUFFIX: &str = "_unmerged";
pub const PROCESSED_MARKER: &str = "_処理済_";

/// `{stem}_unmerged{ext}` next to the input
pub fn unmerged_path(input: &Path) -> FlattenResult<PathBuf> {
    derived_path(input, UNMERGED_SUFFIX)
}

/// `{stem}_処理済_{timestamp}{ext}` next to the input
pub fn processed_path(input: &Path, timestamp: &str) -> FlattenResult<PathBuf> {
    derived_path(input, &format!("{}{}", PROCESSED_MARKER, timestamp))
}

fn derived_path(input: &Path, suffix: &str) -> FlattenResult<PathBuf> {
    let stem = input.file_stem().ok_or_else(|| {
        FlattenError::Format(format!("Input path has no file name: {}", input.display()))
    })?;

    let mut name = stem.to_os_string();
    name.push(suffix);
    name.push(".");
    name.push(output_extension(input)?);
    Ok(input.with_file_name(name))
}

/// The writer only emits Office Open XML, so only .xlsx inputs keep their extension
fn output_extension(input: &Path) -> FlattenResult<OsString> {
    match SpreadsheetFormat::from_path(input)? {
        SpreadsheetFormat::Xlsx => Ok(input.extension().unwrap_or_default().to_os_string()),
        SpreadsheetFormat::Xlsm | SpreadsheetFormat::Xls => Ok(OsString::from("xlsx")),
    }
}
