//! Spreadsheet reader - (.xlsx / .xlsm / .xls) → Workbook

use crate::error::{FlattenError, FlattenResult};
use crate::types::{CellValue, MergeRange, Sheet, Workbook};
use calamine::{open_workbook, Data, Dimensions, Range, Reader, Xls, Xlsx};
use quick_xml::events::Event;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Container formats the reader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Office Open XML workbook
    Xlsx,
    /// Office Open XML workbook with macros
    Xlsm,
    /// Legacy BIFF8 workbook
    Xls,
}

impl SpreadsheetFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> FlattenResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("xlsx") => Ok(SpreadsheetFormat::Xlsx),
            Some("xlsm") => Ok(SpreadsheetFormat::Xlsm),
            Some("xls") => Ok(SpreadsheetFormat::Xls),
            _ => Err(FlattenError::Format(format!(
                "Unsupported spreadsheet extension: {}",
                path.display()
            ))),
        }
    }
}

/// Reads every sheet of a workbook together with its merged ranges
pub struct WorkbookReader {
    path: PathBuf,
}

impl WorkbookReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn read(&self) -> FlattenResult<Workbook> {
        if !self.path.is_file() {
            return Err(FlattenError::NotFound(self.path.clone()));
        }

        match SpreadsheetFormat::from_path(&self.path)? {
            SpreadsheetFormat::Xlsx | SpreadsheetFormat::Xlsm => self.read_xlsx(),
            SpreadsheetFormat::Xls => self.read_xls(),
        }
    }

    fn read_xlsx(&self) -> FlattenResult<Workbook> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path)
            .map_err(|e| FlattenError::Format(format!("Failed to open Excel file: {}", e)))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                FlattenError::Format(format!("Failed to read sheet '{}': {}", name, e))
            })?;
            let mut sheet = sheet_from_range(&name, &range);

            if let Some(merges) = workbook.worksheet_merge_cells(&name) {
                let merges = merges.map_err(|e| {
                    FlattenError::Format(format!(
                        "Failed to read merged cells of '{}': {}",
                        name, e
                    ))
                })?;
                for dim in &merges {
                    sheet.merge(merge_from_dimensions(dim));
                }
            }

            debug!(sheet = %name, merges = sheet.merged_ranges().len(), "loaded sheet");
            sheets.push(sheet);
        }

        let active = read_active_tab(&self.path)?;
        Ok(Workbook::new(sheets, active))
    }

    /// BIFF files carry no active tab we can read, so the first sheet is used
    fn read_xls(&self) -> FlattenResult<Workbook> {
        let mut workbook: Xls<_> = open_workbook(&self.path)
            .map_err(|e| FlattenError::Format(format!("Failed to open Excel file: {}", e)))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                FlattenError::Format(format!("Failed to read sheet '{}': {}", name, e))
            })?;
            let mut sheet = sheet_from_range(&name, &range);

            for dim in workbook.worksheet_merge_cells(&name).unwrap_or_default() {
                sheet.merge(merge_from_dimensions(&dim));
            }

            debug!(sheet = %name, merges = sheet.merged_ranges().len(), "loaded sheet");
            sheets.push(sheet);
        }

        Ok(Workbook::new(sheets, 0))
    }
}

/// Copy a calamine range into a sheet at absolute worksheet coordinates
fn sheet_from_range(name: &str, range: &Range<Data>) -> Sheet {
    let mut sheet = Sheet::new(name);
    // used_cells() yields coordinates relative to range.start()
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    for (row, col, data) in range.used_cells() {
        let value = convert_value(data);
        if value.is_empty() {
            continue;
        }
        sheet.set_cell(start_row + row as u32 + 1, start_col + col as u32 + 1, value);
    }

    sheet
}

fn merge_from_dimensions(dim: &Dimensions) -> MergeRange {
    MergeRange::new(dim.start.0 + 1, dim.start.1 + 1, dim.end.0 + 1, dim.end.1 + 1)
}

fn convert_value(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// Index of the active sheet from `workbookView/@activeTab` in xl/workbook.xml
fn read_active_tab(path: &Path) -> FlattenResult<usize> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| FlattenError::Format(format!("Invalid workbook archive: {}", e)))?;

    let entry = match archive.by_name("xl/workbook.xml") {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(0),
        Err(e) => {
            return Err(FlattenError::Format(format!(
                "Failed to read xl/workbook.xml: {}",
                e
            )))
        }
    };

    let mut reader = quick_xml::Reader::from_reader(BufReader::new(entry));
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"workbookView" =>
            {
                let active = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.local_name().as_ref() == b"activeTab")
                    .and_then(|attr| {
                        std::str::from_utf8(&attr.value)
                            .ok()
                            .and_then(|v| v.trim().parse().ok())
                    })
                    .unwrap_or(0);
                return Ok(active);
            }
            Ok(Event::Eof) => return Ok(0),
            Err(e) => {
                return Err(FlattenError::Format(format!(
                    "Malformed xl/workbook.xml: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }
}
