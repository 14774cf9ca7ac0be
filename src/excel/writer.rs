//! Excel writer implementation - Workbook / Table → .xlsx

use crate::error::{FlattenError, FlattenResult};
use crate::types::{CellValue, Table, Workbook};
use rust_xlsxwriter::{Format, Formula, Worksheet};
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Sheet name used for flattened tables
pub const TABLE_SHEET_NAME: &str = "Sheet1";

/// Writes workbooks and tables to Office Open XML files
pub struct ExcelExporter {
    header_format: Format,
    date_format: Format,
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExcelExporter {
    pub fn new() -> Self {
        Self {
            header_format: Format::new().set_bold(),
            date_format: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }

    /// Write every sheet of the workbook, keeping merged ranges and the active sheet
    pub fn export_workbook(&self, workbook: &Workbook, output_path: &Path) -> FlattenResult<()> {
        let mut book = rust_xlsxwriter::Workbook::new();

        for (idx, sheet) in workbook.sheets.iter().enumerate() {
            let worksheet = book.add_worksheet();
            worksheet.set_name(&sheet.name).map_err(|e| {
                FlattenError::Export(format!("Failed to set worksheet name: {}", e))
            })?;

            // Merges go first; merge_range() blanks the anchor, values below restore it
            for range in sheet.merged_ranges() {
                if range.min_row == range.max_row && range.min_col == range.max_col {
                    continue;
                }
                worksheet
                    .merge_range(
                        range.min_row - 1,
                        to_col(range.min_col)?,
                        range.max_row - 1,
                        to_col(range.max_col)?,
                        "",
                        &Format::new(),
                    )
                    .map_err(|e| {
                        FlattenError::Export(format!("Failed to merge range {}: {}", range, e))
                    })?;
            }

            for (row, col, value) in sheet.used_cells() {
                self.write_cell_value(worksheet, row - 1, to_col(col)?, value)?;
            }

            if idx == workbook.active_index() {
                worksheet.set_active(true);
            }
        }

        save_atomically(&mut book, output_path)
    }

    /// Write a table as a header row of labels followed by its data rows
    pub fn export_table(&self, table: &Table, output_path: &Path) -> FlattenResult<()> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let worksheet = book.add_worksheet();
        worksheet.set_name(TABLE_SHEET_NAME).map_err(|e| {
            FlattenError::Export(format!("Failed to set worksheet name: {}", e))
        })?;

        for (col_idx, label) in table.labels().iter().enumerate() {
            worksheet
                .write_string_with_format(0, to_col(col_idx as u32 + 1)?, label, &self.header_format)
                .map_err(|e| FlattenError::Export(format!("Failed to write header: {}", e)))?;
        }

        for (row_idx, row) in table.rows().iter().enumerate() {
            // +1 for the header row
            let excel_row = u32::try_from(row_idx + 1)
                .map_err(|_| FlattenError::Export("Too many rows for a worksheet".to_string()))?;
            for (col_idx, value) in row.iter().enumerate() {
                self.write_cell_value(worksheet, excel_row, to_col(col_idx as u32 + 1)?, value)?;
            }
        }

        save_atomically(&mut book, output_path)
    }

    /// Write a single cell value; `Empty` leaves the cell blank
    fn write_cell_value(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        value: &CellValue,
    ) -> FlattenResult<()> {
        let result = match value {
            CellValue::Empty => return Ok(()),
            CellValue::Text(s) => worksheet.write_string(row, col, s),
            CellValue::Number(n) => worksheet.write_number(row, col, *n),
            CellValue::Boolean(b) => worksheet.write_boolean(row, col, *b),
            CellValue::DateTime(serial) => {
                worksheet.write_number_with_format(row, col, *serial, &self.date_format)
            }
            // an error literal formula with a cached result keeps the cell an error
            CellValue::Error(code) if is_error_literal(code) => worksheet.write_formula(
                row,
                col,
                Formula::new(format!("={}", code)).set_result(code.as_str()),
            ),
            CellValue::Error(code) => worksheet.write_string(row, col, code),
        };

        result.map(|_| ()).map_err(|e| {
            FlattenError::Export(format!("Failed to write cell ({}, {}): {}", row + 1, col + 1, e))
        })
    }
}

/// Error codes that round-trip as `t="e"` cells
fn is_error_literal(code: &str) -> bool {
    matches!(
        code,
        "#DIV/0!" | "#N/A" | "#NAME?" | "#NULL!" | "#NUM!" | "#REF!" | "#VALUE!"
    )
}

/// 1-based column number → 0-based worksheet column
fn to_col(col: u32) -> FlattenResult<u16> {
    col.checked_sub(1)
        .and_then(|c| u16::try_from(c).ok())
        .ok_or_else(|| FlattenError::Export(format!("Column {} is out of range", col)))
}

/// Render the workbook in memory, write it next to the target, then rename over it
fn save_atomically(book: &mut rust_xlsxwriter::Workbook, output_path: &Path) -> FlattenResult<()> {
    let buffer = book.save_to_buffer()?;

    let file_name = output_path.file_name().ok_or_else(|| {
        FlattenError::Export(format!("Invalid output path: {}", output_path.display()))
    })?;
    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp_path = output_path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp_path, &buffer).and_then(|_| fs::rename(&tmp_path, output_path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}
