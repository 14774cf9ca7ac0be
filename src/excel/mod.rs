//! Spreadsheet file I/O
//!
//! - Read: .xlsx / .xlsm / .xls → [`Workbook`](crate::types::Workbook) with merged ranges
//! - Write: workbook or flattened table → .xlsx

mod reader;
mod writer;

pub use reader::{SpreadsheetFormat, WorkbookReader};
pub use writer::{ExcelExporter, TABLE_SHEET_NAME};
