//! Single-row header flattening

use crate::error::{FlattenError, FlattenResult};
use crate::types::{CellValue, Table};

/// Prefix of the label given to columns whose header cell is blank
pub const PLACEHOLDER_PREFIX: &str = "Column_";

/// Labels for a header row: the cell text, or `Column_<n>` (1-based) when blank.
/// Duplicate labels are kept as they are.
pub fn column_labels(header: &[CellValue]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let text = cell.to_string();
            if text.is_empty() {
                format!("{}{}", PLACEHOLDER_PREFIX, idx + 1)
            } else {
                text
            }
        })
        .collect()
}

/// Turn row 0 into the column labels and drop it from the body
pub fn flatten(table: Table) -> FlattenResult<Table> {
    if table.is_empty() {
        return Err(FlattenError::EmptyTable);
    }

    let (_, rows) = table.into_parts();
    let mut rows = rows.into_iter();
    let header = rows.next().ok_or(FlattenError::EmptyTable)?;

    Ok(Table::new(column_labels(&header), rows.collect()))
}
