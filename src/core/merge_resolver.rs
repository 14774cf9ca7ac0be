//! Merged cell resolution
//!
//! Every merged range on the active sheet is dissolved: the anchor (top-left)
//! value is copied into each cell the range covers and the grouping is removed.
//! Ranges in a valid workbook never overlap, so the order they are processed in
//! does not change the result.

use crate::error::{FlattenError, FlattenResult};
use crate::excel::{ExcelExporter, WorkbookReader};
use crate::naming;
use crate::types::{MergeRange, Sheet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of resolving a workbook file
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWorkbook {
    /// Path of the written `_unmerged` workbook
    pub output_path: PathBuf,
    /// Name of the sheet that was resolved
    pub sheet_name: String,
    /// Ranges that were dissolved
    pub ranges: Vec<MergeRange>,
}

/// Resolves merged ranges in a workbook file and writes the `_unmerged` copy
pub struct MergeResolver {
    input: PathBuf,
}

impl MergeResolver {
    pub fn new<P: AsRef<Path>>(input: P) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
        }
    }

    /// Read the input, resolve its active sheet, save the whole workbook
    pub fn resolve(&self) -> FlattenResult<ResolvedWorkbook> {
        let output_path = naming::unmerged_path(&self.input)?;
        let mut workbook = WorkbookReader::new(&self.input).read()?;

        let sheet = workbook.active_sheet_mut().ok_or_else(|| {
            FlattenError::Format(format!("Workbook has no sheets: {}", self.input.display()))
        })?;
        let sheet_name = sheet.name.clone();
        let ranges = resolve_sheet(sheet);

        ExcelExporter::new().export_workbook(&workbook, &output_path)?;
        info!(
            sheet = %sheet_name,
            merges = ranges.len(),
            output = %output_path.display(),
            "merged cells resolved"
        );

        Ok(ResolvedWorkbook {
            output_path,
            sheet_name,
            ranges,
        })
    }
}

/// Resolve the active sheet of `input` and return the path of the `_unmerged` file
pub fn resolve(input: &Path) -> FlattenResult<PathBuf> {
    MergeResolver::new(input).resolve().map(|r| r.output_path)
}

/// Dissolve every merged range of a sheet in place, returning the ranges handled
pub fn resolve_sheet(sheet: &mut Sheet) -> Vec<MergeRange> {
    let ranges = sheet.merged_ranges().to_vec();

    for range in &ranges {
        let (anchor_row, anchor_col) = range.anchor();
        let value = sheet.cell(anchor_row, anchor_col).clone();

        sheet.unmerge(range);

        for (row, col) in range.cells() {
            sheet.set_cell(row, col, value.clone());
        }
        debug!(range = %range, value = %value, "resolved merged range");
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn sample_sheet() -> Sheet {
        let mut sheet = Sheet::new("Data");
        sheet.set_cell(1, 1, "Region".into());
        sheet.set_cell(1, 2, "Q1".into());
        sheet.set_cell(2, 2, "Jan".into());
        sheet.set_cell(2, 3, "Feb".into());
        sheet.set_cell(3, 1, "North".into());
        sheet.set_cell(3, 2, 10.0.into());
        sheet.set_cell(3, 3, 20.0.into());
        sheet
    }

    #[test]
    fn test_no_merges_leaves_sheet_unchanged() {
        let mut sheet = sample_sheet();
        let before = sheet.clone();

        let ranges = resolve_sheet(&mut sheet);

        assert!(ranges.is_empty());
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_anchor_value_fills_range() {
        let mut sheet = sample_sheet();
        sheet.merge("A1:A2".parse().unwrap());
        sheet.merge("B1:C1".parse().unwrap());

        let ranges = resolve_sheet(&mut sheet);

        assert_eq!(ranges.len(), 2);
        assert!(sheet.merged_ranges().is_empty());
        assert_eq!(sheet.cell(2, 1), &CellValue::Text("Region".to_string()));
        assert_eq!(sheet.cell(1, 3), &CellValue::Text("Q1".to_string()));
        // cells outside the ranges are untouched
        assert_eq!(sheet.cell(2, 3), &CellValue::Text("Feb".to_string()));
    }

    #[test]
    fn test_anchor_value_overwrites_hidden_values() {
        let mut sheet = Sheet::new("Data");
        sheet.set_cell(1, 1, 1.0.into());
        sheet.set_cell(2, 2, "stale".into());
        sheet.merge(MergeRange::new(1, 1, 2, 2));

        resolve_sheet(&mut sheet);

        for (row, col) in MergeRange::new(1, 1, 2, 2).cells() {
            assert_eq!(sheet.cell(row, col), &CellValue::Number(1.0));
        }
    }

    #[test]
    fn test_empty_anchor_propagates_empty() {
        let mut sheet = Sheet::new("Data");
        sheet.set_cell(2, 1, "below".into());
        sheet.merge(MergeRange::new(1, 1, 1, 3));

        resolve_sheet(&mut sheet);

        assert_eq!(sheet.cell(1, 3), &CellValue::Empty);
        assert_eq!(sheet.cell(2, 1), &CellValue::Text("below".to_string()));
    }

    #[test]
    fn test_resolution_is_order_independent() {
        let ranges: Vec<MergeRange> = ["A1:A2", "B1:C1", "D3:E4"]
            .iter()
            .map(|r| r.parse().unwrap())
            .collect();

        let mut forward = sample_sheet();
        forward.set_cell(3, 4, "X".into());
        let mut backward = forward.clone();

        for range in &ranges {
            forward.merge(*range);
        }
        for range in ranges.iter().rev() {
            backward.merge(*range);
        }

        resolve_sheet(&mut forward);
        resolve_sheet(&mut backward);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_resolve_missing_file() {
        let result = resolve(Path::new("no_such_workbook.xlsx"));
        assert!(matches!(result, Err(FlattenError::NotFound(_))));
    }
}
