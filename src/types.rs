use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;

//==============================================================================
// Cell values
//==============================================================================

/// A single scalar held by a spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank or missing cell
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Excel serial date-time (days since 1899-12-30, fraction = time of day)
    DateTime(f64),
    /// Excel error literal such as `#DIV/0!`
    Error(String),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Convert an Excel serial number to a calendar date-time
    pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let millis = (serial * 86_400_000.0).round();
        if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
            return None;
        }
        epoch.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::DateTime(serial) => match Self::serial_to_datetime(*serial) {
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", serial),
            },
            CellValue::Error(code) => f.write_str(code),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

//==============================================================================
// Cell addressing
//==============================================================================

/// Convert a 1-based column number to Excel letters (1→A, 26→Z, 27→AA)
pub fn column_letter(col: u32) -> String {
    let mut result = String::new();
    let mut num = col;

    while num > 0 {
        let remainder = (num - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        num = (num - 1) / 26;
    }

    result
}

//==============================================================================
// Merged ranges
//==============================================================================

/// Rectangular merged region, 1-indexed and inclusive on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRange {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl MergeRange {
    /// Build a range from any two corners; bounds are normalized so min ≤ max
    pub fn new(row_a: u32, col_a: u32, row_b: u32, col_b: u32) -> Self {
        Self {
            min_row: row_a.min(row_b),
            max_row: row_a.max(row_b),
            min_col: col_a.min(col_b),
            max_col: col_a.max(col_b),
        }
    }

    /// The top-left cell, the only one holding a value while merged
    pub fn anchor(&self) -> (u32, u32) {
        (self.min_row, self.min_col)
    }

    /// Every (row, column) covered by the range, row-major
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let (min_col, max_col) = (self.min_col, self.max_col);
        (self.min_row..=self.max_row).flat_map(move |row| (min_col..=max_col).map(move |col| (row, col)))
    }
}

impl fmt::Display for MergeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_letter(self.min_col),
            self.min_row,
            column_letter(self.max_col),
            self.max_row
        )
    }
}

//==============================================================================
// Sheets and workbooks
//==============================================================================

/// One worksheet: a grid addressed by 1-indexed (row, column) plus its merges
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    cells: Vec<Vec<CellValue>>,
    merges: Vec<MergeRange>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            merges: Vec::new(),
        }
    }

    /// Value at (row, col); anything outside the grid reads as `Empty`
    pub fn cell(&self, row: u32, col: u32) -> &CellValue {
        if row == 0 || col == 0 {
            return &EMPTY_CELL;
        }
        self.cells
            .get(row as usize - 1)
            .and_then(|r| r.get(col as usize - 1))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Store a value, growing the grid as needed
    ///
    /// # Panics
    /// If `row` or `col` is 0.
    pub fn set_cell(&mut self, row: u32, col: u32, value: CellValue) {
        assert!(row >= 1 && col >= 1, "sheet coordinates are 1-indexed");
        let (r, c) = (row as usize - 1, col as usize - 1);
        if self.cells.len() <= r {
            self.cells.resize_with(r + 1, Vec::new);
        }
        let line = &mut self.cells[r];
        if line.len() <= c {
            line.resize(c + 1, CellValue::Empty);
        }
        line[c] = value;
    }

    pub fn merged_ranges(&self) -> &[MergeRange] {
        &self.merges
    }

    pub fn merge(&mut self, range: MergeRange) {
        if !self.merges.contains(&range) {
            self.merges.push(range);
        }
    }

    /// Drop a merge grouping; returns false if the range was not merged
    pub fn unmerge(&mut self, range: &MergeRange) -> bool {
        let before = self.merges.len();
        self.merges.retain(|m| m != range);
        self.merges.len() != before
    }

    /// Last row and column holding a non-empty value, (0, 0) for a blank sheet
    pub fn used_bounds(&self) -> (u32, u32) {
        let mut max_row = 0;
        let mut max_col = 0;
        for (r, line) in self.cells.iter().enumerate() {
            if let Some(c) = line.iter().rposition(|v| !v.is_empty()) {
                max_row = r as u32 + 1;
                max_col = max_col.max(c as u32 + 1);
            }
        }
        (max_row, max_col)
    }

    /// Non-empty cells as (row, col, value), row-major
    pub fn used_cells(&self) -> impl Iterator<Item = (u32, u32, &CellValue)> {
        self.cells.iter().enumerate().flat_map(|(r, line)| {
            line.iter()
                .enumerate()
                .filter(|(_, v)| !v.is_empty())
                .map(move |(c, v)| (r as u32 + 1, c as u32 + 1, v))
        })
    }
}

/// All sheets of a spreadsheet file plus which one is active
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    active: usize,
}

impl Workbook {
    /// Out-of-range `active` indices fall back to the first sheet
    pub fn new(sheets: Vec<Sheet>, active: usize) -> Self {
        let active = if active < sheets.len() { active } else { 0 };
        Self { sheets, active }
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_sheet(&self) -> Option<&Sheet> {
        self.sheets.get(self.active)
    }

    pub fn active_sheet_mut(&mut self) -> Option<&mut Sheet> {
        self.sheets.get_mut(self.active)
    }
}

//==============================================================================
// Tables
//==============================================================================

/// Rectangular rows of values with one label per column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    labels: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, padding short rows with `Empty` and missing labels with
    /// `Unnamed: <index>` so every row and the label list share one width
    pub fn new(mut labels: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(labels.len());

        for idx in labels.len()..width {
            labels.push(format!("Unnamed: {}", idx));
        }
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }

        Self { labels, rows }
    }

    /// Load a sheet the way a data-frame reader does: the first sheet row is
    /// taken as the header, the remaining used rows become the data body
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let (max_row, max_col) = sheet.used_bounds();
        if max_row == 0 {
            return Self::default();
        }

        let labels = (1..=max_col)
            .map(|col| match sheet.cell(1, col) {
                CellValue::Empty => format!("Unnamed: {}", col - 1),
                value => value.to_string(),
            })
            .collect();

        let rows = (2..=max_row)
            .map(|row| (1..=max_col).map(|col| sheet.cell(row, col).clone()).collect())
            .collect();

        Self::new(labels, rows)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.labels.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<CellValue>>) {
        (self.labels, self.rows)
    }
}
