use std::path::PathBuf;
use thiserror::Error;

pub type FlattenResult<T> = Result<T, FlattenError>;

#[derive(Error, Debug)]
pub enum FlattenError {
    #[error("missing input file argument")]
    Usage,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Spreadsheet format error: {0}")]
    Format(String),

    #[error("Cannot flatten a table with no rows")]
    EmptyTable,

    #[error("Excel export error: {0}")]
    Export(String),
}

impl From<rust_xlsxwriter::XlsxError> for FlattenError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        FlattenError::Export(e.to_string())
    }
}
