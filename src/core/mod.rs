//! Core transformation stages

pub mod header_flattener;
pub mod merge_resolver;

pub use header_flattener::{column_labels, flatten};
pub use merge_resolver::{resolve, resolve_sheet, MergeResolver, ResolvedWorkbook};
