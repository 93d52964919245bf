//! Survey response loading and cleaning.
//!
//! Reads a delimited response file, applies the cleaning contract
//! (empty/duplicate column removal, numeric coercion, response-range
//! filtering) and hands the engines a complete-case `NumericTable`.

pub mod clean;
pub mod errors;
pub mod options;
pub mod output;
pub mod raw;

pub use clean::{CleanedColumn, CleanedTable, CleaningSummary, clean};
pub use errors::{IngestError, Result};
pub use options::CleaningOptions;
pub use output::write_cleaned_csv;
pub use raw::{RawTable, read_csv, read_csv_from_reader};

pub use scalecheck_core::NumericTable;

/// Read `path` and clean it in one step.
pub fn load_and_clean(
    path: &std::path::Path,
    options: &CleaningOptions,
) -> Result<(CleanedTable, CleaningSummary)> {
    let raw = read_csv(path, options)?;
    Ok(clean(&raw, options))
}
