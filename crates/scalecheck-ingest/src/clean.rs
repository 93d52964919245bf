use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use scalecheck_core::{Item, NumericTable, short_label};

use crate::errors::{IngestError, Result};
use crate::options::CleaningOptions;
use crate::raw::RawTable;

/// Cell spellings read as "no answer".
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

/// One cleaned column; `None` marks an absent answer.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Numeric response table after cleaning, absences still present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanedTable {
    pub columns: Vec<CleanedColumn>,
}

/// What cleaning kept and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_in: usize,
    pub columns_in: usize,
    pub rows_out: usize,
    pub columns_out: usize,
    pub empty_rows_dropped: usize,
    pub unanswered_rows_dropped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub empty_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicate_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub out_of_range_columns: Vec<String>,
}

impl CleanedTable {
    pub fn row_count(&self) -> usize {
        self.columns
            .first()
            .map(|column| column.values.len())
            .unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// Render back to text cells, e.g. to write the cleaned file.
    pub fn to_raw(&self) -> RawTable {
        let rows = (0..self.row_count())
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| column.values[row].map(format_value).unwrap_or_default())
                    .collect()
            })
            .collect();
        RawTable {
            headers: self.column_names(),
            rows,
        }
    }

    /// Drop every row with an absent answer and label the surviving
    /// columns `Item 1`, `Item 2`, ...
    pub fn to_numeric_table(&self) -> Result<NumericTable> {
        self.complete_cases((0..self.column_count()).collect())
    }

    /// Keep only the named columns, then drop rows with an absent answer
    /// in any of them.
    ///
    /// Names match the original column name or the short label the column
    /// has in the full table, and items keep that label. Absences in columns
    /// that were not selected never remove a respondent.
    pub fn to_numeric_table_for<S: AsRef<str>>(&self, names: &[S]) -> Result<NumericTable> {
        let indices = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (0..self.column_count())
                    .find(|&idx| self.columns[idx].name == name || short_label(idx) == name)
                    .ok_or_else(|| {
                        IngestError::Table(scalecheck_core::Error::UnknownColumn(name.to_string()))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        self.complete_cases(indices)
    }

    fn complete_cases(&self, indices: Vec<usize>) -> Result<NumericTable> {
        if indices.is_empty() {
            return Err(IngestError::InvalidInput(
                "no response columns remain after cleaning".to_string(),
            ));
        }
        let complete_rows = (0..self.row_count())
            .filter(|&row| {
                indices
                    .iter()
                    .all(|&idx| self.columns[idx].values[row].is_some())
            })
            .collect::<Vec<_>>();
        if complete_rows.is_empty() {
            return Err(IngestError::InvalidInput(
                "no respondent answered every item".to_string(),
            ));
        }

        let dropped = self.row_count() - complete_rows.len();
        if dropped > 0 {
            warn!(
                event = "incomplete_rows_dropped",
                dropped = dropped,
                kept = complete_rows.len(),
                items = indices.len()
            );
        }

        let items = indices
            .into_iter()
            .map(|idx| {
                let column = &self.columns[idx];
                Item {
                    label: short_label(idx),
                    source_name: column.name.clone(),
                    values: complete_rows
                        .iter()
                        .filter_map(|&row| column.values[row])
                        .collect(),
                }
            })
            .collect();
        Ok(NumericTable::new(items)?)
    }
}

/// Apply the cleaning contract to a raw table.
///
/// Steps, in order:
/// 1. drop columns with no non-empty cell
/// 2. drop rows with no non-empty cell
/// 3. drop repeated column names, keeping the first
/// 4. coerce cells to numbers; anything non-numeric becomes absent
/// 5. keep columns holding at least one valid response
/// 6. drop rows left with no answer at all
pub fn clean(raw: &RawTable, options: &CleaningOptions) -> (CleanedTable, CleaningSummary) {
    let mut summary = CleaningSummary {
        rows_in: raw.row_count(),
        columns_in: raw.column_count(),
        ..CleaningSummary::default()
    };

    let mut columns: Vec<Stage<&str>> = raw
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| Stage {
            name: name.clone(),
            cells: raw
                .rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).filter(|cell| !is_missing(cell)))
                .collect(),
        })
        .collect();

    columns.retain(|column| {
        let keep = column.cells.iter().any(Option::is_some);
        if !keep {
            summary.empty_columns.push(column.name.clone());
        }
        keep
    });

    summary.empty_rows_dropped = drop_unanswered_rows(&mut columns, raw.row_count());
    let rows = raw.row_count() - summary.empty_rows_dropped;

    let mut seen = BTreeSet::new();
    columns.retain(|column| {
        let first = seen.insert(column.name.clone());
        if !first {
            summary.duplicate_columns.push(column.name.clone());
        }
        first
    });

    let mut numeric: Vec<Stage<f64>> = columns
        .into_iter()
        .map(|column| Stage {
            name: column.name,
            cells: column
                .cells
                .into_iter()
                .map(|cell| cell.and_then(parse_number))
                .collect(),
        })
        .collect();

    numeric.retain(|column| {
        let keep = column
            .cells
            .iter()
            .flatten()
            .any(|&value| options.is_valid_response(value));
        if !keep {
            summary.out_of_range_columns.push(column.name.clone());
        }
        keep
    });

    summary.unanswered_rows_dropped = drop_unanswered_rows(&mut numeric, rows);

    let table = CleanedTable {
        columns: numeric
            .into_iter()
            .map(|column| CleanedColumn {
                name: column.name,
                values: column.cells,
            })
            .collect(),
    };
    summary.rows_out = table.row_count();
    summary.columns_out = table.column_count();

    debug!(
        event = "cleaning_finished",
        rows_in = summary.rows_in,
        rows_out = summary.rows_out,
        columns_in = summary.columns_in,
        columns_out = summary.columns_out
    );

    (table, summary)
}

/// Intermediate column while cells move from text to numbers.
struct Stage<T> {
    name: String,
    cells: Vec<Option<T>>,
}

/// Drop rows where every column is absent; returns how many were dropped.
///
/// With no columns left every one of `rows` counts as dropped.
fn drop_unanswered_rows<T>(columns: &mut [Stage<T>], rows: usize) -> usize {
    if columns.is_empty() {
        return rows;
    }

    let keep = (0..rows)
        .map(|row| columns.iter().any(|column| column.cells[row].is_some()))
        .collect::<Vec<_>>();
    for column in columns.iter_mut() {
        let mut flags = keep.iter();
        column
            .cells
            .retain(|_| flags.next().copied().unwrap_or(false));
    }
    keep.iter().filter(|kept| !**kept).count()
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Integral values print without a fractional part (`3`, not `3.0`).
fn format_value(value: f64) -> String {
    value.to_string()
}
