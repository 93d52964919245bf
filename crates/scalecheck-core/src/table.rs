use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::legend::{ItemLegend, LegendEntry, short_label};
use crate::validation::validate_items;

/// A single questionnaire item: one column of responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable short label (e.g. `Item 1`).
    pub label: String,
    /// Original column name, kept for reporting only.
    pub source_name: String,
    /// One value per respondent, aligned by position across items.
    pub values: Vec<f64>,
}

/// Rectangular table of complete numeric responses.
///
/// Every item has the same number of values and every value is finite.
/// Rows with absent answers must be removed before a table is built.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    items: Vec<Item>,
    rows: usize,
}

impl NumericTable {
    /// Build a table from already-labelled items.
    pub fn new(items: Vec<Item>) -> Result<Self> {
        validate_items(&items)?;
        let rows = items.first().map(|item| item.values.len()).unwrap_or(0);
        Ok(Self { items, rows })
    }

    /// Build a table from `(column name, values)` pairs, labelling the
    /// columns `Item 1`, `Item 2`, ... in order.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let items = columns
            .into_iter()
            .enumerate()
            .map(|(idx, (name, values))| Item {
                label: short_label(idx),
                source_name: name.into(),
                values,
            })
            .collect();
        Self::new(items)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn labels(&self) -> Vec<String> {
        self.items.iter().map(|item| item.label.clone()).collect()
    }

    pub fn column(&self, index: usize) -> Option<&[f64]> {
        self.items.get(index).map(|item| item.values.as_slice())
    }

    pub fn legend(&self) -> ItemLegend {
        ItemLegend {
            entries: self
                .items
                .iter()
                .map(|item| LegendEntry {
                    label: item.label.clone(),
                    source_name: item.source_name.clone(),
                })
                .collect(),
        }
    }

    /// Per-respondent total score across every item.
    pub fn row_sums(&self) -> Vec<f64> {
        self.sum_rows(None)
    }

    /// Per-respondent total score across every item except `skip`.
    pub fn row_sums_excluding(&self, skip: usize) -> Vec<f64> {
        self.sum_rows(Some(skip))
    }

    fn sum_rows(&self, skip: Option<usize>) -> Vec<f64> {
        let mut sums = vec![0.0; self.rows];
        for (idx, item) in self.items.iter().enumerate() {
            if Some(idx) == skip {
                continue;
            }
            for (sum, value) in sums.iter_mut().zip(&item.values) {
                *sum += value;
            }
        }
        sums
    }

    /// Keep only the named items, in the order requested.
    ///
    /// Names match either the short label or the original column name.
    /// Items keep their labels so reports stay consistent with the legend.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut items = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let item = self
                .items
                .iter()
                .find(|item| item.label == name || item.source_name == name)
                .ok_or_else(|| Error::UnknownColumn(name.to_string()))?;
            if items.iter().any(|kept: &Item| kept.label == item.label) {
                return Err(Error::InvalidTable(format!(
                    "column selected more than once: {name}"
                )));
            }
            items.push(item.clone());
        }
        Self::new(items)
    }
}
