use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::table::Item;

/// Validate the shape invariants of a set of items.
///
/// This checks:
/// - duplicate item labels
/// - every item has the same number of values
/// - every value is finite
pub fn validate_items(items: &[Item]) -> Result<()> {
    let mut labels = BTreeSet::new();
    let expected_rows = items.first().map(|item| item.values.len());

    for item in items {
        if !labels.insert(item.label.as_str()) {
            return Err(Error::InvalidTable(format!(
                "duplicate item label: {}",
                item.label
            )));
        }

        if let Some(expected) = expected_rows {
            if item.values.len() != expected {
                return Err(Error::InvalidTable(format!(
                    "item {} has {} values, expected {}",
                    item.label,
                    item.values.len(),
                    expected
                )));
            }
        }

        if let Some(row) = item.values.iter().position(|value| !value.is_finite()) {
            return Err(Error::InvalidTable(format!(
                "item {} has a non-finite value at row {}",
                item.label, row
            )));
        }
    }

    Ok(())
}
