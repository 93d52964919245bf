use thiserror::Error;

/// Errors raised when the data cannot support a requested statistic.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("{analysis} requires at least {required} items, found {found}")]
    InsufficientItems {
        analysis: &'static str,
        required: usize,
        found: usize,
    },
    #[error("{analysis} requires at least {required} respondents, found {found}")]
    InsufficientRows {
        analysis: &'static str,
        required: usize,
        found: usize,
    },
    #[error("total score variance is zero; alpha is undefined")]
    ZeroTotalVariance,
    #[error("column selection failed: {0}")]
    Selection(#[from] scalecheck_core::Error),
}

/// Result type for statistical operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Fail unless the table has at least `items` columns and two rows.
pub(crate) fn require_shape(
    analysis: &'static str,
    table: &scalecheck_core::NumericTable,
    items: usize,
) -> Result<()> {
    if table.item_count() < items {
        return Err(DomainError::InsufficientItems {
            analysis,
            required: items,
            found: table.item_count(),
        });
    }
    if table.row_count() < 2 {
        return Err(DomainError::InsufficientRows {
            analysis,
            required: 2,
            found: table.row_count(),
        });
    }
    Ok(())
}
