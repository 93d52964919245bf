use thiserror::Error;

/// Core error type shared across scalecheck crates.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// The table violates its shape invariants.
    #[error("invalid table: {0}")]
    InvalidTable(String),
    /// A column selection named a column that is not in the table.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// Convenience alias for results returned by scalecheck crates.
pub type Result<T> = std::result::Result<T, Error>;
