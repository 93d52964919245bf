//! Core contracts for scalecheck.
//!
//! This crate defines the numeric item table handed to the statistical
//! engines, the short-label legend carried alongside it, and the shape
//! validation shared by the loader and the engines.

pub mod error;
pub mod legend;
pub mod table;
pub mod validation;

pub use error::{Error, Result};
pub use legend::{ItemLegend, LegendEntry, short_label};
pub use table::{Item, NumericTable};
pub use validation::validate_items;

/// Current contract version for `metrics.json` artifacts.
pub const METRICS_VERSION: &str = "0.1";
