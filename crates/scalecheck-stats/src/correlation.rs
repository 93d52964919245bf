//! Pearson correlation matrix and strongest-pair ranking.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scalecheck_core::NumericTable;

use crate::descriptive::pearson;
use crate::errors::{Result, require_shape};

/// Default number of pairs reported per direction.
pub const DEFAULT_NUM_PAIRS: usize = 5;

/// Options for a correlation analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationOptions {
    pub num_pairs: usize,
    /// Restrict the analysis to these columns (labels or original names).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl Default for CorrelationOptions {
    fn default() -> Self {
        Self {
            num_pairs: DEFAULT_NUM_PAIRS,
            columns: None,
        }
    }
}

/// Sign of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
    None,
}

/// Magnitude band of |r|, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Magnitude {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl Magnitude {
    pub fn from_abs(abs_r: f64) -> Self {
        if abs_r >= 0.9 {
            Self::VeryStrong
        } else if abs_r >= 0.7 {
            Self::Strong
        } else if abs_r >= 0.4 {
            Self::Moderate
        } else if abs_r >= 0.2 {
            Self::Weak
        } else {
            Self::VeryWeak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryStrong => "Very Strong",
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
            Self::VeryWeak => "Very Weak",
        }
    }
}

/// Qualitative reading of a coefficient, e.g. `Negative Moderate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CorrelationStrength {
    pub direction: Direction,
    /// Absent when the coefficient is exactly zero.
    pub magnitude: Option<Magnitude>,
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.direction, self.magnitude) {
            (Direction::Positive, Some(magnitude)) => write!(f, "Positive {}", magnitude.label()),
            (Direction::Negative, Some(magnitude)) => write!(f, "Negative {}", magnitude.label()),
            _ => f.write_str("None"),
        }
    }
}

/// Classify a coefficient by sign and magnitude.
pub fn classify_correlation(r: f64) -> CorrelationStrength {
    let direction = if r > 0.0 {
        Direction::Positive
    } else if r < 0.0 {
        Direction::Negative
    } else {
        Direction::None
    };
    let magnitude = match direction {
        Direction::None => None,
        _ => Some(Magnitude::from_abs(r.abs())),
    };
    CorrelationStrength {
        direction,
        magnitude,
    }
}

/// Symmetric Pearson matrix over the table's items.
///
/// The diagonal is 1. Off-diagonal entries are `None` when either item has
/// zero variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.values.get(row)?.get(column).copied().flatten()
    }

    /// Every unordered pair of distinct items with a defined coefficient,
    /// in column-index order (`(0,1), (0,2), ..., (1,2), ...`).
    pub fn pairs(&self) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                if let Some(coefficient) = self.get(i, j) {
                    pairs.push(CorrelationPair::new(
                        &self.labels[i],
                        &self.labels[j],
                        coefficient,
                    ));
                }
            }
        }
        pairs
    }
}

/// Two distinct items and their correlation coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CorrelationPair {
    pub item_a: String,
    pub item_b: String,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
}

impl CorrelationPair {
    pub fn new(item_a: &str, item_b: &str, coefficient: f64) -> Self {
        Self {
            item_a: item_a.to_string(),
            item_b: item_b.to_string(),
            coefficient,
            strength: classify_correlation(coefficient),
        }
    }
}

/// Result of a correlation analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CorrelationReport {
    pub num_pairs: usize,
    pub respondent_count: usize,
    pub matrix: CorrelationMatrix,
    pub top_positive: Vec<CorrelationPair>,
    pub top_negative: Vec<CorrelationPair>,
}

/// Computes the correlation matrix and ranks its strongest pairs.
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine {
    options: CorrelationOptions,
}

impl CorrelationEngine {
    pub fn new(options: CorrelationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CorrelationOptions {
        &self.options
    }

    pub fn analyze(&self, table: &NumericTable) -> Result<CorrelationReport> {
        let selected;
        let table = match &self.options.columns {
            Some(columns) => {
                selected = table.select(columns)?;
                &selected
            }
            None => table,
        };

        let matrix = correlation_matrix(table)?;
        let pairs = matrix.pairs();
        let top_positive = top_positive_pairs(&pairs, self.options.num_pairs);
        let top_negative = top_negative_pairs(&pairs, self.options.num_pairs);

        debug!(
            event = "correlation_computed",
            items = matrix.size(),
            pairs = pairs.len(),
            positive = top_positive.len(),
            negative = top_negative.len()
        );

        Ok(CorrelationReport {
            num_pairs: self.options.num_pairs,
            respondent_count: table.row_count(),
            matrix,
            top_positive,
            top_negative,
        })
    }
}

/// Full Pearson matrix; needs at least two items and two respondents.
pub fn correlation_matrix(table: &NumericTable) -> Result<CorrelationMatrix> {
    require_shape("correlation", table, 2)?;

    let k = table.item_count();
    let mut values = vec![vec![None; k]; k];
    for i in 0..k {
        values[i][i] = Some(1.0);
        for j in (i + 1)..k {
            let r = pearson(&table.items()[i].values, &table.items()[j].values);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        labels: table.labels(),
        values,
    })
}

/// Up to `limit` pairs with r > 0, strongest first.
///
/// Only positive coefficients qualify, so the list is shorter than `limit`
/// when fewer than `limit` pairs are positive.
/// The sort is stable, so equal coefficients keep column-index order.
pub fn top_positive_pairs(pairs: &[CorrelationPair], limit: usize) -> Vec<CorrelationPair> {
    let mut ranked: Vec<CorrelationPair> = pairs
        .iter()
        .filter(|pair| pair.coefficient > 0.0)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| b.coefficient.total_cmp(&a.coefficient));
    ranked.truncate(limit);
    ranked
}

/// Up to `limit` pairs with r < 0, most negative first; may be shorter than
/// `limit` for the same reason.
pub fn top_negative_pairs(pairs: &[CorrelationPair], limit: usize) -> Vec<CorrelationPair> {
    let mut ranked: Vec<CorrelationPair> = pairs
        .iter()
        .filter(|pair| pair.coefficient < 0.0)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| a.coefficient.total_cmp(&b.coefficient));
    ranked.truncate(limit);
    ranked
}
