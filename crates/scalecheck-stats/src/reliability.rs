//! Cronbach's alpha and per-item reliability diagnostics.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use scalecheck_core::NumericTable;

use crate::descriptive::{VARIANCE_EPSILON, mean, pearson, sample_std_dev, sample_variance};
use crate::errors::{DomainError, Result, require_shape};

/// Per-item diagnostic reported next to the item statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemDiagnostic {
    /// Alpha recomputed with the item removed.
    AlphaIfDeleted,
    /// Correlation between the item and the sum of the other items.
    ItemTotalCorrelation,
}

/// Options for a reliability analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityOptions {
    pub diagnostics: Vec<ItemDiagnostic>,
    /// Restrict the scale to these columns (labels or original names).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl Default for ReliabilityOptions {
    fn default() -> Self {
        Self {
            diagnostics: vec![ItemDiagnostic::AlphaIfDeleted],
            columns: None,
        }
    }
}

/// Qualitative band for an alpha value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlphaBand {
    ExcellentRedundant,
    Excellent,
    Good,
    Acceptable,
    Questionable,
    Poor,
    Unacceptable,
}

impl AlphaBand {
    /// Bands are checked top-down; each lower bound is inclusive.
    pub fn classify(alpha: f64) -> Self {
        if alpha >= 0.95 {
            Self::ExcellentRedundant
        } else if alpha >= 0.90 {
            Self::Excellent
        } else if alpha >= 0.80 {
            Self::Good
        } else if alpha >= 0.70 {
            Self::Acceptable
        } else if alpha >= 0.60 {
            Self::Questionable
        } else if alpha >= 0.50 {
            Self::Poor
        } else {
            Self::Unacceptable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ExcellentRedundant => "Excellent (possible redundancy)",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Acceptable => "Acceptable",
            Self::Questionable => "Questionable",
            Self::Poor => "Poor",
            Self::Unacceptable => "Unacceptable",
        }
    }
}

impl fmt::Display for AlphaBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive statistics and diagnostics for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ItemStatistics {
    pub label: String,
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_if_deleted: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_total_correlation: Option<f64>,
}

/// A requested diagnostic that could not be computed for this scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticFailure {
    pub diagnostic: ItemDiagnostic,
    pub message: String,
}

/// Result of a reliability analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReliabilityReport {
    pub alpha: f64,
    pub band: AlphaBand,
    pub item_count: usize,
    pub respondent_count: usize,
    pub diagnostics: Vec<ItemDiagnostic>,
    pub items: Vec<ItemStatistics>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostic_failures: Vec<DiagnosticFailure>,
}

impl ReliabilityReport {
    /// Whether `diagnostic` was requested and computed.
    pub fn has_diagnostic(&self, diagnostic: ItemDiagnostic) -> bool {
        self.diagnostics.contains(&diagnostic)
            && !self
                .diagnostic_failures
                .iter()
                .any(|failure| failure.diagnostic == diagnostic)
    }
}

/// Computes Cronbach's alpha and item diagnostics over a numeric table.
#[derive(Debug, Clone, Default)]
pub struct ReliabilityEngine {
    options: ReliabilityOptions,
}

impl ReliabilityEngine {
    pub fn new(options: ReliabilityOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReliabilityOptions {
        &self.options
    }

    pub fn analyze(&self, table: &NumericTable) -> Result<ReliabilityReport> {
        let selected;
        let table = match &self.options.columns {
            Some(columns) => {
                selected = table.select(columns)?;
                &selected
            }
            None => table,
        };

        let alpha = cronbach_alpha(table)?;
        let mut diagnostic_failures = Vec::new();
        let mut run_diagnostic = |diagnostic: ItemDiagnostic,
                                  compute: fn(&NumericTable) -> Result<Vec<Option<f64>>>| {
            if !self.options.diagnostics.contains(&diagnostic) {
                return None;
            }
            match compute(table) {
                Ok(values) => Some(values),
                Err(err) => {
                    warn!(event = "diagnostic_skipped", diagnostic = ?diagnostic, error = %err);
                    diagnostic_failures.push(DiagnosticFailure {
                        diagnostic,
                        message: err.to_string(),
                    });
                    None
                }
            }
        };

        let alpha_if_deleted = run_diagnostic(ItemDiagnostic::AlphaIfDeleted, alpha_if_deleted);
        let item_total = run_diagnostic(
            ItemDiagnostic::ItemTotalCorrelation,
            item_total_correlations,
        );

        let items = table
            .items()
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let variance = sample_variance(&item.values).unwrap_or(0.0);
                ItemStatistics {
                    label: item.label.clone(),
                    mean: mean(&item.values).unwrap_or(0.0),
                    std_dev: sample_std_dev(&item.values).unwrap_or(0.0),
                    variance,
                    alpha_if_deleted: alpha_if_deleted.as_ref().and_then(|values| values[idx]),
                    item_total_correlation: item_total.as_ref().and_then(|values| values[idx]),
                }
            })
            .collect();

        let band = AlphaBand::classify(alpha);
        debug!(
            event = "reliability_computed",
            alpha = alpha,
            band = %band,
            items = table.item_count(),
            respondents = table.row_count()
        );

        Ok(ReliabilityReport {
            alpha,
            band,
            item_count: table.item_count(),
            respondent_count: table.row_count(),
            diagnostics: self.options.diagnostics.clone(),
            items,
            diagnostic_failures,
        })
    }
}

/// Cronbach's alpha over every item of the table.
///
/// Needs at least two items and two respondents, and a total score with
/// non-zero variance.
pub fn cronbach_alpha(table: &NumericTable) -> Result<f64> {
    require_shape("reliability", table, 2)?;
    let variances = item_variances(table);
    alpha_from_parts(
        table.item_count(),
        variances.iter().sum(),
        &table.row_sums(),
    )
    .ok_or(DomainError::ZeroTotalVariance)
}

/// Alpha recomputed once per item with that item left out.
///
/// Each reduced scale has k - 1 items, so at least three items are needed.
/// An entry is `None` when the remaining items have a constant total.
pub fn alpha_if_deleted(table: &NumericTable) -> Result<Vec<Option<f64>>> {
    require_shape("alpha-if-deleted", table, 3)?;
    let variances = item_variances(table);
    let total: f64 = variances.iter().sum();

    Ok((0..table.item_count())
        .map(|idx| {
            alpha_from_parts(
                table.item_count() - 1,
                total - variances[idx],
                &table.row_sums_excluding(idx),
            )
        })
        .collect())
}

/// Corrected item-total correlation: each item against the sum of the rest.
pub fn item_total_correlations(table: &NumericTable) -> Result<Vec<Option<f64>>> {
    require_shape("item-total correlation", table, 2)?;
    Ok(table
        .items()
        .iter()
        .enumerate()
        .map(|(idx, item)| pearson(&item.values, &table.row_sums_excluding(idx)))
        .collect())
}

fn item_variances(table: &NumericTable) -> Vec<f64> {
    table
        .items()
        .iter()
        .map(|item| sample_variance(&item.values).unwrap_or(0.0))
        .collect()
}

/// alpha = k / (k - 1) * (1 - sum(item variances) / var(total score))
fn alpha_from_parts(items: usize, item_variance_sum: f64, totals: &[f64]) -> Option<f64> {
    let total_variance = sample_variance(totals)?;
    if total_variance < VARIANCE_EPSILON || items < 2 {
        return None;
    }
    let k = items as f64;
    Some((k / (k - 1.0)) * (1.0 - item_variance_sum / total_variance))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn table(columns: &[&[f64]]) -> NumericTable {
        NumericTable::from_columns(
            columns
                .iter()
                .enumerate()
                .map(|(idx, values)| (format!("q{}", idx + 1), values.to_vec())),
        )
        .expect("valid table")
    }

    /// Five respondents answering a four-item scale.
    fn scale() -> NumericTable {
        table(&[
            &[4.0, 5.0, 3.0, 2.0, 4.0],
            &[4.0, 4.0, 3.0, 1.0, 5.0],
            &[3.0, 5.0, 2.0, 2.0, 4.0],
            &[5.0, 4.0, 3.0, 1.0, 4.0],
        ])
    }

    #[test]
    fn alpha_of_identical_items_is_one() {
        let column = [1.0, 3.0, 2.0, 5.0, 4.0];
        let alpha = cronbach_alpha(&table(&[&column, &column, &column])).expect("alpha");

        assert!((alpha - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn alpha_of_two_uncorrelated_equal_variance_items_is_zero() {
        let alpha =
            cronbach_alpha(&table(&[&[2.0, 2.0, 4.0, 4.0], &[2.0, 4.0, 2.0, 4.0]])).expect("alpha");

        assert!(alpha.abs() < TOLERANCE);
    }

    #[test]
    fn alpha_matches_hand_computation() {
        // item variances: 1.3, 2.3, 1.7, 2.3 (sum 7.6); totals 16,18,11,6,17 -> var 25.3
        let expected = (4.0 / 3.0) * (1.0 - 7.6 / 25.3);
        let alpha = cronbach_alpha(&scale()).expect("alpha");

        assert!((alpha - expected).abs() < TOLERANCE);
        assert_eq!(AlphaBand::classify(alpha), AlphaBand::Excellent);
    }

    #[test]
    fn alpha_if_deleted_matches_recomputed_subscale() {
        let full = scale();
        let deleted = alpha_if_deleted(&full).expect("alpha if deleted");

        for (idx, value) in deleted.iter().enumerate() {
            let keep: Vec<String> = full
                .labels()
                .into_iter()
                .enumerate()
                .filter(|(other, _)| *other != idx)
                .map(|(_, label)| label)
                .collect();
            let reduced = full.select(&keep).expect("select");
            let expected = cronbach_alpha(&reduced).expect("reduced alpha");
            assert!((value.expect("defined") - expected).abs() < TOLERANCE);
        }
    }

    #[test]
    fn alpha_if_deleted_needs_three_items() {
        let err = alpha_if_deleted(&table(&[&[1.0, 2.0, 3.0], &[2.0, 3.0, 5.0]])).unwrap_err();

        assert_eq!(
            err,
            DomainError::InsufficientItems {
                analysis: "alpha-if-deleted",
                required: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn single_column_is_a_domain_error() {
        let err = cronbach_alpha(&table(&[&[1.0, 2.0, 3.0]])).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientItems { found: 1, .. }));
    }

    #[test]
    fn single_respondent_is_a_domain_error() {
        let err = cronbach_alpha(&table(&[&[1.0], &[2.0]])).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientRows { found: 1, .. }));
    }

    #[test]
    fn constant_totals_are_a_domain_error() {
        let err = cronbach_alpha(&table(&[&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]])).unwrap_err();
        assert_eq!(err, DomainError::ZeroTotalVariance);
    }

    #[test]
    fn item_total_correlation_uses_remaining_items() {
        let full = scale();
        let correlations = item_total_correlations(&full).expect("item-total");

        let rest = full.row_sums_excluding(1);
        let expected = pearson(full.column(1).unwrap(), &rest).unwrap();
        assert!((correlations[1].unwrap() - expected).abs() < TOLERANCE);
        assert!(correlations.iter().all(|value| value.is_some()));
    }

    #[test]
    fn engine_reports_selected_diagnostics() {
        let engine = ReliabilityEngine::new(ReliabilityOptions {
            diagnostics: vec![
                ItemDiagnostic::AlphaIfDeleted,
                ItemDiagnostic::ItemTotalCorrelation,
            ],
            columns: None,
        });
        let report = engine.analyze(&scale()).expect("report");

        assert_eq!(report.item_count, 4);
        assert_eq!(report.respondent_count, 5);
        assert_eq!(report.items.len(), 4);
        assert_eq!(report.items[0].label, "Item 1");
        assert!((report.items[0].mean - 3.6).abs() < TOLERANCE);
        assert!((report.items[0].variance - 1.3).abs() < TOLERANCE);
        assert!((report.items[0].std_dev - 1.3_f64.sqrt()).abs() < TOLERANCE);
        assert!(report.items.iter().all(|item| item.alpha_if_deleted.is_some()));
        assert!(report.items.iter().all(|item| item.item_total_correlation.is_some()));
    }

    #[test]
    fn two_item_scale_keeps_alpha_when_alpha_if_deleted_is_unavailable() {
        let two_items = table(&[&[4.0, 5.0, 3.0, 2.0, 4.0], &[4.0, 4.0, 3.0, 1.0, 5.0]]);
        let expected = cronbach_alpha(&two_items).expect("alpha");

        let report = ReliabilityEngine::new(ReliabilityOptions {
            diagnostics: vec![
                ItemDiagnostic::AlphaIfDeleted,
                ItemDiagnostic::ItemTotalCorrelation,
            ],
            columns: None,
        })
        .analyze(&two_items)
        .expect("report");

        assert!((report.alpha - expected).abs() < TOLERANCE);
        assert_eq!(report.items.len(), 2);
        assert!(report.items.iter().all(|item| item.alpha_if_deleted.is_none()));
        assert!(report.items.iter().all(|item| item.item_total_correlation.is_some()));
        assert_eq!(report.diagnostic_failures.len(), 1);
        assert_eq!(
            report.diagnostic_failures[0].diagnostic,
            ItemDiagnostic::AlphaIfDeleted
        );
        assert!(report.diagnostic_failures[0].message.contains("at least 3 items"));
        assert!(!report.has_diagnostic(ItemDiagnostic::AlphaIfDeleted));
        assert!(report.has_diagnostic(ItemDiagnostic::ItemTotalCorrelation));
    }

    #[test]
    fn engine_default_omits_item_total_correlation() {
        let report = ReliabilityEngine::default().analyze(&scale()).expect("report");

        assert_eq!(report.diagnostics, vec![ItemDiagnostic::AlphaIfDeleted]);
        assert!(report.diagnostic_failures.is_empty());
        assert!(report.items.iter().all(|item| item.item_total_correlation.is_none()));
    }

    #[test]
    fn engine_restricts_to_selected_columns() {
        let engine = ReliabilityEngine::new(ReliabilityOptions {
            diagnostics: vec![ItemDiagnostic::ItemTotalCorrelation],
            columns: Some(vec!["q1".to_string(), "Item 3".to_string()]),
        });
        let report = engine.analyze(&scale()).expect("report");

        assert_eq!(report.item_count, 2);
        assert_eq!(report.items[1].label, "Item 3");

        let missing = ReliabilityEngine::new(ReliabilityOptions {
            diagnostics: vec![],
            columns: Some(vec!["q9".to_string()]),
        });
        assert!(matches!(
            missing.analyze(&scale()),
            Err(DomainError::Selection(_))
        ));
    }

    #[test]
    fn bands_use_inclusive_lower_bounds() {
        let cases = [
            (0.97, "Excellent (possible redundancy)"),
            (0.95, "Excellent (possible redundancy)"),
            (0.90, "Excellent"),
            (0.85, "Good"),
            (0.80, "Good"),
            (0.70, "Acceptable"),
            (0.60, "Questionable"),
            (0.50, "Poor"),
            (0.49, "Unacceptable"),
            (-0.3, "Unacceptable"),
        ];
        for (alpha, label) in cases {
            assert_eq!(AlphaBand::classify(alpha).label(), label, "alpha {alpha}");
        }
    }
}
