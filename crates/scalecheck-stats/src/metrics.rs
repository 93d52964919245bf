use schemars::schema::RootSchema;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use scalecheck_core::{ItemLegend, METRICS_VERSION};

use crate::analysis::{AnalysisFailure, AnalysisOutcome};
use crate::correlation::CorrelationReport;
use crate::reliability::ReliabilityReport;

/// Machine-readable results of one analysis run (`metrics.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisMetrics {
    pub metrics_version: String,
    pub run_id: String,
    pub item_count: usize,
    pub respondent_count: usize,
    pub legend: ItemLegend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<ReliabilityReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AnalysisFailure>,
}

impl AnalysisMetrics {
    pub fn from_outcome(run_id: &str, outcome: &AnalysisOutcome) -> Self {
        Self {
            metrics_version: METRICS_VERSION.to_string(),
            run_id: run_id.to_string(),
            item_count: outcome.item_count,
            respondent_count: outcome.respondent_count,
            legend: outcome.legend.clone(),
            reliability: outcome.reliability_report().cloned(),
            correlation: outcome.correlation_report().cloned(),
            failures: outcome.failures(),
        }
    }
}

/// Emit the JSON Schema for `metrics.json`.
pub fn metrics_json_schema() -> RootSchema {
    schema_for!(AnalysisMetrics)
}
