use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use scalecheck_core::{ItemLegend, NumericTable};

use crate::correlation::{CorrelationEngine, CorrelationOptions, CorrelationReport};
use crate::errors::Result;
use crate::reliability::{ReliabilityEngine, ReliabilityOptions, ReliabilityReport};

/// Which analyses to run; `None` skips that analysis.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub reliability: Option<ReliabilityOptions>,
    pub correlation: Option<CorrelationOptions>,
}

impl AnalysisOptions {
    /// Both analyses with default options.
    pub fn all() -> Self {
        Self {
            reliability: Some(ReliabilityOptions::default()),
            correlation: Some(CorrelationOptions::default()),
        }
    }
}

/// Name of an analysis, used when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Reliability,
    Correlation,
}

/// An analysis that could not produce a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisFailure {
    pub analysis: AnalysisKind,
    pub message: String,
}

/// Results of the requested analyses over one table.
///
/// Each analysis succeeds or fails on its own.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub legend: ItemLegend,
    pub item_count: usize,
    pub respondent_count: usize,
    pub reliability: Option<Result<ReliabilityReport>>,
    pub correlation: Option<Result<CorrelationReport>>,
}

impl AnalysisOutcome {
    pub fn failures(&self) -> Vec<AnalysisFailure> {
        let mut failures = Vec::new();
        if let Some(Err(err)) = &self.reliability {
            failures.push(AnalysisFailure {
                analysis: AnalysisKind::Reliability,
                message: err.to_string(),
            });
        }
        if let Some(Err(err)) = &self.correlation {
            failures.push(AnalysisFailure {
                analysis: AnalysisKind::Correlation,
                message: err.to_string(),
            });
        }
        failures
    }

    pub fn has_failures(&self) -> bool {
        matches!(self.reliability, Some(Err(_))) || matches!(self.correlation, Some(Err(_)))
    }

    pub fn reliability_report(&self) -> Option<&ReliabilityReport> {
        self.reliability.as_ref().and_then(|result| result.as_ref().ok())
    }

    pub fn correlation_report(&self) -> Option<&CorrelationReport> {
        self.correlation.as_ref().and_then(|result| result.as_ref().ok())
    }
}

/// Run the requested analyses over `table`.
pub fn run_analyses(table: &NumericTable, options: &AnalysisOptions) -> AnalysisOutcome {
    info!(
        event = "analysis_started",
        items = table.item_count(),
        respondents = table.row_count()
    );

    let reliability = options.reliability.as_ref().map(|options| {
        let result = ReliabilityEngine::new(options.clone()).analyze(table);
        match &result {
            Ok(report) => info!(event = "reliability_finished", alpha = report.alpha),
            Err(err) => warn!(event = "reliability_failed", error = %err),
        }
        result
    });

    let correlation = options.correlation.as_ref().map(|options| {
        let result = CorrelationEngine::new(options.clone()).analyze(table);
        match &result {
            Ok(report) => info!(
                event = "correlation_finished",
                positive = report.top_positive.len(),
                negative = report.top_negative.len()
            ),
            Err(err) => warn!(event = "correlation_failed", error = %err),
        }
        result
    });

    AnalysisOutcome {
        legend: table.legend(),
        item_count: table.item_count(),
        respondent_count: table.row_count(),
        reliability,
        correlation,
    }
}
