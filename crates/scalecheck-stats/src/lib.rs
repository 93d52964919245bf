//! Reliability and correlation analysis for survey item tables.
//!
//! The engines are pure: they take a `NumericTable` and return serializable
//! reports. `report` renders those reports as markdown.

pub mod analysis;
pub mod correlation;
pub mod descriptive;
pub mod errors;
pub mod metrics;
pub mod reliability;
pub mod report;

pub use analysis::{AnalysisFailure, AnalysisKind, AnalysisOptions, AnalysisOutcome, run_analyses};
pub use correlation::{
    CorrelationEngine, CorrelationMatrix, CorrelationOptions, CorrelationPair, CorrelationReport,
    CorrelationStrength, DEFAULT_NUM_PAIRS, Direction, Magnitude, classify_correlation,
    correlation_matrix,
};
pub use errors::DomainError;
pub use metrics::{AnalysisMetrics, metrics_json_schema};
pub use reliability::{
    AlphaBand, DiagnosticFailure, ItemDiagnostic, ItemStatistics, ReliabilityEngine,
    ReliabilityOptions, ReliabilityReport, alpha_if_deleted, cronbach_alpha,
    item_total_correlations,
};
pub use report::render_report;
