use scalecheck_core::ItemLegend;

use crate::analysis::{AnalysisKind, AnalysisOutcome};
use crate::correlation::{CorrelationPair, CorrelationReport};
use crate::reliability::{ItemDiagnostic, ReliabilityReport};

/// Render a deterministic markdown report for every analysis in `outcome`.
pub fn render_report(outcome: &AnalysisOutcome) -> String {
    let mut lines = Vec::new();

    lines.push("# Scalecheck Analysis Report".to_string());
    lines.push(String::new());
    lines.push("## Summary".to_string());
    lines.push(format!("- items: {}", outcome.item_count));
    lines.push(format!("- respondents: {}", outcome.respondent_count));
    lines.push(String::new());

    if let Some(report) = outcome.reliability_report() {
        lines.push(render_reliability(report));
        lines.push(String::new());
    }

    if let Some(report) = outcome.correlation_report() {
        lines.push(render_correlation(report));
        lines.push(String::new());
    }

    let failures = outcome.failures();
    if !failures.is_empty() {
        lines.push("## Failed analyses".to_string());
        for failure in &failures {
            let name = match failure.analysis {
                AnalysisKind::Reliability => "reliability",
                AnalysisKind::Correlation => "correlation",
            };
            lines.push(format!("- {name}: {}", failure.message));
        }
        lines.push(String::new());
    }

    lines.push(render_legend(&outcome.legend));
    lines.join("\n")
}

/// Alpha, its band and the per-item table.
pub fn render_reliability(report: &ReliabilityReport) -> String {
    let mut lines = Vec::new();
    lines.push("## Reliability (Cronbach's alpha)".to_string());
    lines.push(format!("- alpha: {}", fixed(report.alpha)));
    lines.push(format!("- classification: {}", report.band));
    lines.push(format!(
        "- items: {} | respondents: {}",
        report.item_count, report.respondent_count
    ));
    lines.push(String::new());

    let with_deleted = report.has_diagnostic(ItemDiagnostic::AlphaIfDeleted);
    let with_item_total = report.has_diagnostic(ItemDiagnostic::ItemTotalCorrelation);

    let mut header = vec!["item", "mean", "std_dev", "variance"];
    if with_deleted {
        header.push("alpha_if_deleted");
    }
    if with_item_total {
        header.push("item_total_r");
    }
    push_table_header(&mut lines, &header);

    for item in &report.items {
        let mut cells = vec![
            item.label.clone(),
            fixed(item.mean),
            fixed(item.std_dev),
            fixed(item.variance),
        ];
        if with_deleted {
            cells.push(optional(item.alpha_if_deleted));
        }
        if with_item_total {
            cells.push(optional(item.item_total_correlation));
        }
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    if !report.diagnostic_failures.is_empty() {
        lines.push(String::new());
        for failure in &report.diagnostic_failures {
            lines.push(format!(
                "- {} unavailable: {}",
                diagnostic_name(failure.diagnostic),
                failure.message
            ));
        }
    }

    lines.join("\n")
}

/// Ranked pairs in both directions followed by the full matrix.
pub fn render_correlation(report: &CorrelationReport) -> String {
    let mut lines = Vec::new();
    lines.push("## Correlation (Pearson)".to_string());
    lines.push(String::new());

    lines.push(format!(
        "### Top {} positively correlated pairs",
        report.num_pairs
    ));
    push_pairs(&mut lines, &report.top_positive);
    lines.push(String::new());

    lines.push(format!(
        "### Top {} negatively correlated pairs",
        report.num_pairs
    ));
    push_pairs(&mut lines, &report.top_negative);
    lines.push(String::new());

    lines.push("### Correlation matrix".to_string());
    let matrix = &report.matrix;
    let mut header = vec![""];
    header.extend(matrix.labels.iter().map(String::as_str));
    push_table_header(&mut lines, &header);
    for (row, label) in matrix.labels.iter().enumerate() {
        let cells = (0..matrix.size())
            .map(|column| optional(matrix.get(row, column)))
            .collect::<Vec<_>>();
        lines.push(format!("| {} | {} |", label, cells.join(" | ")));
    }

    lines.join("\n")
}

/// Short label to original column name, one per line.
pub fn render_legend(legend: &ItemLegend) -> String {
    let mut lines = vec!["## Item legend".to_string()];
    for entry in &legend.entries {
        lines.push(format!("- {}: {}", entry.label, entry.source_name));
    }
    lines.join("\n")
}

fn diagnostic_name(diagnostic: ItemDiagnostic) -> &'static str {
    match diagnostic {
        ItemDiagnostic::AlphaIfDeleted => "alpha_if_deleted",
        ItemDiagnostic::ItemTotalCorrelation => "item_total_r",
    }
}

fn push_pairs(lines: &mut Vec<String>, pairs: &[CorrelationPair]) {
    if pairs.is_empty() {
        lines.push("_no pairs in this direction_".to_string());
        return;
    }
    push_table_header(lines, &["item_a", "item_b", "r", "classification"]);
    for pair in pairs {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            pair.item_a,
            pair.item_b,
            fixed(pair.coefficient),
            pair.strength
        ));
    }
}

fn push_table_header(lines: &mut Vec<String>, header: &[&str]) {
    lines.push(format!("| {} |", header.join(" | ")));
    lines.push(format!("|{}", " --- |".repeat(header.len())));
}

fn fixed(value: f64) -> String {
    format!("{value:.2}")
}

fn optional(value: Option<f64>) -> String {
    value.map(fixed).unwrap_or_else(|| "-".to_string())
}
