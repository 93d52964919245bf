use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use scalecheck_ingest::{CleaningOptions, CleaningSummary};
use scalecheck_stats::{AnalysisMetrics, ItemDiagnostic};

use super::{RegistryError, RegistryResult};

/// Serializable options for runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    pub num_pairs: usize,
    pub diagnostics: Vec<ItemDiagnostic>,
    pub columns: Option<Vec<String>>,
    pub cleaning: CleaningOptions,
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub input: PathBuf,
    pub options: RunOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub input: String,
    pub options: RunOptions,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
    pub cleaned_path: PathBuf,
    pub cleaning_path: PathBuf,
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx
        .run_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let paths = RunPaths {
        config_path: root.join("config.json"),
        logs_path: root.join("logs.ndjson"),
        cleaned_path: root.join("cleaned.csv"),
        cleaning_path: root.join("cleaning.json"),
        metrics_path: root.join("metrics.json"),
        report_path: root.join("report.md"),
        root,
    };

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        input: ctx.input.display().to_string(),
        options: ctx.options.clone(),
        git: collect_git_info(),
    };

    write_json(&paths.config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

pub fn write_cleaning_summary(paths: &RunPaths, summary: &CleaningSummary) -> RegistryResult<()> {
    write_json(&paths.cleaning_path, summary)
}

pub fn write_metrics(paths: &RunPaths, metrics: &AnalysisMetrics) -> RegistryResult<()> {
    write_json(&paths.metrics_path, metrics)
}

pub fn write_report(paths: &RunPaths, report: &str) -> RegistryResult<()> {
    std::fs::write(&paths.report_path, report.as_bytes()).map_err(RegistryError::from)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_run_lays_out_artifacts() {
        let run_dir = std::env::temp_dir().join(format!("scalecheck_runs_{}", uuid::Uuid::new_v4()));
        let ctx = RunContext {
            run_id: "abc".to_string(),
            started_at: DateTime::parse_from_rfc3339("2026-10-18T09:30:00Z")
                .expect("timestamp")
                .with_timezone(&Utc),
            run_dir: run_dir.clone(),
            input: PathBuf::from("respostas.csv"),
            options: RunOptions {
                num_pairs: 5,
                diagnostics: vec![ItemDiagnostic::AlphaIfDeleted],
                columns: None,
                cleaning: CleaningOptions::default(),
            },
        };

        let paths = start_run(&ctx).expect("start run");

        assert_eq!(paths.root, run_dir.join("2026-10-18T09-30-00Z__run_abc"));
        assert!(paths.logs_path.exists());

        let config: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.config_path).expect("read"))
                .expect("parse config.json");
        assert_eq!(config["run_id"], "abc");
        assert_eq!(config["input"], "respostas.csv");
        assert_eq!(config["options"]["num_pairs"], 5);
        assert_eq!(config["options"]["cleaning"]["response_max"], 5);
    }
}
