use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scalecheck_ingest::CleaningOptions;
use scalecheck_stats::{DEFAULT_NUM_PAIRS, ItemDiagnostic};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "scalecheck.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings read from `scalecheck.toml`; command-line flags win over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalecheckConfig {
    /// Raw (for `clean`/`run`) or cleaned (for `alpha`/`correlate`) response file.
    pub input: Option<PathBuf>,
    /// Extra copy of the cleaned file written by `clean` and `run`.
    pub cleaned_output: Option<PathBuf>,
    /// Parent directory for run artifacts.
    pub run_dir: PathBuf,
    /// Pairs reported per direction by the correlation analysis.
    pub num_pairs: usize,
    /// Per-item diagnostics for the reliability analysis.
    pub diagnostics: Vec<ItemDiagnostic>,
    /// Restrict both analyses to these columns.
    pub columns: Option<Vec<String>>,
    pub cleaning: CleaningOptions,
}

impl Default for ScalecheckConfig {
    fn default() -> Self {
        Self {
            input: None,
            cleaned_output: None,
            run_dir: PathBuf::from("runs"),
            num_pairs: DEFAULT_NUM_PAIRS,
            diagnostics: vec![ItemDiagnostic::AlphaIfDeleted],
            columns: None,
            cleaning: CleaningOptions::default(),
        }
    }
}

/// Load the explicit config file, else `scalecheck.toml` if present, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<ScalecheckConfig, ConfigError> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            parse_config_file(path)
        }
        None => {
            let implicit = Path::new(DEFAULT_CONFIG_FILE);
            if implicit.exists() {
                parse_config_file(implicit)
            } else {
                Ok(ScalecheckConfig::default())
            }
        }
    }
}

fn parse_config_file(path: &Path) -> Result<ScalecheckConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::debug!(event = "config_loaded", path = %path.display());
    Ok(config)
}

/// Output path used by `clean` when none is configured: `<stem>_cleaned.csv`
/// next to the input.
pub fn default_cleaned_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "responses".to_string());
    input.with_file_name(format!("{stem}_cleaned.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ScalecheckConfig = toml::from_str(
            r#"
input = "respostas.csv"
num_pairs = 3
diagnostics = ["alpha_if_deleted", "item_total_correlation"]

[cleaning]
delimiter = ";"
response_max = 7
"#,
        )
        .expect("parse config");

        assert_eq!(config.input, Some(PathBuf::from("respostas.csv")));
        assert_eq!(config.num_pairs, 3);
        assert_eq!(config.run_dir, PathBuf::from("runs"));
        assert_eq!(
            config.diagnostics,
            vec![
                ItemDiagnostic::AlphaIfDeleted,
                ItemDiagnostic::ItemTotalCorrelation
            ]
        );
        assert_eq!(config.cleaning.delimiter, ';');
        assert_eq!(config.cleaning.response_min, 1);
        assert_eq!(config.cleaning.response_max, 7);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("scalecheck_{}.toml", uuid::Uuid::new_v4()));
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn cleaned_path_sits_next_to_input() {
        assert_eq!(
            default_cleaned_path(Path::new("data/respostas.csv")),
            PathBuf::from("data/respostas_cleaned.csv")
        );
    }
}
