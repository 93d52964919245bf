mod config;
mod registry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{ConfigError, ScalecheckConfig, default_cleaned_path, load_config};
use registry::{
    RunContext, RunOptions, init_logging, start_run, write_cleaning_summary, write_metrics,
    write_report,
};
use scalecheck_core::NumericTable;
use scalecheck_ingest::{
    CleanedTable, CleaningOptions, IngestError, load_and_clean, write_cleaned_csv,
};
use scalecheck_stats::report::{render_correlation, render_legend, render_reliability};
use scalecheck_stats::{
    AnalysisMetrics, AnalysisOptions, CorrelationEngine, CorrelationOptions, DomainError,
    ItemDiagnostic, ReliabilityEngine, ReliabilityOptions, metrics_json_schema, render_report,
    run_analyses,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("input error: {0}")]
    Input(#[from] IngestError),
    #[error("analysis failed: {0}")]
    Domain(#[from] DomainError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "scalecheck",
    version,
    about = "Survey cleaning, Cronbach's alpha and Pearson correlation"
)]
struct Cli {
    /// Config file (defaults to ./scalecheck.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log progress to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a raw response file and write the numeric table.
    Clean(CleanArgs),
    /// Cronbach's alpha with per-item diagnostics.
    Alpha(AlphaArgs),
    /// Pearson correlation matrix and strongest pairs.
    Correlate(CorrelateArgs),
    /// Clean, run both analyses and record the run artifacts.
    Run(RunArgs),
    /// Print the JSON Schema for metrics.json.
    Schema,
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Response file to read.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
    /// Field delimiter.
    #[arg(long)]
    delimiter: Option<char>,
    /// Lowest valid answer on the response scale.
    #[arg(long, allow_negative_numbers = true)]
    response_min: Option<i64>,
    /// Highest valid answer on the response scale.
    #[arg(long, allow_negative_numbers = true)]
    response_max: Option<i64>,
}

#[derive(Args, Debug)]
struct CleanArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Where to write the cleaned file.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AlphaArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Restrict the scale to this column (repeatable; label or original name).
    #[arg(long = "column", value_name = "NAME")]
    columns: Vec<String>,
    /// Per-item diagnostic to report.
    #[arg(long, value_enum)]
    diagnostic: Option<DiagnosticArg>,
}

#[derive(Args, Debug)]
struct CorrelateArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Restrict the analysis to this column (repeatable; label or original name).
    #[arg(long = "column", value_name = "NAME")]
    columns: Vec<String>,
    /// Pairs to report per direction.
    #[arg(long)]
    pairs: Option<usize>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Restrict both analyses to this column (repeatable; label or original name).
    #[arg(long = "column", value_name = "NAME")]
    columns: Vec<String>,
    /// Pairs to report per direction.
    #[arg(long)]
    pairs: Option<usize>,
    /// Per-item diagnostic to report.
    #[arg(long, value_enum)]
    diagnostic: Option<DiagnosticArg>,
    /// Parent directory for run artifacts.
    #[arg(long, value_name = "PATH")]
    run_dir: Option<PathBuf>,
    /// Also write the cleaned file here.
    #[arg(long, value_name = "PATH")]
    cleaned_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DiagnosticArg {
    AlphaIfDeleted,
    ItemTotal,
    Both,
}

impl DiagnosticArg {
    fn diagnostics(self) -> Vec<ItemDiagnostic> {
        match self {
            Self::AlphaIfDeleted => vec![ItemDiagnostic::AlphaIfDeleted],
            Self::ItemTotal => vec![ItemDiagnostic::ItemTotalCorrelation],
            Self::Both => vec![
                ItemDiagnostic::AlphaIfDeleted,
                ItemDiagnostic::ItemTotalCorrelation,
            ],
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(event = "command_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;

    if !matches!(cli.command, Command::Run(_)) {
        init_logging(None, cli.verbose)?;
    }

    match cli.command {
        Command::Clean(args) => run_clean(&config, args),
        Command::Alpha(args) => run_alpha(&config, args),
        Command::Correlate(args) => run_correlate(&config, args),
        Command::Run(args) => run_pipeline(&config, args, cli.verbose),
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&metrics_json_schema())?);
            Ok(())
        }
    }
}

fn run_clean(config: &ScalecheckConfig, args: CleanArgs) -> Result<(), CliError> {
    let input = resolve_input(config, &args.input)?;
    let cleaning = resolve_cleaning(config, &args.input);
    let out = args
        .out
        .or_else(|| config.cleaned_output.clone())
        .unwrap_or_else(|| default_cleaned_path(&input));

    let (cleaned, summary) = load_and_clean(&input, &cleaning)?;
    write_cleaned_csv(&out, &cleaned)?;

    println!(
        "rows: {} -> {} | columns: {} -> {}",
        summary.rows_in, summary.rows_out, summary.columns_in, summary.columns_out
    );
    println!("cleaned file: {}", out.display());
    Ok(())
}

fn run_alpha(config: &ScalecheckConfig, args: AlphaArgs) -> Result<(), CliError> {
    let columns = resolve_columns(config, args.columns);
    let table = load_table(config, &args.input, columns.as_deref())?;
    let options = ReliabilityOptions {
        diagnostics: args
            .diagnostic
            .map(DiagnosticArg::diagnostics)
            .unwrap_or_else(|| config.diagnostics.clone()),
        columns: None,
    };

    let report = ReliabilityEngine::new(options).analyze(&table)?;
    println!("{}", render_reliability(&report));
    println!();
    println!("{}", render_legend(&table.legend()));
    Ok(())
}

fn run_correlate(config: &ScalecheckConfig, args: CorrelateArgs) -> Result<(), CliError> {
    let columns = resolve_columns(config, args.columns);
    let table = load_table(config, &args.input, columns.as_deref())?;
    let options = CorrelationOptions {
        num_pairs: resolve_pairs(config, args.pairs)?,
        columns: None,
    };

    let report = CorrelationEngine::new(options).analyze(&table)?;
    println!("{}", render_correlation(&report));
    println!();
    println!("{}", render_legend(&table.legend()));
    Ok(())
}

fn run_pipeline(config: &ScalecheckConfig, args: RunArgs, verbose: bool) -> Result<(), CliError> {
    let input = resolve_input(config, &args.input)?;
    let cleaning = resolve_cleaning(config, &args.input);
    let columns = resolve_columns(config, args.columns);
    let num_pairs = resolve_pairs(config, args.pairs)?;
    let diagnostics = args
        .diagnostic
        .map(DiagnosticArg::diagnostics)
        .unwrap_or_else(|| config.diagnostics.clone());

    let run_id = Uuid::new_v4().to_string();
    let ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir: args.run_dir.unwrap_or_else(|| config.run_dir.clone()),
        input: input.clone(),
        options: RunOptions {
            num_pairs,
            diagnostics: diagnostics.clone(),
            columns: columns.clone(),
            cleaning: cleaning.clone(),
        },
    };

    let paths = start_run(&ctx)?;
    init_logging(Some(&paths.logs_path), verbose)?;

    tracing::info!(event = "run_started", run_id = %run_id, input = %input.display());
    let timer = Instant::now();

    let (cleaned, summary) = load_and_clean(&input, &cleaning)?;
    write_cleaned_csv(&paths.cleaned_path, &cleaned)?;
    if let Some(out) = args.cleaned_out.or_else(|| config.cleaned_output.clone()) {
        write_cleaned_csv(&out, &cleaned)?;
    }
    write_cleaning_summary(&paths, &summary)?;

    let table = complete_cases(&cleaned, columns.as_deref())?;
    let options = AnalysisOptions {
        reliability: Some(ReliabilityOptions {
            diagnostics,
            columns: None,
        }),
        correlation: Some(CorrelationOptions {
            num_pairs,
            columns: None,
        }),
    };
    let outcome = run_analyses(&table, &options);

    let report = render_report(&outcome);
    println!("{report}");

    write_metrics(&paths, &AnalysisMetrics::from_outcome(&run_id, &outcome))?;
    tracing::info!(event = "metrics_written", path = %paths.metrics_path.display());
    write_report(&paths, &report)?;
    tracing::info!(event = "report_written", path = %paths.report_path.display());

    let duration_ms = timer.elapsed().as_millis();
    let status = if outcome.has_failures() { "partial" } else { "success" };
    tracing::info!(event = "run_finished", status = status, duration_ms = duration_ms);

    eprintln!("run artifacts: {}", paths.root.display());
    Ok(())
}

/// Read, clean and reduce the input to complete cases over `columns`.
fn load_table(
    config: &ScalecheckConfig,
    args: &InputArgs,
    columns: Option<&[String]>,
) -> Result<NumericTable, CliError> {
    let input = resolve_input(config, args)?;
    let (cleaned, _) = load_and_clean(&input, &resolve_cleaning(config, args))?;
    complete_cases(&cleaned, columns)
}

/// Narrow to the selected columns first so that absences elsewhere do not
/// drop respondents.
fn complete_cases(
    cleaned: &CleanedTable,
    columns: Option<&[String]>,
) -> Result<NumericTable, CliError> {
    let table = match columns {
        Some(columns) => cleaned.to_numeric_table_for(columns)?,
        None => cleaned.to_numeric_table()?,
    };
    Ok(table)
}

fn resolve_input(config: &ScalecheckConfig, args: &InputArgs) -> Result<PathBuf, CliError> {
    args.input
        .clone()
        .or_else(|| config.input.clone())
        .ok_or_else(|| {
            CliError::InvalidConfig(
                "no input file: pass --input or set `input` in the config file".to_string(),
            )
        })
}

fn resolve_cleaning(config: &ScalecheckConfig, args: &InputArgs) -> CleaningOptions {
    let mut cleaning = config.cleaning.clone();
    if let Some(delimiter) = args.delimiter {
        cleaning.delimiter = delimiter;
    }
    if let Some(min) = args.response_min {
        cleaning.response_min = min;
    }
    if let Some(max) = args.response_max {
        cleaning.response_max = max;
    }
    cleaning
}

fn resolve_columns(config: &ScalecheckConfig, columns: Vec<String>) -> Option<Vec<String>> {
    if columns.is_empty() {
        config.columns.clone()
    } else {
        Some(columns)
    }
}

fn resolve_pairs(config: &ScalecheckConfig, pairs: Option<usize>) -> Result<usize, CliError> {
    match pairs.unwrap_or(config.num_pairs) {
        0 => Err(CliError::InvalidConfig(
            "number of pairs must be at least 1".to_string(),
        )),
        pairs => Ok(pairs),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use scalecheck_ingest::CleanedColumn;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let config = ScalecheckConfig {
            input: Some(PathBuf::from("from_config.csv")),
            num_pairs: 7,
            columns: Some(vec!["Item 1".to_string()]),
            ..ScalecheckConfig::default()
        };
        let cli = Cli::parse_from([
            "scalecheck",
            "run",
            "--input",
            "from_flag.csv",
            "--delimiter",
            ";",
            "--response-max",
            "7",
            "--pairs",
            "2",
            "--diagnostic",
            "both",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };

        assert_eq!(
            resolve_input(&config, &args.input).expect("input"),
            PathBuf::from("from_flag.csv")
        );
        let cleaning = resolve_cleaning(&config, &args.input);
        assert_eq!(cleaning.delimiter, ';');
        assert_eq!(cleaning.response_min, 1);
        assert_eq!(cleaning.response_max, 7);
        assert_eq!(resolve_pairs(&config, args.pairs).expect("pairs"), 2);
        assert_eq!(
            resolve_columns(&config, args.columns),
            Some(vec!["Item 1".to_string()])
        );
        assert_eq!(
            args.diagnostic.map(DiagnosticArg::diagnostics),
            Some(vec![
                ItemDiagnostic::AlphaIfDeleted,
                ItemDiagnostic::ItemTotalCorrelation
            ])
        );
    }

    #[test]
    fn missing_input_and_zero_pairs_are_rejected() {
        let config = ScalecheckConfig::default();

        assert!(matches!(
            resolve_input(&config, &InputArgs::default()),
            Err(CliError::InvalidConfig(_))
        ));
        assert!(matches!(
            resolve_pairs(&config, Some(0)),
            Err(CliError::InvalidConfig(_))
        ));
        assert_eq!(resolve_pairs(&config, None).expect("pairs"), 5);
    }

    #[test]
    fn selected_columns_ignore_gaps_in_other_columns() {
        let cleaned = CleanedTable {
            columns: vec![
                CleanedColumn {
                    name: "Q1".to_string(),
                    values: vec![Some(4.0), Some(2.0), Some(5.0), Some(3.0)],
                },
                CleanedColumn {
                    name: "Q2".to_string(),
                    values: vec![Some(5.0), Some(2.0), Some(4.0), Some(3.0)],
                },
                CleanedColumn {
                    name: "Q3".to_string(),
                    values: vec![Some(3.0), None, None, None],
                },
            ],
        };
        let columns = vec!["Q1".to_string(), "Q2".to_string()];

        let table = complete_cases(&cleaned, Some(&columns)).expect("subscale");
        assert_eq!(table.row_count(), 4);
        assert_eq!(complete_cases(&cleaned, None).expect("all").row_count(), 1);

        let report = ReliabilityEngine::new(ReliabilityOptions::default())
            .analyze(&table)
            .expect("alpha on two items");
        assert_eq!(report.respondent_count, 4);
    }

    #[test]
    fn repeated_column_flags_collect_in_order() {
        let cli = Cli::parse_from([
            "scalecheck",
            "alpha",
            "--input",
            "cleaned.csv",
            "--column",
            "Item 2",
            "--column",
            "Item 1",
        ]);
        let Command::Alpha(args) = cli.command else {
            panic!("expected alpha");
        };
        assert_eq!(args.columns, vec!["Item 2", "Item 1"]);
        assert!(args.diagnostic.is_none());
    }
}
