// claimdoc CLI - generate COD and Email documents from a claims sheet

mod exit_codes;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use claimdoc_config::job::KeyValue;
use claimdoc_config::{ConfigError, DatasetSource, JobConfig};
use claimdoc_engine::{DataError, PoKey};
use claimdoc_io::{LoadError, PipelineError, WriteError};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use exit_codes::{pipeline_exit_code, EXIT_ERROR, EXIT_LOAD, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "claimdoc")]
#[command(about = "Fill Certificate of Damage and Email templates per purchase order")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documents for every (or each selected) purchase order
    #[command(after_help = "\
Examples:
  claimdoc generate --config job.toml
  claimdoc generate --data claims.xlsx --cod-template cod.docx --email-template email.docx --out out/
  claimdoc generate --config job.toml --po 4500123 --po 4500124 --json")]
    Generate {
        /// TOML job file; flags below override its values
        #[arg(long, short = 'c', env = "CLAIMDOC_CONFIG")]
        config: Option<PathBuf>,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// COD template (.docx)
        #[arg(long)]
        cod_template: Option<PathBuf>,

        /// Email template (.docx)
        #[arg(long)]
        email_template: Option<PathBuf>,

        /// Output directory (must exist)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Purchase order to generate. Repeatable; default is all.
        #[arg(long = "po", value_name = "KEY")]
        purchase_orders: Vec<String>,

        /// Value for <DATE> (YYYY/MM/DD); default is today
        #[arg(long)]
        date: Option<String>,

        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// List the purchase orders present in a dataset
    Keys {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[arg(long)]
        json: bool,
    },

    /// Print the computed placeholder values per purchase order as JSON
    Fields {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[arg(long = "po", value_name = "KEY")]
        purchase_orders: Vec<String>,

        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(clap::Args)]
struct DatasetArgs {
    /// Claims dataset (xlsx, xls, xlsb, ods, csv, tsv)
    #[arg(long, short = 'd')]
    data: Option<PathBuf>,

    /// Worksheet name; default is the first sheet
    #[arg(long)]
    sheet: Option<String>,
}

impl DatasetArgs {
    fn source(self) -> Result<DatasetSource, CliError> {
        let path = self
            .data
            .ok_or_else(|| CliError::usage("no dataset given").with_hint("pass --data FILE"))?;
        Ok(DatasetSource {
            path,
            sheet: self.sheet,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            config,
            dataset,
            cod_template,
            email_template,
            out,
            purchase_orders,
            date,
            json,
        } => cmd_generate(GenerateArgs {
            config,
            dataset,
            cod_template,
            email_template,
            out,
            purchase_orders,
            date,
            json,
        }),
        Commands::Keys { dataset, json } => cmd_keys(dataset, json),
        Commands::Fields {
            dataset,
            purchase_orders,
            date,
        } => cmd_fields(dataset, purchase_orders, date),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            eprintln!("error: {}", message);
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .try_init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::NoTemplates => Some("pass --cod-template and/or --email-template"),
            ConfigError::Missing("dataset") => Some("pass --data FILE or set `dataset` in the job file"),
            ConfigError::Missing("output_dir") => Some("pass --out DIR or set `output_dir` in the job file"),
            ConfigError::InvalidDate(_) => Some("use YYYY/MM/DD"),
            _ => None,
        };
        Self {
            code: EXIT_USAGE,
            message: err.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}

impl From<PipelineError> for CliError {
    fn from(err: PipelineError) -> Self {
        let hint = match &err {
            PipelineError::Data(DataError::UnknownKey { .. }) => {
                Some("run `claimdoc keys --data FILE` to list available purchase orders".to_string())
            }
            PipelineError::Write(WriteError::MissingDirectory { .. }) => {
                Some("create the output directory first".to_string())
            }
            PipelineError::Load(LoadError::MissingColumn { .. }) => Some(format!(
                "the header row must contain: {}",
                claimdoc_io::dataset::REQUIRED_COLUMNS.join(", ")
            )),
            _ => None,
        };
        Self {
            code: pipeline_exit_code(&err),
            message: err.to_string(),
            hint,
        }
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        Self { code: EXIT_LOAD, message: format!("load error: {err}"), hint: None }
    }
}

// ============================================================================
// generate
// ============================================================================

struct GenerateArgs {
    config: Option<PathBuf>,
    dataset: DatasetArgs,
    cod_template: Option<PathBuf>,
    email_template: Option<PathBuf>,
    out: Option<PathBuf>,
    purchase_orders: Vec<String>,
    date: Option<String>,
    json: bool,
}

/// Job file (if any) with command-line values layered on top.
fn job_config(args: &GenerateArgs) -> Result<JobConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => JobConfig::load(path)?,
        None => JobConfig::default(),
    };

    if let Some(data) = &args.dataset.data {
        config.dataset = Some(data.clone());
    }
    if let Some(sheet) = &args.dataset.sheet {
        config.sheet = Some(sheet.clone());
    }
    if let Some(path) = &args.cod_template {
        config.cod_template = Some(path.clone());
    }
    if let Some(path) = &args.email_template {
        config.email_template = Some(path.clone());
    }
    if let Some(dir) = &args.out {
        config.output_dir = Some(dir.clone());
    }
    if !args.purchase_orders.is_empty() {
        config.purchase_orders = key_values(&args.purchase_orders);
    }
    if let Some(date) = &args.date {
        config.date = Some(date.clone());
    }
    Ok(config)
}

fn key_values(raw: &[String]) -> Vec<KeyValue> {
    raw.iter().map(|s| KeyValue::Text(s.clone())).collect()
}

fn cmd_generate(args: GenerateArgs) -> Result<(), CliError> {
    let job = job_config(&args)?.validate()?;
    log::debug!(
        "job: dataset {}, {} template(s), output {}, date {}, {}",
        job.dataset.path.display(),
        job.templates.len(),
        job.output_dir.display(),
        job.date,
        match &job.selection {
            Some(keys) => format!("{} selected purchase order(s)", keys.len()),
            None => "all purchase orders".to_string(),
        }
    );
    let report = claimdoc_io::run(&job)?;

    if args.json {
        print_json(&report)?;
    } else {
        eprintln!(
            "generated {} document(s) in {} ({} row(s) without a numeric PO skipped)",
            report.documents.len(),
            job.output_dir.display(),
            report.dropped_rows
        );
    }
    Ok(())
}

// ============================================================================
// keys
// ============================================================================

fn cmd_keys(dataset: DatasetArgs, json: bool) -> Result<(), CliError> {
    let listing = claimdoc_io::list_keys(&dataset.source()?)?;

    if json {
        return print_json(&listing);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for key in &listing.keys {
        writeln!(handle, "{}", key_text(*key)).map_err(|e| CliError::output(e.to_string()))?;
    }
    Ok(())
}

/// Exact key value; integral keys print without a fraction.
fn key_text(key: PoKey) -> String {
    let value = key.value();
    if value.fract() == 0.0 {
        key.to_string()
    } else {
        value.to_string()
    }
}

// ============================================================================
// fields
// ============================================================================

fn cmd_fields(
    dataset: DatasetArgs,
    purchase_orders: Vec<String>,
    date: Option<String>,
) -> Result<(), CliError> {
    let source = dataset.source()?;

    // Reuse job-file parsing for keys and date
    let config = JobConfig {
        purchase_orders: key_values(&purchase_orders),
        date,
        ..Default::default()
    };
    let selection = config.selection()?;
    let date = config.date()?;

    let preview = claimdoc_io::preview(&source, selection.as_ref(), date)?;
    print_json(&preview)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CliError::output(e.to_string()))?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", text).map_err(|e| CliError::output(e.to_string()))
}
