//! medscreen — batch LLM screening of medicines for Type II diabetes risk.
//!
//! Entry point. Parses the command line, loads configuration, initialises
//! structured logging, then runs the pipeline: read the drug column, submit
//! fixed-size batches to the generation engine, parse each response for its
//! `Estimated Probability:` line, and write the result table to Parquet.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use medscreen::config::AppConfig;
use medscreen::engine::vllm::VllmClient;
use medscreen::runner::BatchRunner;
use medscreen::storage;

#[derive(Debug, Parser)]
#[command(
    name = "medscreen",
    version,
    about = "Estimate per-medicine Type II diabetes probability via an LLM"
)]
struct Cli {
    /// Configuration file (optional; defaults apply when absent)
    #[arg(long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Model identifier, as served by the generation endpoint
    #[arg(long)]
    model: Option<String>,

    /// Enable chain-of-thought reasoning in the prompt
    #[arg(long)]
    cot: bool,

    /// Tensor-parallel size of the serving deployment
    #[arg(long)]
    num_gpus: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f64>,

    /// Number of drugs per engine call
    #[arg(long)]
    batch_size: Option<usize>,

    /// Input Parquet file with the drug-name column
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Name of the drug-name column in the input file
    #[arg(long)]
    column: Option<String>,

    /// Directory the result table is written into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Write only the probability column, dropping raw response text
    #[arg(long)]
    probs_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = AppConfig::load(&cli.config)?;
    apply_overrides(&mut cfg, &cli);

    init_logging();

    info!(
        model = %cfg.engine.model,
        endpoint = %cfg.engine.endpoint,
        batch_size = cfg.engine.batch_size,
        cot = cli.cot,
        input = %cfg.io.input_path.display(),
        "medscreen starting"
    );

    let drugs = storage::read_drug_column(&cfg.io.input_path, &cfg.io.drug_column)?;

    let engine = VllmClient::new(&cfg.engine)?;
    let runner = BatchRunner::new(&engine, cfg.sampling.clone());
    let report = runner
        .estimate(&drugs, cli.cot, cfg.engine.batch_size)
        .await?;

    let out_path = storage::output_path(&cfg.io.output_dir, cli.cot);
    let responses = (!cli.probs_only).then_some(report.responses.as_slice());
    storage::write_estimates(&out_path, &report.probabilities, responses)?;

    info!(
        rows = report.len(),
        parsed = report.len() - report.null_count(),
        nulls = report.null_count(),
        output = %out_path.display(),
        "medscreen finished"
    );

    Ok(())
}

/// Command-line flags take precedence over file values.
fn apply_overrides(cfg: &mut AppConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        cfg.engine.model = model.clone();
    }
    if let Some(num_gpus) = cli.num_gpus {
        cfg.engine.num_gpus = num_gpus;
    }
    if let Some(temperature) = cli.temperature {
        cfg.sampling.temperature = temperature;
    }
    if let Some(batch_size) = cli.batch_size {
        cfg.engine.batch_size = batch_size;
    }
    if let Some(input) = &cli.input {
        cfg.io.input_path = input.clone();
    }
    if let Some(column) = &cli.column {
        cfg.io.drug_column = column.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        cfg.io.output_dir = output_dir.clone();
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("medscreen=info"));

    let json_logging = std::env::var("MEDSCREEN_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
