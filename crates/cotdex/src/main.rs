use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cotdex::FailureReport;
use cotdex_engine::{parse_full_decision_response, EngineError, ParseFailure, PromptPair};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "cotdex",
    about = "Extract and validate trading decisions from a reasoning model's reply"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/cotdex.toml")]
    config: String,

    /// Current account equity in quote currency
    #[arg(short, long)]
    equity: f64,

    /// Read the raw model response from a file instead of stdin
    #[arg(short, long, conflicts_with_all = ["system_prompt", "user_prompt"])]
    input: Option<String>,

    /// System prompt file; with --user-prompt, calls the model first
    #[arg(long, requires = "user_prompt")]
    system_prompt: Option<String>,

    /// User prompt file; with --system-prompt, calls the model first
    #[arg(long, requires = "system_prompt")]
    user_prompt: Option<String>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

fn read_file(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read: {path}"))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

fn reject(failure: &ParseFailure, pretty: bool) -> Result<()> {
    warn!(
        stage = failure.stage(),
        decoded = failure.decisions.len(),
        error = %failure.error,
        "Response rejected"
    );
    print_json(&FailureReport::from(failure), pretty)?;
    bail!("Response rejected at {} stage: {}", failure.stage(), failure.error)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.equity.is_nan() || cli.equity <= 0.0 {
        bail!("Account equity must be positive, got {}", cli.equity);
    }

    let config = cotdex::load_config(&cli.config)?;
    let validation = config.validation_for(cli.equity);
    info!(config = %cli.config, equity = cli.equity, "Loaded configuration");

    let result = if let (Some(system_path), Some(user_path)) = (&cli.system_prompt, &cli.user_prompt)
    {
        let prompts = PromptPair {
            system: read_file(system_path)?,
            user: read_file(user_path)?,
        };
        let engine = cotdex::build_engine(&config);
        info!(model = %config.model.model, "Requesting decisions from model");
        match engine.decide(&prompts, &validation).await {
            Ok(batch) => Ok(batch),
            Err(EngineError::Rejected(failure)) => Err(failure),
            Err(e) => {
                warn!(error = %e, "Model call failed");
                return Err(anyhow::anyhow!("Model call failed: {e}"));
            }
        }
    } else {
        let raw = if let Some(input_path) = &cli.input {
            read_file(input_path)?
        } else {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        };
        parse_full_decision_response(&raw, &validation)
    };

    match result {
        Ok(batch) => {
            info!(
                batch_id = %batch.id,
                decisions = batch.decisions.len(),
                actionable = batch.actionable().count(),
                "Batch accepted"
            );
            print_json(&batch, cli.pretty)
        }
        Err(failure) => reject(&failure, cli.pretty),
    }
}
