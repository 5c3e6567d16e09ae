//! cotdex - chain-of-thought decision extraction
//!
//! Turns the free-text reply of a reasoning model (a narrative followed by a
//! JSON array of trading instructions) into a validated `DecisionBatch`, or a
//! typed failure that still carries the narrative and any decoded decisions.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use cotdex::models::ValidationConfig;
//! use cotdex::engine::parse_full_decision_response;
//!
//! let raw = "BTC reclaimed the range.\n[{\"symbol\":\"BTCUSDT\",\"action\":\"hold\",\"reasoning\":\"ok\"}]";
//! let batch = parse_full_decision_response(raw, &ValidationConfig::new(1000.0, 10, 5));
//! ```

pub use cotdex_engine as engine;
pub use cotdex_models as models;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cotdex_engine::{ClaudeCliModel, DecisionEngine, ParseFailure};
use cotdex_models::config::CotdexConfig;
use cotdex_models::decision::Decision;
use serde::Serialize;

/// Parse a TOML configuration string.
pub fn parse_config(toml_str: &str) -> Result<CotdexConfig, anyhow::Error> {
    toml::from_str(toml_str).context("Failed to parse config")
}

/// Read and parse the configuration file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<CotdexConfig, anyhow::Error> {
    let path = path.as_ref();
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&config_str)
}

/// Build a DecisionEngine backed by the Claude CLI.
pub fn build_engine(config: &CotdexConfig) -> DecisionEngine {
    let model = ClaudeCliModel::new(config.model.clone().into());
    DecisionEngine::new(Arc::new(model))
}

/// Machine-readable form of a rejected response.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub stage: &'static str,
    pub error: String,
    pub narrative: String,
    pub decisions: Vec<Decision>,
}

impl From<&ParseFailure> for FailureReport {
    fn from(failure: &ParseFailure) -> Self {
        Self {
            stage: failure.stage(),
            error: failure.error.to_string(),
            narrative: failure.narrative.clone(),
            decisions: failure.decisions.clone(),
        }
    }
}
