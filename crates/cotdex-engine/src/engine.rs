use std::sync::Arc;
use std::time::Instant;

use cotdex_models::{DecisionBatch, ValidationConfig};
use tracing::{info, warn};

use crate::error::{EngineError, ParseError, ParseFailure};
use crate::model::ReasoningModel;
use crate::parser::{extract_decisions, extract_narrative};
use crate::validator::validate_decisions;

/// Parse a raw model response into a validated batch.
///
/// On failure the narrative is always returned. Decisions are returned only
/// when validation rejected the batch, truncated to the evaluated prefix
/// ending at the failing decision.
pub fn parse_full_decision_response(
    raw: &str,
    config: &ValidationConfig,
) -> Result<DecisionBatch, ParseFailure> {
    let narrative = extract_narrative(raw).to_string();

    let mut decisions = match extract_decisions(raw) {
        Ok(decisions) => decisions,
        Err(error) => {
            warn!(stage = error.stage(), error = %error, "Failed to extract decisions");
            return Err(ParseFailure {
                error,
                narrative,
                decisions: Vec::new(),
            });
        }
    };

    if let Err(err) = validate_decisions(&decisions, config) {
        let position = err.position();
        warn!(position, error = %err, "Decision validation failed");
        decisions.truncate(position);
        return Err(ParseFailure {
            error: ParseError::Validation(err),
            narrative,
            decisions,
        });
    }

    info!(
        decisions = decisions.len(),
        narrative_len = narrative.len(),
        "Decision batch accepted"
    );
    Ok(DecisionBatch::new(narrative, decisions))
}

/// Prompt text for one model round-trip. Built by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Runs one model round-trip and validates the reply.
pub struct DecisionEngine {
    model: Arc<dyn ReasoningModel>,
}

impl DecisionEngine {
    pub fn new(model: Arc<dyn ReasoningModel>) -> Self {
        Self { model }
    }

    /// Ask the model for decisions and validate them against `validation`.
    pub async fn decide(
        &self,
        prompts: &PromptPair,
        validation: &ValidationConfig,
    ) -> Result<DecisionBatch, EngineError> {
        let start = Instant::now();
        info!(model = %self.model.name(), equity = validation.account_equity, "Requesting decisions");

        let raw = self.model.complete(&prompts.system, &prompts.user).await?;
        let batch = parse_full_decision_response(&raw, validation)?;

        info!(
            model = %self.model.name(),
            decisions = batch.decisions.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Decision cycle complete"
        );
        Ok(batch.with_user_prompt(prompts.user.clone()))
    }
}
