//! Test support: decision builders, response rendering, and a scripted model.
//!
//! `ScriptedModel` stands in for the reasoning model so the full
//! model-to-batch path can be exercised without the Claude CLI.

use async_trait::async_trait;
use cotdex_models::{Action, Decision};
use tokio::sync::Mutex;

use crate::error::EngineError;
use crate::model::ReasoningModel;

/// An opening decision with every sizing field populated.
pub fn open_decision(
    action: Action,
    symbol: &str,
    leverage: i64,
    position_size_usd: f64,
    stop_loss: f64,
    take_profit: f64,
) -> Decision {
    Decision {
        symbol: symbol.to_string(),
        action,
        leverage,
        position_size_usd,
        stop_loss,
        take_profit,
        confidence: 75,
        risk_usd: position_size_usd * 0.02,
        reasoning: format!("Test setup on {symbol}"),
    }
}

pub fn open_long(
    symbol: &str,
    leverage: i64,
    position_size_usd: f64,
    stop_loss: f64,
    take_profit: f64,
) -> Decision {
    open_decision(
        Action::OpenLong,
        symbol,
        leverage,
        position_size_usd,
        stop_loss,
        take_profit,
    )
}

pub fn open_short(
    symbol: &str,
    leverage: i64,
    position_size_usd: f64,
    stop_loss: f64,
    take_profit: f64,
) -> Decision {
    open_decision(
        Action::OpenShort,
        symbol,
        leverage,
        position_size_usd,
        stop_loss,
        take_profit,
    )
}

/// Render a response the way a model typically writes one: narrative first,
/// then the decision array as pretty JSON.
pub fn render_response(narrative: &str, decisions: &[Decision]) -> String {
    let array = serde_json::to_string_pretty(decisions).unwrap_or_else(|_| "[]".to_string());
    format!("{narrative}\n\n{array}\n")
}

/// A reasoning model that returns a fixed reply and records the prompts it saw.
pub struct ScriptedModel {
    pub name: String,
    reply: Option<String>,
    last_prompts: Mutex<Option<(String, String)>>,
}

impl ScriptedModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            name: "scripted".to_string(),
            reply: Some(reply.into()),
            last_prompts: Mutex::new(None),
        }
    }

    /// A model whose every call fails like a crashed CLI.
    pub fn failing() -> Self {
        Self {
            name: "scripted".to_string(),
            reply: None,
            last_prompts: Mutex::new(None),
        }
    }

    /// The `(system, user)` prompts from the most recent call.
    pub async fn last_prompts(&self) -> Option<(String, String)> {
        self.last_prompts.lock().await.clone()
    }
}

#[async_trait]
impl ReasoningModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, EngineError> {
        *self.last_prompts.lock().await =
            Some((system_prompt.to_string(), user_prompt.to_string()));

        self.reply
            .clone()
            .ok_or_else(|| EngineError::Cli("Scripted failure".to_string()))
    }
}
