use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// What a decision asks the trader to do with one instrument.
///
/// Decodes from the model's snake_case strings. Anything outside the six known
/// actions is kept verbatim as `Unrecognized` so it can be reported instead of
/// failing the whole array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
    Hold,
    Wait,
    Unrecognized(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::OpenLong => "open_long",
            Action::OpenShort => "open_short",
            Action::CloseLong => "close_long",
            Action::CloseShort => "close_short",
            Action::Hold => "hold",
            Action::Wait => "wait",
            Action::Unrecognized(raw) => raw.as_str(),
        }
    }

    /// True for `open_long` and `open_short`, the only actions carrying sizing.
    pub fn is_open(&self) -> bool {
        matches!(self, Action::OpenLong | Action::OpenShort)
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Action::CloseLong | Action::CloseShort)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Action::Unrecognized(_))
    }
}

impl From<String> for Action {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "open_long" => Action::OpenLong,
            "open_short" => Action::OpenShort,
            "close_long" => Action::CloseLong,
            "close_short" => Action::CloseShort,
            "hold" => Action::Hold,
            "wait" => Action::Wait,
            _ => Action::Unrecognized(raw),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// An empty `Unrecognized` action, which validation reports as invalid.
impl Default for Action {
    fn default() -> Self {
        Action::Unrecognized(String::new())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proposed action on one instrument, as emitted by the reasoning model.
///
/// Every field defaults when absent or `null`; sizing and price fields only
/// carry meaning for `open_*` actions. A missing action decodes as an empty
/// `Unrecognized` so validation can point at it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: Action,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero_int"
    )]
    pub leverage: i64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero_float"
    )]
    pub position_size_usd: f64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero_float"
    )]
    pub stop_loss: f64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero_float"
    )]
    pub take_profit: f64,
    /// 0 to 100, advisory only.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero_confidence"
    )]
    pub confidence: i32,
    /// Maximum dollar risk the model claims for this trade. Advisory only.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "is_zero_float"
    )]
    pub risk_usd: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasoning: String,
}

impl Decision {
    /// A decision with only the fields every action requires.
    pub fn new(symbol: impl Into<String>, action: Action, reasoning: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            leverage: 0,
            position_size_usd: 0.0,
            stop_loss: 0.0,
            take_profit: 0.0,
            confidence: 0,
            risk_usd: 0.0,
            reasoning: reasoning.into(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_zero_int(v: &i64) -> bool {
    *v == 0
}

fn is_zero_confidence(v: &i32) -> bool {
    *v == 0
}

fn is_zero_float(v: &f64) -> bool {
    *v == 0.0
}

/// A validated set of decisions together with the narrative that preceded them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionBatch {
    pub id: Uuid,
    /// Free-text reasoning the model wrote before the decision array.
    pub narrative: String,
    pub decisions: Vec<Decision>,
    pub timestamp: DateTime<Utc>,
    /// Prompt that produced this batch, when it came through a model round-trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
}

impl DecisionBatch {
    pub fn new(narrative: String, decisions: Vec<Decision>) -> Self {
        Self {
            id: Uuid::new_v4(),
            narrative,
            decisions,
            timestamp: Utc::now(),
            user_prompt: None,
        }
    }

    pub fn with_user_prompt(mut self, user_prompt: impl Into<String>) -> Self {
        self.user_prompt = Some(user_prompt.into());
        self
    }

    /// Decisions that open or close a position, in batch order.
    pub fn actionable(&self) -> impl Iterator<Item = &Decision> {
        self.decisions
            .iter()
            .filter(|d| d.action.is_open() || d.action.is_close())
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}
