use cotdex_models::Decision;
use thiserror::Error;

/// The decision array could not be located in the model response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no '[' found in response, decision array missing")]
    MissingArrayStart,

    #[error("unterminated array: '[' at byte {start} is never closed")]
    UnterminatedArray { start: usize },
}

/// A decoded decision broke a semantic or risk rule.
///
/// `position` is 1-based, counting decisions in array order.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("decision #{position}: invalid action {action:?}")]
    InvalidAction { position: usize, action: String },

    #[error("decision #{position}: {field} must not be empty")]
    MissingField {
        position: usize,
        field: &'static str,
    },

    #[error("decision #{position}: leverage for {symbol} must be between 1 and {max}, got {leverage}")]
    LeverageOutOfRange {
        position: usize,
        symbol: String,
        leverage: i64,
        max: u32,
    },

    #[error("decision #{position}: position size must be greater than 0, got {position_size_usd:.2}")]
    InvalidPositionSize {
        position: usize,
        position_size_usd: f64,
    },

    #[error("decision #{position}: position size for {symbol} may not exceed {max_position_usd:.0} USD, got {position_size_usd:.0}")]
    PositionSizeExceeded {
        position: usize,
        symbol: String,
        position_size_usd: f64,
        max_position_usd: f64,
    },

    #[error("decision #{position}: stop loss and take profit must be greater than 0 (stop {stop_loss}, target {take_profit})")]
    InvalidPrice {
        position: usize,
        stop_loss: f64,
        take_profit: f64,
    },

    #[error("decision #{position}: {action} requires stop loss on the losing side of take profit (stop {stop_loss}, target {take_profit})")]
    InvalidPriceOrdering {
        position: usize,
        action: String,
        stop_loss: f64,
        take_profit: f64,
    },

    #[error("decision #{position}: risk/reward {ratio:.2}:1 below {min_ratio}:1 [risk {risk_pct:.2}% reward {reward_pct:.2}%] [stop {stop_loss:.2} target {take_profit:.2}]")]
    RiskRewardTooLow {
        position: usize,
        ratio: f64,
        min_ratio: f64,
        risk_pct: f64,
        reward_pct: f64,
        stop_loss: f64,
        take_profit: f64,
    },
}

impl ValidationError {
    /// 1-based position of the offending decision.
    pub fn position(&self) -> usize {
        match self {
            ValidationError::InvalidAction { position, .. }
            | ValidationError::MissingField { position, .. }
            | ValidationError::LeverageOutOfRange { position, .. }
            | ValidationError::InvalidPositionSize { position, .. }
            | ValidationError::PositionSizeExceeded { position, .. }
            | ValidationError::InvalidPrice { position, .. }
            | ValidationError::InvalidPriceOrdering { position, .. }
            | ValidationError::RiskRewardTooLow { position, .. } => *position,
        }
    }
}

/// Which pipeline stage rejected the response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("failed to extract decisions: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("failed to decode decision array: {message}\nJSON: {json}")]
    Decode { message: String, json: String },

    #[error("decision validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ParseError {
    pub fn stage(&self) -> &'static str {
        match self {
            ParseError::Extraction(_) => "extraction",
            ParseError::Decode { .. } => "decode",
            ParseError::Validation(_) => "validation",
        }
    }
}

/// A rejected response, with everything that could still be recovered from it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct ParseFailure {
    pub error: ParseError,
    /// Narrative preceding the array, available even when extraction fails.
    pub narrative: String,
    /// Decisions decoded before the failure. Empty unless validation failed.
    pub decisions: Vec<Decision>,
}

impl ParseFailure {
    pub fn stage(&self) -> &'static str {
        self.error.stage()
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Model timed out after {0} seconds")]
    Timeout(u64),

    #[error("Model response rejected: {0}")]
    Rejected(#[from] ParseFailure),
}
