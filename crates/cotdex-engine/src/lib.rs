pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod validator;

pub mod test_support;

pub use engine::{parse_full_decision_response, DecisionEngine, PromptPair};
pub use error::{EngineError, ExtractionError, ParseError, ParseFailure, ValidationError};
pub use model::{ClaudeCliConfig, ClaudeCliModel, ReasoningModel};
