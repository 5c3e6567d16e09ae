pub mod config;
pub mod decision;

pub use config::{CotdexConfig, LeverageConfig, ModelConfig, RiskLimits, ValidationConfig};
pub use decision::{Action, Decision, DecisionBatch};
