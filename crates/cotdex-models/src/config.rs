use serde::{Deserialize, Serialize};

/// Top-level configuration for cotdex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CotdexConfig {
    pub leverage: LeverageConfig,
    #[serde(default)]
    pub limits: RiskLimits,
    #[serde(default)]
    pub model: ModelConfig,
}

impl CotdexConfig {
    /// Combine the static configuration with live account equity.
    pub fn validation_for(&self, account_equity: f64) -> ValidationConfig {
        ValidationConfig {
            account_equity,
            major_leverage_cap: self.leverage.major,
            altcoin_leverage_cap: self.leverage.altcoin,
            limits: self.limits.clone(),
        }
    }
}

/// Operator-configured leverage caps per instrument class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeverageConfig {
    /// Cap for the major symbols listed in `RiskLimits::major_symbols`.
    pub major: u32,
    /// Cap for every other symbol.
    pub altcoin: u32,
}

impl Default for LeverageConfig {
    fn default() -> Self {
        Self {
            major: 5,
            altcoin: 5,
        }
    }
}

/// Numeric guardrails applied to `open_*` decisions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskLimits {
    /// Symbols treated as majors (looser position ceiling, major leverage cap).
    #[serde(default = "default_major_symbols")]
    pub major_symbols: Vec<String>,
    /// Position ceiling for majors, as a multiple of account equity.
    #[serde(default = "default_major_position_multiple")]
    pub major_position_multiple: f64,
    /// Position ceiling for everything else, as a multiple of account equity.
    #[serde(default = "default_altcoin_position_multiple")]
    pub altcoin_position_multiple: f64,
    /// Fraction of the ceiling tolerated above it (0.01 = 1%).
    #[serde(default = "default_position_tolerance")]
    pub position_tolerance: f64,
    /// Where between stop-loss (0.0) and take-profit (1.0) the entry is assumed to be.
    #[serde(default = "default_assumed_entry_fraction")]
    pub assumed_entry_fraction: f64,
    /// Minimum reward/risk ratio an opening decision must clear.
    #[serde(default = "default_min_risk_reward")]
    pub min_risk_reward: f64,
}

impl RiskLimits {
    pub fn is_major(&self, symbol: &str) -> bool {
        self.major_symbols.iter().any(|s| s == symbol)
    }
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            major_symbols: default_major_symbols(),
            major_position_multiple: default_major_position_multiple(),
            altcoin_position_multiple: default_altcoin_position_multiple(),
            position_tolerance: default_position_tolerance(),
            assumed_entry_fraction: default_assumed_entry_fraction(),
            min_risk_reward: default_min_risk_reward(),
        }
    }
}

fn default_major_symbols() -> Vec<String> {
    vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]
}
fn default_major_position_multiple() -> f64 {
    10.0
}
fn default_altcoin_position_multiple() -> f64 {
    1.5
}
fn default_position_tolerance() -> f64 {
    0.01
}
fn default_assumed_entry_fraction() -> f64 {
    0.2
}
fn default_min_risk_reward() -> f64 {
    2.5
}

/// Per-invocation validation parameters. Equity is live account state and is
/// never read from the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    pub account_equity: f64,
    pub major_leverage_cap: u32,
    pub altcoin_leverage_cap: u32,
    #[serde(default)]
    pub limits: RiskLimits,
}

impl ValidationConfig {
    pub fn new(account_equity: f64, major_leverage_cap: u32, altcoin_leverage_cap: u32) -> Self {
        Self {
            account_equity,
            major_leverage_cap,
            altcoin_leverage_cap,
            limits: RiskLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RiskLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn leverage_cap(&self, symbol: &str) -> u32 {
        if self.limits.is_major(symbol) {
            self.major_leverage_cap
        } else {
            self.altcoin_leverage_cap
        }
    }

    /// Position ceiling in quote currency, before tolerance.
    pub fn max_position_usd(&self, symbol: &str) -> f64 {
        let multiple = if self.limits.is_major(symbol) {
            self.limits.major_position_multiple
        } else {
            self.limits.altcoin_position_multiple
        };
        self.account_equity * multiple
    }
}

/// Configuration for the reasoning model invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Model name passed to the CLI.
    #[serde(default = "default_model")]
    pub model: String,
    /// Timeout for a single model call in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Executable to run; resolved through `PATH` unless it contains a separator.
    #[serde(default = "default_cli_path")]
    pub cli_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            cli_path: default_cli_path(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}
fn default_timeout_seconds() -> u64 {
    120
}
fn default_cli_path() -> String {
    "claude".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_cotdex_config() {
        let config = CotdexConfig {
            leverage: LeverageConfig::default(),
            limits: RiskLimits::default(),
            model: ModelConfig::default(),
        };

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: CotdexConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn default_limits_match_guardrails() {
        let limits = RiskLimits::default();
        assert!(limits.is_major("BTCUSDT"));
        assert!(limits.is_major("ETHUSDT"));
        assert!(!limits.is_major("SOLUSDT"));
        assert_eq!(limits.major_position_multiple, 10.0);
        assert_eq!(limits.altcoin_position_multiple, 1.5);
        assert_eq!(limits.min_risk_reward, 2.5);
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
[leverage]
major = 20
altcoin = 8

[limits]
min_risk_reward = 3.0

[model]
timeout_seconds = 60
"#;

        let config: CotdexConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.leverage.major, 20);
        assert_eq!(config.leverage.altcoin, 8);
        assert_eq!(config.limits.min_risk_reward, 3.0);
        // unspecified limits fall back to defaults
        assert_eq!(config.limits.assumed_entry_fraction, 0.2);
        assert_eq!(config.limits.major_symbols.len(), 2);
        assert_eq!(config.model.timeout_seconds, 60);
        assert_eq!(config.model.model, "claude-sonnet-4-5-20250929");
        assert_eq!(config.model.cli_path, "claude");
    }

    #[test]
    fn config_from_toml_leverage_only() {
        let config: CotdexConfig = toml::from_str("[leverage]\nmajor = 10\naltcoin = 3\n").unwrap();
        assert_eq!(config.limits, RiskLimits::default());
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn validation_for_uses_class_caps() {
        let config: CotdexConfig = toml::from_str("[leverage]\nmajor = 10\naltcoin = 3\n").unwrap();
        let validation = config.validation_for(1000.0);
        assert_eq!(validation.leverage_cap("BTCUSDT"), 10);
        assert_eq!(validation.leverage_cap("PEPEUSDT"), 3);
        assert_eq!(validation.max_position_usd("ETHUSDT"), 10_000.0);
        assert_eq!(validation.max_position_usd("PEPEUSDT"), 1500.0);
    }
}
