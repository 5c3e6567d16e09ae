use std::time::{Duration, Instant};

use async_trait::async_trait;
use cotdex_models::ModelConfig;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::EngineError;

/// A reasoning model that turns a system prompt and a user prompt into raw text.
/// Mockable for testing.
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, EngineError>;
}

/// Configuration for a Claude CLI invocation.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    pub model: String,
    pub timeout: Duration,
    pub program: String,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        ModelConfig::default().into()
    }
}

impl From<ModelConfig> for ClaudeCliConfig {
    fn from(config: ModelConfig) -> Self {
        Self {
            model: config.model,
            timeout: Duration::from_secs(config.timeout_seconds),
            program: config.cli_path,
        }
    }
}

/// A reasoning model reached through the `claude` CLI.
pub struct ClaudeCliModel {
    pub cli_config: ClaudeCliConfig,
}

impl ClaudeCliModel {
    pub fn new(cli_config: ClaudeCliConfig) -> Self {
        Self { cli_config }
    }
}

#[async_trait]
impl ReasoningModel for ClaudeCliModel {
    fn name(&self) -> &str {
        &self.cli_config.model
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, EngineError> {
        invoke_claude(system_prompt, user_prompt, &self.cli_config).await
    }
}

/// Invoke the `claude` CLI with a system prompt and user prompt.
/// Returns the raw stdout text. The process is killed if the timeout fires.
pub async fn invoke_claude(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, EngineError> {
    debug!(model = %config.model, "Invoking claude CLI");
    let start = Instant::now();

    let result = tokio::time::timeout(config.timeout, async {
        Command::new(&config.program)
            .args([
                "-p",
                user_prompt,
                "--system-prompt",
                system_prompt,
                "--model",
                &config.model,
                "--output-format",
                "text",
            ])
            .kill_on_drop(true)
            .output()
            .await
    })
    .await
    .map_err(|_| EngineError::Timeout(config.timeout.as_secs()))?
    .map_err(|e| EngineError::Cli(format!("Failed to spawn {}: {e}", config.program)))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        warn!(status = %result.status, stderr = %stderr, "Claude CLI failed");
        return Err(EngineError::Cli(format!(
            "claude exited {}: {}",
            result.status, stderr
        )));
    }

    let stdout = String::from_utf8_lossy(&result.stdout).to_string();
    if stdout.trim().is_empty() {
        return Err(EngineError::Cli(
            "Claude returned empty response".to_string(),
        ));
    }

    debug!(
        model = %config.model,
        bytes = stdout.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Claude CLI responded"
    );
    Ok(stdout)
}

/// Check if the `claude` CLI is available on the system.
pub async fn check_cli_available() -> bool {
    match Command::new("claude").arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}
