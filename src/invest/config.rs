use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use super::error::InvestError;

/// Path the flow looks at when no `--config` is given.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vantage")
        .join("invest.toml")
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct InvestConfig {
    pub general: GeneralConfig,
    pub executor: ExecutorConfig,
    pub flow: FlowConfig,
    pub completion: CompletionConfig,
}

impl InvestConfig {
    pub fn load() -> Result<Self, InvestError> {
        Self::load_from(default_path())
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, InvestError> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: InvestConfig = toml::from_str(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub title: String,
    pub subtitle: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: "Vantage Invest".to_string(),
            subtitle: "Guided investment flow".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Simulated round-trip per submission, in milliseconds.
    pub delay_ms: u64,
    /// Maximum wait before a submission times out. Zero disables the limit.
    pub timeout_ms: u64,
    /// Step ids whose first submission is rejected, to demo the retry path.
    pub fail_once: Vec<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            delay_ms: 900,
            timeout_ms: 0,
            fail_once: Vec::new(),
        }
    }
}

impl ExecutorConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub fund_name: String,
    pub currency: String,
    /// Commitment bounds in whole currency units.
    pub min_commitment: u64,
    pub max_commitment: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            fund_name: "Vantage Growth Fund I".to_string(),
            currency: "USD".to_string(),
            min_commitment: 25_000,
            max_commitment: 5_000_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub message: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            message: "Your commitment is confirmed. Welcome aboard.".to_string(),
        }
    }
}
