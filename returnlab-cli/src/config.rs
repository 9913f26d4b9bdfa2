//! TOML run configuration for the full pipeline.
//!
//! ```toml
//! [acquire]
//! tickers = ["VWCE.MI", "SWDA.MI"]
//! endpoint = "https://example.com/api/yf"
//! cache_dir = "cache"
//!
//! [returns]
//! period = 365
//!
//! [distribution]
//! thresholds = 100
//! cumulative = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub acquire: AcquireConfig,
    #[serde(default)]
    pub returns: ReturnsConfig,
    #[serde(default)]
    pub distribution: DistributionConfig,
}

#[derive(Debug, Deserialize)]
pub struct AcquireConfig {
    pub tickers: Vec<String>,
    pub endpoint: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReturnsConfig {
    pub period: usize,
}

impl Default for ReturnsConfig {
    fn default() -> Self {
        Self { period: 365 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    pub thresholds: usize,
    pub cumulative: bool,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            thresholds: 100,
            cumulative: false,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("parsing run config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = RunConfig::from_toml(
            r#"
[acquire]
tickers = ["VWCE.MI"]
endpoint = "https://example.com/api/yf"
"#,
        )
        .unwrap();

        assert_eq!(config.acquire.tickers, ["VWCE.MI"]);
        assert_eq!(config.acquire.cache_dir, PathBuf::from("cache"));
        assert_eq!(config.returns.period, 365);
        assert_eq!(config.distribution.thresholds, 100);
        assert!(!config.distribution.cumulative);
    }

    #[test]
    fn full_config_overrides_defaults() {
        let config = RunConfig::from_toml(
            r#"
[acquire]
tickers = ["A", "B"]
endpoint = "http://localhost:8788/api/yf"
cache_dir = "/tmp/quotes"

[returns]
period = 1825

[distribution]
thresholds = 50
cumulative = true
"#,
        )
        .unwrap();

        assert_eq!(config.returns.period, 1825);
        assert_eq!(config.distribution.thresholds, 50);
        assert!(config.distribution.cumulative);
    }

    #[test]
    fn missing_acquire_section_is_an_error() {
        assert!(RunConfig::from_toml("[returns]\nperiod = 30\n").is_err());
    }
}
