use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::store::HttpOptions;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts to open a remote stream (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/pullsum/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullsumConfig {
    /// Files transferred concurrently.
    pub concurrency: usize,
    /// Read size per chunk for local sources and curl's receive buffer.
    pub chunk_size_bytes: usize,
    /// Task updates buffered before transfer tasks wait on the progress aggregator.
    #[serde(default = "default_progress_channel_capacity")]
    pub progress_channel_capacity: usize,
    /// Base URL of the HTTP object endpoint (objects at `{endpoint}/{bucket}/{key}`).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_progress_channel_capacity() -> usize {
    64
}

impl Default for PullsumConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            chunk_size_bytes: 256 * 1024,
            progress_channel_capacity: default_progress_channel_capacity(),
            endpoint: None,
            retry: None,
        }
    }
}

impl PullsumConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            buffer_size: Some(self.chunk_size_bytes.max(1)),
            ..HttpOptions::default()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pullsum")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PullsumConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PullsumConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PullsumConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = PullsumConfig::default();
        assert_eq!(cfg.concurrency, 3);
        assert_eq!(cfg.chunk_size_bytes, 262_144);
        assert_eq!(cfg.progress_channel_capacity, 64);
        assert!(cfg.endpoint.is_none());
        assert_eq!(cfg.retry_config(), RetryConfig::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = PullsumConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: PullsumConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.concurrency, cfg.concurrency);
        assert_eq!(parsed.chunk_size_bytes, cfg.chunk_size_bytes);
        assert_eq!(parsed.progress_channel_capacity, cfg.progress_channel_capacity);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            concurrency = 8
            chunk_size_bytes = 65536
            endpoint = "https://objects.example.com"

            [retry]
            max_attempts = 2
            base_delay_secs = 0.5
            max_delay_secs = 4
        "#;
        let cfg: PullsumConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.concurrency, 8);
        assert_eq!(cfg.chunk_size_bytes, 65536);
        assert_eq!(cfg.progress_channel_capacity, 64);
        assert_eq!(cfg.endpoint.as_deref(), Some("https://objects.example.com"));
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 2);
        assert!((retry.base_delay_secs - 0.5).abs() < 1e-9);
        assert_eq!(retry.max_delay_secs, 4);
        assert_eq!(cfg.http_options().buffer_size, Some(65536));
    }
}
