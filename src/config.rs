//! Configuration loading and validation

use crate::app::MAX_KEYCHAIN_READ_RETRIES;
use crate::scan::DEFAULT_INFO_CLEAR_DELAY;
use crate::wallet::NetworkType;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the keychain retry setting, every retry is an immediate round-trip
const MAX_CONFIGURABLE_RETRIES: u32 = 10;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the wallet record and sync databases
    pub data_dir: PathBuf,
    pub network: NetworkType,
    /// Default tracing directive, `RUST_LOG` takes precedence
    pub log_level: String,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
    #[serde(default = "default_max_keychain_retries")]
    pub max_keychain_retries: u32,
    #[serde(default = "default_true")]
    pub crash_reporting: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            max_keychain_retries: default_max_keychain_retries(),
            crash_reporting: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_info_clear_delay_ms")]
    pub info_clear_delay_ms: u64,
}

impl ScanConfig {
    pub fn info_clear_delay(&self) -> Duration {
        Duration::from_millis(self.info_clear_delay_ms)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            info_clear_delay_ms: default_info_clear_delay_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_keychain_retries() -> u32 {
    MAX_KEYCHAIN_READ_RETRIES
}

fn default_info_clear_delay_ms() -> u64 {
    DEFAULT_INFO_CLEAR_DELAY.as_millis() as u64
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("data_dir", "wallet-data")?
            .set_default("network", NetworkType::default().as_str())?
            .set_default("log_level", "info")?
            .set_default("launch.max_keychain_retries", default_max_keychain_retries() as i64)?
            .set_default("launch.crash_reporting", true)?
            .set_default("scan.info_clear_delay_ms", default_info_clear_delay_ms() as i64)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix WALLET_)
            .add_source(
                config::Environment::with_prefix("WALLET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            anyhow::bail!("data_dir must not be empty");
        }

        if self.launch.max_keychain_retries > MAX_CONFIGURABLE_RETRIES {
            anyhow::bail!(
                "max_keychain_retries cannot exceed {}, got {}",
                MAX_CONFIGURABLE_RETRIES,
                self.launch.max_keychain_retries
            );
        }

        if self.scan.info_clear_delay_ms == 0 {
            anyhow::bail!("info_clear_delay_ms must be positive");
        }

        Ok(())
    }
}
