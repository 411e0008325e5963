//! lbmon configuration file
//!
//! ```toml
//! [provider]
//! region = "RegionOne"
//! token_env = "OS_AUTH_TOKEN"
//!
//! [provider.endpoints]
//! RegionOne = "https://network.example.com:9696"
//!
//! [retry]
//! max_attempts = 3
//!
//! [monitors.web]
//! type = "HTTP"
//! delay = 10
//! timeout = 5
//! max_retries = 3
//! url_path = "/health"
//! admin_state_up = "true"
//! ```

use anyhow::{Context, Result};
use lbaas::{MonitorConfig, ProviderConfig, RetryConfig};
use reconcile::ResourceSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LbmonConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub retry: RetrySettings,

    /// Declared monitors, keyed by name
    #[serde(default)]
    pub monitors: BTreeMap<String, MonitorConfig>,
}

/// `[retry]` section, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            backoff_factor: 2.0,
            max_delay_ms: 10_000,
        }
    }
}

impl RetrySettings {
    pub fn validate(&self) -> Result<()> {
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            anyhow::bail!(
                "[retry] backoff_factor must be a finite number >= 1.0, got {}",
                self.backoff_factor
            );
        }
        Ok(())
    }

    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

/// A declared monitor lowered to its spec
#[derive(Debug, Clone)]
pub struct DeclaredMonitor {
    pub name: String,
    pub region: String,
    pub spec: ResourceSpec,
}

impl LbmonConfig {
    /// Load and validate the config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!(
            "Loaded {} monitors from {}",
            config.monitors.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Retry settings must be usable and every monitor must validate and
    /// resolve a region.
    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;
        let default_region = self.provider.default_region();
        for (name, monitor) in &self.monitors {
            monitor.to_spec(name, default_region.as_deref())?;
        }
        Ok(())
    }

    /// Declared monitors lowered to specs, optionally only `filter`
    pub fn declared(&self, filter: Option<&str>) -> Result<Vec<DeclaredMonitor>> {
        if let Some(name) = filter
            && !self.monitors.contains_key(name)
        {
            anyhow::bail!("No monitor named '{name}' in config");
        }

        let default_region = self.provider.default_region();
        self.monitors
            .iter()
            .filter(|(name, _)| filter.is_none_or(|f| f == name.as_str()))
            .map(|(name, monitor)| -> Result<DeclaredMonitor> {
                let spec = monitor.to_spec(name, default_region.as_deref())?;
                let region = monitor
                    .resolve_region(default_region.as_deref())
                    .unwrap_or_default();
                Ok(DeclaredMonitor {
                    name: name.clone(),
                    region,
                    spec,
                })
            })
            .collect()
    }
}
