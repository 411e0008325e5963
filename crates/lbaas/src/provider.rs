//! Provider settings: region, endpoints and credentials.
//!
//! Endpoint resolution is a plain lookup in the configured region map;
//! there is no service catalog.

use crate::client::NeutronClient;
use crate::error::{Error, Result};
use crate::types::RetryConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Environment variable consulted when no region is configured
pub const ENV_REGION: &str = "OS_REGION_NAME";

/// Default environment variable holding the auth token
pub const DEFAULT_TOKEN_ENV: &str = "OS_AUTH_TOKEN";

/// `[provider]` section of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Default region for monitors that do not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Region name to networking API base URL
    pub endpoints: BTreeMap<String, String>,

    /// Name of the environment variable holding a pre-issued token
    pub token_env: String,

    /// HTTP timeout per request, in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoints: BTreeMap::new(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Configured region, falling back to `OS_REGION_NAME`
    pub fn default_region(&self) -> Option<String> {
        self.region
            .clone()
            .or_else(|| std::env::var(ENV_REGION).ok())
            .filter(|r| !r.is_empty())
    }

    pub fn endpoint(&self, region: &str) -> Result<&str> {
        self.endpoints
            .get(region)
            .map(String::as_str)
            .ok_or_else(|| Error::NoEndpoint(region.to_string()))
    }

    /// Read the token from the configured environment variable.
    pub fn token(&self) -> Result<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::MissingToken(self.token_env.clone()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a client for `region`.
    pub fn client_for(&self, region: &str, retry: &RetryConfig) -> Result<NeutronClient> {
        let endpoint = self.endpoint(region)?;
        let token = self.token()?;
        log::debug!("Using endpoint {endpoint} for region {region}");
        Ok(NeutronClient::new(endpoint, token, self.timeout()).with_retry(retry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ProviderConfig {
        toml::from_str(
            r#"
            region = "RegionOne"
            token_env = "LBMON_TEST_TOKEN_UNSET"

            [endpoints]
            RegionOne = "https://net-one.example:9696"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let provider: ProviderConfig = toml::from_str("").unwrap();
        assert_eq!(provider.token_env, "OS_AUTH_TOKEN");
        assert_eq!(provider.timeout(), Duration::from_secs(30));
        assert!(provider.endpoints.is_empty());
    }

    #[test]
    fn test_configured_region_wins() {
        assert_eq!(provider().default_region().as_deref(), Some("RegionOne"));
    }

    #[test]
    fn test_endpoint_lookup() {
        let provider = provider();
        assert_eq!(
            provider.endpoint("RegionOne").unwrap(),
            "https://net-one.example:9696"
        );
        let err = provider.endpoint("RegionTwo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "no endpoint configured for region 'RegionTwo'"
        );
    }

    #[test]
    fn test_missing_token() {
        let err = provider().token().unwrap_err();
        assert!(matches!(err, Error::MissingToken(ref var) if var == "LBMON_TEST_TOKEN_UNSET"));
    }

    #[test]
    fn test_client_for_unknown_region_fails_before_token() {
        let err = provider()
            .client_for("Nowhere", &RetryConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::NoEndpoint(_)));
    }
}
