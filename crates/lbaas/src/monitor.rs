//! Typed health-monitor declaration.
//!
//! A [`MonitorConfig`] is one `[monitors.<name>]` table from the config file.
//! It is validated on its own and then lowered into the untyped
//! [`ResourceSpec`] the reconciliation core works on.

use crate::error::{Error, Result};
use reconcile::ResourceSpec;
use serde::{Deserialize, Serialize};

/// Declared configuration of one health monitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Region override; the provider's region applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// Probe type: PING, TCP, HTTP or HTTPS
    #[serde(rename = "type")]
    pub monitor_type: String,

    /// Seconds between probes
    pub delay: i64,

    /// Seconds to wait for a probe reply
    pub timeout: i64,

    /// Failed probes before a member is marked down
    pub max_retries: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_codes: Option<String>,

    /// "true", "false" or unset; any other literal fails at plan time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<String>,
}

impl MonitorConfig {
    /// Check the values that make no sense regardless of the remote side.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.monitor_type.trim().is_empty() {
            return Err(Error::invalid_monitor(name, "'type' must not be empty"));
        }

        for (field, value) in [
            ("delay", self.delay),
            ("timeout", self.timeout),
            ("max_retries", self.max_retries),
        ] {
            if value < 0 {
                return Err(Error::invalid_monitor(
                    name,
                    format!("'{field}' must not be negative, got {value}"),
                ));
            }
        }

        Ok(())
    }

    /// Region this monitor lives in
    pub fn resolve_region(&self, default_region: Option<&str>) -> Option<String> {
        self.region
            .as_deref()
            .or(default_region)
            .filter(|r| !r.is_empty())
            .map(ToString::to_string)
    }

    /// Lower into a [`ResourceSpec`] for the monitor schema.
    ///
    /// Unset optional fields are left out of the spec entirely.
    pub fn to_spec(&self, name: &str, default_region: Option<&str>) -> Result<ResourceSpec> {
        self.validate(name)?;
        let region = self
            .resolve_region(default_region)
            .ok_or_else(|| Error::invalid_monitor(name, "no region set and no provider default"))?;

        let mut spec = ResourceSpec::new()
            .with("region", region)
            .with("type", self.monitor_type.as_str())
            .with("delay", self.delay)
            .with("timeout", self.timeout)
            .with("max_retries", self.max_retries);

        for (field, value) in [
            ("tenant_id", &self.tenant_id),
            ("url_path", &self.url_path),
            ("http_method", &self.http_method),
            ("expected_codes", &self.expected_codes),
            ("admin_state_up", &self.admin_state_up),
        ] {
            if let Some(value) = value {
                spec.set(field, value.as_str());
            }
        }

        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MONITOR_SCHEMA;
    use reconcile::{Value, build_create_request};

    fn http_monitor() -> MonitorConfig {
        toml::from_str(
            r#"
            type = "HTTP"
            delay = 10
            timeout = 5
            max_retries = 3
            url_path = "/health"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_from_toml() {
        let monitor = http_monitor();
        assert_eq!(monitor.monitor_type, "HTTP");
        assert_eq!(monitor.url_path.as_deref(), Some("/health"));
        assert!(monitor.admin_state_up.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: std::result::Result<MonitorConfig, _> = toml::from_str(
            r#"
            type = "TCP"
            delay = 1
            timeout = 1
            max_retries = 1
            pool_id = "p-1"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_to_spec_uses_default_region() {
        let spec = http_monitor().to_spec("web", Some("RegionOne")).unwrap();
        assert_eq!(spec.get("region"), Some(&Value::from("RegionOne")));
        assert_eq!(spec.get("delay"), Some(&Value::Int(10)));
        assert!(spec.get("http_method").is_none());
    }

    #[test]
    fn test_to_spec_region_override() {
        let monitor = MonitorConfig {
            region: Some("RegionTwo".into()),
            ..http_monitor()
        };
        let spec = monitor.to_spec("web", Some("RegionOne")).unwrap();
        assert_eq!(spec.get("region"), Some(&Value::from("RegionTwo")));
    }

    #[test]
    fn test_to_spec_requires_region() {
        let err = http_monitor().to_spec("web", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "monitor 'web': no region set and no provider default"
        );
        assert!(http_monitor().to_spec("web", Some("")).is_err());
    }

    #[test]
    fn test_negative_interval_rejected() {
        let monitor = MonitorConfig {
            delay: -1,
            ..http_monitor()
        };
        let err = monitor.validate("web").unwrap_err();
        assert!(err.to_string().contains("'delay' must not be negative"));
    }

    #[test]
    fn test_empty_type_rejected() {
        let monitor = MonitorConfig {
            monitor_type: " ".into(),
            ..http_monitor()
        };
        assert!(monitor.validate("web").is_err());
    }

    #[test]
    fn test_spec_builds_create_request() {
        let monitor = MonitorConfig {
            admin_state_up: Some("false".into()),
            ..http_monitor()
        };
        let spec = monitor.to_spec("web", Some("RegionOne")).unwrap();
        let payload = build_create_request(&MONITOR_SCHEMA, &spec).unwrap();

        assert_eq!(payload.get("admin_state_up"), Some(&Value::Bool(false)));
        assert_eq!(payload.get("url_path"), Some(&Value::from("/health")));
        assert!(!payload.contains("region"));
    }
}
