//! # lbaas
//!
//! Load-balancer health-monitor binding for the `reconcile` core.
//!
//! This crate provides:
//! - The monitor field schema ([`MONITOR_SCHEMA`])
//! - Typed monitor declarations that lower into a [`reconcile::ResourceSpec`]
//! - A blocking HTTP client for the LBaaS v1 health-monitor API
//! - Retry with exponential backoff for transient API failures
//!
//! ## Example
//!
//! ```no_run
//! use lbaas::{MONITOR_SCHEMA, MonitorConfig, ProviderConfig, RetryConfig};
//! use reconcile::{AppliedState, Reconciler};
//!
//! let provider = ProviderConfig::default();
//! let monitor = MonitorConfig {
//!     monitor_type: "HTTP".into(),
//!     delay: 10,
//!     timeout: 5,
//!     max_retries: 3,
//!     ..MonitorConfig::default()
//! };
//!
//! let spec = monitor.to_spec("web", Some("RegionOne")).unwrap();
//! let client = provider.client_for("RegionOne", &RetryConfig::default()).unwrap();
//! let reconciler = Reconciler::new(&MONITOR_SCHEMA, &client);
//!
//! let applied = reconciler.create(&spec, &AppliedState::absent()).unwrap();
//! println!("created {}", applied.identity);
//! ```

pub mod client;
pub mod error;
pub mod monitor;
pub mod provider;
pub mod retry;
pub mod schema;
pub mod types;

pub use client::NeutronClient;
pub use error::{Error, ErrorCategory, Result};
pub use monitor::MonitorConfig;
pub use provider::ProviderConfig;
pub use schema::MONITOR_SCHEMA;
pub use types::RetryConfig;
