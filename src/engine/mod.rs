//! Execution engine for lbmon
//!
//! The engine orchestrates:
//! 1. Planning - Pair declared monitors with their applied state
//! 2. Diffing - Show what a pass would change
//! 3. Executing - Run reconciliation passes in parallel, one per monitor

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{ExecuteOptions, ExecuteSummary, execute};
pub use planner::{PlannedMonitor, Step, build_plan};

use anyhow::Result;
use lbaas::{ProviderConfig, RetryConfig};
use reconcile::RemoteClient;

/// Hands out a remote client for a region
pub trait ClientSource: Sync {
    fn client_for(&self, region: &str) -> Result<Box<dyn RemoteClient>>;
}

/// Clients built from the `[provider]` section
pub struct ProviderClients<'a> {
    provider: &'a ProviderConfig,
    retry: RetryConfig,
}

impl<'a> ProviderClients<'a> {
    pub fn new(provider: &'a ProviderConfig, retry: RetryConfig) -> Self {
        Self { provider, retry }
    }
}

impl ClientSource for ProviderClients<'_> {
    fn client_for(&self, region: &str) -> Result<Box<dyn RemoteClient>> {
        let client: Box<dyn RemoteClient> =
            Box::new(self.provider.client_for(region, &self.retry)?);
        Ok(client)
    }
}

/// Error text for a failed pass, with advice for API failures
pub fn explain(err: &reconcile::Error) -> String {
    if let reconcile::Error::Remote(source) = err
        && let Some(api) = source.downcast_ref::<lbaas::Error>()
    {
        return format!("{api} ({})", api.category().advice());
    }
    err.to_string()
}
