//! Command implementations for the lbmon CLI

pub mod apply;
pub mod destroy;
pub mod plan;
pub mod refresh;
pub mod show;

use anyhow::{Context as AnyhowContext, Result};
use std::path::PathBuf;

use crate::Context;
use crate::config::LbmonConfig;
use crate::engine::ProviderClients;
use crate::paths;
use crate::state::LbmonState;

/// Config and state loaded for one command
pub struct Workspace {
    pub config: LbmonConfig,
    pub state: LbmonState,
    pub state_path: PathBuf,
}

impl Workspace {
    pub fn load(ctx: &Context) -> Result<Self> {
        let config_path = paths::config_file(ctx.config.as_deref())?;
        let state_path = paths::state_file(ctx.state.as_deref())?;
        log::debug!(
            "Using config {} and state {}",
            config_path.display(),
            state_path.display()
        );

        Ok(Self {
            config: LbmonConfig::load(&config_path)?,
            state: LbmonState::load(&state_path)?,
            state_path,
        })
    }

    pub fn clients(&self) -> ProviderClients<'_> {
        ProviderClients::new(&self.config.provider, self.config.retry.to_retry_config())
    }

    pub fn save(&mut self) -> Result<()> {
        self.state.touch(&self.state_path)
    }
}

/// Ask before a destructive step
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation (pass --yes when not on a terminal)")
}
