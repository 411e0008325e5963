//! Execution planner - pairs declared monitors with their applied state

use anyhow::{Context, Result};
use lbaas::MONITOR_SCHEMA;
use reconcile::{AppliedState, ChangeSet, Plan, ResourceSpec, plan};

use crate::config::LbmonConfig;
use crate::state::LbmonState;

/// What a pass will do to one monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Create,
    /// Delete, then create; ForceNew fields changed
    Replace { fields: Vec<String> },
    Update(ChangeSet),
    NoOp,
    /// Tracked in state but no longer declared
    Delete,
}

impl Step {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// Whether the step removes a remote monitor
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Replace { .. } | Self::Delete)
    }
}

impl From<Plan> for Step {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Create => Self::Create,
            Plan::Replace { fields } => Self::Replace { fields },
            Plan::Update(changes) => Self::Update(changes),
            Plan::NoOp => Self::NoOp,
        }
    }
}

/// One monitor's entry in the plan
#[derive(Debug, Clone)]
pub struct PlannedMonitor {
    pub name: String,
    /// Declared region; for a deletion, the region it was created in
    pub region: String,
    /// Declared spec; empty for a deletion
    pub spec: ResourceSpec,
    pub applied: AppliedState,
    pub step: Step,
}

/// Region an applied monitor lives in
pub fn applied_region(applied: &AppliedState) -> &str {
    applied
        .get("region")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
}

/// Plan every declared monitor plus every tracked monitor that is no
/// longer declared. Makes no remote calls.
pub fn build_plan(
    config: &LbmonConfig,
    state: &LbmonState,
    filter: Option<&str>,
) -> Result<Vec<PlannedMonitor>> {
    if let Some(name) = filter
        && !config.monitors.contains_key(name)
        && !state.monitors.contains_key(name)
    {
        anyhow::bail!("No monitor named '{name}' in config or state");
    }

    let mut planned = Vec::new();

    for declared in config.declared(None)? {
        if filter.is_some_and(|f| f != declared.name) {
            continue;
        }
        let applied = state.applied(&declared.name);
        let step = plan(&MONITOR_SCHEMA, &declared.spec, &applied)
            .with_context(|| format!("Failed to plan monitor '{}'", declared.name))?;

        planned.push(PlannedMonitor {
            name: declared.name,
            region: declared.region,
            spec: declared.spec,
            applied,
            step: step.into(),
        });
    }

    for (name, applied) in state.tracked(filter) {
        if config.monitors.contains_key(name) || applied.is_absent() {
            continue;
        }
        planned.push(PlannedMonitor {
            name: name.clone(),
            region: applied_region(applied).to_string(),
            spec: ResourceSpec::new(),
            applied: applied.clone(),
            step: Step::Delete,
        });
    }

    planned.sort_by(|a, b| a.name.cmp(&b.name));
    log::debug!("Planned {} monitors", planned.len());
    Ok(planned)
}
