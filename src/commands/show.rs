//! `lbmon show` - print recorded monitor state

use anyhow::Result;

use crate::Context;
use crate::paths;
use crate::state::LbmonState;
use crate::ui;

pub fn run(ctx: &Context, name: Option<&str>) -> Result<()> {
    let state_path = paths::state_file(ctx.state.as_deref())?;
    let state = LbmonState::load(&state_path)?;

    if let Some(name) = name
        && !state.monitors.contains_key(name)
    {
        anyhow::bail!("Monitor '{name}' is not tracked");
    }
    if state.monitors.is_empty() {
        ui::info("No monitors tracked");
        return Ok(());
    }

    if ctx.verbose > 0 {
        ui::kv("state", &state_path.display().to_string());
        ui::kv("updated", &state.last_updated.to_rfc3339());
    }

    for (monitor, applied) in state.tracked(name) {
        ui::section(monitor);
        ui::kv("id", applied.identity.as_str());
        for (field, value) in &applied.fields {
            ui::kv(field, &ui::format_value(Some(value)));
        }
    }
    Ok(())
}
