//! `lbmon refresh` - fold remote values into recorded state

use anyhow::Result;
use lbaas::MONITOR_SCHEMA;
use reconcile::{AppliedState, ReadOutcome, Reconciler};

use super::Workspace;
use crate::Context;
use crate::engine::planner::applied_region;
use crate::engine::{ClientSource, explain};
use crate::{progress, ui};

pub fn run(ctx: &Context, name: Option<&str>) -> Result<()> {
    let mut ws = Workspace::load(ctx)?;
    let declared = ws.config.declared(name)?;

    let mut refreshed = 0;
    let mut gone = 0;
    let mut failed = 0;

    for monitor in &declared {
        let applied = ws.state.applied(&monitor.name);
        if applied.is_absent() {
            log::debug!("{}: not created yet", monitor.name);
            continue;
        }

        let pb = progress::spinner(&format!("Reading {}...", monitor.name), ctx.quiet);
        let outcome = ws
            .clients()
            .client_for(applied_region(&applied))
            .map_err(|e| format!("{e:#}"))
            .and_then(|client| {
                Reconciler::new(&MONITOR_SCHEMA, client.as_ref())
                    .read(&monitor.spec, &applied)
                    .map_err(|e| explain(&e))
            });
        pb.finish_and_clear();

        match outcome {
            Ok(ReadOutcome::Found(state)) => {
                if state != applied {
                    log::info!("{}: recorded state changed", monitor.name);
                }
                ws.state.record(&monitor.name, state);
                refreshed += 1;
            }
            Ok(ReadOutcome::NotFound) => {
                ui::warn(&format!(
                    "{} ({}) was deleted out-of-band; apply will re-create it",
                    monitor.name, applied.identity
                ));
                ws.state.record(&monitor.name, AppliedState::absent());
                gone += 1;
            }
            Err(error) => {
                ui::error(&format!("{}: {}", monitor.name, error));
                failed += 1;
            }
        }
    }

    for (orphan, _) in ws.state.tracked(name) {
        if !ws.config.monitors.contains_key(orphan) {
            ui::dim(&format!("{orphan}: no longer declared, skipped"));
        }
    }

    ws.save()?;

    if !ctx.quiet {
        ui::success(&format!(
            "Refreshed {} ({} gone)",
            ui::plural(refreshed, "monitor"),
            gone
        ));
    }
    if failed > 0 {
        anyhow::bail!("{} could not be read", ui::plural(failed, "monitor"));
    }
    Ok(())
}
