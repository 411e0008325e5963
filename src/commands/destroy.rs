//! `lbmon destroy` - delete tracked monitors

use anyhow::Result;
use lbaas::MONITOR_SCHEMA;
use reconcile::{AppliedState, Reconciler};

use super::{Workspace, confirm};
use crate::Context;
use crate::engine::planner::applied_region;
use crate::engine::{ClientSource, explain};
use crate::{progress, ui};

pub fn run(ctx: &Context, name: Option<&str>, yes: bool) -> Result<()> {
    let mut ws = Workspace::load(ctx)?;

    let targets: Vec<(String, AppliedState)> = ws
        .state
        .tracked(name)
        .map(|(n, s)| (n.clone(), s.clone()))
        .collect();

    if targets.is_empty() {
        ui::info("Nothing to destroy");
        return Ok(());
    }

    ui::header("Monitors to delete");
    for (monitor, applied) in &targets {
        ui::kv(monitor, &format!("{} in {}", applied.identity, applied_region(applied)));
    }
    println!();

    if !yes {
        let prompt = format!("Delete {}?", ui::plural(targets.len(), "monitor"));
        if !confirm(&prompt)? {
            ui::warn("Aborted");
            return Ok(());
        }
    }

    let mut failed = 0;
    for (monitor, applied) in &targets {
        let pb = progress::spinner(&format!("Deleting {monitor}..."), ctx.quiet);
        let outcome = ws
            .clients()
            .client_for(applied_region(applied))
            .map_err(|e| format!("{e:#}"))
            .and_then(|client| {
                Reconciler::new(&MONITOR_SCHEMA, client.as_ref())
                    .delete(applied)
                    .map_err(|e| explain(&e))
            });
        pb.finish_and_clear();

        match outcome {
            Ok(state) => {
                ws.state.record(monitor, state);
                if !ctx.quiet {
                    ui::success(&format!("Deleted {monitor}"));
                }
            }
            Err(error) => {
                ui::error(&format!("{monitor}: {error}"));
                failed += 1;
            }
        }
    }

    ws.save()?;

    if failed > 0 {
        anyhow::bail!("{} could not be deleted", ui::plural(failed, "monitor"));
    }
    Ok(())
}
