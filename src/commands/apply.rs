//! `lbmon apply` - converge remote monitors on the config

use anyhow::Result;

use super::{Workspace, confirm};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::differ::{PlanCounts, display_plan};
use crate::engine::executor::print_summary;
use crate::engine::{ExecuteOptions, ExecuteSummary, build_plan, execute};
use crate::ui;

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let mut ws = Workspace::load(ctx)?;
    let planned = build_plan(&ws.config, &ws.state, args.name.as_deref())?;

    if !ctx.quiet {
        display_plan(&planned);
    }

    let counts = PlanCounts::from_plan(&planned);
    if counts.total_changes() == 0 && !args.refresh {
        return Ok(());
    }

    let destructive = planned.iter().filter(|p| p.step.is_destructive()).count();
    if destructive > 0 && !args.yes {
        println!();
        let prompt = format!(
            "{} will be deleted. Continue?",
            ui::plural(destructive, "monitor")
        );
        if !confirm(&prompt)? {
            ui::warn("Aborted");
            return Ok(());
        }
    }

    // A refresh pass reads every tracked monitor, including unchanged ones.
    let pending: Vec<_> = planned
        .into_iter()
        .filter(|p| args.refresh || !p.step.is_noop())
        .collect();

    let opts = ExecuteOptions {
        jobs: args.jobs,
        refresh: args.refresh,
        quiet: ctx.quiet,
        yes: args.yes,
    };
    let clients = ws.clients();
    let results = execute(&pending, &clients, &opts)?;

    for r in &results {
        ws.state.record(&r.name, r.state.clone());
    }
    ws.save()?;

    let summary = ExecuteSummary::from_results(&results);
    if !ctx.quiet {
        print_summary(&results);
    }
    if !summary.is_success() {
        anyhow::bail!("{} failed", ui::plural(summary.failed, "monitor"));
    }
    Ok(())
}
