//! Plan display - shows what a pass would do to each monitor

use colored::{ColoredString, Colorize};

use super::{PlannedMonitor, Step};
use crate::ui;

/// Counts of pending work in a plan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlanCounts {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub unchanged: usize,
}

impl PlanCounts {
    pub fn from_plan(planned: &[PlannedMonitor]) -> Self {
        let mut counts = Self::default();
        for p in planned {
            match p.step {
                Step::Create => counts.create += 1,
                Step::Update(_) => counts.update += 1,
                Step::Replace { .. } => counts.replace += 1,
                Step::Delete => counts.delete += 1,
                Step::NoOp => counts.unchanged += 1,
            }
        }
        counts
    }

    pub fn total_changes(&self) -> usize {
        self.create + self.update + self.replace + self.delete
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} to create, {} to update, {} to replace, {} to delete",
            self.create, self.update, self.replace, self.delete
        )
    }
}

fn symbol(step: &Step) -> ColoredString {
    match step {
        Step::Create => "+".green(),
        Step::Update(_) => "~".yellow(),
        Step::Replace { .. } => "-/+".red(),
        Step::Delete => "-".red(),
        Step::NoOp => "○".dimmed(),
    }
}

/// Short description shown beside the monitor name
pub fn describe_step(planned: &PlannedMonitor) -> String {
    match &planned.step {
        Step::Create => format!("(create in {})", planned.region),
        Step::Update(changes) => format!(
            "({} on {})",
            ui::plural(changes.len(), "change"),
            planned.applied.identity
        ),
        Step::Replace { fields } => format!(
            "(replace {}: {})",
            planned.applied.identity,
            fields.join(", ")
        ),
        Step::Delete => format!(
            "(remove {} from {})",
            planned.applied.identity, planned.region
        ),
        Step::NoOp => "(no changes)".to_string(),
    }
}

/// Per-field detail lines, `field: old → new`
pub fn field_changes(planned: &PlannedMonitor) -> Vec<String> {
    let names: Vec<&str> = match &planned.step {
        Step::Update(changes) => changes.names().collect(),
        Step::Replace { fields } => fields.iter().map(String::as_str).collect(),
        Step::Create => planned.spec.iter().map(|(name, _)| name.as_str()).collect(),
        Step::Delete | Step::NoOp => Vec::new(),
    };

    names
        .into_iter()
        .map(|name| {
            let new = ui::format_value(planned.spec.get(name));
            if matches!(planned.step, Step::Create) {
                format!("{name}: {new}")
            } else {
                let old = ui::format_value(planned.applied.get(name));
                format!("{name}: {old} → {new}")
            }
        })
        .collect()
}

/// Display the plan in a boxed layout
pub fn display_plan(planned: &[PlannedMonitor]) {
    let counts = PlanCounts::from_plan(planned);
    if counts.total_changes() == 0 {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Monitor Plan".bold()
    );
    println!("│");

    for p in planned.iter().filter(|p| !p.step.is_noop()) {
        println!(
            "│   {} {:<30} {}",
            symbol(&p.step),
            p.name,
            describe_step(p).dimmed()
        );
        for line in field_changes(p) {
            println!("│       {}", line.dimmed());
        }
    }

    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    println!("│ Plan: {}", counts.summary_line().bold());
    if counts.unchanged > 0 {
        println!("│ {} unchanged", ui::plural(counts.unchanged, "monitor"));
    }
    println!("└─────────────────────────────────────────────────────┘");
}
