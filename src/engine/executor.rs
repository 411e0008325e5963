//! Execution engine - runs one reconciliation pass per monitor in parallel

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use lbaas::MONITOR_SCHEMA;
use rayon::prelude::*;
use reconcile::{AppliedState, ReadOutcome, Reconciler, RemoteClient, plan};
use std::sync::{Arc, Mutex};

use super::planner::{PlannedMonitor, Step, applied_region};
use super::{ClientSource, explain};
use crate::progress;

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Number of parallel jobs
    pub jobs: usize,
    /// Read each tracked monitor before acting on it
    pub refresh: bool,
    /// Suppress progress output
    pub quiet: bool,
    /// Allow replacements that only a refresh uncovered
    pub yes: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            jobs: 4,
            refresh: false,
            quiet: false,
            yes: false,
        }
    }
}

/// What happened to one monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    Created,
    Updated,
    Replaced,
    Removed,
    NoChange,
    Failed { error: String },
}

/// Outcome for one monitor, with the latest state known for it.
///
/// On failure `state` is whatever the pass had reached, so a replacement
/// that deleted the old monitor but failed to create the new one records
/// the monitor as absent.
#[derive(Debug, Clone)]
pub struct MonitorResult {
    pub name: String,
    pub state: AppliedState,
    pub result: ApplyResult,
}

/// Summary of execution results
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub removed: usize,
    pub no_change: usize,
    pub failed: usize,
}

impl ExecuteSummary {
    pub fn from_results(results: &[MonitorResult]) -> Self {
        let mut summary = Self::default();
        for r in results {
            match r.result {
                ApplyResult::Created => summary.created += 1,
                ApplyResult::Updated => summary.updated += 1,
                ApplyResult::Replaced => summary.replaced += 1,
                ApplyResult::Removed => summary.removed += 1,
                ApplyResult::NoChange => summary.no_change += 1,
                ApplyResult::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced + self.removed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Run the plan. Results come back sorted by monitor name.
pub fn execute(
    planned: &[PlannedMonitor],
    clients: &dyn ClientSource,
    opts: &ExecuteOptions,
) -> Result<Vec<MonitorResult>> {
    let pb = progress::bar(planned.len() as u64, opts.quiet);
    let results: Arc<Mutex<Vec<MonitorResult>>> = Arc::new(Mutex::new(Vec::new()));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs.max(1))
        .build()
        .context("Failed to create apply thread pool")?;

    pool.install(|| {
        planned.par_iter().for_each(|monitor| {
            let result = run_one(monitor, clients, opts);

            let symbol = match &result.result {
                ApplyResult::NoChange => "○",
                ApplyResult::Failed { .. } => "✗",
                _ => "✓",
            };
            pb.set_message(format!("{} {}", symbol, monitor.name));
            pb.inc(1);

            push_result(&results, result);
        });
    });

    pb.finish_and_clear();

    let mut collected = into_results(results)?;
    collected.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(collected)
}

fn run_one(
    planned: &PlannedMonitor,
    clients: &dyn ClientSource,
    opts: &ExecuteOptions,
) -> MonitorResult {
    let mut state = planned.applied.clone();
    let result = match reconcile_monitor(planned, clients, opts, &mut state) {
        Ok(result) => result,
        Err(error) => {
            log::error!("{}: {}", planned.name, error);
            ApplyResult::Failed { error }
        }
    };
    MonitorResult {
        name: planned.name.clone(),
        state,
        result,
    }
}

/// Drive one monitor; `state` always holds the latest known state.
///
/// A refresh can turn a planned no-op or update into a replacement. That
/// replacement was never confirmed, so it fails unless `opts.yes` is set.
fn reconcile_monitor(
    planned: &PlannedMonitor,
    clients: &dyn ClientSource,
    opts: &ExecuteOptions,
    state: &mut AppliedState,
) -> std::result::Result<ApplyResult, String> {
    if planned.step == Step::Delete {
        let client = client_for(clients, applied_region(state))?;
        *state = reconciler(client.as_ref())
            .delete(state)
            .map_err(|e| explain(&e))?;
        return Ok(ApplyResult::Removed);
    }

    let mut step = planned.step.clone();
    if opts.refresh && !state.is_absent() {
        let client = client_for(clients, applied_region(state))?;
        match reconciler(client.as_ref())
            .read(&planned.spec, state)
            .map_err(|e| explain(&e))?
        {
            ReadOutcome::Found(fresh) => *state = fresh,
            ReadOutcome::NotFound => {
                log::warn!(
                    "Monitor '{}' ({}) was deleted out-of-band",
                    planned.name,
                    state.identity
                );
                *state = AppliedState::absent();
            }
        }
        step = plan(&MONITOR_SCHEMA, &planned.spec, state)
            .map_err(|e| explain(&e))?
            .into();

        if let Step::Replace { fields } = &step
            && !planned.step.is_destructive()
            && !opts.yes
        {
            return Err(format!(
                "{} changed out-of-band and now requires replacement; re-run apply to confirm, or pass --yes",
                fields.join(", ")
            ));
        }
    }

    match step {
        Step::NoOp => Ok(ApplyResult::NoChange),
        Step::Create => {
            let client = client_for(clients, &planned.region)?;
            *state = reconciler(client.as_ref())
                .create(&planned.spec, state)
                .map_err(|e| explain(&e))?;
            Ok(ApplyResult::Created)
        }
        Step::Update(changes) => {
            let client = client_for(clients, applied_region(state))?;
            *state = reconciler(client.as_ref())
                .update(&planned.spec, state, &changes)
                .map_err(|e| explain(&e))?;
            Ok(ApplyResult::Updated)
        }
        Step::Replace { fields } => {
            log::info!(
                "Replacing monitor '{}' ({} changed)",
                planned.name,
                fields.join(", ")
            );
            let old = client_for(clients, applied_region(state))?;
            *state = reconciler(old.as_ref())
                .delete(state)
                .map_err(|e| explain(&e))?;

            let new = client_for(clients, &planned.region)?;
            *state = reconciler(new.as_ref())
                .create(&planned.spec, state)
                .map_err(|e| explain(&e))?;
            Ok(ApplyResult::Replaced)
        }
        Step::Delete => Err(format!("monitor '{}' is still declared", planned.name)),
    }
}

fn reconciler<C: RemoteClient + ?Sized>(client: &C) -> Reconciler<'_, C> {
    Reconciler::new(&MONITOR_SCHEMA, client)
}

fn client_for(
    clients: &dyn ClientSource,
    region: &str,
) -> std::result::Result<Box<dyn RemoteClient>, String> {
    clients.client_for(region).map_err(|e| format!("{e:#}"))
}

fn push_result(results: &Arc<Mutex<Vec<MonitorResult>>>, result: MonitorResult) {
    match results.lock() {
        Ok(mut locked) => locked.push(result),
        Err(poisoned) => poisoned.into_inner().push(result),
    }
}

fn into_results(results: Arc<Mutex<Vec<MonitorResult>>>) -> Result<Vec<MonitorResult>> {
    let mutex = Arc::try_unwrap(results)
        .map_err(|_| anyhow::anyhow!("Failed to collect apply results: shared result state"))?;

    match mutex.into_inner() {
        Ok(collected) => Ok(collected),
        Err(poisoned) => Ok(poisoned.into_inner()),
    }
}

/// Print per-monitor failures and the final summary
pub fn print_summary(results: &[MonitorResult]) {
    let summary = ExecuteSummary::from_results(results);

    for r in results {
        if let ApplyResult::Failed { error } = &r.result {
            println!("  {} {}: {}", "✗".red(), r.name.bold(), error);
        }
    }

    println!();
    if summary.is_success() && summary.total_changes() == 0 {
        println!("  {} No changes made", "✓".green().bold());
    } else if summary.is_success() {
        println!("  {} Monitors reconciled successfully!", "✓".green().bold());
    } else {
        println!("  {} Monitors reconciled with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} monitors created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} monitors updated", summary.updated);
    }
    if summary.replaced > 0 {
        println!("    • {} monitors replaced", summary.replaced);
    }
    if summary.removed > 0 {
        println!("    • {} monitors removed", summary.removed);
    }
    if summary.no_change > 0 {
        println!("    • {} unchanged", summary.no_change);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "monitors".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LbmonConfig;
    use crate::engine::build_plan;
    use crate::state::LbmonState;
    use reconcile::Value;
    use reconcile::mock::{Call, Failure, MockClient, Operation};

    const CONFIG: &str = r#"
        [provider]
        region = "RegionOne"

        [monitors.web]
        type = "HTTP"
        delay = 10
        timeout = 5
        max_retries = 3
        url_path = "/health"
        admin_state_up = "true"
    "#;

    struct MockSource(MockClient);

    impl ClientSource for MockSource {
        fn client_for(&self, _region: &str) -> Result<Box<dyn RemoteClient>> {
            Ok(Box::new(self.0.clone()))
        }
    }

    fn opts() -> ExecuteOptions {
        ExecuteOptions {
            jobs: 2,
            refresh: false,
            quiet: true,
            yes: false,
        }
    }

    /// Plan and execute `config` against `state`, recording the results
    fn pass(
        config: &str,
        state: &mut LbmonState,
        source: &MockSource,
        opts: &ExecuteOptions,
    ) -> Vec<MonitorResult> {
        let config = LbmonConfig::parse(config).unwrap();
        let planned = build_plan(&config, state, None).unwrap();
        let results = execute(&planned, source, opts).unwrap();
        for r in &results {
            state.record(&r.name, r.state.clone());
        }
        results
    }

    #[test]
    fn test_create_then_converged() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();

        let results = pass(CONFIG, &mut state, &source, &opts());
        assert_eq!(results[0].result, ApplyResult::Created);
        assert_eq!(state.applied("web").identity.as_str(), "m-1");
        assert_eq!(
            state.applied("web").get("admin_state_up"),
            Some(&Value::from("true"))
        );

        source.0.clear_calls();
        let results = pass(CONFIG, &mut state, &source, &opts());
        assert_eq!(results[0].result, ApplyResult::NoChange);
        assert_eq!(source.0.call_count(), 0);
    }

    #[test]
    fn test_update_mutable_field() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());

        source.0.clear_calls();
        let changed = CONFIG.replace("delay = 10", "delay = 30");
        let results = pass(&changed, &mut state, &source, &opts());

        assert_eq!(results[0].result, ApplyResult::Updated);
        assert_eq!(source.0.count(Operation::Update), 1);
        assert_eq!(source.0.count(Operation::Get), 1);
        assert_eq!(state.applied("web").get("delay"), Some(&Value::Int(30)));
        assert_eq!(state.applied("web").identity.as_str(), "m-1");
    }

    #[test]
    fn test_replace_on_type_change() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());

        let changed = CONFIG.replace("\"HTTP\"", "\"HTTPS\"");
        let results = pass(&changed, &mut state, &source, &opts());

        assert_eq!(results[0].result, ApplyResult::Replaced);
        assert!(source.0.stored("m-1").is_none());
        assert_eq!(state.applied("web").identity.as_str(), "m-2");
        assert_eq!(state.applied("web").get("type"), Some(&Value::from("HTTPS")));
    }

    #[test]
    fn test_replace_failure_keeps_absent_state() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());

        source
            .0
            .fail_next(Operation::Create, Failure::Remote("quota exceeded".into()));
        let changed = CONFIG.replace("\"HTTP\"", "\"HTTPS\"");
        let results = pass(&changed, &mut state, &source, &opts());

        assert!(matches!(results[0].result, ApplyResult::Failed { .. }));
        assert!(state.applied("web").is_absent());
    }

    #[test]
    fn test_orphan_removed() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());

        let results = pass("[provider]\nregion = \"RegionOne\"\n", &mut state, &source, &opts());
        assert_eq!(results[0].result, ApplyResult::Removed);
        assert!(state.monitors.is_empty());
        assert!(source.0.stored("m-1").is_none());
    }

    #[test]
    fn test_orphan_already_gone_still_removed() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());
        source.0.remove("m-1");

        let results = pass("", &mut state, &source, &opts());
        assert_eq!(results[0].result, ApplyResult::Removed);
        assert!(state.monitors.is_empty());
    }

    #[test]
    fn test_refresh_recreates_deleted_monitor() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());
        source.0.remove("m-1");

        let refresh = ExecuteOptions {
            refresh: true,
            ..opts()
        };
        let results = pass(CONFIG, &mut state, &source, &refresh);
        assert_eq!(results[0].result, ApplyResult::Created);
        assert_eq!(state.applied("web").identity.as_str(), "m-2");
    }

    #[test]
    fn test_refresh_keeps_region_change_as_replacement() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());

        let moved = CONFIG.replace("region = \"RegionOne\"", "region = \"RegionTwo\"");
        let refresh = ExecuteOptions {
            refresh: true,
            ..opts()
        };
        let results = pass(&moved, &mut state, &source, &refresh);

        assert_eq!(results[0].result, ApplyResult::Replaced);
        assert!(source.0.stored("m-1").is_none());
        assert_eq!(state.applied("web").identity.as_str(), "m-2");
        assert_eq!(
            state.applied("web").get("region"),
            Some(&Value::from("RegionTwo"))
        );
    }

    #[test]
    fn test_replacement_found_by_refresh_needs_confirmation() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());
        source.0.set_field("m-1", "type", Value::from("TCP"));

        let refresh = ExecuteOptions {
            refresh: true,
            ..opts()
        };
        let results = pass(CONFIG, &mut state, &source, &refresh);
        let ApplyResult::Failed { error } = &results[0].result else {
            panic!("expected failure, got {:?}", results[0].result);
        };
        assert!(error.contains("type"));
        assert!(source.0.stored("m-1").is_some());
        assert_eq!(source.0.count(Operation::Delete), 0);
        assert_eq!(state.applied("web").get("type"), Some(&Value::from("TCP")));

        let confirmed = ExecuteOptions {
            yes: true,
            ..refresh
        };
        let results = pass(CONFIG, &mut state, &source, &confirmed);
        assert_eq!(results[0].result, ApplyResult::Replaced);
        assert_eq!(state.applied("web").identity.as_str(), "m-2");
    }

    #[test]
    fn test_refresh_without_drift_is_noop() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        pass(CONFIG, &mut state, &source, &opts());
        source.0.clear_calls();

        let refresh = ExecuteOptions {
            refresh: true,
            ..opts()
        };
        let results = pass(CONFIG, &mut state, &source, &refresh);
        assert_eq!(results[0].result, ApplyResult::NoChange);
        assert_eq!(source.0.calls().len(), 1);
        assert!(matches!(source.0.calls()[0], Call::Get(_)));
    }

    #[test]
    fn test_create_failure_reported() {
        let source = MockSource(MockClient::new());
        source
            .0
            .fail_next(Operation::Create, Failure::Remote("boom".into()));
        let mut state = LbmonState::default();

        let results = pass(CONFIG, &mut state, &source, &opts());
        let ApplyResult::Failed { error } = &results[0].result else {
            panic!("expected failure");
        };
        assert!(error.contains("boom"));
        assert!(state.monitors.is_empty());

        let summary = ExecuteSummary::from_results(&results);
        assert!(!summary.is_success());
        assert_eq!(summary.total_changes(), 0);
    }

    #[test]
    fn test_results_sorted_by_name() {
        let source = MockSource(MockClient::new());
        let mut state = LbmonState::default();
        let config = format!(
            "{CONFIG}\n[monitors.api]\ntype = \"TCP\"\ndelay = 5\ntimeout = 2\nmax_retries = 1\n"
        );
        let results = pass(&config, &mut state, &source, &opts());
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);
        assert_eq!(ExecuteSummary::from_results(&results).created, 2);
    }

    fn sample_result() -> MonitorResult {
        MonitorResult {
            name: "web".to_string(),
            state: AppliedState::absent(),
            result: ApplyResult::NoChange,
        }
    }

    #[test]
    fn push_result_handles_poisoned_mutex() {
        let results: Arc<Mutex<Vec<MonitorResult>>> = Arc::new(Mutex::new(Vec::new()));
        let poisoned = Arc::clone(&results);

        let _ = std::thread::spawn(move || {
            let _guard = poisoned
                .lock()
                .expect("lock should succeed before poisoning");
            panic!("intentional poison");
        })
        .join();

        push_result(&results, sample_result());

        let len = match results.lock() {
            Ok(locked) => locked.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        };
        assert_eq!(len, 1);
    }

    #[test]
    fn into_results_recovers_from_poisoned_mutex() {
        let results: Arc<Mutex<Vec<MonitorResult>>> = Arc::new(Mutex::new(Vec::new()));
        let poisoned = Arc::clone(&results);

        let _ = std::thread::spawn(move || {
            let mut guard = poisoned
                .lock()
                .expect("lock should succeed before poisoning");
            guard.push(sample_result());
            panic!("intentional poison");
        })
        .join();

        let collected = into_results(results).expect("poisoned mutex should be recovered");
        assert_eq!(collected.len(), 1);
    }
}
