use super::*;
use crate::test_support::{job, FakeCache, FakeStore, ScriptedExecutor};
use scrapehub_core::JobStore;
use std::collections::HashSet;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;
use tokio::sync::Semaphore;

fn counting_scheduler() -> (TriggerScheduler, Arc<Mutex<Vec<String>>>) {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = fired.clone();
    let on_fire: FireCallback = Arc::new(move |job: &JobDefinition| {
        sink.lock().push(job.id.clone());
    });
    (TriggerScheduler::new(chrono_tz::America::New_York, on_fire), fired)
}

fn pairs(scheduler: &TriggerScheduler) -> Vec<(String, String)> {
    scheduler
        .active_triggers()
        .into_iter()
        .map(|t| (t.job_id, t.trigger_expression))
        .collect()
}

#[tokio::test]
async fn test_reconcile_skips_malformed_expression() {
    let (scheduler, _) = counting_scheduler();
    let report = scheduler.reconcile(&[job("j1", "*/5 * * * *"), job("j2", "garbage")]);

    assert_eq!(report.installed, vec!["j1".to_string()]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].job_id, "j2");
    assert!(report.skipped[0].reason.contains("garbage"));
    assert_eq!(
        pairs(&scheduler),
        vec![("j1".to_string(), "*/5 * * * *".to_string())]
    );
}

#[tokio::test]
async fn test_partial_failure_isolation() {
    let (scheduler, _) = counting_scheduler();
    let mut snapshot: Vec<_> = (0..5)
        .map(|i| job(&format!("ok{}", i), "0 * * * *"))
        .collect();
    snapshot.insert(2, job("bad", "99 * * * *"));

    let report = scheduler.reconcile(&snapshot);
    assert_eq!(report.installed.len(), 5);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(scheduler.active_triggers().len(), 5);
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let (scheduler, _) = counting_scheduler();
    let snapshot = vec![job("j1", "*/5 * * * *"), job("j2", "0 9 * * 1-5")];

    let first = scheduler.reconcile(&snapshot);
    let before = pairs(&scheduler);
    let second = scheduler.reconcile(&snapshot);
    let after = pairs(&scheduler);

    assert_eq!(before, after);
    assert_eq!(second.generation, first.generation + 1);
}

#[tokio::test]
async fn test_duplicate_job_ids_keep_one_trigger() {
    let (scheduler, _) = counting_scheduler();
    let report = scheduler.reconcile(&[
        job("j1", "*/5 * * * *"),
        job("j1", "0 * * * *"),
        job("j2", "0 * * * *"),
    ]);

    assert_eq!(report.installed, vec!["j1".to_string(), "j2".to_string()]);
    assert_eq!(report.skipped.len(), 1);
    let active = pairs(&scheduler);
    assert_eq!(active.len(), 2);
    assert_eq!(active[0], ("j1".to_string(), "*/5 * * * *".to_string()));
}

#[tokio::test]
async fn test_no_duplicate_triggers_across_reconciliations() {
    let (scheduler, _) = counting_scheduler();
    scheduler.reconcile(&[job("j1", "* * * * *"), job("j2", "* * * * *")]);
    scheduler.reconcile(&[job("j2", "*/2 * * * *"), job("j3", "* * * * *")]);
    scheduler.reconcile(&[job("j2", "*/3 * * * *")]);

    let active = pairs(&scheduler);
    assert_eq!(active, vec![("j2".to_string(), "*/3 * * * *".to_string())]);

    let ids: HashSet<&str> = active.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids.len(), active.len());
}

#[tokio::test]
async fn test_previous_generation_is_cancelled() {
    let (scheduler, _) = counting_scheduler();
    scheduler.reconcile(&[job("j1", "*/5 * * * *")]);
    let old = scheduler.snapshot();

    scheduler.reconcile(&[job("j1", "*/5 * * * *")]);

    assert!(old.is_cancelled());
    assert!(old.triggers().iter().all(|t| t.is_cancelled()));
    assert!(!scheduler.snapshot().is_cancelled());
}

#[tokio::test]
async fn test_next_fire_at_is_in_configured_zone() {
    let (scheduler, _) = counting_scheduler();
    scheduler.reconcile(&[job("j1", "0 9 * * *")]);

    let active = scheduler.active_triggers();
    let next = active[0].next_fire_at.unwrap();
    assert_eq!(next.timezone(), chrono_tz::America::New_York);
    assert_eq!(next.format("%H:%M").to_string(), "09:00");
}

#[tokio::test]
async fn test_triggers_fire_for_installed_job() {
    let (scheduler, fired) = counting_scheduler();
    scheduler.reconcile(&[job("j1", "* * * * * *")]);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    scheduler.shutdown();

    let fired = fired.lock().clone();
    assert!(!fired.is_empty());
    assert!(fired.iter().all(|id| id == "j1"));
}

#[tokio::test]
async fn test_scheduled_fire_uses_parameters_captured_at_reconcile() {
    let store = FakeStore::with_jobs(vec![job("j1", "* * * * * *")]);
    let executor = Arc::new(ScriptedExecutor::new(Vec::new()));
    let runner = Arc::new(ExecutionRunner::new(
        store.clone(),
        Arc::new(FakeCache::default()),
        executor.clone(),
    ));
    let scheduler = TriggerScheduler::with_runner(chrono_tz::UTC, runner);

    let snapshot = store.list_jobs().await.unwrap();
    scheduler.reconcile(&snapshot);

    // Edited in the store, but not yet reconciled.
    let mut edited = job("j1", "* * * * * *");
    edited.target.href = "https://example.com/edited".to_string();
    store.set_jobs(vec![edited]);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    scheduler.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let targets = executor.targets.lock().clone();
    assert!(!targets.is_empty());
    assert!(targets.iter().all(|t| t.href == "https://example.com/j1"));
}

#[tokio::test]
async fn test_rapid_reconcile_does_not_double_fire_a_tick() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let tick_counter = ticks.clone();
    let on_fire: FireCallback = Arc::new(move |_job: &JobDefinition| {
        tick_counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });
    let scheduler = TriggerScheduler::new(chrono_tz::UTC, on_fire);
    let snapshot = vec![job("j1", "* * * * * *")];

    let started = Utc::now();
    for _ in 0..20 {
        scheduler.reconcile(&snapshot);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    scheduler.shutdown();
    let elapsed_secs = (Utc::now() - started).num_milliseconds() as f64 / 1000.0;

    let fired = ticks.load(std::sync::atomic::Ordering::SeqCst) as f64;
    assert!(
        fired <= elapsed_secs.ceil() + 1.0,
        "{} fires in {:.1}s",
        fired,
        elapsed_secs
    );
}

#[tokio::test]
async fn test_overlapping_runs_of_slow_job_are_allowed() {
    let gate = Arc::new(Semaphore::new(0));
    let executor = Arc::new(ScriptedExecutor::gated(gate.clone()));
    let store = Arc::new(FakeStore::default());
    let runner = Arc::new(ExecutionRunner::new(
        store.clone(),
        Arc::new(FakeCache::default()),
        executor.clone(),
    ));
    let scheduler = TriggerScheduler::with_runner(chrono_tz::UTC, runner);

    scheduler.reconcile(&[job("slow", "* * * * * *")]);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    scheduler.shutdown();

    assert!(executor.max_in_flight.load(std::sync::atomic::Ordering::SeqCst) >= 2);

    gate.add_permits(16);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let calls = executor.calls.load(std::sync::atomic::Ordering::SeqCst);
    assert_eq!(store.records_for("slow").len(), calls);
}

#[tokio::test]
async fn test_shutdown_clears_active_triggers() {
    let (scheduler, fired) = counting_scheduler();
    scheduler.reconcile(&[job("j1", "* * * * * *")]);
    scheduler.shutdown();

    assert!(scheduler.active_triggers().is_empty());
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(fired.lock().is_empty());
}

#[test]
fn test_plan_from_snapshot() {
    let plan = ReconcilePlan::from_snapshot(&[
        job("a", "*/5 * * * *"),
        job("b", ""),
        job("c", "0 0 * * 0"),
    ]);
    assert_eq!(plan.accepted.len(), 2);
    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].job_id, "b");
}

#[test]
fn test_generation_starts_at_zero() {
    let (scheduler, _) = counting_scheduler();
    assert_eq!(scheduler.generation(), 0);
    assert!(scheduler.installed_at().is_none());
    assert!(scheduler.active_triggers().is_empty());
}
