//! Trigger Scheduler.
//!
//! Every reconciliation tears down the live generation and rebuilds it in
//! full from the snapshot; triggers are never patched in place.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use scrapehub_core::JobDefinition;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::expression::TriggerExpression;
use crate::registry::{Generation, TriggerRegistry};
use crate::runner::ExecutionRunner;
use crate::trigger::{FireCallback, ScheduledTrigger, TickClaims};

/// A job left out of a generation.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedJob {
    pub job_id: String,
    pub expression: String,
    pub reason: String,
}

/// Result of planning a generation from a snapshot.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    pub accepted: Vec<(JobDefinition, TriggerExpression)>,
    pub skipped: Vec<SkippedJob>,
}

impl ReconcilePlan {
    /// Parse every job's expression, keeping the valid ones.
    ///
    /// Duplicate job IDs keep their first occurrence.
    pub fn from_snapshot(snapshot: &[JobDefinition]) -> Self {
        let mut plan = ReconcilePlan::default();
        let mut seen = HashSet::new();

        for job in snapshot {
            if !seen.insert(job.id.as_str()) {
                plan.skip(job, "duplicate job id in snapshot".to_string());
                continue;
            }
            match TriggerExpression::parse(&job.schedule) {
                Ok(expression) => plan.accepted.push((job.clone(), expression)),
                Err(e) => plan.skip(job, e.to_string()),
            }
        }

        plan
    }

    fn skip(&mut self, job: &JobDefinition, reason: String) {
        self.skipped.push(SkippedJob {
            job_id: job.id.clone(),
            expression: job.schedule.clone(),
            reason,
        });
    }
}

/// What a reconciliation installed.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub generation: u64,
    pub installed: Vec<String>,
    pub skipped: Vec<SkippedJob>,
}

/// Introspection view of one active trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveTrigger {
    pub job_id: String,
    pub trigger_expression: String,
    pub next_fire_at: Option<DateTime<Tz>>,
}

/// Owns the live trigger generation and rebuilds it on demand.
pub struct TriggerScheduler {
    registry: TriggerRegistry,
    claims: Arc<TickClaims>,
    timezone: Tz,
    on_fire: FireCallback,
    next_generation: AtomicU64,
    reconcile_guard: Mutex<()>,
}

impl TriggerScheduler {
    /// Create a scheduler that hands each fire to `on_fire`.
    pub fn new(timezone: Tz, on_fire: FireCallback) -> Self {
        Self {
            registry: TriggerRegistry::new(),
            claims: Arc::new(TickClaims::new()),
            timezone,
            on_fire,
            next_generation: AtomicU64::new(1),
            reconcile_guard: Mutex::new(()),
        }
    }

    /// Create a scheduler whose fires dispatch the runner on the tokio
    /// runtime, fire-and-forget.
    pub fn with_runner(timezone: Tz, runner: Arc<ExecutionRunner>) -> Self {
        let on_fire: FireCallback = Arc::new(move |job: &JobDefinition| {
            let runner = Arc::clone(&runner);
            let job_id = job.id.clone();
            let target = job.target.clone();
            tokio::spawn(async move {
                runner.run(&job_id, &target).await;
            });
        });
        Self::new(timezone, on_fire)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Replace the live generation with one built from `snapshot`.
    ///
    /// Jobs with malformed expressions are skipped with a warning; the
    /// rest are installed. Must be called inside a tokio runtime.
    pub fn reconcile(&self, snapshot: &[JobDefinition]) -> ReconcileReport {
        let _guard = self.reconcile_guard.lock();

        let plan = ReconcilePlan::from_snapshot(snapshot);
        for skipped in &plan.skipped {
            warn!(
                "Skipping job {} with trigger '{}': {}",
                skipped.job_id, skipped.expression, skipped.reason
            );
        }

        let number = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();
        let triggers: Vec<Arc<ScheduledTrigger>> = plan
            .accepted
            .into_iter()
            .map(|(job, expression)| {
                Arc::new(ScheduledTrigger::new(
                    job,
                    expression,
                    number,
                    token.child_token(),
                ))
            })
            .collect();

        let installed: Vec<String> = triggers.iter().map(|t| t.job_id().to_string()).collect();
        let keep: HashSet<&str> = installed.iter().map(String::as_str).collect();
        self.claims.retain(|job_id| keep.contains(job_id));

        let old = self
            .registry
            .replace_all(Generation::new(number, token, triggers.clone()));

        for trigger in &triggers {
            trigger.start(self.timezone, Arc::clone(&self.claims), Arc::clone(&self.on_fire));
            info!(
                "Installed trigger for job {} ('{}')",
                trigger.job_id(),
                trigger.expression()
            );
        }

        info!(
            "Trigger generation {} installed ({} active, {} skipped, replaced generation {})",
            number,
            installed.len(),
            plan.skipped.len(),
            old.number()
        );

        ReconcileReport {
            generation: number,
            installed,
            skipped: plan.skipped,
        }
    }

    /// Active triggers of the live generation, in snapshot order.
    pub fn active_triggers(&self) -> Vec<ActiveTrigger> {
        let generation = self.registry.snapshot();
        if generation.is_cancelled() {
            return Vec::new();
        }
        generation
            .triggers()
            .iter()
            .map(|t| ActiveTrigger {
                job_id: t.job_id().to_string(),
                trigger_expression: t.expression().to_string(),
                next_fire_at: t.next_fire_time(self.timezone),
            })
            .collect()
    }

    /// Number of the live generation; 0 before the first reconciliation.
    pub fn generation(&self) -> u64 {
        self.registry.snapshot().number()
    }

    /// Read-only view of the live generation.
    pub fn snapshot(&self) -> Arc<Generation> {
        self.registry.snapshot()
    }

    /// Cancel the live generation. Dispatched runs keep going.
    pub fn shutdown(&self) {
        let _guard = self.reconcile_guard.lock();
        self.registry.cancel_current();
        info!("Trigger scheduler stopped at generation {}", self.generation());
    }

    pub fn installed_at(&self) -> Option<DateTime<Utc>> {
        let generation = self.registry.snapshot();
        (generation.number() > 0).then(|| generation.installed_at())
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
