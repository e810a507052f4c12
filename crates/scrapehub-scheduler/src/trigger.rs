//! ScheduledTrigger - one job bound to a live cron timer.
//!
//! A trigger owns a single tokio task that sleeps until the next fire time
//! of its expression and then hands the job to the fire callback. The
//! callback must not block; it dispatches the actual run elsewhere so a
//! slow run never delays the next fire.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;
use parking_lot::Mutex;
use scrapehub_core::JobDefinition;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::expression::TriggerExpression;

/// Callback invoked on each fire with the job captured at install time.
pub type FireCallback = Arc<dyn Fn(&JobDefinition) + Send + Sync>;

/// A live binding of one job to its timer.
///
/// State machine: installed, fired (repeatable), cancelled (terminal).
pub struct ScheduledTrigger {
    job: JobDefinition,
    expression: TriggerExpression,
    generation: u64,
    cancel: CancellationToken,
    fire_count: AtomicU64,
    next_fire: Mutex<Option<DateTime<Utc>>>,
}

impl ScheduledTrigger {
    /// Create an installed, not yet running trigger.
    pub fn new(
        job: JobDefinition,
        expression: TriggerExpression,
        generation: u64,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            job,
            expression,
            generation,
            cancel,
            fire_count: AtomicU64::new(0),
            next_fire: Mutex::new(None),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job.id
    }

    pub fn job(&self) -> &JobDefinition {
        &self.job
    }

    pub fn expression(&self) -> &TriggerExpression {
        &self.expression
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fire_count(&self) -> u64 {
        self.fire_count.load(Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop future fires. Runs already dispatched are unaffected.
    pub fn cancel(&self) {
        self.cancel.cancel();
        debug!("Trigger for job {} cancelled", self.job.id);
    }

    /// Next fire time, `None` once cancelled.
    pub fn next_fire_time(&self, tz: Tz) -> Option<DateTime<Tz>> {
        if self.is_cancelled() {
            return None;
        }
        match *self.next_fire.lock() {
            Some(next) => Some(next.with_timezone(&tz)),
            None => self.expression.next_in(tz),
        }
    }

    /// Spawn the timer task.
    pub fn start(
        self: &Arc<Self>,
        tz: Tz,
        claims: Arc<TickClaims>,
        on_fire: FireCallback,
    ) -> JoinHandle<()> {
        let trigger = Arc::clone(self);
        tokio::spawn(async move { trigger.drive(tz, claims, on_fire).await })
    }

    async fn drive(self: Arc<Self>, tz: Tz, claims: Arc<TickClaims>, on_fire: FireCallback) {
        let mut cursor = Utc::now();

        loop {
            let Some((next, missed)) = next_due(&self.expression, tz, cursor, Utc::now()) else {
                debug!("Trigger for job {} has no upcoming fire time", self.job.id);
                break;
            };
            if let Some(missed) = missed {
                warn!(
                    "Trigger for job {} missed ticks from {}, resuming at {}",
                    self.job.id,
                    missed.to_rfc3339(),
                    next.to_rfc3339()
                );
            }
            *self.next_fire.lock() = Some(next);

            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
            if self.cancel.is_cancelled() {
                break;
            }

            cursor = next;
            if !claims.claim(&self.job.id, next) {
                debug!(
                    "Tick {} of job {} already dispatched, skipping",
                    next.to_rfc3339(),
                    self.job.id
                );
                continue;
            }

            self.fire_count.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Trigger for job {} fired (generation {}, tick {})",
                self.job.id,
                self.generation,
                next.to_rfc3339()
            );
            on_fire(&self.job);
        }

        *self.next_fire.lock() = None;
    }
}

/// Next tick to sleep towards, strictly after `cursor`.
///
/// Ticks that already passed by `now` (wall-clock jump, suspended host)
/// are dropped rather than replayed; the first dropped tick is returned
/// alongside for logging.
fn next_due(
    expression: &TriggerExpression,
    tz: Tz,
    cursor: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, Option<DateTime<Utc>>)> {
    let after = |t: DateTime<Utc>| {
        expression
            .next_after(&t.with_timezone(&tz))
            .map(|next| next.with_timezone(&Utc))
    };

    let due = after(cursor)?;
    if due >= now {
        return Some((due, None));
    }
    Some((after(now)?, Some(due)))
}

/// Last dispatched tick per job, shared across generations.
///
/// A fresh generation may start a timer for a tick that the previous
/// generation already dispatched just before it was cancelled. Claiming
/// ticks here keeps one logical tick to one dispatch.
#[derive(Debug, Default)]
pub struct TickClaims {
    claimed: DashMap<String, DateTime<Utc>>,
}

impl TickClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `tick` for `job_id`. Returns `false` if this tick or a later
    /// one was already claimed.
    pub fn claim(&self, job_id: &str, tick: DateTime<Utc>) -> bool {
        use dashmap::mapref::entry::Entry;

        match self.claimed.entry(job_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() >= tick {
                    false
                } else {
                    entry.insert(tick);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(tick);
                true
            }
        }
    }

    /// Forget jobs that are no longer scheduled.
    pub fn retain<F>(&self, keep: F)
    where
        F: Fn(&str) -> bool,
    {
        self.claimed.retain(|job_id, _| keep(job_id));
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
