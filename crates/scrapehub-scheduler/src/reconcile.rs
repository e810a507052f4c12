//! Reconciliation: fetch the authoritative job list and rebuild triggers.
//!
//! [`Reconciler`] performs one pass and is shared by the periodic
//! [`ReconciliationLoop`] and out-of-band callers. Passes are serialized.
//! A failed fetch leaves the live generation untouched.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use scrapehub_core::{JobStore, StoreError};
use serde::Serialize;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::scheduler::{ReconcileReport, TriggerScheduler};

/// Outcome history of reconciliation passes, for health reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileStatus {
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub successes: u64,
    pub failures: u64,
}

impl ReconcileStatus {
    /// Healthy once a pass has succeeded and the latest one did not fail.
    pub fn is_healthy(&self) -> bool {
        self.last_success_at.is_some() && self.last_error.is_none()
    }
}

/// Runs one fetch-and-reinstall pass at a time.
pub struct Reconciler {
    store: Arc<dyn JobStore>,
    scheduler: Arc<TriggerScheduler>,
    pass: tokio::sync::Mutex<()>,
    status: RwLock<ReconcileStatus>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn JobStore>, scheduler: Arc<TriggerScheduler>) -> Self {
        Self {
            store,
            scheduler,
            pass: tokio::sync::Mutex::new(()),
            status: RwLock::new(ReconcileStatus::default()),
        }
    }

    pub fn scheduler(&self) -> &Arc<TriggerScheduler> {
        &self.scheduler
    }

    /// Fetch all jobs and install a fresh generation.
    ///
    /// On fetch failure the previous generation stays live and the error
    /// is returned.
    pub async fn reconcile_now(&self) -> Result<ReconcileReport, StoreError> {
        let _pass = self.pass.lock().await;
        let attempted_at = Utc::now();

        match self.store.list_jobs().await {
            Ok(jobs) => {
                let report = self.scheduler.reconcile(&jobs);
                let mut status = self.status.write();
                status.last_attempt_at = Some(attempted_at);
                status.last_success_at = Some(Utc::now());
                status.last_error = None;
                status.successes += 1;
                Ok(report)
            }
            Err(e) => {
                error!(
                    "Failed to fetch jobs, keeping trigger generation {}: {}",
                    self.scheduler.generation(),
                    e
                );
                let mut status = self.status.write();
                status.last_attempt_at = Some(attempted_at);
                status.last_error = Some(e.to_string());
                status.failures += 1;
                Err(e)
            }
        }
    }

    pub fn status(&self) -> ReconcileStatus {
        self.status.read().clone()
    }
}

/// Timing driver: one pass at startup, then one per poll interval.
pub struct ReconciliationLoop {
    reconciler: Arc<Reconciler>,
    poll_interval: Option<Duration>,
}

impl ReconciliationLoop {
    /// `poll_interval` of `None` disables polling; only the startup pass
    /// and out-of-band calls reconcile. A zero interval also disables it.
    pub fn new(reconciler: Arc<Reconciler>, poll_interval: Option<Duration>) -> Self {
        let poll_interval = match poll_interval {
            Some(every) if every.is_zero() => {
                warn!("Zero reconciliation poll interval, polling disabled");
                None
            }
            other => other,
        };
        Self {
            reconciler,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval
    }

    /// Run until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        match self.poll_interval {
            Some(every) => info!("Reconciliation loop started (poll interval: {:?})", every),
            None => info!("Reconciliation loop started (polling disabled)"),
        }

        if let Err(e) = self.reconciler.reconcile_now().await {
            error!("Startup reconciliation failed, running with no triggers: {}", e);
        }

        let Some(every) = self.poll_interval else {
            cancel.cancelled().await;
            info!("Reconciliation loop shutting down");
            return;
        };

        let mut interval = time::interval_at(time::Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    // Failures are logged and recorded by the reconciler.
                    let _ = self.reconciler.reconcile_now().await;
                }
                _ = cancel.cancelled() => {
                    info!("Reconciliation loop shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn the loop onto the runtime.
    pub fn spawn(self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
