//! # ScrapeHub Scheduler
//!
//! The scheduling and execution core of ScrapeHub.
//!
//! - [`TriggerScheduler`] owns the live generation of cron triggers and
//!   rebuilds it wholesale on every reconciliation.
//! - [`ExecutionRunner`] runs one job firing and records its outcome.
//! - [`Reconciler`] and [`ReconciliationLoop`] keep the trigger set in step
//!   with the job store.
//! - [`ScrapeHub`] ties them together for the API and CLI.

pub mod error;
pub mod expression;
pub mod hub;
pub mod reconcile;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod trigger;

#[cfg(test)]
mod test_support;

pub use error::TriggerParseError;
pub use expression::TriggerExpression;
pub use hub::{HubConfig, HubStatus, LatestResult, ResultSource, ScrapeHub};
pub use reconcile::{ReconcileStatus, Reconciler, ReconciliationLoop};
pub use registry::{Generation, TriggerRegistry};
pub use runner::{CachePolicy, ExecutionRunner, RunOutcome};
pub use scheduler::{ActiveTrigger, ReconcilePlan, ReconcileReport, SkippedJob, TriggerScheduler};
pub use trigger::{FireCallback, ScheduledTrigger, TickClaims};
