//! Trigger registry.
//!
//! Holds the single live [`Generation`] of triggers. The only mutation is
//! a whole-generation swap; readers always see one complete generation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::trigger::ScheduledTrigger;

/// The full set of triggers installed by one reconciliation pass.
pub struct Generation {
    number: u64,
    installed_at: DateTime<Utc>,
    token: CancellationToken,
    triggers: Vec<Arc<ScheduledTrigger>>,
}

impl Generation {
    /// An empty generation, used before the first reconciliation.
    pub fn empty() -> Self {
        Self::new(0, CancellationToken::new(), Vec::new())
    }

    /// Create a generation. Every trigger's token must be a child of `token`.
    pub fn new(number: u64, token: CancellationToken, triggers: Vec<Arc<ScheduledTrigger>>) -> Self {
        Self {
            number,
            installed_at: Utc::now(),
            token,
            triggers,
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn installed_at(&self) -> DateTime<Utc> {
        self.installed_at
    }

    pub fn triggers(&self) -> &[Arc<ScheduledTrigger>] {
        &self.triggers
    }

    pub fn get(&self, job_id: &str) -> Option<&Arc<ScheduledTrigger>> {
        self.triggers.iter().find(|t| t.job_id() == job_id)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Cancel every trigger of this generation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token that child triggers of this generation derive from.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Internally synchronized holder of the live generation.
pub struct TriggerRegistry {
    current: RwLock<Arc<Generation>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Generation::empty())),
        }
    }

    /// Install `next` as the live generation and cancel the previous one.
    ///
    /// The previous generation is cancelled before the write lock is
    /// released, so no reader can observe two live generations.
    pub fn replace_all(&self, next: Generation) -> Arc<Generation> {
        let next = Arc::new(next);
        let mut current = self.current.write();
        current.cancel();
        std::mem::replace(&mut *current, next)
    }

    /// Read-only view of the live generation.
    pub fn snapshot(&self) -> Arc<Generation> {
        self.current.read().clone()
    }

    /// Cancel the live generation without replacing it.
    pub fn cancel_current(&self) {
        self.current.read().cancel();
    }
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::TriggerExpression;
    use scrapehub_core::{JobDefinition, ScrapeTarget};

    fn generation(number: u64, ids: &[&str]) -> Generation {
        let token = CancellationToken::new();
        let triggers = ids
            .iter()
            .map(|id| {
                Arc::new(ScheduledTrigger::new(
                    JobDefinition::new(*id, "*/5 * * * *", ScrapeTarget::new("https://a", "p", "")),
                    TriggerExpression::parse("*/5 * * * *").unwrap(),
                    number,
                    token.child_token(),
                ))
            })
            .collect();
        Generation::new(number, token, triggers)
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = TriggerRegistry::new();
        let snap = registry.snapshot();
        assert_eq!(snap.number(), 0);
        assert!(snap.is_empty());
    }

    #[test]
    fn test_replace_all_cancels_previous() {
        let registry = TriggerRegistry::new();
        registry.replace_all(generation(1, &["j1", "j2"]));
        let first = registry.snapshot();
        assert_eq!(first.len(), 2);

        let old = registry.replace_all(generation(2, &["j3"]));
        assert_eq!(old.number(), 1);
        assert!(old.is_cancelled());
        assert!(first.triggers().iter().all(|t| t.is_cancelled()));

        let current = registry.snapshot();
        assert_eq!(current.number(), 2);
        assert!(!current.is_cancelled());
        assert!(current.get("j3").is_some());
        assert!(current.get("j1").is_none());
    }

    #[test]
    fn test_snapshot_is_stable_across_replace() {
        let registry = TriggerRegistry::new();
        registry.replace_all(generation(1, &["j1"]));
        let held = registry.snapshot();
        registry.replace_all(generation(2, &["j1", "j2"]));
        assert_eq!(held.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn test_cancel_current() {
        let registry = TriggerRegistry::new();
        registry.replace_all(generation(1, &["j1"]));
        registry.cancel_current();
        assert!(registry.snapshot().triggers()[0].is_cancelled());
    }
}
