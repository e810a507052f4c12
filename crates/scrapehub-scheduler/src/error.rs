//! Scheduler errors.

use thiserror::Error;

/// A trigger expression that cannot be scheduled.
///
/// Always isolated to the one offending job.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TriggerParseError {
    #[error("Expected 5 or 6 fields in '{expression}', found {found}")]
    FieldCount { expression: String, found: usize },

    #[error("Invalid trigger expression '{expression}': {reason}")]
    Invalid { expression: String, reason: String },
}
