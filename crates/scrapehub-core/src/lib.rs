//! # ScrapeHub Core
//!
//! Data model and collaborator interfaces shared by every ScrapeHub crate.
//!
//! The scheduling core talks to three external collaborators, each behind
//! a narrow async trait:
//!
//! - [`JobStore`]: authoritative job definitions and the append-only
//!   execution history.
//! - [`ResultCache`]: disposable key-value cache of the latest successful
//!   result per job.
//! - [`ScrapeExecutor`]: turns a [`ScrapeTarget`] into structured JSON.
//!
//! Concrete implementations live in `scrapehub-clients`.

pub mod cache;
pub mod error;
pub mod executor;
pub mod job;
pub mod record;
pub mod store;

pub use cache::{cache_key, ResultCache, DEFAULT_KEY_PREFIX};
pub use error::{CacheError, ExecutorError, HubError, HubResult, StoreError};
pub use executor::ScrapeExecutor;
pub use job::{JobDefinition, ScrapeTarget};
pub use record::{ExecutionRecord, NewExecutionRecord};
pub use store::JobStore;
