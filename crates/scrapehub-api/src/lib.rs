//! # ScrapeHub API
//!
//! HTTP surface over [`scrapehub_scheduler::ScrapeHub`].
//!
//! ```text
//! POST /reconcile            - Re-fetch jobs and reinstall triggers
//! GET  /triggers             - Active triggers with next fire times
//! POST /jobs/{id}/run        - Run a job now
//! GET  /jobs/{id}/latest     - Latest successful result
//! GET  /jobs/{id}/history    - Execution history, newest first
//! GET  /health               - Scheduler health
//! GET  /livez                - Liveness check
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{InterfaceConfig, InterfaceServer};
pub use state::AppState;
