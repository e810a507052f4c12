//! Application state.

use std::sync::Arc;

use scrapehub_scheduler::ScrapeHub;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ScrapeHub>,
}

impl AppState {
    pub fn new(hub: Arc<ScrapeHub>) -> Self {
        Self { hub }
    }
}
