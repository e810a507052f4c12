//! # ScrapeHub Clients
//!
//! Concrete collaborators for the scheduling core:
//!
//! | Concern | Remote | Local |
//! |---|---|---|
//! | Job store | [`GraphqlJobStore`] | [`FileJobStore`], [`MemoryJobStore`] |
//! | Result cache | [`UpstashCache`] | [`MemoryResultCache`] |
//! | Scrape executor | [`HttpScrapeExecutor`] | |

mod file_store;
mod graphql;
mod http_executor;
mod memory_cache;
mod memory_store;
mod upstash;

pub use file_store::FileJobStore;
pub use graphql::GraphqlJobStore;
pub use http_executor::HttpScrapeExecutor;
pub use memory_cache::MemoryResultCache;
pub use memory_store::MemoryJobStore;
pub use upstash::UpstashCache;
