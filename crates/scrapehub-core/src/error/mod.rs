//! Error types for the ScrapeHub collaborator interfaces.

mod cache;
mod executor;
mod hub;
mod store;

pub use cache::*;
pub use executor::*;
pub use hub::*;
pub use store::*;
