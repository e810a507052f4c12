//! HTTP interface module.

pub mod routes;

pub(crate) mod jobs;
pub(crate) mod monitoring;
