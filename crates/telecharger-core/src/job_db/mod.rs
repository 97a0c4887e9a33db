//! Persistent job store (SQLite via sqlx).
//!
//! One row per queued download: source, output name, encoding options and
//! lifecycle status. The store is the single source of truth for job status.

pub mod db;
mod jobs;
pub mod store;
pub mod types;

pub use db::*;
pub use store::JobStore;
pub use types::*;

#[cfg(test)]
mod tests;
