//! Easel Lock - durable exclusive edit locks
//!
//! This crate implements the server side of canvas locking:
//! - `LockService`: acquire/refresh/release/status over the `canvas_lock`
//!   table, with the unique index on `resource_id` arbitrating races
//! - `Reaper`: background sweep of expired rows
//! - `StatusCache`: optional bounded cache for status reads
//!
//! The database is the only system of record. A lock is a lease: holding it
//! means owning the single row whose `expires_at` is still in the future.

pub mod cache;
pub mod config;
pub mod model;
pub mod reaper;
pub mod service;

pub use cache::StatusCache;
pub use config::LockConfig;
pub use model::{AcquireOutcome, LockToken, RefreshOutcome};
pub use reaper::Reaper;
pub use service::LockService;
