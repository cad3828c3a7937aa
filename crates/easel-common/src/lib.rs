//! Easel Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all Easel components:
//! - Error types and error codes
//! - Wire models for the lock API
//! - Time helpers

pub mod error;
pub mod model;
pub mod time;

// Re-exports for convenience
pub use error::{AppError, EaselError, ErrorCode};
pub use model::{CleanupReceipt, LockGrant, LockStatus, RefreshReceipt, ReleaseReceipt};
pub use time::epoch_millis;

/// Query/body parameter names
pub const HOLDER: &str = "holder";
pub const RESOURCE_ID: &str = "resourceId";
