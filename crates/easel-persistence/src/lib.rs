//! Easel Persistence - Database entities and schema migrations
//!
//! This crate provides:
//! - SeaORM entity definitions for the lock store and the reference
//!   graphics table
//! - The schema migrator run at server startup and by the test suites

pub mod entity;
pub mod migration;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export the migrator and the trait needed to run it
pub use migration::Migrator;
pub use sea_orm_migration::MigratorTrait;
