//! Common test utilities for integration testing
//!
//! Builds `AppState` instances over fresh in-memory databases so each test
//! starts from a clean slate.

use std::sync::Arc;
use std::time::Duration;

use easel_lock::{LockConfig, LockService};
use easel_persistence::{Migrator, MigratorTrait};
use easel_server::model::common::{AppState, Configuration};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory database with the schema applied.
pub async fn test_db() -> DatabaseConnection {
    // A single pooled connection: every sqlite::memory: connection is a
    // distinct database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("sqlite connect failed");
    Migrator::up(&db, None).await.expect("migrations failed");
    db
}

/// App state over a fresh database with the given lock configuration.
pub async fn state_with(config: LockConfig) -> Arc<AppState> {
    let db = test_db().await;
    let lock_service = LockService::new(db.clone(), config);
    Arc::new(AppState {
        configuration: Configuration::default(),
        database_connection: db,
        lock_service,
    })
}

pub async fn default_state() -> Arc<AppState> {
    state_with(LockConfig::default()).await
}

/// Holder tracking on: refresh/release are keyed to the acquiring session.
#[allow(dead_code)]
pub async fn holder_state() -> Arc<AppState> {
    state_with(LockConfig {
        holder_tracking: true,
        ..LockConfig::default()
    })
    .await
}

/// Sub-second TTL so expiry paths run in tens of milliseconds.
#[allow(dead_code)]
pub fn short_ttl(ms: u64) -> LockConfig {
    LockConfig {
        ttl: Duration::from_millis(ms),
        ..LockConfig::default()
    }
}
