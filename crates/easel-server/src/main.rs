//! Main entry point for the Easel canvas lock server.
//!
//! Boot order: configuration, logging, database (with migrations), lock
//! service and reaper, then the HTTP server. Shutdown fans out through a
//! broadcast signal so the reaper stops alongside the server.

use std::sync::Arc;

use easel_lock::{LockService, Reaper};
use easel_persistence::{Migrator, MigratorTrait};
use easel_server::{
    model::common::{AppState, Configuration},
    startup,
};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize configuration and logging
    let configuration = Configuration::new();

    let subscriber = startup::get_subscriber("easel-server", "info", std::io::stdout);
    startup::init_subscriber(subscriber)?;

    // Extract configuration parameters
    let server_address = configuration.server_address();
    let server_port = configuration.server_port();
    let context_path = configuration.server_context_path();
    let lock_config = configuration.lock_config();

    // Initialize database and apply pending migrations
    let database_connection = configuration.database_connection().await?;
    Migrator::up(&database_connection, None).await?;
    info!("Database schema is up to date");

    let lock_service = LockService::new(database_connection.clone(), lock_config);

    // Install the signal listener before anything long-lived starts
    let shutdown = startup::wait_for_shutdown_signal().await;
    let reaper_handle = Reaper::new(lock_service.clone()).spawn(shutdown.subscribe());

    let app_state = Arc::new(AppState {
        configuration,
        database_connection,
        lock_service,
    });

    info!(
        "Starting Easel lock server on {}:{}",
        server_address, server_port
    );
    let server = startup::http_server(app_state, context_path, server_address, server_port)?;

    let mut shutdown_rx = shutdown.subscribe();
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutting down HTTP server");
        }
    }

    // Stop the reaper whichever way we got here
    shutdown.shutdown();
    if let Err(e) = reaper_handle.await {
        error!("Reaper task failed to stop cleanly: {}", e);
    }

    info!("Easel server shutdown complete");
    Ok(())
}
