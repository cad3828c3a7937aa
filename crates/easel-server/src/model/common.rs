//! Configuration and shared application state
//!
//! Configuration is layered: `conf/application.yml` (optional), `EASEL_*`
//! environment variables, then command line flags, last writer wins.

use std::time::Duration;

use clap::Parser;
use config::{Config, Environment};
use easel_lock::{LockConfig, LockService};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub const DEFAULT_SERVER_PORT: u16 = 8642;

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command()]
struct Cli {
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    database_url: Option<String>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        Self::build(args.port, args.database_url)
    }

    /// Build a configuration without touching the process arguments. Used by
    /// tests and by embedders that supply their own overrides.
    pub fn with_overrides(port: Option<u16>, database_url: Option<String>) -> Self {
        Self::build(port, database_url)
    }

    fn build(port: Option<u16>, database_url: Option<String>) -> Self {
        let mut config_builder = Config::builder()
            .add_source(
                Environment::with_prefix("easel")
                    .separator(".")
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("conf/application.yml").required(false));

        if let Some(v) = port {
            config_builder = config_builder
                .set_override("server.port", i64::from(v))
                .expect("Failed to set server port override");
        }
        if let Some(v) = database_url {
            config_builder = config_builder
                .set_override("db.url", v)
                .expect("Failed to set database URL override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/application.yml");

        Configuration { config: app_config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or("0.0.0.0".to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    pub fn server_context_path(&self) -> String {
        self.config
            .get_string("easel.server.contextPath")
            .unwrap_or_default()
    }

    // ========================================================================
    // Lock Configuration
    // ========================================================================

    pub fn lock_ttl_seconds(&self) -> u64 {
        self.config.get_int("easel.lock.ttlSeconds").unwrap_or(90) as u64
    }

    pub fn lock_reaper_interval_seconds(&self) -> u64 {
        self.config
            .get_int("easel.lock.reaperIntervalSeconds")
            .unwrap_or(60) as u64
    }

    pub fn lock_holder_tracking(&self) -> bool {
        self.config
            .get_bool("easel.lock.holderTracking")
            .unwrap_or(false)
    }

    /// Status cache TTL in milliseconds; 0 disables the cache.
    pub fn lock_status_cache_ttl_ms(&self) -> u64 {
        self.config
            .get_int("easel.lock.statusCacheTtlMs")
            .unwrap_or(0) as u64
    }

    pub fn lock_config(&self) -> LockConfig {
        LockConfig {
            ttl: Duration::from_secs(self.lock_ttl_seconds()),
            reaper_interval: Duration::from_secs(self.lock_reaper_interval_seconds()),
            holder_tracking: self.lock_holder_tracking(),
            status_cache_ttl: match self.lock_status_cache_ttl_ms() {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }

    // ========================================================================
    // Database Configuration
    // ========================================================================

    pub async fn database_connection(
        &self,
    ) -> std::result::Result<DatabaseConnection, Box<dyn std::error::Error>> {
        let max_connections = self
            .config
            .get_int("db.pool.config.maximumPoolSize")
            .unwrap_or(20) as u32;
        let min_connections = self
            .config
            .get_int("db.pool.config.minimumPoolSize")
            .unwrap_or(1) as u32;
        let connect_timeout = self
            .config
            .get_int("db.pool.config.connectionTimeout")
            .unwrap_or(30) as u64;
        let idle_timeout = self
            .config
            .get_int("db.pool.config.idleTimeout")
            .unwrap_or(10) as u64;
        let max_lifetime = self
            .config
            .get_int("db.pool.config.maxLifetime")
            .unwrap_or(1800) as u64;
        let sqlx_logging = self
            .config
            .get_bool("db.pool.config.sqlxLogging")
            .unwrap_or(false);

        let url = self.config.get_string("db.url")?;

        let mut opt = ConnectOptions::new(url);

        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .idle_timeout(Duration::from_secs(idle_timeout))
            .max_lifetime(Duration::from_secs(max_lifetime))
            .sqlx_logging(sqlx_logging)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        tracing::info!(
            max_connections = max_connections,
            min_connections = min_connections,
            connect_timeout = connect_timeout,
            idle_timeout = idle_timeout,
            max_lifetime = max_lifetime,
            sqlx_logging = sqlx_logging,
            "Database connection pool configured"
        );

        let database_connection: DatabaseConnection = Database::connect(opt).await?;

        Ok(database_connection)
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub configuration: Configuration,
    pub database_connection: DatabaseConnection,
    pub lock_service: LockService,
}

impl AppState {
    pub fn db(&self) -> &DatabaseConnection {
        &self.database_connection
    }

    pub fn locks(&self) -> &LockService {
        &self.lock_service
    }
}
