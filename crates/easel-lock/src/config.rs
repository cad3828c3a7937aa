//! Lock service configuration

use std::time::Duration;

/// Tunables for the lock service and its reaper.
#[derive(Clone, Debug)]
pub struct LockConfig {
    /// Lease duration granted by acquire and refresh.
    pub ttl: Duration,
    /// How often the reaper sweeps expired rows.
    pub reaper_interval: Duration,
    /// When true, the service mints (or accepts) a holder identity and
    /// refresh/release are filtered on it. Off by default: the lock is
    /// exclusive by resource alone and first-to-acquire wins.
    pub holder_tracking: bool,
    /// TTL for the status read cache. `None` disables caching entirely;
    /// mutation paths never consult the cache either way.
    pub status_cache_ttl: Option<Duration>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(90),
            reaper_interval: Duration::from_secs(60),
            holder_tracking: false,
            status_cache_ttl: None,
        }
    }
}

impl LockConfig {
    pub fn ttl_millis(&self) -> i64 {
        self.ttl.as_millis() as i64
    }
}
