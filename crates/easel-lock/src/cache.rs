//! Status read cache
//!
//! Optional, bounded, TTL-evicted front for `LockService::status`. It is
//! never a second source of truth: mutation paths write to the store and
//! invalidate here, and a cached "locked" answer whose lease has lapsed is
//! discarded on read.

use std::time::Duration;

use easel_common::model::LockStatus;
use easel_common::time::epoch_millis;
use moka::sync::Cache;

const MAX_CACHED_RESOURCES: u64 = 10_000;

#[derive(Clone)]
pub struct StatusCache {
    inner: Cache<String, LockStatus>,
}

impl StatusCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(MAX_CACHED_RESOURCES)
                .build(),
        }
    }

    pub fn get(&self, resource_id: &str) -> Option<LockStatus> {
        let status = self.inner.get(resource_id)?;
        if status.locked && status.expires_at.is_some_and(|at| at <= epoch_millis()) {
            self.inner.invalidate(resource_id);
            return None;
        }
        Some(status)
    }

    pub fn insert(&self, resource_id: &str, status: LockStatus) {
        self.inner.insert(resource_id.to_string(), status);
    }

    pub fn invalidate(&self, resource_id: &str) {
        self.inner.invalidate(resource_id);
    }
}
