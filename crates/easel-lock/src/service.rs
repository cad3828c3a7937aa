//! Lock service over the durable store
//!
//! Every mutation is a single conditional statement or a short transaction;
//! correctness never rests on a read-then-write pair. The unique index on
//! `canvas_lock.resource_id` is the arbiter for concurrent acquires, and
//! expired rows are treated as absent wherever they are encountered.

use easel_common::model::LockStatus;
use easel_common::time::epoch_millis;
use easel_persistence::entity::canvas_lock;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use crate::cache::StatusCache;
use crate::config::LockConfig;
use crate::model::{AcquireOutcome, LockToken, RefreshOutcome};

/// Durable exclusive-lock service backed by the `canvas_lock` table.
#[derive(Clone)]
pub struct LockService {
    db: DatabaseConnection,
    config: LockConfig,
    cache: Option<StatusCache>,
}

impl LockService {
    pub fn new(db: DatabaseConnection, config: LockConfig) -> Self {
        let cache = config.status_cache_ttl.map(StatusCache::new);
        Self { db, config, cache }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Try to acquire the lock on `resource_id`.
    ///
    /// One transaction: delete the row if it has already expired, then insert
    /// a fresh lease. A unique-constraint violation on the insert means a
    /// live lease exists; that is reported as `Conflict` together with the
    /// status the contender saw, never as an error.
    pub async fn acquire(
        &self,
        resource_id: &str,
        requested_holder: Option<&str>,
    ) -> anyhow::Result<AcquireOutcome> {
        let now = epoch_millis();
        let expires_at = now + self.config.ttl_millis();
        let holder = self.mint_holder(requested_holder);

        let tx = self.db.begin().await?;

        canvas_lock::Entity::delete_many()
            .filter(canvas_lock::Column::ResourceId.eq(resource_id))
            .filter(canvas_lock::Column::ExpiresAt.lte(now))
            .exec(&tx)
            .await?;

        let model = canvas_lock::ActiveModel {
            resource_id: Set(resource_id.to_string()),
            acquired_at: Set(now),
            expires_at: Set(expires_at),
            holder: Set(holder.clone()),
            ..Default::default()
        };

        match canvas_lock::Entity::insert(model).exec(&tx).await {
            Ok(_) => {
                tx.commit().await?;
                self.invalidate(resource_id);
                debug!(resource_id = %resource_id, expires_at, "lock acquired");
                Ok(AcquireOutcome::Acquired(LockToken {
                    resource_id: resource_id.to_string(),
                    holder,
                    acquired_at: now,
                    expires_at,
                }))
            }
            Err(err) => {
                if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
                    // Roll back before reading status; with a small pool the
                    // read needs the connection.
                    tx.rollback().await?;
                    let status = self.status(resource_id).await?;
                    debug!(resource_id = %resource_id, "lock contended");
                    Ok(AcquireOutcome::Conflict(status))
                } else {
                    Err(err.into())
                }
            }
        }
    }

    /// Extend a held lease to `now + ttl`.
    ///
    /// A single conditional update filtered on the resource and a live
    /// expiry (and, in holder tracking mode, the holder). Zero rows affected
    /// means ownership was lost: expired, released, or held by someone else.
    pub async fn refresh(
        &self,
        resource_id: &str,
        holder: Option<&str>,
    ) -> anyhow::Result<RefreshOutcome> {
        if self.config.holder_tracking && holder.is_none() {
            // Without an identity the caller cannot prove ownership.
            return Ok(RefreshOutcome::NotHeld);
        }

        let now = epoch_millis();
        let expires_at = now + self.config.ttl_millis();

        let mut update = canvas_lock::Entity::update_many()
            .filter(canvas_lock::Column::ResourceId.eq(resource_id))
            .filter(canvas_lock::Column::ExpiresAt.gt(now))
            .col_expr(canvas_lock::Column::ExpiresAt, Expr::value(expires_at));

        if self.config.holder_tracking
            && let Some(holder) = holder
        {
            update = update.filter(canvas_lock::Column::Holder.eq(holder));
        }

        let result = update.exec(&self.db).await?;

        if result.rows_affected > 0 {
            self.invalidate(resource_id);
            debug!(resource_id = %resource_id, expires_at, "lock refreshed");
            Ok(RefreshOutcome::Refreshed { expires_at })
        } else {
            debug!(resource_id = %resource_id, "refresh found no live lease");
            Ok(RefreshOutcome::NotHeld)
        }
    }

    /// Release the lock on `resource_id`.
    ///
    /// Idempotent: releasing an absent (or already expired) lock succeeds.
    /// Returns whether a row was actually deleted. In holder tracking mode a
    /// supplied holder narrows the delete to that holder's lease; omitting it
    /// is an unconditional, administrative release.
    pub async fn release(&self, resource_id: &str, holder: Option<&str>) -> anyhow::Result<bool> {
        let mut delete =
            canvas_lock::Entity::delete_many().filter(canvas_lock::Column::ResourceId.eq(resource_id));

        if self.config.holder_tracking
            && let Some(holder) = holder
        {
            delete = delete.filter(canvas_lock::Column::Holder.eq(holder));
        }

        let result = delete.exec(&self.db).await?;
        self.invalidate(resource_id);

        if result.rows_affected > 0 {
            debug!(resource_id = %resource_id, "lock released");
        }
        Ok(result.rows_affected > 0)
    }

    /// Observed lock state. An expired row reports `locked: false`; physical
    /// deletion is left to the next acquire or the reaper.
    pub async fn status(&self, resource_id: &str) -> anyhow::Result<LockStatus> {
        if let Some(cache) = &self.cache
            && let Some(status) = cache.get(resource_id)
        {
            return Ok(status);
        }

        let now = epoch_millis();
        let status = match canvas_lock::Entity::find()
            .filter(canvas_lock::Column::ResourceId.eq(resource_id))
            .one(&self.db)
            .await?
        {
            Some(row) if row.expires_at > now => LockStatus::held(row.expires_at, row.holder),
            _ => LockStatus::unlocked(),
        };

        if let Some(cache) = &self.cache {
            cache.insert(resource_id, status.clone());
        }
        Ok(status)
    }

    /// Bulk-delete every expired row. Returns the number removed.
    pub async fn sweep_expired(&self) -> anyhow::Result<u64> {
        let now = epoch_millis();
        let result = canvas_lock::Entity::delete_many()
            .filter(canvas_lock::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    fn mint_holder(&self, requested: Option<&str>) -> Option<String> {
        if !self.config.holder_tracking {
            return None;
        }
        requested
            .map(str::to_string)
            .or_else(|| Some(Uuid::new_v4().to_string()))
    }

    fn invalidate(&self, resource_id: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(resource_id);
        }
    }
}
