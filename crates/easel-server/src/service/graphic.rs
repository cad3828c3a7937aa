//! Graphics service
//!
//! Reference slice of the dashboard's graphics CRUD, here to host the lock
//! contract. Reads are unguarded. Metadata updates and deletes are refused
//! while a lock is held; canvas saves go further and require the caller to
//! hold a live lock. Deleting a graphic drops its lock row too, so a reused
//! id never inherits a stale lease. The lock key for a graphic is its id
//! rendered as a string.

use easel_common::model::LockStatus;
use easel_common::time::epoch_millis;
use easel_lock::LockService;
use easel_persistence::entity::graphic;
use sea_orm::*;
use tracing::debug;

/// Outcome of a guarded metadata update.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(graphic::Model),
    /// Another session holds the lock; carries what the caller saw.
    Locked(LockStatus),
    NotFound,
}

/// Outcome of a canvas save.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(graphic::Model),
    /// No live lock held by the caller. Saving without the lock would let a
    /// stale tab clobber the active editor's work.
    LockRequired(LockStatus),
    NotFound,
}

/// Outcome of a guarded delete.
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted,
    Locked(LockStatus),
    NotFound,
}

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    canvas_json: &str,
) -> anyhow::Result<graphic::Model> {
    let now = epoch_millis();
    let model = graphic::ActiveModel {
        name: Set(name.to_string()),
        canvas_json: Set(canvas_json.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    debug!(id = created.id, name = %created.name, "graphic created");
    Ok(created)
}

pub async fn get(db: &DatabaseConnection, id: i64) -> anyhow::Result<Option<graphic::Model>> {
    Ok(graphic::Entity::find_by_id(id).one(db).await?)
}

pub async fn list(db: &DatabaseConnection) -> anyhow::Result<Vec<graphic::Model>> {
    Ok(graphic::Entity::find()
        .order_by_asc(graphic::Column::Id)
        .all(db)
        .await?)
}

/// Rename a graphic. Refused while another session holds the edit lock.
pub async fn update_meta(
    db: &DatabaseConnection,
    locks: &LockService,
    id: i64,
    name: &str,
    holder: Option<&str>,
) -> anyhow::Result<UpdateOutcome> {
    let Some(existing) = graphic::Entity::find_by_id(id).one(db).await? else {
        return Ok(UpdateOutcome::NotFound);
    };

    let status = locks.status(&id.to_string()).await?;
    if status.locked && !may_bypass(locks, &status, holder) {
        debug!(id, "metadata update refused, graphic is locked");
        return Ok(UpdateOutcome::Locked(status));
    }

    let mut active: graphic::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    active.updated_at = Set(epoch_millis());

    Ok(UpdateOutcome::Updated(active.update(db).await?))
}

/// Persist the canvas. Only the session holding a live lock may save.
pub async fn save_canvas(
    db: &DatabaseConnection,
    locks: &LockService,
    id: i64,
    canvas_json: &str,
    holder: Option<&str>,
) -> anyhow::Result<SaveOutcome> {
    let Some(existing) = graphic::Entity::find_by_id(id).one(db).await? else {
        return Ok(SaveOutcome::NotFound);
    };

    let status = locks.status(&id.to_string()).await?;
    let authorized = if locks.config().holder_tracking {
        status.locked && holder.is_some() && holder == status.holder.as_deref()
    } else {
        status.locked
    };
    if !authorized {
        debug!(id, "canvas save refused, no live lock");
        return Ok(SaveOutcome::LockRequired(status));
    }

    let mut active: graphic::ActiveModel = existing.into();
    active.canvas_json = Set(canvas_json.to_string());
    active.updated_at = Set(epoch_millis());

    Ok(SaveOutcome::Saved(active.update(db).await?))
}

/// Delete a graphic and release its lock row.
pub async fn delete(
    db: &DatabaseConnection,
    locks: &LockService,
    id: i64,
    holder: Option<&str>,
) -> anyhow::Result<DeleteOutcome> {
    let status = locks.status(&id.to_string()).await?;
    if status.locked && !may_bypass(locks, &status, holder) {
        debug!(id, "delete refused, graphic is locked");
        return Ok(DeleteOutcome::Locked(status));
    }

    let result = graphic::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Ok(DeleteOutcome::NotFound);
    }

    // Also clears an expired-but-present row that was about to be reaped.
    locks.release(&id.to_string(), None).await?;
    debug!(id, "graphic deleted");
    Ok(DeleteOutcome::Deleted)
}

/// In holder tracking mode the session that holds the lock may mutate; a
/// locked resource is otherwise untouchable until release or expiry.
fn may_bypass(locks: &LockService, status: &LockStatus, holder: Option<&str>) -> bool {
    locks.config().holder_tracking && holder.is_some() && holder == status.holder.as_deref()
}
