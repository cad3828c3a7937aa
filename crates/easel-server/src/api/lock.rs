//! Lock endpoints
//!
//! Acquire, refresh, release and status for a single resource. Contended
//! acquires and lapsed refreshes answer 409 carrying the current status so
//! the dashboard can show who holds the lock and until when.

use actix_web::{HttpRequest, HttpResponse, Scope, delete, get, post, web};
use easel_common::model::{LockRequest, RefreshReceipt, ReleaseReceipt};
use easel_lock::{AcquireOutcome, RefreshOutcome};
use serde::Deserialize;
use tracing::debug;

use crate::model::common::AppState;

use super::internal_error;

#[derive(Debug, Default, Deserialize)]
pub struct ReleaseParams {
    holder: Option<String>,
}

fn requested_holder(body: &Option<web::Json<LockRequest>>) -> Option<&str> {
    body.as_ref().and_then(|b| b.holder.as_deref())
}

/// Try to take the exclusive edit lock on a resource.
#[post("/{resource_id}")]
async fn acquire(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<LockRequest>>,
    req: HttpRequest,
) -> HttpResponse {
    let resource_id = path.into_inner();

    match data
        .locks()
        .acquire(&resource_id, requested_holder(&body))
        .await
    {
        Ok(AcquireOutcome::Acquired(token)) => HttpResponse::Ok().json(token.grant()),
        Ok(AcquireOutcome::Conflict(status)) => {
            debug!(resource_id = %resource_id, "acquire rejected, lock is held");
            HttpResponse::Conflict().json(status)
        }
        Err(err) => internal_error(&req, err),
    }
}

/// Extend a held lease. 409 means ownership was lost and the caller must
/// re-acquire before continuing to edit.
#[post("/{resource_id}/refresh")]
async fn refresh(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<LockRequest>>,
    req: HttpRequest,
) -> HttpResponse {
    let resource_id = path.into_inner();

    match data
        .locks()
        .refresh(&resource_id, requested_holder(&body))
        .await
    {
        Ok(RefreshOutcome::Refreshed { expires_at }) => {
            HttpResponse::Ok().json(RefreshReceipt { expires_at })
        }
        Ok(RefreshOutcome::NotHeld) => {
            debug!(resource_id = %resource_id, "refresh rejected, lease not held");
            match data.locks().status(&resource_id).await {
                Ok(status) => HttpResponse::Conflict().json(status),
                Err(err) => internal_error(&req, err),
            }
        }
        Err(err) => internal_error(&req, err),
    }
}

/// Release the lock. Always 200; `released` reports whether a row existed.
#[delete("/{resource_id}")]
async fn release(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ReleaseParams>,
    req: HttpRequest,
) -> HttpResponse {
    let resource_id = path.into_inner();

    match data
        .locks()
        .release(&resource_id, query.holder.as_deref())
        .await
    {
        Ok(released) => HttpResponse::Ok().json(ReleaseReceipt { released }),
        Err(err) => internal_error(&req, err),
    }
}

#[get("/{resource_id}/status")]
async fn status(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> HttpResponse {
    let resource_id = path.into_inner();

    match data.locks().status(&resource_id).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(err) => internal_error(&req, err),
    }
}

pub fn routes() -> Scope {
    web::scope("/lock")
        .service(status)
        .service(refresh)
        .service(acquire)
        .service(release)
}
