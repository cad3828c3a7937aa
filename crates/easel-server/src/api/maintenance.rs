//! Maintenance endpoints
//!
//! On-demand counterpart of the background reaper, for operators and cron.

use actix_web::{HttpRequest, HttpResponse, Scope, post, web};
use easel_common::model::CleanupReceipt;
use tracing::info;

use crate::model::common::AppState;

use super::internal_error;

/// Delete every expired lock row and report how many went.
#[post("/cleanup-locks")]
async fn cleanup_locks(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    match data.locks().sweep_expired().await {
        Ok(deleted) => {
            if deleted > 0 {
                info!(deleted, "maintenance sweep removed expired locks");
            }
            HttpResponse::Ok().json(CleanupReceipt { deleted })
        }
        Err(err) => internal_error(&req, err),
    }
}

pub fn routes() -> Scope {
    web::scope("/maintenance").service(cleanup_locks)
}
