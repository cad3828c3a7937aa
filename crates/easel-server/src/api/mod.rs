//! HTTP API handlers
//!
//! Lock outcomes that are part of normal operation (a contended acquire, a
//! lapsed refresh) answer 409 with a status body. The `ErrorResult` envelope
//! is reserved for genuine errors: unknown graphics and server faults.

pub mod graphic;
pub mod health;
pub mod lock;
pub mod maintenance;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode};
use easel_common::model::ErrorResult;
use easel_common::time::now_rfc3339;
use tracing::error;

pub(crate) fn error_response(req: &HttpRequest, status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResult {
        timestamp: now_rfc3339(),
        status: status.as_u16() as i32,
        error: status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string(),
        message,
        path: req.path().to_string(),
    })
}

pub(crate) fn not_found(req: &HttpRequest, message: String) -> HttpResponse {
    error_response(req, StatusCode::NOT_FOUND, message)
}

pub(crate) fn internal_error(req: &HttpRequest, err: anyhow::Error) -> HttpResponse {
    error!(path = %req.path(), error = %err, "request failed");
    error_response(req, StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
