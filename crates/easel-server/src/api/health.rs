use actix_web::{HttpResponse, Responder, Scope, get, web};
use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::model::common::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[get("")]
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    match data.db().execute_unprepared("SELECT 1").await {
        Ok(_) => HttpResponse::Ok().json(HealthStatus {
            status: "UP".to_string(),
            message: None,
        }),
        Err(e) => HttpResponse::ServiceUnavailable().json(HealthStatus {
            status: "DOWN".to_string(),
            message: Some(e.to_string()),
        }),
    }
}

pub fn routes() -> Scope {
    web::scope("/health").service(health_check)
}
