//! Reference graphics endpoints
//!
//! Hosts the collaborator contract: metadata updates and deletes are refused
//! with 409 while the graphic is locked, canvas saves require a live lock,
//! and a successful delete releases the lock row. In holder tracking mode
//! the `holder` query parameter identifies the calling session.

use actix_web::{HttpRequest, HttpResponse, Scope, delete, get, post, put, web};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::model::common::AppState;
use crate::service::graphic::{self, DeleteOutcome, SaveOutcome, UpdateOutcome};

use super::{internal_error, not_found};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGraphic {
    pub name: String,
    #[serde(default)]
    pub canvas_json: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGraphic {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCanvas {
    pub canvas_json: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HolderParam {
    holder: Option<String>,
}

#[post("")]
async fn create(
    data: web::Data<AppState>,
    body: web::Json<CreateGraphic>,
    req: HttpRequest,
) -> HttpResponse {
    let canvas_json = body.canvas_json.as_deref().unwrap_or("{}");

    match graphic::create(data.db(), &body.name, canvas_json).await {
        Ok(model) => HttpResponse::Ok().json(model),
        Err(err) => internal_error(&req, err),
    }
}

#[get("")]
async fn list(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    match graphic::list(data.db()).await {
        Ok(models) => HttpResponse::Ok().json(models),
        Err(err) => internal_error(&req, err),
    }
}

#[get("/{id}")]
async fn get_one(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> HttpResponse {
    let id = path.into_inner();

    match graphic::get(data.db(), id).await {
        Ok(Some(model)) => HttpResponse::Ok().json(model),
        Ok(None) => not_found(&req, format!("graphic '{}' not exist", id)),
        Err(err) => internal_error(&req, err),
    }
}

#[put("/{id}")]
async fn update_meta(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<HolderParam>,
    body: web::Json<UpdateGraphic>,
    req: HttpRequest,
) -> HttpResponse {
    let id = path.into_inner();

    match graphic::update_meta(data.db(), data.locks(), id, &body.name, query.holder.as_deref())
        .await
    {
        Ok(UpdateOutcome::Updated(model)) => HttpResponse::Ok().json(model),
        Ok(UpdateOutcome::Locked(status)) => {
            debug!(id, "metadata update rejected, graphic is locked");
            HttpResponse::Conflict().json(status)
        }
        Ok(UpdateOutcome::NotFound) => not_found(&req, format!("graphic '{}' not exist", id)),
        Err(err) => internal_error(&req, err),
    }
}

#[put("/{id}/canvas")]
async fn save_canvas(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<HolderParam>,
    body: web::Json<SaveCanvas>,
    req: HttpRequest,
) -> HttpResponse {
    let id = path.into_inner();

    match graphic::save_canvas(
        data.db(),
        data.locks(),
        id,
        &body.canvas_json,
        query.holder.as_deref(),
    )
    .await
    {
        Ok(SaveOutcome::Saved(model)) => HttpResponse::Ok().json(model),
        Ok(SaveOutcome::LockRequired(status)) => {
            debug!(id, "canvas save rejected, no live lock");
            HttpResponse::Conflict().json(status)
        }
        Ok(SaveOutcome::NotFound) => not_found(&req, format!("graphic '{}' not exist", id)),
        Err(err) => internal_error(&req, err),
    }
}

#[delete("/{id}")]
async fn remove(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<HolderParam>,
    req: HttpRequest,
) -> HttpResponse {
    let id = path.into_inner();

    match graphic::delete(data.db(), data.locks(), id, query.holder.as_deref()).await {
        Ok(DeleteOutcome::Deleted) => HttpResponse::Ok().json(json!({ "deleted": true })),
        Ok(DeleteOutcome::Locked(status)) => {
            debug!(id, "delete rejected, graphic is locked");
            HttpResponse::Conflict().json(status)
        }
        Ok(DeleteOutcome::NotFound) => not_found(&req, format!("graphic '{}' not exist", id)),
        Err(err) => internal_error(&req, err),
    }
}

pub fn routes() -> Scope {
    web::scope("/graphics")
        .service(create)
        .service(list)
        .service(get_one)
        .service(save_canvas)
        .service(update_meta)
        .service(remove)
}
