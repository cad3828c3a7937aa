//! Graphics endpoint tests
//!
//! The reference CRUD surface plus the lock guards: mutations while locked,
//! canvas saves without a lock, and the end-to-end dashboard scenario.

use std::time::Duration;

use actix_web::{App, http::StatusCode, test, web};
use easel_common::model::{LockGrant, LockStatus};
use easel_persistence::entity::canvas_lock;
use easel_server::api;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};

use crate::common;

macro_rules! full_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($state.clone()))
                .service(api::lock::routes())
                .service(api::graphic::routes()),
        )
        .await
    };
}

macro_rules! create_graphic {
    ($app:expr, $name:expr) => {{
        let resp = test::call_service(
            &$app,
            test::TestRequest::post()
                .uri("/graphics")
                .set_json(json!({ "name": $name }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body["id"].as_i64().expect("created graphic has an id")
    }};
}

#[actix_web::test]
async fn test_create_and_fetch() {
    let state = common::default_state().await;
    let app = full_app!(state);

    let id = create_graphic!(app, "lower third");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/graphics/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "lower third");
    assert_eq!(body["canvasJson"], "{}");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/graphics").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn test_get_unknown_graphic_is_404() {
    let state = common::default_state().await;
    let app = full_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/graphics/999").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["path"], "/graphics/999");
}

#[actix_web::test]
async fn test_locked_graphic_refuses_metadata_and_delete() {
    let state = common::default_state().await;
    let app = full_app!(state);

    let id = create_graphic!(app, "scoreboard");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/lock/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}"))
            .set_json(json!({ "name": "renamed" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let status: LockStatus = test::read_body_json(resp).await;
    assert!(status.locked);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/graphics/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_canvas_save_requires_live_lock() {
    let state = common::default_state().await;
    let app = full_app!(state);

    let id = create_graphic!(app, "ticker");

    // No lock: the save is refused.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}/canvas"))
            .set_json(json!({ "canvasJson": "{\"widgets\":[1]}" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // With the lock held the save lands.
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/lock/{id}"))
            .to_request(),
    )
    .await;
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}/canvas"))
            .set_json(json!({ "canvasJson": "{\"widgets\":[1]}" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["canvasJson"], "{\"widgets\":[1]}");
}

#[actix_web::test]
async fn test_delete_releases_lock_row() {
    let state = common::state_with(common::short_ttl(40)).await;
    let app = full_app!(state);

    let id = create_graphic!(app, "bug");

    test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/lock/{id}"))
            .to_request(),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(70)).await;

    // Lease lapsed, so the delete passes the guard and sweeps the stale row.
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/graphics/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["deleted"], true);

    let rows = canvas_lock::Entity::find()
        .count(state.db())
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

/// The dashboard scenario end to end: create, lock, a second session is
/// turned away, release, the second session takes over.
#[actix_web::test]
async fn test_two_sessions_hand_over_the_edit_lock() {
    let state = common::default_state().await;
    let app = full_app!(state);

    let id = create_graphic!(app, "starting five");

    // Session one opens the editor.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/lock/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let grant: LockGrant = test::read_body_json(resp).await;

    // Session two is rejected and sees who it lost to.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/lock/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let seen: LockStatus = test::read_body_json(resp).await;
    assert_eq!(seen.expires_at, Some(grant.expires_at));

    // Session one edits and closes.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}/canvas"))
            .set_json(json!({ "canvasJson": "{\"v\":1}" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/lock/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Now session two succeeds and can edit in turn.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/lock/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}/canvas"))
            .set_json(json!({ "canvasJson": "{\"v\":2}" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// === holder tracking mode ===

#[actix_web::test]
async fn test_holder_mode_distinguishes_sessions_on_mutations() {
    let state = common::holder_state().await;
    let app = full_app!(state);

    let id = create_graphic!(app, "casters");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/lock/{id}"))
            .set_json(json!({ "holder": "tab-1" }))
            .to_request(),
    )
    .await;
    let grant: LockGrant = test::read_body_json(resp).await;
    assert_eq!(grant.holder.as_deref(), Some("tab-1"));

    // The holding session may rename and save; another session may not.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}?holder=tab-1"))
            .set_json(json!({ "name": "casters v2" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}?holder=tab-2"))
            .set_json(json!({ "name": "hijack" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}/canvas?holder=tab-2"))
            .set_json(json!({ "canvasJson": "{}" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/graphics/{id}/canvas?holder=tab-1"))
            .set_json(json!({ "canvasJson": "{\"mine\":true}" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}
