//! Lock endpoint tests
//!
//! Status codes and bodies for acquire/refresh/release/status, in both the
//! default holderless mode and holder tracking mode.

use std::time::Duration;

use actix_web::{App, http::StatusCode, test, web};
use easel_common::epoch_millis;
use easel_common::model::{LockGrant, LockStatus, RefreshReceipt, ReleaseReceipt};
use easel_server::api;
use serde_json::json;

use crate::common;

macro_rules! lock_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($state.clone()))
                .service(api::lock::routes()),
        )
        .await
    };
}

#[actix_web::test]
async fn test_acquire_returns_grant() {
    let state = common::default_state().await;
    let app = lock_app!(state);

    let before = epoch_millis();
    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-1").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let grant: LockGrant = test::read_body_json(resp).await;
    assert!(grant.locked);
    assert!(grant.expires_at >= before + 90_000);
    assert!(grant.holder.is_none());
}

#[actix_web::test]
async fn test_second_acquire_conflicts_with_status_body() {
    let state = common::default_state().await;
    let app = lock_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-1").to_request(),
    )
    .await;
    let grant: LockGrant = test::read_body_json(resp).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-1").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let seen: LockStatus = test::read_body_json(resp).await;
    assert!(seen.locked);
    assert_eq!(seen.expires_at, Some(grant.expires_at));

    // A different resource is still free.
    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-2").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_release_is_idempotent() {
    let state = common::default_state().await;
    let app = lock_app!(state);

    test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-1").to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::delete().uri("/lock/graphic-1").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: ReleaseReceipt = test::read_body_json(resp).await;
    assert!(receipt.released);

    // Releasing again is still 200, just with nothing to delete.
    let resp = test::call_service(
        &app,
        test::TestRequest::delete().uri("/lock/graphic-1").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: ReleaseReceipt = test::read_body_json(resp).await;
    assert!(!receipt.released);
}

#[actix_web::test]
async fn test_refresh_extends_expiry() {
    let state = common::default_state().await;
    let app = lock_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-1").to_request(),
    )
    .await;
    let grant: LockGrant = test::read_body_json(resp).await;

    tokio::time::sleep(Duration::from_millis(20)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/lock/graphic-1/refresh")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: RefreshReceipt = test::read_body_json(resp).await;
    assert!(receipt.expires_at > grant.expires_at);
}

#[actix_web::test]
async fn test_refresh_without_lease_conflicts() {
    let state = common::default_state().await;
    let app = lock_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/lock/never-locked/refresh")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let status: LockStatus = test::read_body_json(resp).await;
    assert!(!status.locked);
}

#[actix_web::test]
async fn test_status_of_unknown_resource_is_unlocked() {
    let state = common::default_state().await;
    let app = lock_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/lock/never-locked/status")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let status: LockStatus = test::read_body_json(resp).await;
    assert_eq!(status, LockStatus::unlocked());
}

#[actix_web::test]
async fn test_expired_lock_is_reclaimable() {
    let state = common::state_with(common::short_ttl(40)).await;
    let app = lock_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-1").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(70)).await;

    // The lease lapsed, so a status read reports unlocked...
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/lock/graphic-1/status")
            .to_request(),
    )
    .await;
    let status: LockStatus = test::read_body_json(resp).await;
    assert!(!status.locked);

    // ...and a new acquire wins without waiting for the reaper.
    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-1").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// === holder tracking mode ===

#[actix_web::test]
async fn test_holder_mode_keys_refresh_and_release_to_session() {
    let state = common::holder_state().await;
    let app = lock_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/lock/graphic-1")
            .set_json(json!({ "holder": "tab-1" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let grant: LockGrant = test::read_body_json(resp).await;
    assert_eq!(grant.holder.as_deref(), Some("tab-1"));

    // A stranger cannot refresh the lease.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/lock/graphic-1/refresh")
            .set_json(json!({ "holder": "tab-2" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/lock/graphic-1/refresh")
            .set_json(json!({ "holder": "tab-1" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Nor release it.
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/lock/graphic-1?holder=tab-2")
            .to_request(),
    )
    .await;
    let receipt: ReleaseReceipt = test::read_body_json(resp).await;
    assert!(!receipt.released);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/lock/graphic-1?holder=tab-1")
            .to_request(),
    )
    .await;
    let receipt: ReleaseReceipt = test::read_body_json(resp).await;
    assert!(receipt.released);
}

#[actix_web::test]
async fn test_holder_minted_when_not_supplied() {
    let state = common::holder_state().await;
    let app = lock_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/lock/graphic-1").to_request(),
    )
    .await;
    let grant: LockGrant = test::read_body_json(resp).await;
    let holder = grant.holder.expect("holder should be minted");
    assert!(!holder.is_empty());

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/lock/graphic-1/status")
            .to_request(),
    )
    .await;
    let status: LockStatus = test::read_body_json(resp).await;
    assert_eq!(status.holder, Some(holder));
}
