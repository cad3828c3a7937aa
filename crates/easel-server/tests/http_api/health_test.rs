//! Health endpoint test

use actix_web::{App, http::StatusCode, test, web};
use easel_server::api;
use serde_json::Value;

use crate::common;

#[actix_web::test]
async fn test_health_reports_up() {
    let state = common::default_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(state))
            .service(api::health::routes()),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "UP");
}
