//! Admin router exercised in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use gateway_engine::admin::setup_admin_router;
use gateway_engine::obfuscation::obfuscate_string;

mod common;

fn router() -> Router {
    setup_admin_router(common::admin_state(&common::gateway_config()))
}

fn authorized(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", common::API_KEY))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_or_wrong_key_is_rejected() {
    let response = router()
        .oneshot(Request::builder().uri("/admin/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router()
        .oneshot(
            Request::builder()
                .uri("/admin/status")
                .header(header::AUTHORIZATION, "Bearer nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_status_reports_policy_version() {
    let response = router().oneshot(authorized("/admin/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "operational");
    assert_eq!(body["policy_version"], 1);
}

#[tokio::test]
async fn test_lookup_resolves_endpoint_and_global_plugins() {
    let response = router()
        .oneshot(authorized("/admin/lookup?method=get&url=api.shop.io%2Fitems%2F42"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["matched"], true);
    assert_eq!(body["normalized_url"], "api.shop.io/items/{item_id}");
    assert_eq!(body["path_params"]["item_id"], "42");
    assert_eq!(body["remedies"][0]["name"], "items-cache");
    assert_eq!(body["remedies"][0]["type"], "caching");
    assert_eq!(body["remedies"][0]["options"]["ttl_secs"], 30);
    assert_eq!(body["diagnoses"][0]["name"], "all-har");
    assert_eq!(body["diagnoses"][0]["global"], true);
}

#[tokio::test]
async fn test_lookup_without_match_keeps_request_url() {
    let response = router()
        .oneshot(authorized("/admin/lookup?method=DELETE&url=api.shop.io%2Fitems%2F42"))
        .await
        .unwrap();
    let body = json_body(response).await;

    assert_eq!(body["matched"], false);
    assert_eq!(body["normalized_url"], "api.shop.io/items/42");
    assert_eq!(body["remedies"].as_array().unwrap().len(), 0);
    assert_eq!(body["diagnoses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_discovery_report_reflects_processed_logs() {
    let state = common::admin_state(&common::gateway_config());
    state
        .discovery
        .lock()
        .unwrap()
        .process(&[common::access_log("GET", "api.shop.io/items/7", 1, 12, 200)]);

    let response = setup_admin_router(state)
        .oneshot(authorized("/admin/discovery"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let endpoint = &body["endpoints"]["GET api.shop.io/items/{item_id}"];
    assert_eq!(endpoint["count"], 1);
    assert_eq!(endpoint["status_codes"]["200"], 1);
}

#[tokio::test]
async fn test_obfuscate_hashes_parameter_values() {
    let response = router()
        .oneshot(authorized("/admin/obfuscate?host=api.shop.io&path=%2Fitems%2F42"))
        .await
        .unwrap();
    let body = json_body(response).await;

    assert_eq!(body["enabled"], true);
    assert_eq!(body["path"], format!("/items/{}", obfuscate_string("42")));
}
