//! Concurrent requests against shared state. Store updates run under
//! a single write lock, so racing transitions must land in a coherent
//! final state rather than a torn one.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use khata_api::state::{AppConfig, AppState};

const SECRET: &str = "test-secret";

fn test_app() -> axum::Router {
    khata_api::app(AppState::with_config(AppConfig {
        port: 8080,
        auth_token: Some(SECRET.to_string()),
    }))
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a business and push it to UNDER_REVIEW. Returns (id, token).
async fn business_under_review(app: &axum::Router, email: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/register",
            None,
            json!({"email": email, "full_name": "Shop", "account_type": "BUSINESS"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let account = body_json(response).await;
    let id = account["id"].as_str().unwrap().to_string();
    let token = format!("{id}:{SECRET}");

    app.clone()
        .oneshot(post_json("/v1/business/payment", Some(&token), json!({})))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json(
            "/v1/business/kyc",
            Some(&token),
            json!({
                "business_name": "Shop",
                "registration_number": "REG-1",
                "address": "1 Main Street",
                "owner_name": "Shop Owner"
            }),
        ))
        .await
        .unwrap();
    (id, token)
}

#[tokio::test]
async fn racing_review_decisions_leave_a_coherent_account() {
    let app = test_app();
    let (id, token) = business_under_review(&app, "race@shop.example").await;
    let admin = format!("admin:{SECRET}");

    let approve = app.clone().oneshot(post_json(
        &format!("/v1/business/kyc/{id}/approve"),
        Some(&admin),
        json!({}),
    ));
    let reject = app.clone().oneshot(post_json(
        &format!("/v1/business/kyc/{id}/reject"),
        Some(&admin),
        json!({"reason": "Blurry documents."}),
    ));
    let (approved, rejected) = tokio::join!(approve, reject);
    assert_eq!(approved.unwrap().status(), StatusCode::OK);
    assert_eq!(rejected.unwrap().status(), StatusCode::OK);

    // Whichever decision landed last, every field agrees with it.
    let response = app.clone().oneshot(get("/v1/business/status", &token)).await.unwrap();
    let status = body_json(response).await;
    let business_status = status["business_status"].as_str().unwrap();
    let review_status = status["kyc"]["review_status"].as_str().unwrap();
    match business_status {
        "APPROVED" => {
            assert_eq!(status["kyc_status"], "APPROVED");
            assert_eq!(review_status, "APPROVED");
        }
        "REJECTED" => {
            assert_eq!(status["kyc_status"], "REJECTED");
            assert_eq!(review_status, "REJECTED");
            assert_eq!(status["kyc"]["rejection_reason"], "Blurry documents.");
        }
        other => panic!("unexpected business_status {other:?}"),
    }
}

#[tokio::test]
async fn racing_settles_succeed_exactly_once() {
    let app = test_app();
    let (id, token) = business_under_review(&app, "settle-race@shop.example").await;
    let admin = format!("admin:{SECRET}");
    app.clone()
        .oneshot(post_json(
            &format!("/v1/business/kyc/{id}/approve"),
            Some(&admin),
            json!({}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/business/ledger",
            Some(&token),
            json!({
                "counterparty": "Alice",
                "amount": "40.00",
                "transaction_type": "CREDIT",
                "date": "2024-11-01"
            }),
        ))
        .await
        .unwrap();
    let tx = body_json(response).await;
    let tx_id = tx["id"].as_str().unwrap().to_string();

    let uri = format!("/v1/business/ledger/{tx_id}/settle");
    let first = app.clone().oneshot(post_json(&uri, Some(&token), json!({})));
    let second = app.clone().oneshot(post_json(&uri, Some(&token), json!({})));
    let (first, second) = tokio::join!(first, second);
    let mut statuses = [first.unwrap().status(), second.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn concurrent_registrations_with_one_email_yield_one_account() {
    let app = test_app();
    let register = |email: &str| {
        app.clone().oneshot(post_json(
            "/v1/auth/register",
            None,
            json!({"email": email, "full_name": "Dup", "account_type": "PRIVATE"}),
        ))
    };

    let (first, second) = tokio::join!(register("dup@p.example"), register("DUP@p.example"));
    let mut statuses = [first.unwrap().status(), second.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}
