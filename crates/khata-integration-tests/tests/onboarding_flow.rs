//! End-to-end business onboarding over HTTP: registration, payment,
//! KYC submission, review, and the reconciling status reads.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use khata_api::state::{AppConfig, AppState};

const SECRET: &str = "test-secret";

fn authed_app() -> axum::Router {
    let config = AppConfig {
        port: 8080,
        auth_token: Some(SECRET.to_string()),
    };
    khata_api::app(AppState::with_config(config))
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

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register an account and return its JSON representation.
async fn register(app: &axum::Router, email: &str, account_type: &str) -> Value {
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/register",
            None,
            json!({"email": email, "full_name": "Test User", "account_type": account_type}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn token_for(account: &Value) -> String {
    format!("{}:{SECRET}", account["id"].as_str().unwrap())
}

#[tokio::test]
async fn full_onboarding_approval_flow() {
    let app = authed_app();
    let account = register(&app, "owner@shop.example", "BUSINESS").await;
    let id = account["id"].as_str().unwrap().to_string();
    let token = token_for(&account);
    assert_eq!(account["business_status"], "PAYMENT_PENDING");
    assert_eq!(account["kyc_status"], "PENDING");

    // Payment with defaults advances to KYC_PENDING.
    let response = app
        .clone()
        .oneshot(post_json("/v1/business/payment", Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payment = body_json(response).await;
    assert_eq!(payment["amount"], "18000");
    assert_eq!(payment["provider"], "Fonepay");
    assert_eq!(payment["is_verified"], false);

    let response = app
        .clone()
        .oneshot(get("/v1/business/status", Some(&token)))
        .await
        .unwrap();
    let status = body_json(response).await;
    assert_eq!(status["business_status"], "KYC_PENDING");

    // KYC submission moves to UNDER_REVIEW.
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/business/kyc",
            Some(&token),
            json!({
                "business_name": "Shop & Sons",
                "registration_number": "REG-1001",
                "address": "12 Market Road",
                "owner_name": "May Owner"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let kyc = body_json(response).await;
    assert_eq!(kyc["review_status"], "PENDING");

    // Approve as admin; both statuses flip.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/kyc/{id}/approve"),
            Some(&format!("admin:{SECRET}")),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(response).await;
    assert_eq!(status["business_status"], "APPROVED");
    assert_eq!(status["kyc_status"], "APPROVED");
    assert_eq!(status["kyc"]["review_status"], "APPROVED");

    // Profile read agrees.
    let response = app.clone().oneshot(get("/v1/auth/me", Some(&token))).await.unwrap();
    let me = body_json(response).await;
    assert_eq!(me["business_status"], "APPROVED");
}

#[tokio::test]
async fn rejection_carries_reason_and_allows_resubmission() {
    let app = authed_app();
    let account = register(&app, "owner@bad-docs.example", "BUSINESS").await;
    let id = account["id"].as_str().unwrap().to_string();
    let token = token_for(&account);
    let admin = format!("admin:{SECRET}");

    app.clone()
        .oneshot(post_json("/v1/business/payment", Some(&token), json!({})))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json(
            "/v1/business/kyc",
            Some(&token),
            json!({
                "business_name": "Bad Docs Ltd",
                "registration_number": "REG-2002",
                "address": "9 Side Street",
                "owner_name": "Sam Owner"
            }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/kyc/{id}/reject"),
            Some(&admin),
            json!({"reason": "registration document unreadable"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(response).await;
    assert_eq!(status["business_status"], "REJECTED");
    assert_eq!(
        status["kyc"]["rejection_reason"],
        "registration document unreadable"
    );

    // Resubmission clears the rejection and goes back under review.
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/business/kyc",
            Some(&token),
            json!({
                "business_name": "Bad Docs Ltd",
                "registration_number": "REG-2002",
                "address": "9 Side Street",
                "owner_name": "Sam Owner"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let kyc = body_json(response).await;
    assert_eq!(kyc["review_status"], "PENDING");
    assert!(kyc.get("rejection_reason").is_none());
}

#[tokio::test]
async fn reject_without_reason_uses_default_message() {
    let app = authed_app();
    let account = register(&app, "owner@silent.example", "BUSINESS").await;
    let id = account["id"].as_str().unwrap().to_string();
    let token = token_for(&account);

    app.clone()
        .oneshot(post_json("/v1/business/payment", Some(&token), json!({})))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json(
            "/v1/business/kyc",
            Some(&token),
            json!({
                "business_name": "Silent Co",
                "registration_number": "REG-3003",
                "address": "1 Quiet Lane",
                "owner_name": "Quin Owner"
            }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/kyc/{id}/reject"),
            Some(&format!("admin:{SECRET}")),
            json!({}),
        ))
        .await
        .unwrap();
    let status = body_json(response).await;
    assert_eq!(status["kyc"]["rejection_reason"], "Rejected by reviewer.");

    // A POST with no body at all works the same way.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/business/kyc/{id}/reject"))
                .header("authorization", format!("Bearer admin:{SECRET}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_json(response).await;
    assert_eq!(status["kyc"]["rejection_reason"], "Rejected by reviewer.");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = authed_app();
    register(&app, "dup@example.com", "BUSINESS").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/register",
            None,
            json!({"email": "DUP@example.com", "full_name": "Other", "account_type": "PRIVATE"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn personal_normalizes_to_private() {
    let app = authed_app();
    let account = register(&app, "me@example.com", "PERSONAL").await;
    assert_eq!(account["account_type"], "PRIVATE");
    assert_eq!(account["business_status"], "APPROVED");
}

#[tokio::test]
async fn approve_requires_superuser() {
    let app = authed_app();
    let account = register(&app, "owner@unpriv.example", "BUSINESS").await;
    let other = register(&app, "rando@unpriv.example", "BUSINESS").await;
    let id = account["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/kyc/{id}/approve"),
            Some(&token_for(&other)),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn business_endpoints_reject_private_accounts_and_missing_tokens() {
    let app = authed_app();
    let account = register(&app, "p2p@example.com", "PRIVATE").await;
    let token = token_for(&account);

    let response = app
        .clone()
        .oneshot(get("/v1/business/status", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.clone().oneshot(get("/v1/auth/me", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_openapi_need_no_token() {
    let app = authed_app();

    let response = app.clone().oneshot(get("/health/liveness", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/health/readiness", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");

    let response = app.clone().oneshot(get("/openapi.json", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/v1/auth/register"].is_object());
}
