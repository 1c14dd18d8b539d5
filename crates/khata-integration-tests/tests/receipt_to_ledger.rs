//! Receipt intake over HTTP: upload with a canned extractor, field
//! suggestions, confirmation into the ledger, and the aggregation
//! views downstream.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use khata_api::state::{AppConfig, AppState};
use khata_ocr::FixtureExtractor;

const SECRET: &str = "test-secret";

const MEGA_MART_RECEIPT: &str = "Mega Mart\nHigh Street Branch\nTotal: 45.00 Tax: 3.00\n12/01/2024";

fn test_app() -> axum::Router {
    let config = AppConfig {
        port: 8080,
        auth_token: Some(SECRET.to_string()),
    };
    let extractor = FixtureExtractor::new([
        ("receipt-1.png", MEGA_MART_RECEIPT),
        ("receipt-blank.png", ""),
    ]);
    khata_api::app(AppState::with_extractor(config, Arc::new(extractor)))
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

/// Register a business account and push it through onboarding approval.
/// Returns the caller token.
async fn approved_business(app: &axum::Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/register",
            None,
            json!({"email": email, "full_name": "Shop Owner", "account_type": "BUSINESS"}),
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
    token
}

#[tokio::test]
async fn upload_suggests_fields_from_extracted_text() {
    let app = test_app();
    let token = approved_business(&app, "ocr@shop.example").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/business/ocr",
            Some(&token),
            json!({"image_ref": "receipt-1.png"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let doc = body_json(response).await;
    assert_eq!(doc["status"], "DRAFT");
    // 45.00 beats 3.00; the 2024 inside the date span is not a candidate.
    assert_eq!(doc["extracted_amount"], "45.00");
    assert_eq!(doc["extracted_date"], "2024-12-01");
    assert_eq!(doc["extracted_merchant"], "Mega Mart");
}

#[tokio::test]
async fn unreadable_receipt_still_creates_a_draft() {
    let app = test_app();
    let token = approved_business(&app, "blank@shop.example").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/business/ocr",
            Some(&token),
            json!({"image_ref": "receipt-blank.png"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let doc = body_json(response).await;
    assert_eq!(doc["status"], "DRAFT");
    assert!(doc["extracted_amount"].is_null());
    assert!(doc["extracted_date"].is_null());
    assert!(doc["extracted_merchant"].is_null());
}

#[tokio::test]
async fn confirm_creates_exactly_one_transaction() {
    let app = test_app();
    let token = approved_business(&app, "confirm@shop.example").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/business/ocr",
            Some(&token),
            json!({"image_ref": "receipt-1.png"}),
        ))
        .await
        .unwrap();
    let doc = body_json(response).await;
    let doc_id = doc["id"].as_str().unwrap().to_string();

    let confirmation = json!({
        "amount": "47.50",
        "date": "2024-12-02",
        "merchant": "Mega Mart Express",
        "transaction_type": "DEBIT"
    });
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/ocr/{doc_id}/confirm"),
            Some(&token),
            confirmation.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let confirmed = body_json(response).await;
    assert_eq!(confirmed["status"], "CONFIRMED");
    // Corrections overwrite the extracted suggestions.
    assert_eq!(confirmed["extracted_amount"], "47.50");
    assert_eq!(confirmed["extracted_merchant"], "Mega Mart Express");
    let tx_id = confirmed["transaction_id"].as_str().unwrap().to_string();

    // The ledger holds exactly one OCR-sourced transaction.
    let response = app.clone().oneshot(get("/v1/business/ledger", &token)).await.unwrap();
    let transactions = body_json(response).await;
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["id"], tx_id.as_str());
    assert_eq!(transactions[0]["source"], "OCR");
    assert_eq!(transactions[0]["display_name"], "Mega Mart Express");
    assert_eq!(transactions[0]["document_id"], doc_id.as_str());

    // A second confirm is refused and creates nothing.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/ocr/{doc_id}/confirm"),
            Some(&token),
            confirmation,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"]["message"],
        "bad request: only draft documents can be confirmed"
    );

    let response = app.clone().oneshot(get("/v1/business/ledger", &token)).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn documents_are_scoped_to_their_owner() {
    let app = test_app();
    let owner = approved_business(&app, "mine@shop.example").await;
    let other = approved_business(&app, "theirs@shop.example").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/business/ocr",
            Some(&owner),
            json!({"image_ref": "receipt-1.png"}),
        ))
        .await
        .unwrap();
    let doc = body_json(response).await;
    let doc_id = doc["id"].as_str().unwrap().to_string();

    // The other account sees 404, not 403: existence is not leaked.
    let response = app
        .clone()
        .oneshot(get(&format!("/v1/business/ocr/{doc_id}"), &other))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/ocr/{doc_id}/confirm"),
            Some(&other),
            json!({
                "amount": "1.00",
                "date": "2024-12-02",
                "merchant": "X",
                "transaction_type": "DEBIT"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drafts_list_before_confirmed_documents() {
    let app = test_app();
    let token = approved_business(&app, "order@shop.example").await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/v1/business/ocr",
                Some(&token),
                json!({"image_ref": "receipt-1.png"}),
            ))
            .await
            .unwrap();
        ids.push(body_json(response).await["id"].as_str().unwrap().to_string());
    }

    // Confirm the middle upload.
    app.clone()
        .oneshot(post_json(
            &format!("/v1/business/ocr/{}/confirm", ids[1]),
            Some(&token),
            json!({
                "amount": "45.00",
                "date": "2024-12-01",
                "merchant": "Mega Mart",
                "transaction_type": "CREDIT"
            }),
        ))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/v1/business/ocr", &token)).await.unwrap();
    let docs = body_json(response).await;
    let statuses: Vec<&str> = docs
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["DRAFT", "DRAFT", "CONFIRMED"]);
}

#[tokio::test]
async fn ledger_aggregation_views() {
    let app = test_app();
    let token = approved_business(&app, "ledger@shop.example").await;

    for (counterparty, amount, kind) in [
        ("Alice", "100.00", "CREDIT"),
        ("Alice", "30.00", "DEBIT"),
        ("Bob", "55.00", "CREDIT"),
        ("Caro", "20.00", "DEBIT"),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/v1/business/ledger",
                Some(&token),
                json!({
                    "counterparty": counterparty,
                    "amount": amount,
                    "transaction_type": kind,
                    "date": "2024-11-01"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Customers preserve first-seen order and include negatives.
    let response = app
        .clone()
        .oneshot(get("/v1/business/ledger/customers", &token))
        .await
        .unwrap();
    let customers = body_json(response).await;
    let rows = customers.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[0]["balance"], "70.00");
    assert_eq!(rows[0]["transaction_count"], 2);
    assert_eq!(rows[1]["name"], "Bob");
    assert_eq!(rows[2]["name"], "Caro");
    assert_eq!(rows[2]["balance"], "-20.00");

    // Top debtors rank positive balances only.
    let response = app
        .clone()
        .oneshot(get("/v1/business/ledger/top-debtors", &token))
        .await
        .unwrap();
    let debtors = body_json(response).await;
    let rows = debtors.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[1]["name"], "Bob");

    // Summary totals are exact.
    let response = app
        .clone()
        .oneshot(get("/v1/business/ledger/summary", &token))
        .await
        .unwrap();
    let summary = body_json(response).await;
    assert_eq!(summary["total_receivable"], "155.00");
    assert_eq!(summary["total_payable"], "50.00");
    assert_eq!(summary["net_balance"], "105.00");

    // Per-customer detail.
    let response = app
        .clone()
        .oneshot(get("/v1/business/ledger/customers/Alice", &token))
        .await
        .unwrap();
    let detail = body_json(response).await;
    assert_eq!(detail["balance"], "70.00");
    assert_eq!(detail["transactions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn settle_is_one_way() {
    let app = test_app();
    let token = approved_business(&app, "settle@shop.example").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/business/ledger",
            Some(&token),
            json!({
                "counterparty": "Dana",
                "amount": "15.00",
                "transaction_type": "CREDIT",
                "date": "2024-11-05"
            }),
        ))
        .await
        .unwrap();
    let tx = body_json(response).await;
    let tx_id = tx["id"].as_str().unwrap().to_string();
    assert!(tx["settled_at"].is_null());

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/ledger/{tx_id}/settle"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let settled = body_json(response).await;
    assert!(settled["settled_at"].is_string());

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/v1/business/ledger/{tx_id}/settle"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Settled rows fall out of the default customer balances.
    let response = app
        .clone()
        .oneshot(get("/v1/business/ledger/customers", &token))
        .await
        .unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(get(
            "/v1/business/ledger/customers?include_settled=true",
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unapproved_business_cannot_reach_ocr_or_ledger() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/auth/register",
            None,
            json!({"email": "new@shop.example", "full_name": "New Shop", "account_type": "BUSINESS"}),
        ))
        .await
        .unwrap();
    let account = body_json(response).await;
    let token = format!("{}:{SECRET}", account["id"].as_str().unwrap());

    let response = app.clone().oneshot(get("/v1/business/ocr", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.clone().oneshot(get("/v1/business/ledger", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
