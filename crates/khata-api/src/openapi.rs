//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single spec served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Khata API",
        version = "0.1.0",
        description = "Multi-tenant ledger and expense-tracking backend: business onboarding with KYC review, receipt scanning, ledger aggregation, and private peer-to-peer features.",
        license(name = "MIT")
    ),
    paths(
        // Auth
        crate::routes::auth_routes::register,
        crate::routes::auth_routes::me,
        // Business onboarding
        crate::routes::business::submit_payment,
        crate::routes::business::submit_kyc,
        crate::routes::business::onboarding_status,
        crate::routes::business::approve_kyc,
        crate::routes::business::reject_kyc,
        // OCR
        crate::routes::ocr::upload_document,
        crate::routes::ocr::list_documents,
        crate::routes::ocr::get_document,
        crate::routes::ocr::confirm_document,
        // Ledger
        crate::routes::ledger::create_transaction,
        crate::routes::ledger::list_transactions,
        crate::routes::ledger::settle_transaction,
        crate::routes::ledger::ledger_summary,
        crate::routes::ledger::list_customers,
        crate::routes::ledger::customer_detail,
        crate::routes::ledger::list_top_debtors,
        // Private
        crate::routes::private::connect,
        crate::routes::private::list_friends,
        crate::routes::private::create_group,
        crate::routes::private::list_groups,
        crate::routes::private::add_group_member,
        crate::routes::private::remove_group_member,
        crate::routes::private::create_transaction,
        crate::routes::private::list_transactions,
        crate::routes::private::transactions_summary,
        crate::routes::private::create_loan,
        crate::routes::private::list_loans,
        crate::routes::private::return_loan,
        crate::routes::private::reminders_due,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Auth DTOs
        crate::routes::auth_routes::RegisterRequest,
        crate::routes::auth_routes::AccountResponse,
        // Business DTOs
        crate::routes::business::PaymentRequest,
        crate::routes::business::KycRequest,
        crate::routes::business::RejectRequest,
        crate::routes::business::PaymentView,
        crate::routes::business::KycView,
        crate::routes::business::StatusResponse,
        // OCR DTOs
        crate::routes::ocr::UploadRequest,
        crate::routes::ocr::ConfirmRequest,
        crate::routes::ocr::DocumentResponse,
        // Ledger DTOs
        crate::routes::ledger::CreateTransactionRequest,
        crate::routes::ledger::TransactionResponse,
        crate::routes::ledger::BalanceRow,
        crate::routes::ledger::SummaryResponse,
        crate::routes::ledger::CustomerDetailResponse,
        // Private DTOs
        crate::routes::private::ConnectRequest,
        crate::routes::private::ConnectionResponse,
        crate::routes::private::FriendResponse,
        crate::routes::private::CreateGroupRequest,
        crate::routes::private::MemberRequest,
        crate::routes::private::GroupMemberView,
        crate::routes::private::GroupResponse,
        crate::routes::private::CreateLoanRequest,
        crate::routes::private::LoanResponse,
    )),
    tags(
        (name = "auth", description = "Registration and caller profile"),
        (name = "business", description = "Business onboarding: payment, KYC, review"),
        (name = "ocr", description = "Receipt scanning and confirmation"),
        (name = "ledger", description = "Business ledger and aggregation views"),
        (name = "private", description = "Peer-to-peer: friends, groups, items"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router, serving the generated spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
