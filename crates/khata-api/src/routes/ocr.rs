//! # Receipt Scanning API
//!
//! Upload, listing and confirmation of scanned receipts. Requires an
//! approved business account. Confirmation turns a draft document into
//! a ledger transaction atomically.
//!
//! ## Endpoints
//!
//! - `POST /v1/business/ocr` — upload a receipt image reference
//! - `GET /v1/business/ocr` — list documents (drafts first, newest first)
//! - `GET /v1/business/ocr/:id` — get one document
//! - `POST /v1/business/ocr/:id/confirm` — confirm and create a transaction

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use khata_core::ValidationError;
use khata_ledger::{LedgerTransaction, NewTransaction, TransactionKind, TransactionSource};
use khata_ocr::{listing_order, Confirmation, DocumentStatus, ScannedDocument};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::routes::require_business_enabled;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to upload a scanned receipt.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadRequest {
    /// Opaque reference to the stored image.
    pub image_ref: String,
}

impl Validate for UploadRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.image_ref.trim().is_empty() {
            return Err(ValidationError::Required { field: "image_ref" });
        }
        Ok(())
    }
}

/// Request to confirm a draft document.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmRequest {
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub merchant: String,
    /// "CREDIT" or "DEBIT".
    pub transaction_type: String,
    pub note: Option<String>,
}

impl Validate for ConfirmRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount { field: "amount" });
        }
        if self.merchant.trim().is_empty() {
            return Err(ValidationError::Required { field: "merchant" });
        }
        match TransactionKind::parse(&self.transaction_type) {
            Some(TransactionKind::Credit) | Some(TransactionKind::Debit) => Ok(()),
            _ => Err(ValidationError::InvalidChoice {
                field: "transaction_type",
                allowed: "CREDIT, DEBIT",
            }),
        }
    }
}

/// Wire view of a scanned document.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub image_ref: String,
    pub raw_text: String,
    #[schema(value_type = Option<String>)]
    pub extracted_amount: Option<Decimal>,
    pub extracted_date: Option<NaiveDate>,
    pub extracted_merchant: Option<String>,
    #[schema(value_type = String)]
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ScannedDocument> for DocumentResponse {
    fn from(doc: &ScannedDocument) -> Self {
        Self {
            id: doc.id,
            image_ref: doc.image_ref.clone(),
            raw_text: doc.raw_text.clone(),
            extracted_amount: doc.extracted_amount,
            extracted_date: doc.extracted_date,
            extracted_merchant: doc.extracted_merchant.clone(),
            status: doc.status,
            transaction_id: doc.transaction_id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the OCR router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/business/ocr", get(list_documents).post(upload_document))
        .route("/v1/business/ocr/:id", get(get_document))
        .route("/v1/business/ocr/:id/confirm", post(confirm_document))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/business/ocr — Upload a receipt and run extraction.
///
/// Extraction is best-effort: the draft is created even when the text
/// yields no usable fields.
#[utoipa::path(
    post,
    path = "/v1/business/ocr",
    request_body = UploadRequest,
    responses(
        (status = 201, description = "Draft document created", body = DocumentResponse),
        (status = 403, description = "Business account not approved", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "ocr"
)]
pub(crate) async fn upload_document(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ValidatedJson(req): ValidatedJson<UploadRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let account = require_business_enabled(&state, &caller)?;

    let raw_text = state.extractor.extract_text(&req.image_ref);
    let document = ScannedDocument::from_scan(account.id, req.image_ref, raw_text, Utc::now());
    let response = DocumentResponse::from(&document);
    state.documents.insert(document.id, document);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/business/ocr — List the caller's documents.
///
/// Drafts come before confirmed documents, newest first within each
/// group.
#[utoipa::path(
    get,
    path = "/v1/business/ocr",
    responses(
        (status = 200, description = "Documents", body = Vec<DocumentResponse>),
        (status = 403, description = "Business account not approved", body = crate::error::ErrorBody),
    ),
    tag = "ocr"
)]
pub(crate) async fn list_documents(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let account = require_business_enabled(&state, &caller)?;
    let mut documents: Vec<ScannedDocument> = state
        .documents
        .list()
        .into_iter()
        .filter(|d| d.owner_id == account.id)
        .collect();
    documents.sort_by(listing_order);
    Ok(Json(documents.iter().map(DocumentResponse::from).collect()))
}

/// GET /v1/business/ocr/:id — Get one of the caller's documents.
#[utoipa::path(
    get,
    path = "/v1/business/ocr/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document", body = DocumentResponse),
        (status = 404, description = "Not found or not owned", body = crate::error::ErrorBody),
    ),
    tag = "ocr"
)]
pub(crate) async fn get_document(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, AppError> {
    let account = require_business_enabled(&state, &caller)?;
    state
        .documents
        .get(&id)
        .filter(|d| d.owner_id == account.id)
        .map(|d| Json(DocumentResponse::from(&d)))
        .ok_or_else(|| AppError::NotFound(format!("document {id} not found")))
}

/// POST /v1/business/ocr/:id/confirm — Confirm a draft document.
///
/// Overwrites the extracted fields with the caller's corrections, flips
/// the document to CONFIRMED and records the ledger transaction, all
/// under the document store's write lock. A document is confirmed at
/// most once; repeats get 400.
#[utoipa::path(
    post,
    path = "/v1/business/ocr/{id}/confirm",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = ConfirmRequest,
    responses(
        (status = 201, description = "Confirmed; transaction created", body = DocumentResponse),
        (status = 400, description = "Document is not a draft", body = crate::error::ErrorBody),
        (status = 404, description = "Not found or not owned", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "ocr"
)]
pub(crate) async fn confirm_document(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ConfirmRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let account = require_business_enabled(&state, &caller)?;

    let kind = TransactionKind::parse(&req.transaction_type)
        .ok_or_else(|| AppError::Validation("unrecognized transaction_type".into()))?;
    let now = Utc::now();

    // Build the transaction before touching the document so a late
    // validation failure cannot leave a confirmed document without one.
    let transaction = LedgerTransaction::new(
        account.id,
        NewTransaction {
            counterparty: String::new(),
            merchant: Some(req.merchant.clone()),
            amount: req.amount,
            kind,
            date: req.date,
            note: req.note.clone(),
            source: TransactionSource::Ocr,
            document_id: Some(id),
        },
        now,
    )?;

    let confirmation = Confirmation {
        amount: req.amount,
        date: req.date,
        merchant: req.merchant,
    };

    let result = state
        .documents
        .try_update(&id, |doc| {
            if doc.owner_id != account.id {
                return Err(AppError::NotFound(format!("document {id} not found")));
            }
            doc.confirm(&confirmation, now)?;
            doc.link_transaction(transaction.id);
            Ok(DocumentResponse::from(&*doc))
        })
        .ok_or_else(|| AppError::NotFound(format!("document {id} not found")))?;
    let response = result?;

    state.transactions.insert(transaction.id, transaction);
    Ok((StatusCode::CREATED, Json(response)))
}
