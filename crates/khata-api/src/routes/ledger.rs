//! # Business Ledger API
//!
//! Transaction recording, settlement, and the aggregation views.
//! Requires an approved business account.
//!
//! ## Endpoints
//!
//! - `POST /v1/business/ledger` — record a transaction
//! - `GET /v1/business/ledger` — list transactions
//! - `POST /v1/business/ledger/:id/settle` — settle a transaction
//! - `GET /v1/business/ledger/summary` — receivable/payable totals
//! - `GET /v1/business/ledger/customers` — per-counterparty balances
//! - `GET /v1/business/ledger/customers/:name` — one counterparty's history
//! - `GET /v1/business/ledger/top-debtors` — top outstanding debtors

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use khata_account::Account;
use khata_core::ValidationError;
use khata_ledger::{
    counterparty_balances, summary, top_debtors, CounterpartyBalance, LedgerSummary,
    LedgerTransaction, NewTransaction, TransactionKind, TransactionSource,
};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::routes::require_business_enabled;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to record a ledger transaction.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    /// Customer or friend name.
    pub counterparty: String,
    pub merchant: Option<String>,
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// "CREDIT", "DEBIT", "LENT" or "BORROWED".
    pub transaction_type: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl Validate for CreateTransactionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount { field: "amount" });
        }
        if TransactionKind::parse(&self.transaction_type).is_none() {
            return Err(ValidationError::InvalidChoice {
                field: "transaction_type",
                allowed: "CREDIT, DEBIT, LENT, BORROWED",
            });
        }
        Ok(())
    }
}

/// Wire view of a ledger transaction.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    /// Counterparty with the merchant fallback applied.
    pub display_name: String,
    pub counterparty: String,
    pub merchant: Option<String>,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub transaction_type: TransactionKind,
    pub date: NaiveDate,
    pub note: Option<String>,
    #[schema(value_type = String)]
    pub source: TransactionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Uuid>,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&LedgerTransaction> for TransactionResponse {
    fn from(tx: &LedgerTransaction) -> Self {
        Self {
            id: tx.id,
            display_name: tx.display_name().to_string(),
            counterparty: tx.counterparty.clone(),
            merchant: tx.merchant.clone(),
            amount: tx.amount,
            transaction_type: tx.kind,
            date: tx.date,
            note: tx.note.clone(),
            source: tx.source,
            document_id: tx.document_id,
            settled_at: tx.settled_at,
            created_at: tx.created_at,
        }
    }
}

/// Wire view of a per-counterparty balance row.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceRow {
    pub name: String,
    #[schema(value_type = String)]
    pub balance: Decimal,
    pub transaction_count: usize,
}

impl From<CounterpartyBalance> for BalanceRow {
    fn from(b: CounterpartyBalance) -> Self {
        Self {
            name: b.name,
            balance: b.balance,
            transaction_count: b.transaction_count,
        }
    }
}

/// Wire view of the ledger summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    #[schema(value_type = String)]
    pub total_receivable: Decimal,
    #[schema(value_type = String)]
    pub total_payable: Decimal,
    #[schema(value_type = String)]
    pub net_balance: Decimal,
}

impl From<LedgerSummary> for SummaryResponse {
    fn from(s: LedgerSummary) -> Self {
        Self {
            total_receivable: s.total_receivable,
            total_payable: s.total_payable,
            net_balance: s.net_balance,
        }
    }
}

/// One counterparty's balance and transaction history.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDetailResponse {
    pub name: String,
    #[schema(value_type = String)]
    pub balance: Decimal,
    pub transactions: Vec<TransactionResponse>,
}

/// Query flags for the customers listing.
#[derive(Debug, Default, Deserialize)]
pub struct CustomersQuery {
    /// Include settled transactions in the balances. Defaults to false:
    /// balances reflect what is still outstanding.
    #[serde(default)]
    pub include_settled: bool,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the ledger router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/business/ledger",
            get(list_transactions).post(create_transaction),
        )
        .route("/v1/business/ledger/:id/settle", post(settle_transaction))
        .route("/v1/business/ledger/summary", get(ledger_summary))
        .route("/v1/business/ledger/customers", get(list_customers))
        .route("/v1/business/ledger/customers/:name", get(customer_detail))
        .route("/v1/business/ledger/top-debtors", get(list_top_debtors))
}

fn owned_transactions(state: &AppState, account: &Account) -> Vec<LedgerTransaction> {
    state
        .transactions
        .list()
        .into_iter()
        .filter(|t| t.owner_id == account.id)
        .collect()
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/business/ledger — Record a transaction.
#[utoipa::path(
    post,
    path = "/v1/business/ledger",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = TransactionResponse),
        (status = 403, description = "Business account not approved", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn create_transaction(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ValidatedJson(req): ValidatedJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let account = require_business_enabled(&state, &caller)?;
    let kind = TransactionKind::parse(&req.transaction_type)
        .ok_or_else(|| AppError::Validation("unrecognized transaction_type".into()))?;

    let transaction = LedgerTransaction::new(
        account.id,
        NewTransaction {
            counterparty: req.counterparty,
            merchant: req.merchant,
            amount: req.amount,
            kind,
            date: req.date,
            note: req.note,
            source: TransactionSource::Manual,
            document_id: None,
        },
        Utc::now(),
    )?;
    let response = TransactionResponse::from(&transaction);
    state.transactions.insert(transaction.id, transaction);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/business/ledger — List the caller's transactions, newest first.
#[utoipa::path(
    get,
    path = "/v1/business/ledger",
    responses(
        (status = 200, description = "Transactions", body = Vec<TransactionResponse>),
        (status = 403, description = "Business account not approved", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn list_transactions(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let account = require_business_enabled(&state, &caller)?;
    let mut transactions = owned_transactions(&state, &account);
    transactions.reverse();
    Ok(Json(
        transactions.iter().map(TransactionResponse::from).collect(),
    ))
}

/// POST /v1/business/ledger/:id/settle — Settle a transaction.
///
/// Settlement is one-way; settling again returns 409 and leaves the
/// original settlement timestamp untouched.
#[utoipa::path(
    post,
    path = "/v1/business/ledger/{id}/settle",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction settled", body = TransactionResponse),
        (status = 404, description = "Not found or not owned", body = crate::error::ErrorBody),
        (status = 409, description = "Already settled", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn settle_transaction(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let account = require_business_enabled(&state, &caller)?;
    let result = state
        .transactions
        .try_update(&id, |tx| {
            if tx.owner_id != account.id {
                return Err(AppError::NotFound(format!("transaction {id} not found")));
            }
            tx.settle(Utc::now())?;
            Ok(TransactionResponse::from(&*tx))
        })
        .ok_or_else(|| AppError::NotFound(format!("transaction {id} not found")))?;
    let response = result?;
    Ok(Json(response))
}

/// GET /v1/business/ledger/summary — Receivable/payable totals.
#[utoipa::path(
    get,
    path = "/v1/business/ledger/summary",
    responses(
        (status = 200, description = "Ledger summary", body = SummaryResponse),
        (status = 403, description = "Business account not approved", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn ledger_summary(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<SummaryResponse>, AppError> {
    let account = require_business_enabled(&state, &caller)?;
    let transactions = owned_transactions(&state, &account);
    Ok(Json(SummaryResponse::from(summary(&transactions))))
}

/// GET /v1/business/ledger/customers — Per-counterparty balances.
///
/// Rows keep first-seen order and include zero and negative balances.
#[utoipa::path(
    get,
    path = "/v1/business/ledger/customers",
    params(("include_settled" = Option<bool>, Query, description = "Include settled transactions")),
    responses(
        (status = 200, description = "Customer balances", body = Vec<BalanceRow>),
        (status = 403, description = "Business account not approved", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn list_customers(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<CustomersQuery>,
) -> Result<Json<Vec<BalanceRow>>, AppError> {
    let account = require_business_enabled(&state, &caller)?;
    let transactions = owned_transactions(&state, &account);
    let rows = counterparty_balances(&transactions, query.include_settled)
        .into_iter()
        .map(BalanceRow::from)
        .collect();
    Ok(Json(rows))
}

/// GET /v1/business/ledger/customers/:name — One counterparty's history.
#[utoipa::path(
    get,
    path = "/v1/business/ledger/customers/{name}",
    params(("name" = String, Path, description = "Counterparty display name")),
    responses(
        (status = 200, description = "Counterparty detail", body = CustomerDetailResponse),
        (status = 404, description = "No transactions for this name", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn customer_detail(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(name): Path<String>,
) -> Result<Json<CustomerDetailResponse>, AppError> {
    let account = require_business_enabled(&state, &caller)?;
    let transactions: Vec<LedgerTransaction> = owned_transactions(&state, &account)
        .into_iter()
        .filter(|t| t.display_name() == name)
        .collect();
    if transactions.is_empty() {
        return Err(AppError::NotFound(format!(
            "no transactions for counterparty {name:?}"
        )));
    }
    let balance = transactions
        .iter()
        .map(LedgerTransaction::signed_amount)
        .sum();
    Ok(Json(CustomerDetailResponse {
        name,
        balance,
        transactions: transactions.iter().map(TransactionResponse::from).collect(),
    }))
}

/// GET /v1/business/ledger/top-debtors — Top five outstanding debtors.
#[utoipa::path(
    get,
    path = "/v1/business/ledger/top-debtors",
    responses(
        (status = 200, description = "Top debtors", body = Vec<BalanceRow>),
        (status = 403, description = "Business account not approved", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub(crate) async fn list_top_debtors(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<BalanceRow>>, AppError> {
    let account = require_business_enabled(&state, &caller)?;
    let transactions: Vec<LedgerTransaction> = owned_transactions(&state, &account)
        .into_iter()
        .filter(|t| !t.is_settled())
        .collect();
    let rows = top_debtors(&transactions)
        .into_iter()
        .map(BalanceRow::from)
        .collect();
    Ok(Json(rows))
}
