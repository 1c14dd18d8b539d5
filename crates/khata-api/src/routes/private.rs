//! # Private (Peer-to-Peer) API
//!
//! Invite-code connections, friend groups, the personal ledger, and
//! item loans with reminder computation. Requires a private account.
//!
//! ## Endpoints
//!
//! - `POST /v1/private/connect` — connect to a friend by invite code
//! - `GET /v1/private/friends` — list friends
//! - `GET/POST /v1/private/groups` — list/create groups
//! - `POST /v1/private/groups/:id/add-member` — add a friend to a group
//! - `POST /v1/private/groups/:id/remove-member` — remove a member
//! - `GET/POST /v1/private/transactions` — personal ledger
//! - `GET /v1/private/transactions/summary` — personal totals
//! - `GET/POST /v1/private/items` — item loans
//! - `POST /v1/private/items/:id/return` — mark an item returned
//! - `GET /v1/private/items/reminder-due` — loans with a reminder due

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use khata_core::ValidationError;
use khata_ledger::{summary, LedgerTransaction, NewTransaction, TransactionKind, TransactionSource};
use khata_private::{
    are_friends, friends_of, Group, GroupMember, ItemLoan, LoanStatus, MemberRole, NewItemLoan,
    PrivateConnection,
};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::routes::ledger::{CreateTransactionRequest, SummaryResponse, TransactionResponse};
use crate::routes::require_private;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to connect to another private account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConnectRequest {
    /// The peer's invite code, case-insensitive.
    pub invite_code: String,
}

impl Validate for ConnectRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.invite_code.trim().is_empty() {
            return Err(ValidationError::Required { field: "invite_code" });
        }
        Ok(())
    }
}

/// Wire view of a new connection.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionResponse {
    pub id: Uuid,
    pub peer_id: Uuid,
    pub peer_name: String,
    pub connected_at: DateTime<Utc>,
}

/// Wire view of a friend.
#[derive(Debug, Serialize, ToSchema)]
pub struct FriendResponse {
    pub account_id: Uuid,
    pub full_name: String,
    pub connected_at: DateTime<Utc>,
}

/// Request to create a group.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
}

impl Validate for CreateGroupRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required { field: "name" });
        }
        Ok(())
    }
}

/// Request naming a group member to add or remove.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberRequest {
    pub account_id: Uuid,
}

impl Validate for MemberRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Wire view of a group member.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupMemberView {
    pub account_id: Uuid,
    #[schema(value_type = String)]
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl From<&GroupMember> for GroupMemberView {
    fn from(member: &GroupMember) -> Self {
        Self {
            account_id: member.account_id,
            role: member.role,
            joined_at: member.joined_at,
        }
    }
}

/// Wire view of a group.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub members: Vec<GroupMemberView>,
    pub created_at: DateTime<Utc>,
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            owner_id: group.owner_id,
            members: group.members.iter().map(GroupMemberView::from).collect(),
            created_at: group.created_at,
        }
    }
}

/// Request to record an item loan.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    pub borrower_id: Uuid,
    pub item_name: String,
    pub item_description: Option<String>,
    pub lent_date: NaiveDate,
    pub expected_return_date: Option<NaiveDate>,
    #[serde(default = "default_reminder_enabled")]
    pub reminder_enabled: bool,
    pub reminder_interval_days: Option<u32>,
}

fn default_reminder_enabled() -> bool {
    true
}

impl Validate for CreateLoanRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.item_name.trim().is_empty() {
            return Err(ValidationError::Required { field: "item_name" });
        }
        if self.reminder_interval_days == Some(0) {
            return Err(ValidationError::BelowMinimum {
                field: "reminder_interval_days",
                min: 1,
            });
        }
        Ok(())
    }
}

/// Wire view of an item loan.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoanResponse {
    pub id: Uuid,
    pub borrower_id: Uuid,
    pub item_name: String,
    pub item_description: Option<String>,
    pub lent_date: NaiveDate,
    pub expected_return_date: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub status: LoanStatus,
    pub reminder_enabled: bool,
    pub reminder_interval_days: u32,
    pub last_reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&ItemLoan> for LoanResponse {
    fn from(loan: &ItemLoan) -> Self {
        Self {
            id: loan.id,
            borrower_id: loan.borrower_id,
            item_name: loan.item_name.clone(),
            item_description: loan.item_description.clone(),
            lent_date: loan.lent_date,
            expected_return_date: loan.expected_return_date,
            status: loan.status,
            reminder_enabled: loan.reminder_enabled,
            reminder_interval_days: loan.reminder_interval_days,
            last_reminder_sent_at: loan.last_reminder_sent_at,
            created_at: loan.created_at,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the private router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/private/connect", post(connect))
        .route("/v1/private/friends", get(list_friends))
        .route("/v1/private/groups", get(list_groups).post(create_group))
        .route("/v1/private/groups/:id/add-member", post(add_group_member))
        .route(
            "/v1/private/groups/:id/remove-member",
            post(remove_group_member),
        )
        .route(
            "/v1/private/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/v1/private/transactions/summary", get(transactions_summary))
        .route("/v1/private/items", get(list_loans).post(create_loan))
        .route("/v1/private/items/:id/return", post(return_loan))
        .route("/v1/private/items/reminder-due", get(reminders_due))
}

// ── Handlers: connections ───────────────────────────────────────────

/// POST /v1/private/connect — Connect to a friend by invite code.
#[utoipa::path(
    post,
    path = "/v1/private/connect",
    request_body = ConnectRequest,
    responses(
        (status = 201, description = "Connected", body = ConnectionResponse),
        (status = 400, description = "Self-connection or duplicate", body = crate::error::ErrorBody),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown invite code", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn connect(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ValidatedJson(req): ValidatedJson<ConnectRequest>,
) -> Result<(StatusCode, Json<ConnectionResponse>), AppError> {
    let account = require_private(&state, &caller)?;

    let code = req.invite_code.trim().to_ascii_uppercase();
    let peer = state
        .accounts
        .find(|a| a.invite_code == code)
        .ok_or_else(|| AppError::NotFound("no account with this invite code".into()))?;

    let existing = state.connections.list();
    let connection = PrivateConnection::connect(account.id, peer.id, &existing, Utc::now())?;
    let response = ConnectionResponse {
        id: connection.id,
        peer_id: peer.id,
        peer_name: peer.full_name,
        connected_at: connection.created_at,
    };
    state.connections.insert(connection.id, connection);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/private/friends — List friends in either direction.
#[utoipa::path(
    get,
    path = "/v1/private/friends",
    responses(
        (status = 200, description = "Friends", body = Vec<FriendResponse>),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn list_friends(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<FriendResponse>>, AppError> {
    let account = require_private(&state, &caller)?;
    let connections = state.connections.list();
    let friends = friends_of(account.id, &connections)
        .into_iter()
        .map(|friend| {
            let full_name = state
                .accounts
                .get(&friend.account_id)
                .map(|a| a.full_name)
                .unwrap_or_default();
            FriendResponse {
                account_id: friend.account_id,
                full_name,
                connected_at: friend.connected_at,
            }
        })
        .collect();
    Ok(Json(friends))
}

// ── Handlers: groups ────────────────────────────────────────────────

/// POST /v1/private/groups — Create a group. The creator joins as ADMIN.
#[utoipa::path(
    post,
    path = "/v1/private/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn create_group(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ValidatedJson(req): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), AppError> {
    let account = require_private(&state, &caller)?;

    let group = Group::new(account.id, &req.name, Utc::now())?;
    let response = GroupResponse::from(&group);
    state.groups.insert(group.id, group);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/private/groups — Groups the caller belongs to.
#[utoipa::path(
    get,
    path = "/v1/private/groups",
    responses(
        (status = 200, description = "Groups", body = Vec<GroupResponse>),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn list_groups(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<GroupResponse>>, AppError> {
    let account = require_private(&state, &caller)?;
    let groups = state
        .groups
        .list()
        .iter()
        .filter(|g| g.role_of(account.id).is_some())
        .map(GroupResponse::from)
        .collect();
    Ok(Json(groups))
}

/// POST /v1/private/groups/:id/add-member — Add a friend to a group.
///
/// The acting member must be an admin and the target must be one of
/// their friends.
#[utoipa::path(
    post,
    path = "/v1/private/groups/{id}/add-member",
    params(("id" = Uuid, Path, description = "Group ID")),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member added", body = GroupResponse),
        (status = 400, description = "Already a member or not a friend", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not a group admin", body = crate::error::ErrorBody),
        (status = 404, description = "Group not found or caller not a member", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn add_group_member(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<MemberRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    let account = require_private(&state, &caller)?;

    let connections = state.connections.list();
    let is_friend = are_friends(account.id, req.account_id, &connections);

    let result = state
        .groups
        .try_update(&id, |group| {
            if group.role_of(account.id).is_none() {
                return Err(AppError::NotFound(format!("group {id} not found")));
            }
            group.add_member(account.id, req.account_id, is_friend, Utc::now())?;
            Ok(GroupResponse::from(&*group))
        })
        .ok_or_else(|| AppError::NotFound(format!("group {id} not found")))?;
    let response = result?;
    Ok(Json(response))
}

/// POST /v1/private/groups/:id/remove-member — Remove a group member.
#[utoipa::path(
    post,
    path = "/v1/private/groups/{id}/remove-member",
    params(("id" = Uuid, Path, description = "Group ID")),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member removed", body = GroupResponse),
        (status = 400, description = "Cannot remove the owner", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not a group admin", body = crate::error::ErrorBody),
        (status = 404, description = "Group or member not found", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn remove_group_member(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<MemberRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    let account = require_private(&state, &caller)?;

    let result = state
        .groups
        .try_update(&id, |group| {
            if group.role_of(account.id).is_none() {
                return Err(AppError::NotFound(format!("group {id} not found")));
            }
            group.remove_member(account.id, req.account_id)?;
            Ok(GroupResponse::from(&*group))
        })
        .ok_or_else(|| AppError::NotFound(format!("group {id} not found")))?;
    let response = result?;
    Ok(Json(response))
}

// ── Handlers: personal ledger ───────────────────────────────────────

/// POST /v1/private/transactions — Record a personal transaction.
#[utoipa::path(
    post,
    path = "/v1/private/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = TransactionResponse),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn create_transaction(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ValidatedJson(req): ValidatedJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let account = require_private(&state, &caller)?;
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

/// GET /v1/private/transactions — The caller's transactions, newest first.
#[utoipa::path(
    get,
    path = "/v1/private/transactions",
    responses(
        (status = 200, description = "Transactions", body = Vec<TransactionResponse>),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn list_transactions(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let account = require_private(&state, &caller)?;
    let mut transactions: Vec<LedgerTransaction> = state
        .transactions
        .list()
        .into_iter()
        .filter(|t| t.owner_id == account.id)
        .collect();
    transactions.reverse();
    Ok(Json(
        transactions.iter().map(TransactionResponse::from).collect(),
    ))
}

/// GET /v1/private/transactions/summary — Personal totals.
#[utoipa::path(
    get,
    path = "/v1/private/transactions/summary",
    responses(
        (status = 200, description = "Summary", body = SummaryResponse),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn transactions_summary(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<SummaryResponse>, AppError> {
    let account = require_private(&state, &caller)?;
    let transactions: Vec<LedgerTransaction> = state
        .transactions
        .list()
        .into_iter()
        .filter(|t| t.owner_id == account.id)
        .collect();
    Ok(Json(SummaryResponse::from(summary(&transactions))))
}

// ── Handlers: item loans ────────────────────────────────────────────

/// POST /v1/private/items — Record an item loan.
#[utoipa::path(
    post,
    path = "/v1/private/items",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan recorded", body = LoanResponse),
        (status = 400, description = "Self-loan", body = crate::error::ErrorBody),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn create_loan(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ValidatedJson(req): ValidatedJson<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), AppError> {
    let account = require_private(&state, &caller)?;

    let loan = ItemLoan::new(
        account.id,
        NewItemLoan {
            borrower_id: req.borrower_id,
            item_name: req.item_name,
            item_description: req.item_description,
            lent_date: req.lent_date,
            expected_return_date: req.expected_return_date,
            reminder_enabled: req.reminder_enabled,
            reminder_interval_days: req.reminder_interval_days,
        },
        Utc::now(),
    )?;
    let response = LoanResponse::from(&loan);
    state.item_loans.insert(loan.id, loan);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/private/items — The caller's loans.
#[utoipa::path(
    get,
    path = "/v1/private/items",
    responses(
        (status = 200, description = "Loans", body = Vec<LoanResponse>),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn list_loans(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<LoanResponse>>, AppError> {
    let account = require_private(&state, &caller)?;
    let loans = state
        .item_loans
        .list()
        .iter()
        .filter(|l| l.owner_id == account.id)
        .map(LoanResponse::from)
        .collect();
    Ok(Json(loans))
}

/// POST /v1/private/items/:id/return — Mark an item returned.
#[utoipa::path(
    post,
    path = "/v1/private/items/{id}/return",
    params(("id" = Uuid, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Item returned", body = LoanResponse),
        (status = 404, description = "Not found or not owned", body = crate::error::ErrorBody),
        (status = 409, description = "Already returned", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn return_loan(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LoanResponse>, AppError> {
    let account = require_private(&state, &caller)?;
    let result = state
        .item_loans
        .try_update(&id, |loan| {
            if loan.owner_id != account.id {
                return Err(AppError::NotFound(format!("loan {id} not found")));
            }
            loan.mark_returned()?;
            Ok(LoanResponse::from(&*loan))
        })
        .ok_or_else(|| AppError::NotFound(format!("loan {id} not found")))?;
    let response = result?;
    Ok(Json(response))
}

/// GET /v1/private/items/reminder-due — Active loans with a reminder due.
///
/// Pure read: marking a reminder as sent is the notifier's concern.
#[utoipa::path(
    get,
    path = "/v1/private/items/reminder-due",
    responses(
        (status = 200, description = "Loans with a reminder due", body = Vec<LoanResponse>),
        (status = 403, description = "Not a private account", body = crate::error::ErrorBody),
    ),
    tag = "private"
)]
pub(crate) async fn reminders_due(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<LoanResponse>>, AppError> {
    let account = require_private(&state, &caller)?;
    let now = Utc::now();
    let loans = state
        .item_loans
        .list()
        .iter()
        .filter(|l| l.owner_id == account.id && l.reminder_due(now))
        .map(LoanResponse::from)
        .collect();
    Ok(Json(loans))
}
