//! # Ledger Transactions
//!
//! One record per money movement. Business accounts use CREDIT/DEBIT,
//! private accounts use LENT/BORROWED; the sign convention is the same
//! either way. Records are immutable except for the one-way settle
//! transition.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use khata_core::{quantize, validate_amount, ValidationError};

/// Direction of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money owed to the owner (business sale on credit).
    Credit,
    /// Money the owner owes (business purchase).
    Debit,
    /// Money lent to a friend (private).
    Lent,
    /// Money borrowed from a friend (private).
    Borrowed,
}

impl TransactionKind {
    /// Whether this kind increases the owner's receivable position.
    pub fn is_incoming(&self) -> bool {
        matches!(self, Self::Credit | Self::Lent)
    }

    /// The string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
            Self::Lent => "LENT",
            Self::Borrowed => "BORROWED",
        }
    }

    /// Parse a kind from its wire string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREDIT" => Some(Self::Credit),
            "DEBIT" => Some(Self::Debit),
            "LENT" => Some(Self::Lent),
            "BORROWED" => Some(Self::Borrowed),
            _ => None,
        }
    }
}

/// How a transaction entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionSource {
    /// Entered by hand.
    Manual,
    /// Created by confirming a scanned receipt.
    Ocr,
}

/// Errors raised by transaction operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Settle was called on an already-settled transaction.
    #[error("transaction is already settled")]
    AlreadySettled,
    /// A submitted field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Fields the caller provides when recording a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Counterparty display name (customer or friend).
    pub counterparty: String,
    /// Merchant name, when distinct from the counterparty.
    pub merchant: Option<String>,
    /// Positive amount, at most two decimal places.
    pub amount: Decimal,
    /// Direction.
    pub kind: TransactionKind,
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-text note.
    pub note: Option<String>,
    /// Manual entry or receipt confirmation.
    pub source: TransactionSource,
    /// Backing scanned document, for OCR-sourced records.
    pub document_id: Option<Uuid>,
}

/// A single ledger entry owned by one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Unique id.
    pub id: Uuid,
    /// Owning account.
    pub owner_id: Uuid,
    /// Counterparty display name. May be blank for receipt imports.
    pub counterparty: String,
    /// Merchant name, when known.
    pub merchant: Option<String>,
    /// Positive amount, two decimal places.
    pub amount: Decimal,
    /// Direction.
    pub kind: TransactionKind,
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-text note.
    pub note: Option<String>,
    /// Manual entry or receipt confirmation.
    pub source: TransactionSource,
    /// Backing scanned document, for OCR-sourced records.
    pub document_id: Option<Uuid>,
    /// Set once when the counterparty settles up. None = outstanding.
    pub settled_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Record a new transaction for `owner_id`.
    pub fn new(
        owner_id: Uuid,
        new: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        validate_amount(new.amount, "amount")?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            counterparty: new.counterparty.trim().to_owned(),
            merchant: new.merchant.filter(|m| !m.trim().is_empty()),
            amount: quantize(new.amount),
            kind: new.kind,
            date: new.date,
            note: new.note.filter(|n| !n.trim().is_empty()),
            source: new.source,
            document_id: new.document_id,
            settled_at: None,
            created_at: now,
        })
    }

    /// Amount with the direction's sign applied: positive for incoming
    /// (CREDIT/LENT), negative for outgoing (DEBIT/BORROWED).
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_incoming() {
            self.amount
        } else {
            -self.amount
        }
    }

    /// Name a balance row for this transaction: counterparty, else
    /// merchant, else "Unknown".
    pub fn display_name(&self) -> &str {
        if !self.counterparty.is_empty() {
            &self.counterparty
        } else if let Some(merchant) = self.merchant.as_deref().filter(|m| !m.is_empty()) {
            merchant
        } else {
            "Unknown"
        }
    }

    /// Mark the transaction settled. One-way: settling twice is an
    /// error and leaves the original timestamp untouched.
    pub fn settle(&mut self, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if self.settled_at.is_some() {
            return Err(LedgerError::AlreadySettled);
        }
        self.settled_at = Some(now);
        Ok(())
    }

    /// Whether the counterparty has settled this transaction.
    pub fn is_settled(&self) -> bool {
        self.settled_at.is_some()
    }
}
