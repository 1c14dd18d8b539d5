//! # Account Status Enums
//!
//! Account type, KYC status, and the business-status lifecycle.
//!
//! All three serialize as `SCREAMING_SNAKE_CASE` strings on the wire.
//! Statuses are enums end to end; stored strings from external sources
//! enter through [`BusinessStatus::parse_lossy`], which resets anything
//! unrecognized to `PAYMENT_PENDING` instead of letting a defective
//! string circulate.

use serde::{Deserialize, Serialize};

// ── Account Type ─────────────────────────────────────────────────────

/// Whether an account is a private (peer-to-peer) or business tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Peer-to-peer account: friends, groups, item loans, LENT/BORROWED ledger.
    Private,
    /// Business account: payment + KYC gated, CREDIT/DEBIT ledger, OCR intake.
    Business,
}

impl AccountType {
    /// Parse an account type from user input.
    ///
    /// Case-insensitive; the legacy alias `PERSONAL` maps to `Private`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRIVATE" | "PERSONAL" => Some(Self::Private),
            "BUSINESS" => Some(Self::Business),
            _ => None,
        }
    }

    /// The string representation of this account type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "PRIVATE",
            Self::Business => "BUSINESS",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── KYC Status ───────────────────────────────────────────────────────

/// The account-level view of KYC review progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    /// No review decision yet (or a resubmission is awaiting review).
    Pending,
    /// A reviewer approved the KYC record.
    Approved,
    /// A reviewer rejected the KYC record.
    Rejected,
}

impl KycStatus {
    /// The string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Business Status ──────────────────────────────────────────────────

/// Lifecycle status of a business account's onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessStatus {
    /// Awaiting the onboarding payment submission.
    PaymentPending,
    /// Payment submitted; awaiting the KYC submission.
    KycPending,
    /// KYC submitted; awaiting a reviewer decision.
    UnderReview,
    /// Reviewer approved — the account may use business features.
    Approved,
    /// Reviewer rejected — resubmitting KYC returns to UnderReview.
    Rejected,
}

impl BusinessStatus {
    /// Parse a stored status string, `None` if it is not a member of the
    /// allowed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PAYMENT_PENDING" => Some(Self::PaymentPending),
            "KYC_PENDING" => Some(Self::KycPending),
            "UNDER_REVIEW" => Some(Self::UnderReview),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Parse a stored status string, resetting anything outside the
    /// allowed set to `PAYMENT_PENDING`.
    ///
    /// This is the repair applied at the storage boundary for statuses
    /// corrupted by out-of-band edits.
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::PaymentPending)
    }

    /// The string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::KycPending => "KYC_PENDING",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
