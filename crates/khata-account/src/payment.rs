//! # Onboarding Payment Record
//!
//! The one-time fee a business account pays before it may submit KYC.
//! Each account owns at most one record; resubmission updates it in
//! place and preserves any verification a reviewer has already set.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_core::{quantize, validate_amount, ValidationError};

/// Default onboarding fee when the submission carries no amount.
pub const DEFAULT_PAYMENT_AMOUNT: Decimal = Decimal::from_parts(18000, 0, 0, false, 0);

/// Default payment provider when the submission carries none.
pub const DEFAULT_PAYMENT_PROVIDER: &str = "Fonepay";

/// Fields the caller provides when submitting an onboarding payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSubmission {
    /// Amount paid; defaults to the standard onboarding fee.
    pub amount: Option<Decimal>,
    /// Payment provider name; defaults to the standard provider.
    pub provider: Option<String>,
    /// Provider-side transaction code, if the caller has one.
    pub transaction_code: Option<String>,
    /// Opaque reference to the uploaded payment screenshot.
    pub screenshot_ref: Option<String>,
}

/// The stored onboarding payment for a business account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Amount paid, quantized to two decimal places.
    pub amount: Decimal,
    /// Payment provider name.
    pub provider: String,
    /// Provider-side transaction code.
    pub transaction_code: Option<String>,
    /// Opaque reference to the uploaded payment screenshot.
    pub screenshot_ref: Option<String>,
    /// Set by a reviewer once the payment is confirmed against the provider.
    pub is_verified: bool,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Build a fresh record from a submission, applying defaults.
    pub fn new(submission: PaymentSubmission, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let amount = submission.amount.unwrap_or(DEFAULT_PAYMENT_AMOUNT);
        validate_amount(amount, "amount")?;
        Ok(Self {
            amount: quantize(amount),
            provider: submission
                .provider
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PAYMENT_PROVIDER.to_owned()),
            transaction_code: submission.transaction_code,
            screenshot_ref: submission.screenshot_ref,
            is_verified: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite the submitted fields in place, keeping `is_verified`
    /// and `created_at`.
    pub fn resubmit(
        &mut self,
        submission: PaymentSubmission,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let amount = submission.amount.unwrap_or(DEFAULT_PAYMENT_AMOUNT);
        validate_amount(amount, "amount")?;
        self.amount = quantize(amount);
        if let Some(provider) = submission.provider.filter(|p| !p.trim().is_empty()) {
            self.provider = provider;
        }
        if submission.transaction_code.is_some() {
            self.transaction_code = submission.transaction_code;
        }
        if submission.screenshot_ref.is_some() {
            self.screenshot_ref = submission.screenshot_ref;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Mark the payment as verified by a reviewer.
    pub fn verify(&mut self, now: DateTime<Utc>) {
        self.is_verified = true;
        self.updated_at = now;
    }
}
