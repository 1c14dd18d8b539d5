//! # KYC Review Decisions
//!
//! Approve and reject operate on the whole account aggregate, so the
//! review state and both status fields move together. Callers run
//! these inside a single store update; access control (reviewers only)
//! lives at the API layer.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::account::Account;
use crate::kyc::ReviewState;
use crate::status::{BusinessStatus, KycStatus};

/// Reason recorded when a rejection carries none.
pub const DEFAULT_REJECTION_REASON: &str = "Rejected by reviewer.";

/// Errors raised by review decisions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// The account has no KYC record to decide on.
    #[error("account has no KYC record")]
    NoKycRecord,
}

/// Approve the account's KYC record.
///
/// Idempotent: approving an already-approved record refreshes the
/// reviewer metadata and leaves the statuses approved.
pub fn approve(
    account: &mut Account,
    reviewer: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<(), ReviewError> {
    let record = account.kyc.as_mut().ok_or(ReviewError::NoKycRecord)?;
    record.review = ReviewState::Approved {
        reviewed_by: reviewer,
        reviewed_at: now,
    };
    record.updated_at = now;
    account.kyc_status = KycStatus::Approved;
    account.business_status = BusinessStatus::Approved;
    Ok(())
}

/// Reject the account's KYC record.
///
/// A blank or missing reason is replaced with
/// [`DEFAULT_REJECTION_REASON`].
pub fn reject(
    account: &mut Account,
    reviewer: Option<Uuid>,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), ReviewError> {
    let record = account.kyc.as_mut().ok_or(ReviewError::NoKycRecord)?;
    let reason = reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_owned());
    record.review = ReviewState::Rejected {
        reviewed_by: reviewer,
        reviewed_at: now,
        reason,
    };
    record.updated_at = now;
    account.kyc_status = KycStatus::Rejected;
    account.business_status = BusinessStatus::Rejected;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kyc::tests::sample_profile;
    use crate::payment::PaymentSubmission;
    use crate::status::AccountType;

    fn under_review_account() -> Account {
        let mut account =
            Account::new("shop@example.com", "Shop", AccountType::Business, Utc::now()).unwrap();
        account
            .submit_payment(
                PaymentSubmission {
                    amount: None,
                    provider: None,
                    transaction_code: None,
                    screenshot_ref: None,
                },
                Utc::now(),
            )
            .unwrap();
        account.submit_kyc(sample_profile(), Utc::now()).unwrap();
        account
    }

    #[test]
    fn approve_sets_all_three_fields() {
        let mut account = under_review_account();
        let reviewer = Uuid::new_v4();
        approve(&mut account, Some(reviewer), Utc::now()).unwrap();
        assert_eq!(account.kyc_status, KycStatus::Approved);
        assert_eq!(account.business_status, BusinessStatus::Approved);
        let review = &account.kyc.as_ref().unwrap().review;
        assert!(review.is_approved());
        assert_eq!(review.reviewed_by(), Some(reviewer));
    }

    #[test]
    fn reject_records_reason() {
        let mut account = under_review_account();
        reject(&mut account, None, Some("Expired certificate.".into()), Utc::now()).unwrap();
        assert_eq!(account.kyc_status, KycStatus::Rejected);
        assert_eq!(account.business_status, BusinessStatus::Rejected);
        assert_eq!(
            account.kyc.as_ref().unwrap().review.rejection_reason(),
            Some("Expired certificate.")
        );
    }

    #[test]
    fn reject_defaults_blank_reason() {
        let mut account = under_review_account();
        reject(&mut account, None, Some("   ".into()), Utc::now()).unwrap();
        assert_eq!(
            account.kyc.as_ref().unwrap().review.rejection_reason(),
            Some(DEFAULT_REJECTION_REASON)
        );
    }

    #[test]
    fn decisions_without_record_fail() {
        let mut account = under_review_account();
        account.kyc = None;
        assert_eq!(
            approve(&mut account, None, Utc::now()),
            Err(ReviewError::NoKycRecord)
        );
        assert_eq!(
            reject(&mut account, None, None, Utc::now()),
            Err(ReviewError::NoKycRecord)
        );
    }

    #[test]
    fn approve_after_reject_overwrites_cleanly() {
        let mut account = under_review_account();
        reject(&mut account, None, None, Utc::now()).unwrap();
        approve(&mut account, None, Utc::now()).unwrap();
        let review = &account.kyc.as_ref().unwrap().review;
        assert!(review.is_approved());
        assert_eq!(review.rejection_reason(), None);
        assert_eq!(account.business_status, BusinessStatus::Approved);
    }
}
