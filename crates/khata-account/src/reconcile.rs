//! # Status Reconciliation
//!
//! Business status and the owned KYC record can drift apart when one
//! side is edited out of band. [`reconcile`] repairs the drift in a
//! fixed priority order and reports what it touched. It is pure over
//! the aggregate, so callers run it inside a single store update and
//! readers never observe a half-repaired account.

use chrono::{DateTime, Utc};

use crate::account::Account;
use crate::kyc::ReviewState;
use crate::status::{BusinessStatus, KycStatus};

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// The account's statuses were repaired to match the KYC record.
    pub account_repaired: bool,
    /// The KYC record was repaired to match the account's status.
    pub kyc_repaired: bool,
}

impl ReconcileOutcome {
    /// Whether the pass changed anything at all.
    pub fn changed(&self) -> bool {
        self.account_repaired || self.kyc_repaired
    }
}

/// Repair any drift between an account's statuses and its KYC record.
///
/// Rules, in priority order:
///
/// 1. An approved KYC record wins: the account is promoted to
///    `APPROVED` on both status fields.
/// 2. Otherwise an `APPROVED` account status wins: an existing
///    unapproved KYC record is marked approved as of `now`, with no
///    reviewer recorded.
/// 3. An `UNDER_REVIEW` status with no KYC record at all is demoted to
///    `KYC_PENDING` — there is nothing to review.
///
/// Running the pass again immediately changes nothing.
pub fn reconcile(account: &mut Account, now: DateTime<Utc>) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    let kyc_approved = account
        .kyc
        .as_ref()
        .is_some_and(|record| record.review.is_approved());

    if kyc_approved {
        if account.business_status != BusinessStatus::Approved
            || account.kyc_status != KycStatus::Approved
        {
            account.business_status = BusinessStatus::Approved;
            account.kyc_status = KycStatus::Approved;
            outcome.account_repaired = true;
        }
        return outcome;
    }

    if account.business_status == BusinessStatus::Approved {
        if let Some(record) = account.kyc.as_mut() {
            record.review = ReviewState::Approved {
                reviewed_by: None,
                reviewed_at: now,
            };
            record.updated_at = now;
            account.kyc_status = KycStatus::Approved;
            outcome.kyc_repaired = true;
        }
        return outcome;
    }

    if account.business_status == BusinessStatus::UnderReview && account.kyc.is_none() {
        account.business_status = BusinessStatus::KycPending;
        outcome.account_repaired = true;
    }

    outcome
}
