//! # Account Aggregate
//!
//! An account owns its payment and KYC records directly. Submissions
//! and review decisions mutate the aggregate as a unit, so a single
//! store update covers every field a transition touches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use khata_core::ValidationError;

use crate::kyc::{KycProfile, KycRecord};
use crate::payment::{PaymentRecord, PaymentSubmission};
use crate::status::{AccountType, BusinessStatus, KycStatus};

/// Errors raised by account-level transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    /// A submitted field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A business-only operation was attempted on a private account.
    #[error("operation requires a business account")]
    NotBusiness,
    /// KYC resubmission attempted after approval.
    #[error("KYC record is already approved")]
    KycAlreadyApproved,
}

/// A registered account, private or business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique id.
    pub id: Uuid,
    /// Normalized (trimmed, lowercased) email address, unique per tenant.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Private or business.
    pub account_type: AccountType,
    /// Account-level KYC progress.
    pub kyc_status: KycStatus,
    /// Business onboarding lifecycle status.
    pub business_status: BusinessStatus,
    /// Short code other accounts use to connect to this one.
    pub invite_code: String,
    /// Grants access to review operations.
    pub is_superuser: bool,
    /// Owned onboarding payment, once submitted.
    pub payment: Option<PaymentRecord>,
    /// Owned KYC record, once submitted.
    pub kyc: Option<KycRecord>,
    /// When the account registered.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Register a new account.
    ///
    /// Private accounts start fully approved; business accounts start
    /// at `PAYMENT_PENDING` and must complete onboarding.
    pub fn new(
        email: &str,
        full_name: &str,
        account_type: AccountType,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::Required { field: "email" });
        }
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::Required { field: "full_name" });
        }
        let (kyc_status, business_status) = match account_type {
            AccountType::Private => (KycStatus::Approved, BusinessStatus::Approved),
            AccountType::Business => (KycStatus::Pending, BusinessStatus::PaymentPending),
        };
        let id = Uuid::new_v4();
        Ok(Self {
            id,
            email,
            full_name: full_name.to_owned(),
            account_type,
            kyc_status,
            business_status,
            invite_code: id.simple().to_string()[..8].to_ascii_uppercase(),
            is_superuser: false,
            payment: None,
            kyc: None,
            created_at: now,
        })
    }

    /// Whether business features are unlocked for this account.
    pub fn is_business_enabled(&self) -> bool {
        self.account_type == AccountType::Business
            && (self.kyc_status == KycStatus::Approved
                || self.business_status == BusinessStatus::Approved)
    }

    /// Submit (or resubmit) the onboarding payment.
    ///
    /// Advances `PAYMENT_PENDING` to `KYC_PENDING`; a later status is
    /// left where it is so resubmitting a payment never regresses
    /// onboarding progress.
    pub fn submit_payment(
        &mut self,
        submission: PaymentSubmission,
        now: DateTime<Utc>,
    ) -> Result<&PaymentRecord, AccountError> {
        if self.account_type != AccountType::Business {
            return Err(AccountError::NotBusiness);
        }
        match self.payment.as_mut() {
            Some(existing) => {
                existing.resubmit(submission, now)?;
            }
            None => {
                self.payment = Some(PaymentRecord::new(submission, now)?);
            }
        }
        if self.business_status == BusinessStatus::PaymentPending {
            self.business_status = BusinessStatus::KycPending;
        }
        Ok(self.payment.as_ref().expect("payment was just set"))
    }

    /// Submit (or resubmit) the KYC profile.
    ///
    /// Sets `kyc_status` to pending and moves the business status to
    /// `UNDER_REVIEW`. Resubmission after approval is refused.
    pub fn submit_kyc(
        &mut self,
        profile: KycProfile,
        now: DateTime<Utc>,
    ) -> Result<&KycRecord, AccountError> {
        if self.account_type != AccountType::Business {
            return Err(AccountError::NotBusiness);
        }
        match self.kyc.as_mut() {
            Some(existing) => {
                if existing.review.is_approved() {
                    return Err(AccountError::KycAlreadyApproved);
                }
                existing.resubmit(profile, now)?;
            }
            None => {
                self.kyc = Some(KycRecord::new(profile, now)?);
            }
        }
        self.kyc_status = KycStatus::Pending;
        self.business_status = BusinessStatus::UnderReview;
        Ok(self.kyc.as_ref().expect("kyc was just set"))
    }
}
