//! # KYC Record and Review State
//!
//! A business account owns at most one KYC record. The record splits
//! into the submitted [`KycProfile`] and the [`ReviewState`], a tagged
//! enum that carries reviewer metadata only in the states where it
//! exists. A rejection reason on an approved record, or reviewer
//! fields on a pending one, are unrepresentable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use khata_core::ValidationError;

/// Maximum length accepted for free-text profile fields.
const MAX_FIELD_LEN: usize = 255;

/// The identity and business details a KYC submission carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycProfile {
    /// Registered business name.
    pub business_name: String,
    /// Government business registration number.
    pub registration_number: String,
    /// PAN / tax identifier.
    pub tax_id: Option<String>,
    /// Business street address.
    pub address: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Owner's legal name.
    pub owner_name: String,
    /// Owner's citizenship or ID number.
    pub owner_id_number: Option<String>,
    /// Owner's date of birth.
    pub owner_dob: Option<NaiveDate>,
    /// Opaque reference to the registration certificate upload.
    pub registration_doc_ref: Option<String>,
    /// Opaque reference to the owner ID upload.
    pub owner_id_doc_ref: Option<String>,
}

impl KycProfile {
    /// Validate required fields and lengths.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("business_name", &self.business_name),
            ("registration_number", &self.registration_number),
            ("address", &self.address),
            ("owner_name", &self.owner_name),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Required { field });
            }
            if value.len() > MAX_FIELD_LEN {
                return Err(ValidationError::TooLong {
                    field,
                    max: MAX_FIELD_LEN,
                });
            }
        }
        Ok(())
    }
}

/// Review decision on a KYC record.
///
/// Tagged so reviewer metadata exists exactly when a decision does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Awaiting a reviewer decision.
    Pending,
    /// Approved by a reviewer.
    Approved {
        /// Reviewer who approved, when known.
        reviewed_by: Option<Uuid>,
        /// When the approval happened.
        reviewed_at: DateTime<Utc>,
    },
    /// Rejected by a reviewer.
    Rejected {
        /// Reviewer who rejected, when known.
        reviewed_by: Option<Uuid>,
        /// When the rejection happened.
        reviewed_at: DateTime<Utc>,
        /// Human-readable reason shown to the account holder.
        reason: String,
    },
}

impl ReviewState {
    /// Whether this record has been approved.
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    /// The rejection reason, if the record is rejected.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// When the decision was made, if one has been.
    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Approved { reviewed_at, .. } | Self::Rejected { reviewed_at, .. } => {
                Some(*reviewed_at)
            }
            Self::Pending => None,
        }
    }

    /// The reviewer who made the decision, if recorded.
    pub fn reviewed_by(&self) -> Option<Uuid> {
        match self {
            Self::Approved { reviewed_by, .. } | Self::Rejected { reviewed_by, .. } => *reviewed_by,
            Self::Pending => None,
        }
    }
}

/// The stored KYC record for a business account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycRecord {
    /// The submitted profile details.
    pub profile: KycProfile,
    /// Current review decision.
    pub review: ReviewState,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl KycRecord {
    /// Build a fresh record from a validated profile.
    pub fn new(profile: KycProfile, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        profile.validate()?;
        Ok(Self {
            profile,
            review: ReviewState::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the profile and reset the review to pending.
    ///
    /// Resubmission clears any prior rejection; gating against
    /// resubmitting an already-approved record lives on the account.
    pub fn resubmit(
        &mut self,
        profile: KycProfile,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        profile.validate()?;
        self.profile = profile;
        self.review = ReviewState::Pending;
        self.updated_at = now;
        Ok(())
    }
}
