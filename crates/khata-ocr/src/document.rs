//! # Scanned Document Lifecycle
//!
//! A document enters as DRAFT with whatever the heuristics suggested,
//! and is confirmed exactly once with caller-verified values. CONFIRMED
//! is terminal: repeat confirmation is rejected, never absorbed, so a
//! document can back at most one ledger transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use khata_core::{quantize, validate_amount, ValidationError};

use crate::extract::{extract_receipt, ReceiptFields};

/// Lifecycle status of a scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Awaiting user confirmation of the extracted fields.
    Draft,
    /// Confirmed; a ledger transaction exists for it. Terminal.
    Confirmed,
}

impl DocumentStatus {
    /// The string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Confirmed => "CONFIRMED",
        }
    }
}

/// Errors raised by document transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// Confirmation was attempted on a non-draft document.
    #[error("only draft documents can be confirmed")]
    NotDraft,
    /// A confirmation field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Caller-verified values applied at confirmation time.
#[derive(Debug, Clone, Deserialize)]
pub struct Confirmation {
    /// Final amount, positive with at most two decimal places.
    pub amount: Decimal,
    /// Final transaction date.
    pub date: NaiveDate,
    /// Final merchant name.
    pub merchant: String,
}

/// A scanned receipt image and the fields extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedDocument {
    /// Unique id.
    pub id: Uuid,
    /// Account that uploaded the document.
    pub owner_id: Uuid,
    /// Opaque reference to the stored image.
    pub image_ref: String,
    /// Raw text the extractor produced. May be empty.
    pub raw_text: String,
    /// Suggested amount, if the heuristics found one.
    pub extracted_amount: Option<Decimal>,
    /// Suggested date, if the heuristics found one.
    pub extracted_date: Option<NaiveDate>,
    /// Suggested merchant, if the heuristics found one.
    pub extracted_merchant: Option<String>,
    /// Current lifecycle status.
    pub status: DocumentStatus,
    /// Ledger transaction created at confirmation.
    pub transaction_id: Option<Uuid>,
    /// When the document was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the document last changed.
    pub updated_at: DateTime<Utc>,
}

impl ScannedDocument {
    /// Create a DRAFT document from raw extractor output, running the
    /// field heuristics over it. Never fails: unreadable text simply
    /// yields empty suggestions.
    pub fn from_scan(
        owner_id: Uuid,
        image_ref: String,
        raw_text: String,
        now: DateTime<Utc>,
    ) -> Self {
        let ReceiptFields {
            amount,
            date,
            merchant,
        } = extract_receipt(&raw_text);
        Self {
            id: Uuid::new_v4(),
            owner_id,
            image_ref,
            raw_text,
            extracted_amount: amount,
            extracted_date: date,
            extracted_merchant: merchant,
            status: DocumentStatus::Draft,
            transaction_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a confirmation: validate the final values, overwrite the
    /// suggestions with them, and move to CONFIRMED.
    ///
    /// The caller links the resulting ledger transaction via
    /// [`link_transaction`](Self::link_transaction) in the same store
    /// update.
    pub fn confirm(&mut self, confirmation: &Confirmation, now: DateTime<Utc>) -> Result<(), DocumentError> {
        if self.status != DocumentStatus::Draft {
            return Err(DocumentError::NotDraft);
        }
        validate_amount(confirmation.amount, "amount")?;
        if confirmation.merchant.trim().is_empty() {
            return Err(ValidationError::Required { field: "merchant" }.into());
        }
        self.extracted_amount = Some(quantize(confirmation.amount));
        self.extracted_date = Some(confirmation.date);
        self.extracted_merchant = Some(confirmation.merchant.trim().to_owned());
        self.status = DocumentStatus::Confirmed;
        self.updated_at = now;
        Ok(())
    }

    /// Record the ledger transaction backing this document.
    pub fn link_transaction(&mut self, transaction_id: Uuid) {
        self.transaction_id = Some(transaction_id);
    }
}

/// Ordering for document listings: drafts before confirmed, newest
/// first within each group.
pub fn listing_order(a: &ScannedDocument, b: &ScannedDocument) -> std::cmp::Ordering {
    let rank = |d: &ScannedDocument| match d.status {
        DocumentStatus::Draft => 0,
        DocumentStatus::Confirmed => 1,
    };
    rank(a)
        .cmp(&rank(b))
        .then(b.created_at.cmp(&a.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn draft(text: &str) -> ScannedDocument {
        ScannedDocument::from_scan(Uuid::new_v4(), "r1.jpg".into(), text.into(), Utc::now())
    }

    fn confirmation() -> Confirmation {
        Confirmation {
            amount: dec!(12.50),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            merchant: "Test Store".into(),
        }
    }

    #[test]
    fn from_scan_populates_suggestions() {
        let doc = draft("Sunrise Store\n13-01-2024\nTotal 45.00");
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert_eq!(doc.extracted_amount, Some(dec!(45.00)));
        assert_eq!(doc.extracted_date, NaiveDate::from_ymd_opt(2024, 1, 13));
        assert_eq!(doc.extracted_merchant.as_deref(), Some("Sunrise Store"));
    }

    #[test]
    fn from_scan_tolerates_empty_text() {
        let doc = draft("");
        assert_eq!(doc.extracted_amount, None);
        assert_eq!(doc.extracted_date, None);
        assert_eq!(doc.extracted_merchant, None);
        assert_eq!(doc.status, DocumentStatus::Draft);
    }

    #[test]
    fn confirm_overwrites_and_flips_status() {
        let mut doc = draft("Total 99.99");
        doc.confirm(&confirmation(), Utc::now()).unwrap();
        assert_eq!(doc.status, DocumentStatus::Confirmed);
        assert_eq!(doc.extracted_amount, Some(dec!(12.50)));
        assert_eq!(doc.extracted_merchant.as_deref(), Some("Test Store"));
    }

    #[test]
    fn second_confirm_rejected() {
        let mut doc = draft("Total 99.99");
        doc.confirm(&confirmation(), Utc::now()).unwrap();
        let err = doc.confirm(&confirmation(), Utc::now()).unwrap_err();
        assert_eq!(err, DocumentError::NotDraft);
    }

    #[test]
    fn confirm_validates_amount_and_merchant() {
        let mut doc = draft("");
        let mut bad = confirmation();
        bad.amount = dec!(-5);
        assert!(doc.confirm(&bad, Utc::now()).is_err());
        let mut blank = confirmation();
        blank.merchant = "  ".into();
        assert!(doc.confirm(&blank, Utc::now()).is_err());
        assert_eq!(doc.status, DocumentStatus::Draft);
    }

    #[test]
    fn listing_order_drafts_first_then_newest() {
        let at = |h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap();
        let mut old_draft = draft("");
        old_draft.created_at = at(1);
        let mut new_draft = draft("");
        new_draft.created_at = at(2);
        let mut confirmed = draft("");
        confirmed.confirm(&confirmation(), Utc::now()).unwrap();
        confirmed.created_at = at(3);

        let mut docs = vec![old_draft.clone(), confirmed.clone(), new_draft.clone()];
        docs.sort_by(listing_order);
        assert_eq!(docs[0].id, new_draft.id);
        assert_eq!(docs[1].id, old_draft.id);
        assert_eq!(docs[2].id, confirmed.id);
    }
}
