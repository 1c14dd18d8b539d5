//! # khata-account — Account Aggregate & KYC Reconciliation
//!
//! Models a tenant account together with its (at most one) payment record
//! and (at most one) KYC record, the business-status state machine, and the
//! two privileged review actions.
//!
//! ## Business-status state machine
//!
//! ```text
//! PAYMENT_PENDING ──(payment submitted)──▶ KYC_PENDING
//!       KYC_PENDING ──(KYC submitted)────▶ UNDER_REVIEW
//!       UNDER_REVIEW ──(reviewer approves)▶ APPROVED
//!       UNDER_REVIEW ──(reviewer rejects)─▶ REJECTED
//!       REJECTED ──(KYC resubmitted)──────▶ UNDER_REVIEW
//! ```
//!
//! APPROVED and REJECTED are soft-terminal: only explicit review actions
//! re-enter them, never the reconciler.
//!
//! ## Aggregate layout
//!
//! The payment and KYC records are embedded in [`Account`] rather than
//! stored alongside it. The account is the unit of concurrency control —
//! a single write lock on the account record covers every invariant that
//! spans account status and KYC approval, which is what makes the
//! approve/reject race impossible to half-apply.
//!
//! ## Design Decision
//!
//! KYC review state is a tagged enum ([`ReviewState`]) rather than an
//! `is_approved` flag plus free-floating `reviewed_by`/`reviewed_at`/
//! `rejection_reason` columns. An approved record carrying a rejection
//! reason is unrepresentable.

pub mod account;
pub mod kyc;
pub mod payment;
pub mod reconcile;
pub mod review;
pub mod status;

pub use account::{Account, AccountError};
pub use kyc::{KycProfile, KycRecord, ReviewState};
pub use payment::{PaymentRecord, PaymentSubmission};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use review::{approve, reject, ReviewError, DEFAULT_REJECTION_REASON};
pub use status::{AccountType, BusinessStatus, KycStatus};
