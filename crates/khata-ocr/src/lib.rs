//! # khata-ocr
//!
//! Receipt intake for business accounts: the [`TextExtractor`] boundary
//! that hides the OCR engine, the field heuristics that turn raw text
//! into suggestions, and the [`ScannedDocument`] DRAFT → CONFIRMED
//! lifecycle that feeds the ledger.
//!
//! The heuristics are deliberately simple and best-effort; a document
//! is always created, and the user corrects the suggestions at
//! confirmation time.

#![deny(missing_docs)]

pub mod document;
pub mod extract;
pub mod extractor;

pub use document::{
    listing_order, Confirmation, DocumentError, DocumentStatus, ScannedDocument,
};
pub use extract::{extract_amount, extract_date, extract_merchant, extract_receipt, ReceiptFields};
pub use extractor::{FixtureExtractor, NoopExtractor, TextExtractor};
