#![deny(missing_docs)]

//! # khata-core — Foundational Types for the Khata Ledger Backend
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `thiserror`,
//! `rust_decimal`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Exact decimal money.** Every monetary amount in the stack is a
//!    [`rust_decimal::Decimal`]. Floats never touch money — accumulation
//!    across a ledger must be free of binary-representation drift.
//!
//! 2. **Half-up rounding at two decimal places.** [`money::quantize`] is
//!    the single rounding path. Extraction heuristics, confirmation input,
//!    and balance output all flow through it.
//!
//! 3. **Structured validation errors.** [`ValidationError`] carries the
//!    offending field so API layers can report field-level problems without
//!    reconstructing context.

pub mod error;
pub mod money;

pub use error::ValidationError;
pub use money::{quantize, validate_amount};
