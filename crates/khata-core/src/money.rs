//! # Money Handling
//!
//! Exact-decimal monetary helpers. All amounts in the stack are
//! [`Decimal`] values with at most two decimal places; accumulation in the
//! aggregation layer is exact (no binary floating point anywhere).
//!
//! ## Rounding
//!
//! The single rounding rule is half-up at two decimal places: 0.005 rounds
//! away from zero to 0.01. Both the OCR amount heuristic and balance output
//! go through [`quantize`].

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValidationError;

/// Round an amount to two decimal places, half-up.
pub fn quantize(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate that an amount is positive and carries at most two decimal
/// places. The field name is threaded through for field-level reporting.
pub fn validate_amount(amount: Decimal, field: &'static str) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount { field });
    }
    // normalize() strips trailing zeros, so "12.50" (scale 2) and "12.5"
    // (scale 1) both pass while "12.505" does not.
    if amount.normalize().scale() > 2 {
        return Err(ValidationError::InvalidAmount { field });
    }
    Ok(())
}
