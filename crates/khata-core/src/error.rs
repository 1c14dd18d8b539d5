//! # Shared Validation Errors
//!
//! Field-level validation failures reported by domain crates, built with
//! `thiserror`.
//!
//! Each variant names the field that failed so the API layer can return a
//! field → message mapping without reconstructing context.

use thiserror::Error;

/// Validation failure for a single input field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was missing or empty.
    #[error("{field} is required")]
    Required {
        /// The field that was missing.
        field: &'static str,
    },

    /// A monetary amount was zero, negative, or carried more than two
    /// decimal places.
    #[error("{field} must be a positive amount with at most two decimal places")]
    InvalidAmount {
        /// The field carrying the bad amount.
        field: &'static str,
    },

    /// A string exceeded its maximum length.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// The field that was too long.
        field: &'static str,
        /// The maximum permitted length.
        max: usize,
    },

    /// A value was not one of the permitted choices.
    #[error("{field} must be one of: {allowed}")]
    InvalidChoice {
        /// The field carrying the bad value.
        field: &'static str,
        /// Comma-separated list of permitted values.
        allowed: &'static str,
    },

    /// A numeric field fell below its minimum.
    #[error("{field} must be at least {min}")]
    BelowMinimum {
        /// The field carrying the bad value.
        field: &'static str,
        /// The smallest permitted value.
        min: u32,
    },
}

impl ValidationError {
    /// The name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::InvalidAmount { field }
            | Self::TooLong { field, .. }
            | Self::InvalidChoice { field, .. }
            | Self::BelowMinimum { field, .. } => field,
        }
    }
}
