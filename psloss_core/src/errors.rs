//! # Error Types
//!
//! Structured error types for psloss_core. Errors carry enough context
//! (field, point of interest, interval, duct) to identify the offending input
//! without re-running the computation.
//!
//! Configuration problems (unknown specification entry or code edition) are
//! never returned as errors. They are reported to the
//! [`StatusSink`](crate::status::StatusSink) and the computation falls back to
//! a default method.
//!
//! ## Example
//!
//! ```rust
//! use psloss_core::errors::{LossError, LossResult};
//!
//! fn validate_humidity(rh: f64) -> LossResult<()> {
//!     if !(0.0..=100.0).contains(&rh) {
//!         return Err(LossError::invalid_input(
//!             "relative_humidity",
//!             rh.to_string(),
//!             "Relative humidity must be between 0 and 100 percent",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for psloss_core operations
pub type LossResult<T> = Result<T, LossError>;

/// Structured error type for loss computations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum LossError {
    /// An input value is invalid (out of range, inconsistent, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The section property provider has no properties for a required part
    #[error("Missing section properties for {part} at POI {poi} in interval {interval}")]
    MissingSectionProperties {
        poi: u32,
        interval: usize,
        part: String,
    },

    /// A duct definition cannot be used (bad profile, bad friction data)
    #[error("Malformed duct '{duct}': {reason}")]
    MalformedDuct { duct: String, reason: String },

    /// Named specification entry is not in the library
    #[error("Specification entry not found: {name}")]
    SpecEntryNotFound { name: String },

    /// The section strain solve for an interval failed
    #[error("Strain solve failed at POI {poi} in interval {interval}: {reason}")]
    SolveFailed {
        poi: u32,
        interval: usize,
        reason: String,
    },

    /// The caller cancelled the computation between girders
    #[error("Computation cancelled")]
    Cancelled,

    /// Requested results have not been computed
    #[error("Not available: {what}")]
    NotAvailable { what: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LossError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        LossError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        LossError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MissingSectionProperties error
    pub fn missing_section(poi: u32, interval: usize, part: impl Into<String>) -> Self {
        LossError::MissingSectionProperties {
            poi,
            interval,
            part: part.into(),
        }
    }

    /// Create a MalformedDuct error
    pub fn malformed_duct(duct: impl Into<String>, reason: impl Into<String>) -> Self {
        LossError::MalformedDuct {
            duct: duct.into(),
            reason: reason.into(),
        }
    }

    /// Create a SolveFailed error
    pub fn solve_failed(poi: u32, interval: usize, reason: impl Into<String>) -> Self {
        LossError::SolveFailed {
            poi,
            interval,
            reason: reason.into(),
        }
    }

    /// Create a NotAvailable error
    pub fn not_available(what: impl Into<String>) -> Self {
        LossError::NotAvailable { what: what.into() }
    }

    /// Configuration-level problems the caller can fix and retry without
    /// touching the bridge description.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LossError::SpecEntryNotFound { .. } | LossError::Cancelled | LossError::NotAvailable { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            LossError::InvalidInput { .. } => "INVALID_INPUT",
            LossError::MissingField { .. } => "MISSING_FIELD",
            LossError::MissingSectionProperties { .. } => "MISSING_SECTION_PROPERTIES",
            LossError::MalformedDuct { .. } => "MALFORMED_DUCT",
            LossError::SpecEntryNotFound { .. } => "SPEC_ENTRY_NOT_FOUND",
            LossError::SolveFailed { .. } => "SOLVE_FAILED",
            LossError::Cancelled => "CANCELLED",
            LossError::NotAvailable { .. } => "NOT_AVAILABLE",
            LossError::SerializationError { .. } => "SERIALIZATION_ERROR",
            LossError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for LossError {
    fn from(err: serde_json::Error) -> Self {
        LossError::SerializationError {
            reason: err.to_string(),
        }
    }
}
