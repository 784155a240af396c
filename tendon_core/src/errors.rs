//! # Error Types
//!
//! Structured error types for tendon_core. Every failure a design run can
//! hit is reported through [`TendonError`]; none of them is process-fatal,
//! so a batch of moment cases keeps going when one case has no solution.
//!
//! ## Example
//!
//! ```rust
//! use tendon_core::errors::{TendonError, TendonResult};
//!
//! fn validate_width(width_m: f64) -> TendonResult<()> {
//!     if width_m <= 0.0 {
//!         return Err(TendonError::invalid_input(
//!             "placement_width_m",
//!             width_m.to_string(),
//!             "Placement width must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_width(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::envelope::Side;

/// Result type alias for tendon_core operations
pub type TendonResult<T> = Result<T, TendonError>;

/// Structured error type for envelope and layout operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum TendonError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A controlled-fiber selector that is neither top nor bottom
    #[error("Invalid side selector '{value}': expected top or bottom")]
    InvalidSideSelector { value: String },

    /// No seed position on the controlled side yields a non-empty force range
    #[error("No feasible seed eccentricity on the {side} side (gave up at e = {last_eccentricity:.3} m)")]
    InfeasibleSeedEccentricity { side: Side, last_eccentricity: f64 },

    /// The growth loop ran out of rows or strands without converging
    #[error("Tendon layout not found: {reason} (rows = {rows}, strands per group = {strands_per_group})")]
    LayoutNotFound {
        reason: String,
        rows: usize,
        strands_per_group: i32,
    },

    /// The inverse scan found no position admitting the target force
    #[error("No admissible eccentricity for {force_kn:.0} kN after {trials} trial positions")]
    NoAdmissibleEccentricity { force_kn: f64, trials: usize },

    /// An envelope query outside the sampled eccentricity domain (strict mode)
    #[error("Eccentricity {eccentricity:.4} m outside envelope domain [{min:.4}, {max:.4}]")]
    EnvelopeDomainViolation { eccentricity: f64, min: f64, max: f64 },

    /// Calculation failed (section too small, degenerate arithmetic, etc.)
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl TendonError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        TendonError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a LayoutNotFound error
    pub fn layout_not_found(reason: impl Into<String>, rows: usize, strands_per_group: i32) -> Self {
        TendonError::LayoutNotFound {
            reason: reason.into(),
            rows,
            strands_per_group,
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        TendonError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// True when the inputs were valid but no design satisfies them.
    ///
    /// Callers can use this to tell "try a different section or moment case"
    /// apart from "fix the input".
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            TendonError::InfeasibleSeedEccentricity { .. }
                | TendonError::LayoutNotFound { .. }
                | TendonError::NoAdmissibleEccentricity { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TendonError::InvalidInput { .. } => "INVALID_INPUT",
            TendonError::InvalidSideSelector { .. } => "INVALID_SIDE_SELECTOR",
            TendonError::InfeasibleSeedEccentricity { .. } => "INFEASIBLE_SEED_ECCENTRICITY",
            TendonError::LayoutNotFound { .. } => "LAYOUT_NOT_FOUND",
            TendonError::NoAdmissibleEccentricity { .. } => "NO_ADMISSIBLE_ECCENTRICITY",
            TendonError::EnvelopeDomainViolation { .. } => "ENVELOPE_DOMAIN_VIOLATION",
            TendonError::CalculationFailed { .. } => "CALCULATION_FAILED",
            TendonError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for TendonError {
    fn from(err: serde_json::Error) -> Self {
        TendonError::SerializationError {
            reason: err.to_string(),
        }
    }
}
