//! # Error Types
//!
//! Domain-specific error types for mortar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mortar-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mortar-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures, conflicts, wraps CoreError   │
//! │                                                                         │
//! │  backoffice errors (app)                                               │
//! │  └── ApiError         - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI message   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors are raised before any mutation begins, so reporting one
/// never implies a partially applied transaction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Sale lines ask for more units than are on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// New sale: 5 × Ciment CPJ 45
    ///      │
    ///      ▼
    /// Check stock (state before the sale): available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Ciment CPJ 45", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows the message, nothing was written
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A manual stock adjustment would leave a negative quantity.
    #[error("Adjusting stock of {product} by {delta} would leave {resulting} units")]
    NegativeStock {
        product: String,
        delta: i64,
        resulting: i64,
    },

    /// A sale or purchase was submitted without lines.
    #[error("A {kind} needs at least one line")]
    EmptyTransaction { kind: &'static str },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., non-numeric price, invalid UUID, bad email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A date window whose start is after its end.
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: String, end: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
