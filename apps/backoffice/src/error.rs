//! # API Error Type
//!
//! Unified error type for back-office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Mortar                                 │
//! │                                                                         │
//! │  UI                          Rust Backend                               │
//! │  ──                          ────────────                               │
//! │                                                                         │
//! │  create_sale(draft)                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage Error? ──── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Rule? ──── CoreError::InsufficientStock ─ ApiError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Feedback::from_result(&result, "Vente enregistrée")                    │
//! │    → { success: false,                                                  │
//! │        message: "Insufficient stock for Ciment: available 3, ..." }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures are logged in full and reach the UI as a generic
//! message. Every other kind carries its own human-readable text.

use serde::Serialize;
use ts_rs::TS;

use mortar_core::{CoreError, ValidationError};
use mortar_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Ciment CPJ 42.5: available 3, requested 5"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// A referenced record does not exist
    NotFound,

    /// Input validation failed, including negative manual adjustments
    ValidationError,

    /// A sale asked for more units than are on hand
    InsufficientStock,

    /// Delete refused because of references, or a duplicate name
    Conflict,

    /// Database operation failed
    DatabaseError,

    /// Anything else (export file I/O, ...)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Domain(core) => ApiError::from(core),
            err @ (DbError::HasDependents { .. } | DbError::UniqueViolation { .. }) => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::Conflict, "Operation refused: record is referenced elsewhere")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            err @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            err @ (CoreError::NegativeStock { .. } | CoreError::EmptyTransaction { .. }) => {
                ApiError::validation(err.to_string())
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// The (success flag, message) pair the UI shows after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Feedback {
    pub success: bool,
    pub message: String,
}

impl Feedback {
    /// Success shows `done`; failure shows the error message verbatim.
    pub fn from_result<T>(result: &Result<T, ApiError>, done: &str) -> Self {
        match result {
            Ok(_) => Feedback {
                success: true,
                message: done.to_string(),
            },
            Err(e) => Feedback {
                success: false,
                message: e.message.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serialization() {
        let err = ApiError::new(ErrorCode::InsufficientStock, "not enough");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"INSUFFICIENT_STOCK","message":"not enough"}"#);
    }

    #[test]
    fn test_db_error_mapping() {
        let err = ApiError::from(DbError::not_found("Product", "p-1"));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: p-1");

        let err = ApiError::from(DbError::has_dependents("category", "c-1", "products"));
        assert_eq!(err.code, ErrorCode::Conflict);

        let err = ApiError::from(DbError::duplicate("category name", "Ciment"));
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.message.contains("Ciment"));
    }

    #[test]
    fn test_storage_errors_are_generic() {
        let err = ApiError::from(DbError::QueryFailed("no such table: products".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("no such table"));
    }

    #[test]
    fn test_domain_error_mapping() {
        let err = ApiError::from(DbError::Domain(CoreError::InsufficientStock {
            product: "Ciment".into(),
            available: 3,
            requested: 5,
        }));
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("available 3"));

        let err = ApiError::from(CoreError::NegativeStock {
            product: "Ciment".into(),
            delta: -5,
            resulting: -2,
        });
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = ApiError::from(DbError::from(ValidationError::Required {
            field: "name".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_feedback_from_result() {
        let ok: Result<(), ApiError> = Ok(());
        assert_eq!(
            Feedback::from_result(&ok, "Produit ajouté"),
            Feedback {
                success: true,
                message: "Produit ajouté".into()
            }
        );

        let failed: Result<(), ApiError> = Err(ApiError::validation("name is required"));
        let feedback = Feedback::from_result(&failed, "Produit ajouté");
        assert!(!feedback.success);
        assert_eq!(feedback.message, "name is required");
    }
}
