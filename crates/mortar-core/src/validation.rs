//! # Validation Module
//!
//! Input validation rules for Mortar.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Backoffice command (Rust)                                    │
//! │  ├── Parse typed text (prices, quantities)                             │
//! │  └── Map failures to VALIDATION_ERROR                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository entry (Rust)                                      │
//! │  └── THIS MODULE: business rules, checked before any write             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE (category name)                                            │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mortar_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("name", "Ciment CPJ 45").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::{CategoryInput, PartyInput, ProductInput};
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a display name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of free-text fields (description, address, notes).
pub const MAX_TEXT_LEN: usize = 1000;

/// Maximum length of a phone number or email address.
pub const MAX_CONTACT_LEN: usize = 100;

/// Maximum length of a search term.
pub const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use mortar_core::validation::validate_name;
///
/// assert!(validate_name("name", "Brique creuse 12").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional text field against a maximum length.
pub fn validate_text_len(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates an optional email address.
///
/// Only the shape `local@domain` is checked; empty values are accepted
/// since contact fields are optional.
///
/// ## Example
/// ```rust
/// use mortar_core::validation::validate_email;
///
/// assert!(validate_email(Some("achats@chantier.dz")).is_ok());
/// assert!(validate_email(None).is_ok());
/// assert!(validate_email(Some("chantier.dz")).is_err());
/// ```
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    validate_text_len("email", Some(email), MAX_CONTACT_LEN)?;

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };

    if !well_formed || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum [`MAX_QUERY_LEN`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Trims an optional text value, collapsing blank strings to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (samples, promotional stock)
///
/// ## Example
/// ```rust
/// use mortar_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("sale price", 15_000).is_ok());
/// assert!(validate_price_cents("sale price", 0).is_ok());
/// assert!(validate_price_cents("sale price", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stored stock level or threshold (>= 0).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Parses a whole number typed by a user (quantities, thresholds, deltas).
///
/// ## Example
/// ```rust
/// use mortar_core::validation::parse_integer;
///
/// assert_eq!(parse_integer("quantity", " 12 ").unwrap(), 12);
/// assert_eq!(parse_integer("delta", "-3").unwrap(), -3);
/// assert!(parse_integer("quantity", "12.5").is_err());
/// ```
pub fn parse_integer(field: &str, input: &str) -> ValidationResult<i64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    input.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a whole number".to_string(),
    })
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates an inclusive calendar-day window.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if start > end {
        return Err(ValidationError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    Ok(())
}

/// Validates a calendar month number.
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

// =============================================================================
// Input Validators
// =============================================================================

/// Validates a category before insert or update.
pub fn validate_category(input: &CategoryInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_text_len("description", input.description.as_deref(), MAX_TEXT_LEN)
}

/// Validates a product before insert or update.
pub fn validate_product(input: &ProductInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_text_len("description", input.description.as_deref(), MAX_TEXT_LEN)?;
    validate_price_cents("purchase price", input.purchase_price_cents)?;
    validate_price_cents("sale price", input.sale_price_cents)?;
    validate_non_negative("quantity", input.quantity)?;
    if let Some(threshold) = input.reorder_threshold {
        validate_non_negative("reorder threshold", threshold)?;
    }
    Ok(())
}

/// Validates a client or supplier before insert or update.
pub fn validate_party(input: &PartyInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_text_len("address", input.address.as_deref(), MAX_TEXT_LEN)?;
    validate_text_len("phone", input.phone.as_deref(), MAX_CONTACT_LEN)?;
    validate_email(input.email.as_deref())?;
    validate_text_len("notes", input.notes.as_deref(), MAX_TEXT_LEN)
}

// =============================================================================
// Unit Tests
// =============================================================================
