//! # Error Types
//!
//! Domain-specific error types for basket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  basket-core errors (this file)                                        │
//! │  ├── CoreError        - Cart and payload errors                        │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── StoreError       - What an InventoryStore reports                 │
//! │  └── CheckoutError    - The four checkout outcomes a user can see      │
//! │                                                                         │
//! │  basket-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  web errors (in app)                                                   │
//! │  └── AppError         - HTTP status + message                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart model and payload errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Line is not in the cart.
    #[error("Item {0} is not in the cart")]
    ItemNotInCart(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// The serialized cart could not be read or written.
    #[error("Cart payload is malformed: {0}")]
    MalformedPayload(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::MalformedPayload(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by an [`InventoryStore`](crate::inventory::InventoryStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The record changed since it was read (version mismatch).
    #[error("Inventory record {name} changed since version {expected_version}")]
    Conflict { name: String, expected_version: i64 },

    /// The record to write does not exist.
    #[error("Inventory record not found: {0}")]
    NotFound(String),

    /// Anything else the backend failed at.
    #[error("Inventory store failure: {0}")]
    Backend(String),
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Why a checkout did not complete.
///
/// ## User Workflow
/// ```text
/// Confirm cart
///      │
///      ├── no cart payload ─────────► CartMissing
///      ├── name not in inventory ───► ItemNotFound("Widget")
///      ├── quantity > on hand ──────► InsufficientStock { "Widget", 2, 5 }
///      ├── store / payload fault ───► UnexpectedFailure(detail)
///      │
///      ▼
/// Redirect to cart view with user_message()
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cart payload is absent or empty.
    #[error("Cart is missing or empty")]
    CartMissing,

    /// No inventory record carries this exact name.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// The line asks for more than is on hand.
    #[error("Insufficient stock for {item_name}: available {available}, requested {requested}")]
    InsufficientStock {
        item_name: String,
        available: i64,
        requested: i64,
    },

    /// Persistence, deserialization, or payload validation fault.
    /// The detail is for logs only.
    #[error("Unexpected checkout failure: {0}")]
    UnexpectedFailure(String),
}

impl CheckoutError {
    /// Message shown to the shopper. Never contains internal detail.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::CartMissing => "Cart items not found.".to_string(),
            CheckoutError::ItemNotFound(name) => format!("Item {} not found.", name),
            CheckoutError::InsufficientStock { item_name, .. } => {
                format!("Not enough stock for {}.", item_name)
            }
            CheckoutError::UnexpectedFailure(_) => {
                "An error occurred while processing your request.".to_string()
            }
        }
    }
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        CheckoutError::UnexpectedFailure(err.to_string())
    }
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        CheckoutError::UnexpectedFailure(err.to_string())
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CheckoutError::InsufficientStock {
            item_name: "Widget".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Widget: available 2, requested 5"
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(CheckoutError::CartMissing.user_message(), "Cart items not found.");
        assert_eq!(
            CheckoutError::ItemNotFound("Gizmo".to_string()).user_message(),
            "Item Gizmo not found."
        );
        assert_eq!(
            CheckoutError::InsufficientStock {
                item_name: "Widget".to_string(),
                available: 2,
                requested: 5,
            }
            .user_message(),
            "Not enough stock for Widget."
        );
    }

    #[test]
    fn test_unexpected_failure_hides_detail() {
        let err: CheckoutError = StoreError::Backend("disk I/O error".to_string()).into();
        assert!(err.to_string().contains("disk I/O error"));
        assert_eq!(
            err.user_message(),
            "An error occurred while processing your request."
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "item name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
