//! # basket-core: Pure Business Logic for Basket
//!
//! This crate is the **heart** of Basket. It holds the domain types, the cart
//! model, and the checkout processor. Storage is reached only through the
//! [`inventory::InventoryStore`] trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Basket Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/web (axum)                              │   │
//! │  │    cart view ──► add item ──► confirm ──► redirect + message    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ basket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │ checkout  │  │ inventory │  │   │
//! │  │   │ LineItem  │  │   Cart    │  │ Processor │  │   trait   │  │   │
//! │  │   │ Inventory │  │  payload  │  │  Outcome  │  │  memory   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    basket-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, InventoryStore impl        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CartLineItem, InventoryRecord, StockChange)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`cart`] - Cart model and the serialized cart payload
//! - [`inventory`] - Storage seam and an in-memory implementation
//! - [`checkout`] - The checkout / stock-decrement processor
//!
//! ## Example Usage
//!
//! ```rust
//! use basket_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.cents(), 3297);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod inventory;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use checkout::{CheckoutFailure, CheckoutOutcome, CheckoutProcessor, CheckoutReceipt, CommitPolicy};
pub use error::{CheckoutError, CoreError, StoreError, ValidationError};
pub use inventory::{InventoryStore, MemoryInventory};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted unit price, in cents ($1,000,000.00).
///
/// With [`MAX_ITEM_QUANTITY`] and [`MAX_CART_ITEMS`] this keeps any cart
/// subtotal well inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Owner recorded on cart lines when no user is known.
pub const ANONYMOUS_USER_ID: &str = "anonymous";

/// Default bound on re-validation attempts after a version conflict.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;
