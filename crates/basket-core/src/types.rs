//! # Domain Types
//!
//! Core domain types used throughout Basket.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CartLineItem   │   │ InventoryRecord │   │   StockChange   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  item_name      │       │
//! │  │  user_id        │   │  name (unique)  │   │  before         │       │
//! │  │  item_name ─────┼──►│  quantity       │   │  after          │       │
//! │  │  unit_price     │   │  unit_price     │   └─────────────────┘       │
//! │  │  quantity       │   │  version (CAS)  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A cart line copies the item name and unit price from the inventory record
//! when it is added, so later price edits do not change an open cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Cart Line Item
// =============================================================================

/// One line of a shopper's cart.
///
/// ## Payload Shape
/// Serialized with PascalCase keys. `Id`, `UserId` and `PriceCents` may be
/// omitted; a minimal line is `{"ItemName": "Widget", "Quantity": 3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "PascalCase")]
pub struct CartLineItem {
    /// Row key for persisted cart items; 0 for lines that live only in a cart.
    #[serde(default)]
    pub id: i64,

    /// Owning user.
    #[serde(default)]
    pub user_id: String,

    /// Inventory name this line draws from (exact, case-sensitive).
    pub item_name: String,

    /// Unit price in cents at time of adding (frozen).
    #[serde(default, rename = "PriceCents")]
    pub unit_price_cents: i64,

    /// Units requested.
    pub quantity: i64,
}

impl CartLineItem {
    /// Creates a transient line for `item_name`.
    pub fn new(
        user_id: impl Into<String>,
        item_name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        CartLineItem {
            id: 0,
            user_id: user_id.into(),
            item_name: item_name.into(),
            unit_price_cents: unit_price.cents(),
            quantity,
        }
    }

    /// Snapshots an inventory record into a cart line.
    pub fn from_record(record: &InventoryRecord, user_id: impl Into<String>, quantity: i64) -> Self {
        CartLineItem::new(user_id, record.name.clone(), record.unit_price(), quantity)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// Fields a client supplies when creating or editing a persisted cart item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    #[serde(default)]
    pub user_id: Option<String>,
    pub item_name: String,
    #[serde(default)]
    pub unit_price_cents: i64,
    pub quantity: i64,
}

// =============================================================================
// Inventory Record
// =============================================================================

/// A stock entry keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Row key.
    pub id: i64,

    /// Unique, case-sensitive name.
    pub name: String,

    /// Units on hand.
    pub quantity: i64,

    /// List price in cents.
    pub unit_price_cents: i64,

    /// Optimistic-concurrency token. Bumped by every successful write.
    pub version: i64,

    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Copy of this record carrying a new quantity and the same version.
    ///
    /// The unchanged version is what makes the following persist a
    /// compare-and-swap against the value that was read.
    pub fn with_quantity(&self, quantity: i64) -> Self {
        InventoryRecord {
            quantity,
            ..self.clone()
        }
    }
}

/// Fields needed to create an inventory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryRecord {
    pub name: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price_cents: i64,
}

// =============================================================================
// Stock Change
// =============================================================================

/// One committed quantity change made by a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub item_name: String,
    pub before: i64,
    pub after: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
