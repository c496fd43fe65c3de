//! # Cart
//!
//! The shopper's in-progress order and its serialized payload.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Request                   Cart method            Change                │
//! │  ───────                   ───────────            ──────                │
//! │                                                                         │
//! │  POST /carts/{id}/items ─► add_item() ──────────► push or merge line    │
//! │                                                                         │
//! │  (edit quantity) ────────► update_quantity() ───► lines[i].qty = n      │
//! │                                                                         │
//! │  (remove line) ──────────► remove_item() ───────► lines.remove(i)       │
//! │                                                                         │
//! │  GET /carts/{id} ────────► decode_payload() ────► (read only)           │
//! │                                                                         │
//! │  Between requests the cart lives as `to_payload()` JSON.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLineItem, InventoryRecord};
use crate::validation::{validate_cart_size, validate_line, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `item_name` (adding the same item increases quantity)
/// - Quantity must be > 0 (updating to 0 removes the line)
/// - At most [`crate::MAX_CART_ITEMS`] lines, each at most
///   [`MAX_ITEM_QUANTITY`] units
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from lines that were already validated.
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        Cart { items }
    }

    /// Adds an inventory item to the cart or increases its quantity.
    ///
    /// ## Behavior
    /// - If a line with the same name exists: increases quantity
    /// - Otherwise: adds a new line with the record's current price frozen
    pub fn add_item(
        &mut self,
        record: &InventoryRecord,
        quantity: i64,
        user_id: &str,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.items.iter_mut().find(|l| l.item_name == record.name) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: crate::MAX_CART_ITEMS,
        })?;

        self.items
            .push(CartLineItem::from_record(record, user_id, quantity));
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn update_quantity(&mut self, item_name: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_name);
        }

        validate_quantity(quantity)?;

        let line = self
            .items
            .iter_mut()
            .find(|l| l.item_name == item_name)
            .ok_or_else(|| CoreError::ItemNotInCart(item_name.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by item name.
    pub fn remove_item(&mut self, item_name: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|l| l.item_name != item_name);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotInCart(item_name.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // =========================================================================
    // Payload
    // =========================================================================

    /// Serializes the lines as the JSON array carried between requests.
    pub fn to_payload(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Reads a payload back into a cart, validating every line.
    pub fn from_payload(payload: &str) -> CoreResult<Self> {
        Ok(Cart::from_items(decode_payload(payload)?))
    }
}

/// Decodes a cart payload into its ordered lines.
///
/// ## Errors
/// - `MalformedPayload` when the text is not a JSON array of lines
/// - `Validation` when a line has an empty name or a non-positive quantity
pub fn decode_payload(payload: &str) -> CoreResult<Vec<CartLineItem>> {
    let items: Vec<CartLineItem> = serde_json::from_str(payload)?;
    for line in &items {
        validate_line(line)?;
    }
    Ok(items)
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: cart.subtotal().cents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(name: &str, price_cents: i64) -> InventoryRecord {
        InventoryRecord {
            id: 1,
            name: name.to_string(),
            quantity: 50,
            unit_price_cents: price_cents,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        cart.add_item(&record("Widget", 999), 2, "u-1").unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_cart_add_same_item_increases_quantity() {
        let mut cart = Cart::new();
        let widget = record("Widget", 999);

        cart.add_item(&widget, 2, "u-1").unwrap();
        cart.add_item(&widget, 3, "u-1").unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_cart_rejects_quantity_overflow() {
        let mut cart = Cart::new();
        let widget = record("Widget", 100);

        cart.add_item(&widget, 900, "u-1").unwrap();
        let err = cart.add_item(&widget, 100, "u-1").unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.total_quantity(), 900);
    }

    #[test]
    fn test_cart_update_and_remove() {
        let mut cart = Cart::new();
        cart.add_item(&record("Widget", 100), 1, "u-1").unwrap();
        cart.add_item(&record("Gadget", 200), 1, "u-1").unwrap();

        cart.update_quantity("Widget", 4).unwrap();
        assert_eq!(cart.items()[0].quantity, 4);

        cart.update_quantity("Gadget", 0).unwrap();
        assert_eq!(cart.item_count(), 1);

        assert!(matches!(
            cart.remove_item("Gadget"),
            Err(CoreError::ItemNotInCart(_))
        ));
    }

    #[test]
    fn test_payload_round_trip_preserves_order() {
        let mut cart = Cart::new();
        cart.add_item(&record("Widget", 250), 3, "u-1").unwrap();
        cart.add_item(&record("Gadget", 1000), 1, "u-1").unwrap();

        let payload = cart.to_payload().unwrap();
        let restored = Cart::from_payload(&payload).unwrap();

        assert_eq!(restored, cart);
        assert_eq!(restored.items()[0].item_name, "Widget");
        assert_eq!(restored.items()[1].item_name, "Gadget");
    }

    #[test]
    fn test_decode_rejects_garbage_and_bad_lines() {
        assert!(matches!(
            decode_payload("not json"),
            Err(CoreError::MalformedPayload(_))
        ));
        assert!(matches!(
            decode_payload(r#"[{"ItemName":"Widget","Quantity":0}]"#),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            decode_payload(r#"[{"ItemName":"","Quantity":1}]"#),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_decode_accepts_large_quantities() {
        let lines = decode_payload(r#"[{"ItemName":"Widget","Quantity":1000}]"#).unwrap();
        assert_eq!(lines[0].quantity, 1000);
    }

    #[test]
    fn test_totals_from_cart() {
        let mut cart = Cart::new();
        cart.add_item(&record("Widget", 250), 4, "u-1").unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 4);
        assert_eq!(totals.subtotal_cents, 1000);
    }
}
