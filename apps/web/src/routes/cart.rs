//! Cart route handlers.
//!
//! Every cart write answers with a `303 See Other` back to the cart view, so
//! a client that follows redirects always lands on fresh state. The checkout
//! result reaches the shopper as the one-shot `statusMessage` of that view.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use basket_core::cart::CartTotals;
use basket_core::checkout::NavTarget;
use basket_core::validation::validate_item_name;
use basket_core::{Cart, CartLineItem};

use crate::error::{AppError, Result};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Response to `POST /carts`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCart {
    pub cart_id: Uuid,
}

/// One cart line as shown to the shopper.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub item_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_price: String,
    pub line_total_cents: i64,
}

impl From<&CartLineItem> for CartLineView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            unit_price: line.unit_price().to_string(),
            line_total_cents: line.line_total().cents(),
        }
    }
}

/// The cart view.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: Uuid,
    pub items: Vec<CartLineView>,
    pub totals: CartTotals,
    pub subtotal: String,
    pub status_message: Option<String>,
}

impl CartView {
    fn new(cart_id: Uuid, cart: &Cart, status_message: Option<String>) -> Self {
        Self {
            cart_id,
            items: cart.items().iter().map(CartLineView::from).collect(),
            totals: CartTotals::from(cart),
            subtotal: cart.subtotal().to_string(),
            status_message,
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub item_name: String,
    pub quantity: i64,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub item_name: String,
    /// Zero removes the line.
    pub quantity: i64,
}

fn redirect_to(target: NavTarget, cart_id: Uuid) -> Redirect {
    match target {
        NavTarget::CartIndex => Redirect::to(&format!("/carts/{}", cart_id)),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /carts`
pub async fn create(State(state): State<AppState>) -> (StatusCode, Json<CreatedCart>) {
    let cart_id = state.carts().create().await;
    info!(cart_id = %cart_id, "Cart session created");
    (StatusCode::CREATED, Json(CreatedCart { cart_id }))
}

/// `GET /carts/{id}`
///
/// Unknown or expired ids show an empty cart.
pub async fn show(State(state): State<AppState>, Path(cart_id): Path<Uuid>) -> Json<CartView> {
    let Some(handle) = state.carts().get(&cart_id).await else {
        return Json(CartView::new(cart_id, &Cart::new(), None));
    };

    let mut session = handle.lock().await;
    let status_message = session.take_flash();
    let cart = session.cart().unwrap_or_else(|e| {
        warn!(cart_id = %cart_id, error = %e, "Unreadable cart payload");
        Cart::new()
    });

    Json(CartView::new(cart_id, &cart, status_message))
}

/// `DELETE /carts/{id}`
pub async fn discard(State(state): State<AppState>, Path(cart_id): Path<Uuid>) -> StatusCode {
    state.carts().remove(&cart_id).await;
    StatusCode::NO_CONTENT
}

/// `POST /carts/{id}/items`
///
/// Copies the item's current price into the cart; repeated adds merge.
pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(req): Json<AddItemRequest>,
) -> Result<Redirect> {
    validate_item_name(&req.item_name)?;

    let record = state
        .db()
        .inventory()
        .find_by_name(&req.item_name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {}", req.item_name)))?;

    let user_id = req
        .user_id
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| state.config().default_user_id.clone());

    let handle = state.carts().get_or_create(cart_id).await;
    let mut session = handle.lock().await;
    let mut cart = session.cart()?;
    cart.add_item(&record, req.quantity, &user_id)?;
    session.store_cart(&cart)?;

    info!(
        cart_id = %cart_id,
        item = %record.name,
        quantity = req.quantity,
        "Item added to cart"
    );
    Ok(redirect_to(NavTarget::CartIndex, cart_id))
}

/// `PUT /carts/{id}/items`
pub async fn update_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Redirect> {
    let handle = state
        .carts()
        .get(&cart_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Cart {}", cart_id)))?;

    let mut session = handle.lock().await;
    let mut cart = session.cart()?;
    cart.update_quantity(&req.item_name, req.quantity)?;
    session.store_cart(&cart)?;

    Ok(redirect_to(NavTarget::CartIndex, cart_id))
}

/// `POST /carts/{id}/confirm`
///
/// Always redirects; failures surface as the cart view's status message.
pub async fn confirm(State(state): State<AppState>, Path(cart_id): Path<Uuid>) -> Redirect {
    let handle = state.carts().get_or_create(cart_id).await;
    let mut session = handle.lock().await;

    let result = state
        .checkout()
        .confirm_payload(session.payload.as_deref())
        .await;

    match &result {
        Ok(receipt) => info!(
            cart_id = %cart_id,
            lines = receipt.changes.len(),
            "Cart checked out"
        ),
        Err(failure) => info!(
            cart_id = %cart_id,
            reason = %failure.error,
            applied = failure.applied.len(),
            "Cart checkout failed"
        ),
    }

    let outcome = session.finish_checkout(&result);
    redirect_to(outcome.redirect, cart_id)
}

/// `POST /carts/{id}/cancel`
///
/// Leaves the cart as it is and returns to the inventory listing.
pub async fn cancel(Path(cart_id): Path<Uuid>) -> Redirect {
    info!(cart_id = %cart_id, "Checkout cancelled");
    Redirect::to("/inventory")
}
