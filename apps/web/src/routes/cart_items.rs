//! Persisted cart item handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use basket_core::validation::validate_line_input;
use basket_core::{CartLineInput, CartLineItem};

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub id: i64,
    pub user_id: String,
    pub item_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

impl From<CartLineItem> for CartItemResponse {
    fn from(item: CartLineItem) -> Self {
        let line_total_cents = item.line_total().cents();
        Self {
            id: item.id,
            user_id: item.user_id,
            item_name: item.item_name,
            unit_price_cents: item.unit_price_cents,
            quantity: item.quantity,
            line_total_cents,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<String>,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("CartItem {}", id))
}

/// `GET /cart-items`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CartItemResponse>>> {
    let repo = state.db().cart_items();
    let items = match query.user_id {
        Some(user_id) => repo.list_for_user(&user_id).await?,
        None => repo.list().await?,
    };

    Ok(Json(items.into_iter().map(CartItemResponse::from).collect()))
}

/// `POST /cart-items`
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CartLineInput>,
) -> Result<(StatusCode, Json<CartItemResponse>)> {
    validate_line_input(&input)?;

    let user_id = input
        .user_id
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| state.config().default_user_id.clone());

    let item = CartLineItem {
        id: 0,
        user_id,
        item_name: input.item_name,
        unit_price_cents: input.unit_price_cents,
        quantity: input.quantity,
    };
    let created = state.db().cart_items().insert(&item).await?;

    info!(id = created.id, item = %created.item_name, "Cart item created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// `GET /cart-items/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CartItemResponse>> {
    let item = state
        .db()
        .cart_items()
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(item.into()))
}

/// `PUT /cart-items/{id}`
///
/// Replaces the line's fields. An omitted `userId` keeps the current owner.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CartLineInput>,
) -> Result<Json<CartItemResponse>> {
    validate_line_input(&input)?;

    let repo = state.db().cart_items();
    let existing = repo.get_by_id(id).await?.ok_or_else(|| not_found(id))?;

    let item = CartLineItem {
        id,
        user_id: input
            .user_id
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(existing.user_id),
        item_name: input.item_name,
        unit_price_cents: input.unit_price_cents,
        quantity: input.quantity,
    };
    repo.update(&item).await?;

    info!(id, item = %item.item_name, "Cart item updated");
    Ok(Json(item.into()))
}

/// `DELETE /cart-items/{id}`
///
/// Answers 204 whether or not the row existed.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    let removed = state.db().cart_items().delete(id).await?;
    info!(id, removed, "Cart item delete");
    Ok(StatusCode::NO_CONTENT)
}
