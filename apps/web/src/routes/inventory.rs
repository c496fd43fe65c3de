//! Inventory listing.

use axum::{extract::State, Json};

use basket_core::InventoryRecord;

use crate::error::Result;
use crate::state::AppState;

/// `GET /inventory`
///
/// Every record, ordered by name.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<InventoryRecord>>> {
    let records = state.db().inventory().list().await?;
    Ok(Json(records))
}
