use anyhow::Context;
use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;
use crate::stock::{load_stock, StockEntry};

pub async fn list_flowers_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockEntry>>, ApiError> {
    let stock = load_stock(&state.config.stock_file)
        .await
        .context("Failed to read flower stock")?;
    Ok(Json(stock))
}
