//! Catalogue proxy. Reads never fail: an unreachable restaurant API gives
//! an empty list.

use axum::extract::{Path, State};
use axum::Json;
use meja_core::validation::validate_store_code;
use serde_json::Value;

use crate::error::ApiResult;
use crate::state::SharedState;

pub async fn menus(
    State(state): State<SharedState>,
    Path(store): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    validate_store_code(&store)?;
    Ok(Json(state.upstream.fetch_menus(&store).await))
}

pub async fn categories(
    State(state): State<SharedState>,
    Path(store): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    validate_store_code(&store)?;
    Ok(Json(state.upstream.fetch_categories(&store).await))
}
