use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    dark_mode: bool,
}

/// GET /api/preferences/theme
pub async fn get_theme(State(state): State<AppState>) -> Result<Json<ThemeResponse>, ApiError> {
    let dark_mode = state.theme.is_dark_mode().await?;
    Ok(Json(ThemeResponse { dark_mode }))
}

/// POST /api/preferences/theme/toggle
pub async fn toggle_theme(State(state): State<AppState>) -> Result<Json<ThemeResponse>, ApiError> {
    let dark_mode = state.theme.toggle().await?;
    Ok(Json(ThemeResponse { dark_mode }))
}
