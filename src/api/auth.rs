use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{Role, Session};
use crate::error::ApiError;
use crate::navigation::{self, MenuItem, Page};

/// Request body for `POST /api/login`. Every field is optional on the wire so
/// that missing fields surface as a validation error rather than a parse
/// failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    authenticated: bool,
    user: Option<Session>,
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    role: Role,
    items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Serialize)]
pub struct ResolvedPage {
    page: Page,
    path: &'static str,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let Json(req) = payload?;
    let role = req.role.as_deref().and_then(Role::parse);
    let session = state
        .sessions
        .login(
            req.identifier.as_deref().unwrap_or_default(),
            req.secret.as_deref().unwrap_or_default(),
            role,
        )
        .await?;
    Ok(Json(session))
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.sessions.logout().await;
    StatusCode::NO_CONTENT
}

/// GET /api/session
pub async fn session_status(State(state): State<AppState>) -> Json<SessionStatus> {
    let user = state.sessions.current();
    Json(SessionStatus {
        authenticated: user.is_some(),
        user,
    })
}

/// GET /api/navigation
pub async fn navigation(Extension(session): Extension<Session>) -> Json<NavigationResponse> {
    Json(NavigationResponse {
        role: session.role,
        items: navigation::menu(session.role),
    })
}

/// GET /api/navigation/resolve?path=/students - where the current role lands
/// for a requested path.
pub async fn resolve_page(
    Extension(session): Extension<Session>,
    Query(query): Query<ResolveQuery>,
) -> Json<ResolvedPage> {
    let page = navigation::resolve(session.role, &query.path);
    Json(ResolvedPage {
        page,
        path: page.path(),
    })
}
