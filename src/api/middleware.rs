use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::error::ApiError;

/// Reject requests while nobody is signed in; otherwise expose the current
/// [`crate::auth::Session`] as a request extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(session) = state.sessions.current() else {
        return Err(ApiError::Unauthorized);
    };
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
