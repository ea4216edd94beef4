//! HTTP handlers.

pub mod auth;
pub mod chat;
pub mod middleware;
pub mod preferences;
pub mod sse;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::AppState;

/// All `/api` routes. Conversation and navigation routes require a signed-in
/// user.
pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/navigation", get(auth::navigation))
        .route("/navigation/resolve", get(auth::resolve_page))
        .route(
            "/conversations",
            post(chat::create_conversation).get(chat::list_conversations),
        )
        .route("/conversations/{id}", delete(chat::delete_conversation))
        .route(
            "/conversations/{id}/messages",
            post(chat::post_message)
                .get(chat::get_messages)
                .delete(chat::clear_messages),
        )
        .route("/conversations/{id}/stream", get(chat::stream_conversation))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::require_session,
        ));

    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session_status))
        .route("/preferences/theme", get(preferences::get_theme))
        .route("/preferences/theme/toggle", post(preferences::toggle_theme))
        .merge(protected)
}
