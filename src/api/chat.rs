use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use super::sse::build_sse_response;
use crate::AppState;
use crate::chat::{ConversationEvent, Message};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedConversation {
    id: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationList {
    ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    messages: Vec<Message>,
    awaiting_reply: bool,
}

/// POST /api/conversations - open a conversation under a fresh id.
pub async fn create_conversation(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreatedConversation>) {
    let log = state.conversations.create();
    (
        StatusCode::CREATED,
        Json(CreatedConversation {
            id: log.id().to_string(),
        }),
    )
}

/// GET /api/conversations
pub async fn list_conversations(State(state): State<AppState>) -> Json<ConversationList> {
    let mut ids = state.conversations.list_ids();
    ids.sort();
    Json(ConversationList { ids })
}

/// DELETE /api/conversations/{id} - drop the conversation and its transcript.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .conversations
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}

/// POST /api/conversations/{id}/messages - append the user message and
/// schedule the assistant reply, which arrives on the stream. An unknown id
/// opens a conversation under that id.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let Json(req) = payload?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::Unprocessable("Message content is required".to_string()));
    }

    let log = state.conversations.get_or_create(&id);
    let pending = log.request_reply(content, Arc::clone(&state.responder))?;
    Ok((StatusCode::ACCEPTED, Json(pending.user_message().clone())))
}

/// GET /api/conversations/{id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Transcript> {
    let transcript = match state.conversations.get(&id) {
        Some(log) => Transcript {
            messages: log.messages(),
            awaiting_reply: log.is_awaiting_reply(),
        },
        None => Transcript {
            messages: Vec::new(),
            awaiting_reply: false,
        },
    };
    Json(transcript)
}

/// DELETE /api/conversations/{id}/messages
pub async fn clear_messages(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if let Some(log) = state.conversations.get(&id) {
        log.clear();
    }
    StatusCode::NO_CONTENT
}

/// GET /api/conversations/{id}/stream - conversation events as SSE.
pub async fn stream_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let rx = state
        .conversations
        .get(&id)
        .ok_or(ApiError::NotFound)?
        .subscribe();

    // lagged receivers skip what they missed
    let stream =
        BroadcastStream::new(rx).filter_map(|res: Result<ConversationEvent, _>| res.ok());

    Ok(build_sse_response(stream))
}
