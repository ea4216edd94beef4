//! Error taxonomy shared by the session store, the conversation log and the
//! HTTP surface.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures of the durable key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage content is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of [`crate::auth::SessionStore::login`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed input: a missing field or an identifier without `@`.
    #[error("{0}")]
    Validation(String),
    /// Well-formed input that does not match the directory. The message never
    /// says whether the identifier or the secret was wrong.
    #[error("Invalid email or password for this role")]
    Authentication,
    /// The session could not be persisted, so nothing became current.
    #[error("could not persist session")]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub(crate) fn missing_fields() -> Self {
        Self::Validation("All fields are required".to_string())
    }

    pub(crate) fn invalid_identifier() -> Self {
        Self::Validation("Invalid email address".to_string())
    }
}

/// Failures of the conversation log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// A reply is already being produced for this conversation.
    #[error("A reply is already pending for this conversation")]
    Busy,
}

/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The body was not JSON or did not fit the request shape.
    #[error("Malformed request body")]
    MalformedBody(#[from] JsonRejection),
    #[error("{0}")]
    Unprocessable(String),
    #[error("Not signed in")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::Validation(_)) | Self::Unprocessable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Auth(AuthError::Authentication) | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(AuthError::Storage(_)) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MalformedBody(rejection) => rejection.status(),
            Self::Chat(ChatError::Busy) => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(name: "api.error", error = ?self, "request failed");
        } else if let Self::MalformedBody(rejection) = &self {
            tracing::debug!(name: "api.malformed_body", reason = %rejection.body_text(), "request rejected");
        }
        let message = if status.is_server_error() {
            "Something went wrong, please try again".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
