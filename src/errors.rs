use crate::models::ErrorResponse;
use axum::{http::StatusCode, Json};
use thiserror::Error;

/// Failure of a record store, service or dataset call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Malformed or out-of-range input, rejected before it reaches a store.
    #[error("{0}")]
    Validation(String),
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    /// Missing, expired or rejected bearer token.
    #[error("authentication required: {0}")]
    Auth(String),
    /// Network or upstream failure talking to the remote API.
    #[error("transport error: {0}")]
    Transport(String),
    /// Local durable cache could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(err: impl std::error::Error) -> Self {
        Self::Storage(err.to_string())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => Self::bad_request(message),
            StoreError::NotFound { resource, .. } => {
                Self::not_found(format!("{resource} not found"))
            }
            StoreError::Auth(message) => Self::unauthorized(message),
            StoreError::Transport(message) => Self {
                status: StatusCode::BAD_GATEWAY,
                message,
            },
            err @ StoreError::Storage(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}
