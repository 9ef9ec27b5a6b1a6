use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::validate::ValidationError;

pub type ServerResult<T> = Result<T, ServerError>;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized Request!";
pub const BOOKMARK_NOT_FOUND_MESSAGE: &str = "Bookmark Not Found.";
pub const DELETE_NOT_FOUND_MESSAGE: &str = "Not Found!";
pub const INVALID_DATA_MESSAGE: &str = "Invalid data";

/// Server error types
///
/// Client errors are rendered directly. Everything that maps to a 500 carries
/// an [`InternalErrorDetail`] extension so the error middleware can log it
/// and decide how much of it the client gets to see.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("malformed request body: {0}")]
    InvalidBody(String),

    #[error("bookmark {0} not found")]
    BookmarkNotFound(String),

    #[error("bookmark {0} not found for deletion")]
    DeleteNotFound(String),

    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// JSON body for the errors that are reported as JSON.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Detail of a 500 response, attached as a response extension.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            // Not-found is a 400 on this API, not a 404.
            ServerError::Validation(_)
            | ServerError::InvalidBody(_)
            | ServerError::BookmarkNotFound(_)
            | ServerError::DeleteNotFound(_) => StatusCode::BAD_REQUEST,
            ServerError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Store(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ServerError::Unauthorized => (
                status,
                Json(ErrorBody {
                    error: UNAUTHORIZED_MESSAGE.to_string(),
                }),
            )
                .into_response(),
            ServerError::Validation(err) => (status, err.client_message()).into_response(),
            ServerError::InvalidBody(_) => (status, INVALID_DATA_MESSAGE).into_response(),
            ServerError::BookmarkNotFound(_) => (status, BOOKMARK_NOT_FOUND_MESSAGE).into_response(),
            ServerError::DeleteNotFound(_) => (status, DELETE_NOT_FOUND_MESSAGE).into_response(),
            ServerError::RouteNotFound(_) => (status, "Not Found").into_response(),
            other @ (ServerError::Store(_) | ServerError::Internal(_) | ServerError::Config(_)) => {
                internal_error_response(other.to_string())
            }
        }
    }
}

/// Build the unsanitized 500 response. The error middleware strips the
/// detail in production.
pub fn internal_error_response(detail: String) -> Response {
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: detail.clone(),
        }),
    )
        .into_response();
    response.extensions_mut().insert(InternalErrorDetail(detail));
    response
}

impl From<JsonRejection> for ServerError {
    fn from(err: JsonRejection) -> Self {
        ServerError::InvalidBody(err.body_text())
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}
