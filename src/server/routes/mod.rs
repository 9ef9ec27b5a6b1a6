//! API route handlers
//!
//! - `bookmarks`: list, get, create and delete under `/bookmarks`

pub mod bookmarks;

use crate::server::error::ServerError;
use axum::http::Uri;

/// 404 Not Found handler for undefined routes.
pub async fn not_found(uri: Uri) -> ServerError {
    ServerError::RouteNotFound(uri.path().to_string())
}
