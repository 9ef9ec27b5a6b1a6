use crate::bookmark::{Bookmark, CreateBookmarkRequest};
use crate::server::error::{ServerError, ServerResult};
use crate::server::state::ServerState;
use crate::validate::validate_new_bookmark;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::{HOST, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value;
use std::sync::Arc;

/// List every bookmark in insertion order
pub async fn list_bookmarks(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<Vec<Bookmark>>> {
    Ok(Json(state.store.list()?))
}

/// Get a single bookmark
pub async fn get_bookmark(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<Bookmark>> {
    match state.store.find_by_id(&id)? {
        Some(bookmark) => Ok(Json(bookmark)),
        None => {
            tracing::info!(bookmark_id = %id, "Bookmark not found");
            Err(ServerError::BookmarkNotFound(id))
        }
    }
}

/// Create a bookmark (`POST /bookmarks`)
///
/// Responds 201 with a `Location` header and the stored record. The body
/// must be a JSON object; arrays and scalars are `400 Invalid data`.
pub async fn create_bookmark(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(body) = payload?;
    let raw = CreateBookmarkRequest::from_json(body)
        .ok_or_else(|| ServerError::InvalidBody("expected a JSON object".into()))?;
    let new = validate_new_bookmark(&raw).inspect_err(|err| {
        tracing::info!(reason = %err, "Rejected bookmark");
    })?;

    let bookmark = Bookmark::create(new);
    state.store.append(bookmark.clone())?;
    tracing::info!(bookmark_id = %bookmark.id, "Bookmark created");

    let host = headers.get(HOST).and_then(|v| v.to_str().ok());
    let location = state.location_for(&bookmark.id, host);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(bookmark),
    ))
}

/// Create a bookmark (`POST /bookmarks/{id}`)
///
/// The path segment is accepted for compatibility with older clients and
/// ignored; the server always assigns the id.
pub async fn create_bookmark_at(
    state: State<Arc<ServerState>>,
    Path(_ignored): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    create_bookmark(state, headers, payload).await
}

/// Delete a bookmark
pub async fn delete_bookmark(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    if !state.store.remove_by_id(&id)? {
        tracing::info!(bookmark_id = %id, "Bookmark to delete not found");
        return Err(ServerError::DeleteNotFound(id));
    }

    tracing::info!(bookmark_id = %id, "Bookmark deleted");
    Ok(StatusCode::NO_CONTENT)
}
