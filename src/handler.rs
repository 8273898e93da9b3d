use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::config::{Config, Environment};
use crate::error::HandlerError;
use crate::model::CreateBookmark;
use crate::store::BookmarkStore;
use crate::{good_response, not_found};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BookmarkStore>,
    pub environment: Environment,
    api_token: Arc<str>,
}

impl AppState {
    pub fn new(store: BookmarkStore, environment: Environment, api_token: &str) -> Self {
        AppState {
            store: Arc::new(store),
            environment,
            api_token: Arc::from(api_token),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        AppState::new(
            BookmarkStore::seeded(),
            cfg.app.environment,
            cfg.app.get_api_token(),
        )
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

pub async fn list_bookmarks(State(state): State<AppState>) -> Result<Response, HandlerError> {
    let bookmarks = state.store.list()?;
    tracing::info!(count = bookmarks.len(), "got bookmarks");
    Ok(good_response(bookmarks))
}

pub async fn get_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, HandlerError> {
    match state.store.get(&id)? {
        Some(bookmark) => Ok(good_response(bookmark)),
        None => {
            tracing::info!(id = %id, "bookmark not found");
            Ok(not_found("404 Not Found"))
        }
    }
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HandlerError> {
    let payload = parse_create_body(&headers, &body)?;
    let new = payload.validate()?;
    let bookmark = state.store.insert(new)?;
    tracing::info!(id = %bookmark.id, "created bookmark");
    Ok(good_response(bookmark))
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, HandlerError> {
    match state.store.remove(&id)? {
        Some(_) => {
            tracing::info!(id = %id, "deleted bookmark");
            Ok((StatusCode::OK, "Deleted").into_response())
        }
        None => {
            tracing::info!(id = %id, "bookmark not found");
            Ok(not_found("Bookmark not found"))
        }
    }
}

/// A body that is empty or not sent as JSON parses to an empty request, so every field
/// reports as missing. Anything else must be well-formed JSON.
fn parse_create_body(headers: &HeaderMap, body: &Bytes) -> Result<CreateBookmark, HandlerError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateBookmark::default());
    }
    Json::<CreateBookmark>::from_bytes(body)
        .map(|Json(payload)| payload)
        .map_err(|rejection| HandlerError::BodyError(rejection.body_text()))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers
    }

    #[test]
    fn test_empty_json_body_is_empty_request() {
        for raw in ["", "  \n"] {
            let payload = parse_create_body(&json_headers(), &Bytes::from(raw)).unwrap();
            assert!(payload.name.is_none() && payload.rating.is_none());
        }
    }

    #[test]
    fn test_non_json_body_is_empty_request() {
        let payload = parse_create_body(&HeaderMap::new(), &Bytes::from("name=x")).unwrap();
        assert!(payload.name.is_none());
    }

    #[test]
    fn test_broken_json_is_body_error() {
        let err = parse_create_body(&json_headers(), &Bytes::from("{not json")).unwrap_err();
        assert_eq!(err.kind(), "BodyError");
    }
}
