//! Static bearer-token gate applied in front of every route.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::fmt;

use crate::handler::AppState;

const BEARER: &str = "Bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    MissingHeader,
    Malformed,
    TokenMismatch,
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AuthRejection::*;
        match self {
            MissingHeader => write!(f, "missing authorization header"),
            Malformed => write!(f, "malformed authorization header"),
            TokenMismatch => write!(f, "token mismatch"),
        }
    }
}

/// Checks `Authorization: Bearer <token>` against `expected`. The token is the second
/// space-separated segment; anything after it is ignored.
pub fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<(), AuthRejection> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthRejection::MissingHeader)?
        .to_str()
        .map_err(|_| AuthRejection::Malformed)?;

    let mut segments = value.split(' ');
    if segments.next() != Some(BEARER) {
        return Err(AuthRejection::Malformed);
    }
    let token = segments.next().ok_or(AuthRejection::Malformed)?;

    if token != expected {
        return Err(AuthRejection::TokenMismatch);
    }
    Ok(())
}

pub async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match check_bearer(request.headers(), state.api_token()) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            tracing::error!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = %rejection,
                "unauthorized request"
            );
            crate::unauthorized("Unauthorized request.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_check_bearer() {
        assert_eq!(check_bearer(&headers("Bearer s3cret"), "s3cret"), Ok(()));
        assert_eq!(check_bearer(&headers("Bearer s3cret trailing"), "s3cret"), Ok(()));
        assert_eq!(
            check_bearer(&HeaderMap::new(), "s3cret"),
            Err(AuthRejection::MissingHeader)
        );
        assert_eq!(
            check_bearer(&headers("Bearer"), "s3cret"),
            Err(AuthRejection::Malformed)
        );
        assert_eq!(
            check_bearer(&headers("Basic s3cret"), "s3cret"),
            Err(AuthRejection::Malformed)
        );
        assert_eq!(
            check_bearer(&headers("Bearer S3CRET"), "s3cret"),
            Err(AuthRejection::TokenMismatch)
        );
        assert_eq!(
            check_bearer(&headers("Bearer  s3cret"), "s3cret"),
            Err(AuthRejection::TokenMismatch)
        );
    }
}
