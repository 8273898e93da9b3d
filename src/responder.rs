//! Fallback for failures no route handles itself.
//!
//! Handlers and the panic catcher tag their 500 responses with a [`Failure`] extension.
//! [`respond_to_failures`] runs outside of them and rewrites the body according to the
//! deployment mode: production gets a fixed, detail-free body, development gets the
//! message and detail and a diagnostic log line.

use std::any::Any;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::HandlerError;
use crate::handler::AppState;

#[derive(Debug, Clone)]
pub struct Failure {
    pub message: String,
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
struct FailureDetail<'a> {
    kind: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct DevelopmentBody<'a> {
    message: &'a str,
    error: FailureDetail<'a>,
}

fn production_body() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": { "message": "server error" } })),
    )
        .into_response()
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        if let HandlerError::ValidationError(e) = &self {
            return crate::unauthorized(&e.to_string());
        }

        let failure = Failure {
            message: self.to_string(),
            kind: self.kind(),
        };
        let mut response = production_body();
        response.extensions_mut().insert(failure);
        response
    }
}

/// Response used by `CatchPanicLayer` when a handler panics.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    HandlerError::Panic(message).into_response()
}

pub async fn respond_to_failures(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let Some(failure) = response.extensions().get::<Failure>().cloned() else {
        return response;
    };

    if state.environment.is_production() {
        tracing::error!(kind = failure.kind, "unhandled failure");
        return production_body();
    }

    tracing::error!(kind = failure.kind, error = %failure.message, "unhandled failure");
    let body = DevelopmentBody {
        message: &failure.message,
        error: FailureDetail {
            kind: failure.kind,
            message: &failure.message,
        },
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::model::ValidationError;

    #[test]
    fn test_validation_error_is_unauthorized() {
        let response = HandlerError::from(ValidationError::Missing("name")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<Failure>().is_none());
    }

    #[test]
    fn test_internal_errors_are_tagged() {
        let response =
            HandlerError::from(StoreError::LockError("poisoned".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let failure = response.extensions().get::<Failure>().unwrap();
        assert_eq!(failure.kind, "StoreError");
        assert!(failure.message.contains("poisoned"));
    }

    #[test]
    fn test_handle_panic_message() {
        let response = handle_panic(Box::new("boom"));
        let failure = response.extensions().get::<Failure>().unwrap();
        assert_eq!(failure.message, "Panic: boom");

        let response = handle_panic(Box::new(String::from("owned boom")));
        let failure = response.extensions().get::<Failure>().unwrap();
        assert_eq!(failure.message, "Panic: owned boom");
    }
}
