use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::auth::require_bearer;
use crate::handler::{self, AppState};
use crate::responder::{handle_panic, respond_to_failures};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bookmarks",
            get(handler::list_bookmarks).post(handler::create_bookmark),
        )
        .route(
            "/bookmarks/:id",
            get(handler::get_bookmark).delete(handler::delete_bookmark),
        )
}

/// The full service: bookmark routes behind the auth gate and the shared layers.
pub fn app(state: AppState) -> Router {
    with_layers(routes(), state)
}

/// Wraps `router` with, from the inside out: the auth gate, panic catching, the
/// failure responder, security headers, access logging and CORS.
pub fn with_layers(router: Router<AppState>, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(Any);

    router
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            respond_to_failures,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("off"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
