use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    error::handle_panic,
    handlers::{auth, diagnostics},
    middleware_layer::session::resolve_session,
    state::AppState,
};

/// Builds the HTTP router.
///
/// The session resolver only runs in front of `GET /user` and `POST /user/signin`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.config.cors_origins.clone()))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400));

    let resolver = from_fn_with_state(state.clone(), resolve_session);

    Router::new()
        .route("/test-cookies", get(diagnostics::test_cookies))
        .route(
            "/user",
            get(auth::current_session)
                .route_layer(resolver.clone())
                .post(auth::register),
        )
        .route("/user/signin", post(auth::sign_in).route_layer(resolver))
        .route("/user/session", delete(auth::sign_out))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
}
