use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::Result,
    middleware_layer::session::{extract_session_id, CurrentSession},
    models::session::{Session, SESSION_COOKIE},
    services::auth::{self as auth_service, SignInOutcome},
    state::AppState,
};

/// The request payload for user registration.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// The request payload for signing in. Both fields may be missing.
#[derive(Deserialize, Default)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The response payload for a successful registration.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: Session,
    pub session_id: Uuid,
}

/// Whether the request declares a JSON body, `application/json` or a `+json` type.
fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Reads the sign-in body.
///
/// A body that is absent, empty or not declared as JSON carries no credentials.
/// A declared JSON body that does not parse into the expected shape is an error.
fn parse_sign_in_body(headers: &HeaderMap, body: &Bytes) -> Result<SignInRequest> {
    if body.is_empty() || !is_json_content(headers) {
        return Ok(SignInRequest::default());
    }

    let Json(payload) = Json::<SignInRequest>::from_bytes(body)?;
    Ok(payload)
}

/// Creates the session cookie for the given identifier.
fn session_cookie(config: &Config, session_id: &Uuid) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());

    cookie.set_http_only(true);
    if config.secure_cookies {
        cookie.set_secure(true);
    }

    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    let duration_secs = i64::try_from(config.session_ttl_secs).unwrap_or(i64::MAX);
    cookie.set_max_age(Duration::seconds(duration_secs));
    cookie.set_path("/");

    cookie
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload?;
    tracing::info!("📝 Register attempt for: {}", payload.email);

    let (session_id, user) =
        auth_service::register(&state, payload.name, payload.email, payload.password).await?;

    cookies.add(session_cookie(&state.config, &session_id));
    tracing::info!("✅ User registered: {}", user.id);

    let response = RegisterResponse { user, session_id };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Returns the caller's session, or `null` when there is none.
#[axum::debug_handler]
pub async fn current_session(
    Extension(current): Extension<CurrentSession>,
) -> Json<Option<Session>> {
    Json(current.0)
}

/// Handles sign-in.
///
/// An empty body reads as missing credentials; a malformed JSON body is a 500.
#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    cookies: Cookies,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let payload = parse_sign_in_body(&headers, &body)?;

    let outcome =
        auth_service::sign_in(&state, current.0, payload.email, payload.password).await?;

    if let SignInOutcome::SignedIn { session_id, session } = &outcome {
        cookies.add(session_cookie(&state.config, session_id));
        tracing::info!("✅ User signed in: {}", session.id);
    }

    Ok(outcome.into_response())
}

/// Handles sign-out. Always answers 204, with or without a session.
#[axum::debug_handler]
pub async fn sign_out(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<StatusCode> {
    if cookies.get(SESSION_COOKIE).is_none() {
        return Ok(StatusCode::NO_CONTENT);
    }

    if let Some(session_id) = extract_session_id(&cookies) {
        auth_service::sign_out(&state, &session_id).await?;
    }

    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookies.remove(cookie);

    Ok(StatusCode::NO_CONTENT)
}
