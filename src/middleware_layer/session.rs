use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::session::{Session, SESSION_COOKIE},
    state::AppState,
};

/// The session resolved for the current request, if any.
///
/// Inserted into the request extensions by [`resolve_session`].
#[derive(Clone, Debug, Default)]
pub struct CurrentSession(pub Option<Session>);

/// Extracts the session identifier from the request cookies.
///
/// A value that is not a UUID cannot name a session and is ignored.
pub fn extract_session_id(cookies: &Cookies) -> Option<Uuid> {
    cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// A middleware that attaches the caller's session, or its absence, to the request.
///
/// Never rejects a request: a missing, unknown or expired session is ordinary
/// traffic. Only a failing session store stops the request.
pub async fn resolve_session(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = match extract_session_id(&cookies) {
        Some(session_id) => {
            let session = state.sessions.load(&session_id).await?;
            if session.is_none() {
                tracing::debug!("No live session for id: {}", session_id);
            }
            session
        }
        None => None,
    };

    request.extensions_mut().insert(CurrentSession(session));
    Ok(next.run(request).await)
}
