use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The body message for every failure the client is not told about.
pub const GENERIC_ERROR_MESSAGE: &str = "Whoooops! Something is wrong.";

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A pool construction error.
    #[error("Pool setup error: {0}")]
    PoolSetup(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A request body that could not be read as the expected JSON.
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    /// A password hashing error.
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// The email is already taken by another user.
    #[error("Conflict: {0} is already registered")]
    Conflict(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Conflict(ref email) => {
                tracing::warn!("Registration conflict for: {}", email);
                (StatusCode::CONFLICT, format!("{} is already registered", email))
            }

            ref other => {
                tracing::error!("❌ Unhandled failure: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE.to_string())
            }
        };

        error_response(status, &message)
    }
}

/// Renders the `{"err": ...}` body shared by every failure response.
fn error_response(status: StatusCode, message: &str) -> Response {
    let body = sonic_rs::to_string(&sonic_rs::json!({
        "err": message
    }))
    .unwrap_or_else(|_| format!(r#"{{"err":"{}"}}"#, GENERIC_ERROR_MESSAGE));

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Converts a handler panic into the generic 500 response.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!("❌ Handler panicked: {}", detail);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn internal_failures_are_generic_500s() {
        let response = AppError::Internal("redis went away".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert!(body.contains(GENERIC_ERROR_MESSAGE));
        assert!(!body.contains("redis went away"));
    }

    #[tokio::test]
    async fn conflicts_are_409s() {
        let response = AppError::Conflict("a@x.com".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_of(response).await.contains("a@x.com"));
    }

    #[tokio::test]
    async fn panics_render_the_generic_body() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_of(response).await.contains(GENERIC_ERROR_MESSAGE));
    }
}
