//! User registration, sign-in and session lookup over HTTP.
//!
//! Users live in PostgreSQL; sessions live in Redis under `session:<id>` with a
//! fixed time-to-live, and clients hold only the id in the `session-id` cookie.

pub mod config;
pub mod db;
pub mod error;
pub mod router;
pub mod state;

pub mod models {
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod auth;
}

pub mod handlers {
    pub mod auth;
    pub mod diagnostics;
}

pub mod middleware_layer {
    pub mod session;
}

pub use router::build_router;
pub use state::AppState;
