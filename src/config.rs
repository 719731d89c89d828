use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use anyhow::{Context, Result};
use http::HeaderValue;

/// Seven days, the lifetime of a session record and its cookie.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The URL of the Redis server.
    pub redis_url: String,
    /// The lifetime of a session, in seconds.
    pub session_ttl_secs: u64,
    /// The socket the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Browser origins allowed to call the API with credentials.
    pub cors_origins: Vec<HeaderValue>,
    /// Whether cookies are marked `Secure`.
    pub secure_cookies: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let is_production = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string()) == "production";

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            session_ttl_secs: parse_ttl(
                &env::var("SESSION_TTL_SECONDS")
                    .unwrap_or_else(|_| DEFAULT_SESSION_TTL_SECS.to_string()),
            )?,
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            )
            .context("Invalid CORS_ORIGINS")?,
            secure_cookies: is_production,
        })
    }

    /// The session lifetime as a `Duration`.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

fn parse_ttl(raw: &str) -> Result<u64> {
    let ttl: u64 = raw.trim().parse().context("Invalid SESSION_TTL_SECONDS")?;
    // Redis deletes a key at once on EXPIRE 0.
    anyhow::ensure!(ttl > 0, "SESSION_TTL_SECONDS must be greater than zero");
    Ok(ttl)
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("bad origin: {}", origin))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins(" http://a.test, http://b.test ,,").unwrap();
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn origins_with_control_characters_are_rejected() {
        assert!(parse_origins("http://a\u{7f}.test").is_err());
    }

    #[test]
    fn zero_or_garbage_ttl_is_rejected() {
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl("seven days").is_err());
        assert_eq!(parse_ttl(" 3600 ").unwrap(), 3600);
    }

    #[test]
    fn default_ttl_is_seven_days() {
        assert_eq!(DEFAULT_SESSION_TTL_SECS, 604_800);
    }
}
