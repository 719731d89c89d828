use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::{
    error::{AppError, Result},
    models::{
        session::Session,
        user::{NewUser, User},
    },
    state::AppState,
};

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 2;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;

/// Hashes a password using Argon2id with a fresh random salt.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the PHC-formatted hash.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::PasswordHash(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::PasswordHash(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a hash.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `hash` - The PHC-formatted hash to verify against.
///
/// # Returns
///
/// A `Result` containing `true` if the password matches, `false` otherwise.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::PasswordHash(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    tracing::debug!("Password verification completed");
    Ok(result)
}

/// Runs CPU-heavy password work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {}", e)))?
}

/// Mints a session identifier and stores a copy of the user's public fields under it.
pub async fn start_session(state: &AppState, user: &User) -> Result<(Uuid, Session)> {
    let session_id = Uuid::new_v4();
    let session = user.public_fields();

    state
        .sessions
        .create(&session_id, &session, state.config.session_ttl())
        .await?;

    tracing::info!("✅ Session started for user: {}", user.id);
    Ok((session_id, session))
}

/// Creates a user and signs them in.
///
/// # Returns
///
/// The new session identifier and the user's public fields.
pub async fn register(
    state: &AppState,
    name: String,
    email: String,
    password: String,
) -> Result<(Uuid, Session)> {
    tracing::debug!("🔐 Creating user: {}", email);
    let password_hash = run_blocking(move || hash_password(&password)).await?;

    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    start_session(state, &user).await
}

/// How a sign-in attempt ended.
#[derive(Debug)]
pub enum SignInOutcome {
    /// The request already carried a live session, which is returned unchanged.
    AlreadySignedIn(Session),
    /// The credentials matched and a new session was started.
    SignedIn { session_id: Uuid, session: Session },
    /// Email or password was not supplied.
    MissingParams,
    /// No user is registered under this email.
    UnknownUser(String),
    /// The password did not match.
    InvalidCredentials,
}

/// Runs the sign-in flow for a request that may already hold a session.
pub async fn sign_in(
    state: &AppState,
    current: Option<Session>,
    email: Option<String>,
    password: Option<String>,
) -> Result<SignInOutcome> {
    if let Some(session) = current {
        return Ok(SignInOutcome::AlreadySignedIn(session));
    }

    let (email, password) = match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => return Ok(SignInOutcome::MissingParams),
    };

    tracing::debug!("🔐 Authenticating user: {}", email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        tracing::debug!("Unknown email on sign-in: {}", email);
        return Ok(SignInOutcome::UnknownUser(email));
    };

    let stored_hash = user.password.clone();
    if !run_blocking(move || verify_password(&password, &stored_hash)).await? {
        tracing::warn!("❌ Invalid credentials for user: {}", user.id);
        return Ok(SignInOutcome::InvalidCredentials);
    }

    let (session_id, session) = start_session(state, &user).await?;
    Ok(SignInOutcome::SignedIn {
        session_id,
        session,
    })
}

/// Ends a session. Missing records are ignored.
pub async fn sign_out(state: &AppState, session_id: &Uuid) -> Result<()> {
    state.sessions.delete(session_id).await?;
    tracing::info!("✅ Session deleted: {}", session_id);
    Ok(())
}

/// The transport policy for sign-in: every outcome is a 200, failures are
/// told apart only by their string payload.
impl IntoResponse for SignInOutcome {
    fn into_response(self) -> Response {
        match self {
            SignInOutcome::AlreadySignedIn(session) | SignInOutcome::SignedIn { session, .. } => {
                (StatusCode::OK, Json(session)).into_response()
            }
            SignInOutcome::MissingParams => {
                (StatusCode::OK, Json("Missing params!")).into_response()
            }
            SignInOutcome::UnknownUser(email) => {
                (StatusCode::OK, Json(format!("User {} doesn't exist!", email))).into_response()
            }
            SignInOutcome::InvalidCredentials => {
                (StatusCode::OK, Json("Invalid credentials")).into_response()
            }
        }
    }
}
