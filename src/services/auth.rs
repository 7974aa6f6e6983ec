//! Password auth service.
//!
//! Normalizes emails, hashes passwords with Argon2id, and owns the
//! signup/login flows. Session issuance lives in [`super::session`].

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use sqlx::PgPool;
use uuid::Uuid;

use super::session::SessionUser;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "E_INVALID_EMAIL",
            Self::WeakPassword => "E_WEAK_PASSWORD",
            Self::EmailTaken => "E_EMAIL_TAKEN",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::Hash(_) => "E_HASH",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

fn name_from_email(email: &str) -> String {
    let local = email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user");
    local.to_owned()
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `Hash` if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC-format hash.
#[must_use]
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Create a new user account.
///
/// # Errors
///
/// Returns `InvalidEmail` / `WeakPassword` on validation failure and
/// `EmailTaken` when the normalized email already has an account.
pub async fn sign_up(
    pool: &PgPool,
    email: &str,
    name: Option<&str>,
    password: &str,
) -> Result<SessionUser, AuthError> {
    let email = normalize_email(email).ok_or(AuthError::InvalidEmail)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }

    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| name_from_email(&email), str::to_owned);

    let id = Uuid::new_v4();
    let password_hash = hash_password(password)?;

    let result = sqlx::query(
        "INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(id)
    .bind(&email)
    .bind(&name)
    .bind(&password_hash)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::EmailTaken);
    }

    tracing::info!(%id, "auth: user created");
    Ok(SessionUser { id, email, name })
}

/// Verify credentials and return the user.
///
/// Unknown email and wrong password are indistinguishable to the caller.
///
/// # Errors
///
/// Returns `InvalidCredentials` on any mismatch.
pub async fn sign_in(pool: &PgPool, email: &str, password: &str) -> Result<SessionUser, AuthError> {
    let email = normalize_email(email).ok_or(AuthError::InvalidCredentials)?;

    let row = sqlx::query_as::<_, (Uuid, String, String, String)>(
        "SELECT id, email, name, password_hash FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    let Some((id, email, name, password_hash)) = row else {
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(&password_hash, password) {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(SessionUser { id, email, name })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
