//! bcrypt hashing. Hashing is CPU-bound, so every call runs on tokio's blocking thread pool.
use bcrypt::BcryptError;
use ipay_common::Secret;
use log::warn;
use once_cell::sync::Lazy;
use tokio::task::spawn_blocking;

use crate::api::errors::AuthApiError;

pub const BCRYPT_COST: u32 = 10;

/// Verified against when no user matches a login attempt, so both failure paths do the same amount of work.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    bcrypt::hash("not-a-real-password", BCRYPT_COST).unwrap_or_else(|e| {
        warn!("🔐️ Could not create the dummy password hash. {e}");
        String::new()
    })
});

pub async fn hash_password(password: &Secret<String>) -> Result<Secret<String>, AuthApiError> {
    let password = password.clone();
    let hash = spawn_blocking(move || bcrypt::hash(password.reveal(), BCRYPT_COST))
        .await
        .map_err(|e| AuthApiError::HashingError(e.to_string()))?
        .map_err(hashing_error)?;
    Ok(Secret::new(hash))
}

/// Checks `password` against the stored bcrypt `hash`. A malformed hash is an error, not a mismatch.
pub async fn verify_password(password: &Secret<String>, hash: &str) -> Result<bool, AuthApiError> {
    let password = password.clone();
    let hash = hash.to_string();
    spawn_blocking(move || bcrypt::verify(password.reveal(), &hash))
        .await
        .map_err(|e| AuthApiError::HashingError(e.to_string()))?
        .map_err(hashing_error)
}

/// Verifies against `hash` when a user was found, and against a fixed dummy hash otherwise. The dummy branch always
/// reports a mismatch.
pub async fn verify_password_or_dummy(password: &Secret<String>, hash: Option<&str>) -> Result<bool, AuthApiError> {
    match hash {
        Some(hash) => verify_password(password, hash).await,
        None => {
            let _ = verify_password(password, DUMMY_HASH.as_str()).await;
            Ok(false)
        },
    }
}

fn hashing_error(e: BcryptError) -> AuthApiError {
    AuthApiError::HashingError(e.to_string())
}
