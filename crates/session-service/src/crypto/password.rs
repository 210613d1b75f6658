//! Credential verifier (bcrypt).

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::SessionError;
use crate::observability::metrics::record_bcrypt_duration;
use std::time::Instant;
use tracing::instrument;

/// Hash a password with bcrypt using the given cost factor.
///
/// Every call draws a fresh salt, so hashing the same password twice never
/// yields the same string. The cost is embedded in the output.
///
/// # Errors
///
/// Returns `SessionError::Crypto` if the cost is outside
/// `MIN_BCRYPT_COST..=MAX_BCRYPT_COST` or hashing fails.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, SessionError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(SessionError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    let start = Instant::now();
    let hashed = bcrypt::hash(password, cost)
        .map_err(|e| SessionError::Crypto(format!("Password hashing failed: {}", e)));
    record_bcrypt_duration("hash", start.elapsed());

    hashed
}

/// Verify a password against a stored bcrypt hash.
///
/// Comparison is constant-time. A malformed hash is treated as a mismatch.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let start = Instant::now();
    let result = bcrypt::verify(password, hash);
    record_bcrypt_duration("verify", start.elapsed());

    match result {
        Ok(matches) => matches,
        Err(e) => {
            tracing::debug!(
                target: "session.crypto",
                error = %e,
                "Stored hash is not valid bcrypt"
            );
            false
        }
    }
}
