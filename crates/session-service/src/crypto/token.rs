//! Token codec for access and refresh tokens.
//!
//! Both token classes are HS256 JWTs. Each class has its own secret and its
//! own lifetime; a [`TokenCodec`] holds both and exposes no way to sign or
//! verify one class with the other's key.
//!
//! Wire format:
//!
//! - header: `{"alg":"HS256","typ":"JWT"}`
//! - access payload: `{"sub", "email", "uuid", "iat", "exp"}`
//! - refresh payload: `{"sub", "email", "jti", "iat", "exp"}`
//!
//! Decoding is a pure signature and expiry check. It never consults the
//! session store.

use crate::config::Config;
use crate::directory::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode as jwt_decode, encode as jwt_encode};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// Tokens above this size are rejected before any base64 or signature work.
const MAX_TOKEN_SIZE_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Access token payload.
///
/// `uuid` is the per-issuance nonce mirrored as a session-store key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,
    pub email: String,
    pub uuid: Uuid,
}

impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("sub", &"[REDACTED]")
            .field("email", &"[REDACTED]")
            .field("uuid", &"[REDACTED]")
            .finish()
    }
}

/// Refresh token payload.
///
/// `jti` makes every refresh token string unique, even two minted for the
/// same subject within the same second.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: UserId,
    pub email: String,
    pub jti: Uuid,
}

impl fmt::Debug for RefreshClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshClaims")
            .field("sub", &"[REDACTED]")
            .field("email", &"[REDACTED]")
            .field("jti", &"[REDACTED]")
            .finish()
    }
}

/// Claims that passed signature and expiry checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<C> {
    pub claims: C,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Serialize)]
struct OutgoingEnvelope<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct IncomingEnvelope<C> {
    #[serde(flatten)]
    claims: C,
    iat: i64,
    exp: i64,
}

/// Encode `claims` as an HS256 JWT that expires `lifetime` from now.
pub fn encode<C: Serialize>(
    claims: &C,
    secret: &SecretString,
    lifetime: Duration,
) -> Result<String, TokenError> {
    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    encode_with_key(claims, &key, lifetime)
}

/// Decode and verify an HS256 JWT signed with `secret`.
///
/// # Errors
///
/// - `TokenError::InvalidSignature` if the signature does not match `secret`
/// - `TokenError::Expired` if the embedded `exp` is in the past
/// - `TokenError::Malformed` for anything that is not a well-formed token
pub fn decode<C: DeserializeOwned>(
    token: &str,
    secret: &SecretString,
) -> Result<Verified<C>, TokenError> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    decode_with_key(token, &key)
}

fn encode_with_key<C: Serialize>(
    claims: &C,
    key: &EncodingKey,
    lifetime: Duration,
) -> Result<String, TokenError> {
    let iat = chrono::Utc::now().timestamp();
    let lifetime_secs = i64::try_from(lifetime.as_secs())
        .map_err(|_| TokenError::Signing("lifetime out of range".to_string()))?;
    let exp = iat.saturating_add(lifetime_secs);

    let envelope = OutgoingEnvelope { claims, iat, exp };

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    jwt_encode(&header, &envelope, key).map_err(|e| TokenError::Signing(e.to_string()))
}

fn decode_with_key<C: DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
) -> Result<Verified<C>, TokenError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "session.crypto",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenError::Malformed("token too large".to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let data = jwt_decode::<IncomingEnvelope<C>>(token, key, &validation).map_err(|e| {
        tracing::debug!(target: "session.crypto", error = %e, "Token verification failed");
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        }
    })?;

    Ok(Verified {
        claims: data.claims.claims,
        issued_at: data.claims.iat,
        expires_at: data.claims.exp,
    })
}

struct ClassKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl ClassKeys {
    fn new(secret: &SecretString, lifetime: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            lifetime,
        }
    }
}

/// Signs and verifies both token classes with their own secrets.
pub struct TokenCodec {
    access: ClassKeys,
    refresh: ClassKeys,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_lifetime", &self.access.lifetime)
            .field("refresh_lifetime", &self.refresh.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(
        access_secret: &SecretString,
        access_lifetime: Duration,
        refresh_secret: &SecretString,
        refresh_lifetime: Duration,
    ) -> Self {
        Self {
            access: ClassKeys::new(access_secret, access_lifetime),
            refresh: ClassKeys::new(refresh_secret, refresh_lifetime),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.access_secret,
            config.access_token_lifetime,
            &config.refresh_secret,
            config.refresh_token_lifetime,
        )
    }

    #[instrument(skip_all)]
    pub fn encode_access(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        encode_with_key(claims, &self.access.encoding, self.access.lifetime)
    }

    #[instrument(skip_all)]
    pub fn decode_access(&self, token: &str) -> Result<Verified<AccessClaims>, TokenError> {
        decode_with_key(token, &self.access.decoding)
    }

    #[instrument(skip_all)]
    pub fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String, TokenError> {
        encode_with_key(claims, &self.refresh.encoding, self.refresh.lifetime)
    }

    #[instrument(skip_all)]
    pub fn decode_refresh(&self, token: &str) -> Result<Verified<RefreshClaims>, TokenError> {
        decode_with_key(token, &self.refresh.decoding)
    }

    pub fn access_lifetime(&self) -> Duration {
        self.access.lifetime
    }

    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh.lifetime
    }
}
