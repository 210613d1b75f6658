//! Custom test assertions for encoded tokens.
//!
//! These inspect the token text only; they do not verify signatures.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {index}"));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {index}: {e}"))
}

/// Decoded payload of a JWT, without verification.
pub fn jwt_payload(token: &str) -> Value {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// The `uuid` claim of an access token.
pub fn jwt_nonce(token: &str) -> Uuid {
    let payload = jwt_payload(token);
    let raw = payload["uuid"].as_str().expect("token has no uuid claim");
    Uuid::parse_str(raw).expect("uuid claim is not a UUID")
}

/// Custom assertions for encoded tokens.
///
/// # Example
/// ```rust,ignore
/// pair.access_token
///     .assert_hs256()
///     .assert_for_subject(1)
///     .assert_has_nonce();
/// ```
pub trait TokenAssertions {
    /// Assert three segments and an `{"alg":"HS256","typ":"JWT"}` header.
    fn assert_hs256(&self) -> &Self;

    fn assert_for_subject(&self, sub: i64) -> &Self;

    fn assert_for_email(&self, email: &str) -> &Self;

    /// Assert an access-shaped payload: `uuid` present, `jti` absent.
    fn assert_has_nonce(&self) -> &Self;

    /// Assert a refresh-shaped payload: `jti` present, `uuid` absent.
    fn assert_has_jti(&self) -> &Self;

    /// Assert `exp - iat` equals `seconds`.
    fn assert_lifetime(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for str {
    fn assert_hs256(&self) -> &Self {
        assert_eq!(
            self.split('.').count(),
            3,
            "JWT must have 3 parts (header.payload.signature)"
        );

        let header: JwtHeader =
            serde_json::from_slice(&segment(self, 0)).expect("Failed to parse JWT header");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        self
    }

    fn assert_for_subject(&self, sub: i64) -> &Self {
        let payload = jwt_payload(self);
        assert_eq!(
            payload["sub"].as_i64(),
            Some(sub),
            "Expected subject {}, got {}",
            sub,
            payload["sub"]
        );
        self
    }

    fn assert_for_email(&self, email: &str) -> &Self {
        let payload = jwt_payload(self);
        assert_eq!(payload["email"].as_str(), Some(email));
        self
    }

    fn assert_has_nonce(&self) -> &Self {
        let payload = jwt_payload(self);
        assert!(payload["uuid"].is_string(), "Expected a uuid claim");
        assert!(payload.get("jti").is_none(), "Unexpected jti claim");
        self
    }

    fn assert_has_jti(&self) -> &Self {
        let payload = jwt_payload(self);
        assert!(payload["jti"].is_string(), "Expected a jti claim");
        assert!(payload.get("uuid").is_none(), "Unexpected uuid claim");
        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let payload = jwt_payload(self);
        let iat = payload["iat"].as_i64().expect("iat claim");
        let exp = payload["exp"].as_i64().expect("exp claim");
        assert_eq!(
            exp - iat,
            seconds,
            "Expected lifetime {seconds}s, got {}s",
            exp - iat
        );
        self
    }
}
