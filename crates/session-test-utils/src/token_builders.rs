//! Builders for hand-shaped tokens.
//!
//! The codec never produces an expired, foreign-signed or claim-less token;
//! these builders do, so tests can drive every rejection path.

use crate::test_ids::{TEST_ACCESS_SECRET, TEST_EMAIL, TEST_REFRESH_SECRET};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Builder for raw HS256 JWTs.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::access()
///     .for_subject(42)
///     .expired()
///     .sign();
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
    secret: String,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Access-shaped claims (`uuid` nonce) signed with the test access secret.
    pub fn access() -> Self {
        Self::base(TEST_ACCESS_SECRET).with_nonce(Uuid::new_v4())
    }

    /// Refresh-shaped claims (`jti`) signed with the test refresh secret.
    pub fn refresh() -> Self {
        Self::base(TEST_REFRESH_SECRET).with_jti(Uuid::new_v4())
    }

    fn base(secret: &str) -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(1));
        claims.insert("email".to_string(), json!(TEST_EMAIL));
        claims.insert("iat".to_string(), json!(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::seconds(900)).timestamp()),
        );
        Self {
            claims,
            secret: secret.to_string(),
            algorithm: Algorithm::HS256,
        }
    }

    pub fn for_subject(mut self, sub: i64) -> Self {
        self.claims.insert("sub".to_string(), json!(sub));
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.claims.insert("email".to_string(), json!(email));
        self
    }

    pub fn with_nonce(mut self, nonce: Uuid) -> Self {
        self.claims.insert("uuid".to_string(), json!(nonce.to_string()));
        self
    }

    pub fn with_jti(mut self, jti: Uuid) -> Self {
        self.claims.insert("jti".to_string(), json!(jti.to_string()));
        self
    }

    /// Set expiration in seconds from now (negative for the past).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        let exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self.claims.insert("exp".to_string(), json!(exp));
        self
    }

    /// Expired one minute ago.
    pub fn expired(self) -> Self {
        self.expires_in(-60)
    }

    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the claims as a JSON value.
    pub fn build_claims(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    /// Sign and encode the token.
    pub fn sign(self) -> String {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        encode(
            &header,
            &Value::Object(self.claims),
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("sign test token")
    }
}
