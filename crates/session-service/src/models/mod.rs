//! Request and result shapes for session operations.
//!
//! Results serialize to camelCase JSON. Requests accept camelCase JSON.

use crate::directory::{PublicProfile, UserId};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const REGISTER_MESSAGE: &str = "Register successfully.";
pub const LOGIN_MESSAGE: &str = "Login successfully.";
pub const LOGOUT_MESSAGE: &str = "Logout successfully.";
pub const REFRESH_MESSAGE: &str = "Refresh token successfully.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub data: PublicProfile,
}

/// Result of login and refresh.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPairResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPairResponse")
            .field("message", &self.message)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub data: PublicProfile,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Identity established by a successful access-token check.
///
/// `nonce` is the token's `uuid` claim, which is also its store key.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    pub id: UserId,
    pub email: String,
    pub nonce: Uuid,
}

impl fmt::Debug for AuthenticatedSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedSubject")
            .field("id", &self.id)
            .field("email", &"[REDACTED]")
            .field("nonce", &"[REDACTED]")
            .finish()
    }
}
