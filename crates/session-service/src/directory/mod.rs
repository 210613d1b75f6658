//! User directory: the external source of credential records.
//!
//! The session service reads records by email or id and creates them at
//! registration. It never updates or deletes them.

pub mod postgres;

pub use postgres::PgUserDirectory;

use crate::errors::SessionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Numeric subject identifier, carried as `sub` in both token classes.
pub type UserId = i64;

/// Credential record as stored by the directory.
#[derive(Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &"[REDACTED]")
            .field("password_hash", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl UserRecord {
    pub fn to_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Fields required to create a record. `password_hash` is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &"[REDACTED]")
            .field("password_hash", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// A user record without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, SessionError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, SessionError>;

    /// Create a record.
    ///
    /// Fails with `SessionError::EmailTaken` if the email already exists.
    async fn create(&self, user: NewUser) -> Result<UserRecord, SessionError>;
}
