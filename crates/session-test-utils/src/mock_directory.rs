//! In-memory user directory.
//!
//! Ids are assigned sequentially from 1. Email uniqueness is enforced on
//! `create`, like the unique constraint of the real table.

use async_trait::async_trait;
use chrono::Utc;
use session_service::crypto::hash_password;
use session_service::directory::{NewUser, UserDirectory, UserId, UserRecord};
use session_service::errors::SessionError;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    next_id: UserId,
    by_id: HashMap<UserId, UserRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    inner: Mutex<Inner>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user with `password` hashed at `cost`. Returns the new id.
    pub fn with_user(&self, email: &str, password: &str, cost: u32) -> UserId {
        let password_hash = hash_password(password, cost).expect("hash test password");
        self.insert(NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash,
        })
        .expect("seed test user")
        .id
    }

    /// Seed a user whose stored hash is `password_hash` verbatim.
    pub fn with_raw_hash(&self, email: &str, password_hash: &str) -> UserId {
        self.insert(NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
        .expect("seed test user")
        .id
    }

    /// Delete a user, simulating removal by another part of the system.
    pub fn remove_by_email(&self, email: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.by_id.len();
        inner.by_id.retain(|_, u| u.email != email);
        inner.by_id.len() != before
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, user: NewUser) -> Result<UserRecord, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.by_id.values().any(|u| u.email == user.email) {
            return Err(SessionError::EmailTaken);
        }

        inner.next_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id: inner.next_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        inner.by_id.insert(record.id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, SessionError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.by_id.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, SessionError> {
        Ok(self.inner.lock().unwrap().by_id.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, SessionError> {
        self.insert(user)
    }
}
