//! Session store: TTL key-value markers for active session components.
//!
//! Two kinds of entry live here:
//!
//! - the access nonce (`uuid` claim) of every live access token
//! - the full encoded string of every live refresh token
//!
//! Absence of an entry means the token is not an active session component,
//! whatever its signature says. Store presence and cryptographic validity
//! are separate gates and both must pass.

pub mod memory;
pub mod redis;

pub use memory::InMemorySessionStore;
pub use self::redis::RedisSessionStore;

use crate::errors::SessionError;
use async_trait::async_trait;
use std::time::Duration;

/// Marker value stored under an access nonce.
pub const ACCESS_MARKER: &str = "access";

/// Marker value stored under a refresh token string.
pub const REFRESH_MARKER: &str = "refresh";

/// TTL-capable key-value store.
///
/// Implementations must be safe to share across tasks behind an `Arc`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or overwrite `key`, resetting its TTL.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SessionError>;

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), SessionError>;

    /// Atomically read and remove `key`.
    ///
    /// Of any number of concurrent callers, at most one observes `Some`.
    async fn take(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Remaining time to live, or `None` if `key` is absent.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, SessionError>;
}
