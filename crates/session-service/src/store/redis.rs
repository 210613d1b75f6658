//! Redis-backed session store.
//!
//! # Commands
//!
//! - `put` - `SET key value PX ttl_ms`
//! - `get` - `GET key`
//! - `delete` - `DEL key`
//! - `take` - `GETDEL key` (Redis 6.2+)
//! - `ttl` - `PTTL key`
//!
//! `MultiplexedConnection` is cheap to clone and safe to use concurrently,
//! so each operation clones it instead of taking a lock.

use crate::errors::SessionError;
use crate::store::SessionStore;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client;
use std::time::Duration;
use tracing::{error, instrument, warn};

#[derive(Clone)]
pub struct RedisSessionStore {
    connection: MultiplexedConnection,
}

impl RedisSessionStore {
    /// Open a client and establish a multiplexed connection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` if the URL is invalid or the server is
    /// unreachable.
    pub async fn connect(redis_url: &str) -> Result<Self, SessionError> {
        // Do not log redis_url: it may carry credentials.
        let client = Client::open(redis_url).map_err(|e| {
            error!(target: "session.store.redis", error = %e, "Failed to open Redis client");
            SessionError::Store(format!("Failed to open Redis client: {e}"))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!(target: "session.store.redis", error = %e, "Failed to connect to Redis");
                SessionError::Store(format!("Failed to connect to Redis: {e}"))
            })?;

        Ok(Self { connection })
    }

    pub fn from_connection(connection: MultiplexedConnection) -> Self {
        Self { connection }
    }
}

fn store_error(op: &'static str, e: &redis::RedisError) -> SessionError {
    warn!(target: "session.store.redis", op, error = %e, "Redis command failed");
    SessionError::Store(format!("Redis {op} failed: {e}"))
}

/// Milliseconds for `PX`, clamped to `1..=i64::MAX`. Redis rejects `PX 0`
/// and any expire time beyond a signed 64-bit millisecond count.
fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip_all)]
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SessionError> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("SET", &e))?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut conn = self.connection.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("GET", &e))
    }

    #[instrument(skip_all)]
    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.connection.clone();
        let _: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("DEL", &e))?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn take(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut conn = self.connection.clone();
        redis::cmd("GETDEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("GETDEL", &e))
    }

    #[instrument(skip_all)]
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, SessionError> {
        let mut conn = self.connection.clone();
        let millis: i64 = redis::cmd("PTTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("PTTL", &e))?;

        // -2: no such key. -1: key without expiry, which this store never writes.
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }
}
