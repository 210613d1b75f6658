//! Session store unavailability.
//!
//! A store that stops answering must fail every gate closed: nothing is
//! authenticated, refreshed or logged out while it is down.

use async_trait::async_trait;
use session_service::errors::{ErrorClass, SessionError};
use session_service::services::SessionManager;
use session_service::store::{InMemorySessionStore, SessionStore};
use session_test_utils::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Wraps the in-memory store; every call fails while `down` is set.
#[derive(Default)]
struct FlakyStore {
    inner: InMemorySessionStore,
    down: AtomicBool,
}

impl FlakyStore {
    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), SessionError> {
        if self.down.load(Ordering::SeqCst) {
            Err(SessionError::Store(
                "connection refused (10.0.0.7:6379)".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SessionError> {
        self.check()?;
        self.inner.put(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.check()?;
        self.inner.take(key).await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, SessionError> {
        self.check()?;
        self.inner.ttl(key).await
    }
}

fn setup() -> Result<(SessionManager, Arc<FlakyStore>, Arc<InMemoryUserDirectory>), SessionError> {
    let store = Arc::new(FlakyStore::default());
    let directory = Arc::new(InMemoryUserDirectory::new());
    let manager = SessionManager::new(&test_config(), store.clone(), directory.clone())?;
    Ok((manager, store, directory))
}

fn assert_internal(err: &SessionError) {
    assert!(matches!(err, SessionError::Store(_)), "got {err:?}");
    assert_eq!(err.class(), ErrorClass::Internal);
    assert_eq!(err.class().status_code(), 500);
    assert!(!err.client_message().contains("10.0.0.7"));
}

#[tokio::test]
async fn test_gates_fail_closed_while_store_is_down() -> Result<(), anyhow::Error> {
    let (manager, store, directory) = setup()?;
    directory.with_user(TEST_EMAIL, TEST_PASSWORD, test_config().bcrypt_cost);
    let pair = manager.login(login_request(TEST_EMAIL, TEST_PASSWORD)).await?;
    let subject = manager.authenticate(&pair.access_token).await?;

    store.set_down(true);

    assert_internal(&manager.authenticate(&pair.access_token).await.unwrap_err());
    assert_internal(&manager.refresh(&pair.refresh_token).await.unwrap_err());
    assert_internal(
        &manager
            .logout(&subject, &pair.refresh_token)
            .await
            .unwrap_err(),
    );
    assert_internal(&manager.me(&subject).await.unwrap_err());
    assert_internal(
        &manager
            .login(login_request(TEST_EMAIL, TEST_PASSWORD))
            .await
            .unwrap_err(),
    );

    // Nothing was consumed while the store was down.
    store.set_down(false);
    manager.authenticate(&pair.access_token).await?;
    manager.refresh(&pair.refresh_token).await?;
    Ok(())
}

#[tokio::test]
async fn test_registration_does_not_touch_the_store() -> Result<(), anyhow::Error> {
    let (manager, store, _directory) = setup()?;
    store.set_down(true);

    let response = manager
        .register(register_request(TEST_EMAIL, TEST_PASSWORD))
        .await?;
    assert_eq!(response.data.email, TEST_EMAIL);
    Ok(())
}

#[tokio::test]
async fn test_error_response_hides_store_details() -> Result<(), anyhow::Error> {
    let (manager, store, _directory) = setup()?;
    store.set_down(true);

    let token = TestTokenBuilder::access().sign();
    let err = manager.authenticate(&token).await.unwrap_err();
    let body = serde_json::to_value(err.to_response())?;

    assert_eq!(body["error"]["code"], "STORE_ERROR");
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("10.0.0.7"));
    Ok(())
}
