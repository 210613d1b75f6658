//! Session manager test harness.
//!
//! Wires a `SessionManager` to an `InMemorySessionStore` and an
//! `InMemoryUserDirectory`, keeping typed handles to both so tests can
//! inspect or tamper with them.
//!
//! # Example
//!
//! ```rust,ignore
//! let harness = TestSessionHarness::new()?;
//! let pair = harness.register_and_login(TEST_EMAIL).await?;
//!
//! let subject = harness.manager.authenticate(&pair.access_token).await?;
//! ```

use crate::mock_directory::InMemoryUserDirectory;
use crate::test_ids::{test_config, TEST_FIRST_NAME, TEST_LAST_NAME, TEST_PASSWORD};
use secrecy::SecretString;
use session_service::config::Config;
use session_service::errors::SessionError;
use session_service::models::{LoginRequest, RegisterRequest, RegisterResponse, TokenPairResponse};
use session_service::services::SessionManager;
use session_service::store::InMemorySessionStore;
use std::sync::Arc;

pub struct TestSessionHarness {
    pub manager: Arc<SessionManager>,
    pub store: Arc<InMemorySessionStore>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub config: Config,
}

impl TestSessionHarness {
    pub fn new() -> Result<Self, SessionError> {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Result<Self, SessionError> {
        let store = Arc::new(InMemorySessionStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let manager = SessionManager::new(&config, store.clone(), directory.clone())?;

        Ok(Self {
            manager: Arc::new(manager),
            store,
            directory,
            config,
        })
    }

    /// Register `email` with `TEST_PASSWORD` and the test names.
    pub async fn register(&self, email: &str) -> Result<RegisterResponse, SessionError> {
        self.manager.register(register_request(email, TEST_PASSWORD)).await
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenPairResponse, SessionError> {
        self.manager.login(login_request(email, password)).await
    }

    /// Register `email` and log it in with `TEST_PASSWORD`.
    pub async fn register_and_login(&self, email: &str) -> Result<TokenPairResponse, SessionError> {
        self.register(email).await?;
        self.login(email, TEST_PASSWORD).await
    }
}

pub fn register_request(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: SecretString::from(password),
        first_name: TEST_FIRST_NAME.to_string(),
        last_name: TEST_LAST_NAME.to_string(),
    }
}

pub fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: SecretString::from(password),
    }
}
