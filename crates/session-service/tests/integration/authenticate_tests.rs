//! Authenticate: signature/expiry gate plus nonce presence gate.

use session_service::errors::{ErrorClass, SessionError};
use session_service::store::{SessionStore, ACCESS_MARKER};
use session_test_utils::*;
use std::time::Duration;
use uuid::Uuid;

fn assert_unauthorized(result: Result<impl std::fmt::Debug, SessionError>) {
    match result {
        Err(err @ SessionError::Unauthorized(_)) => {
            assert_eq!(err.class(), ErrorClass::Unauthorized);
            assert_eq!(err.client_message(), "Unauthorized");
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_authenticate_returns_subject() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let registered = harness.register(TEST_EMAIL).await?;
    let pair = harness.login(TEST_EMAIL, TEST_PASSWORD).await?;

    let subject = harness.manager.authenticate(&pair.access_token).await?;

    assert_eq!(subject.id, registered.data.id);
    assert_eq!(subject.email, TEST_EMAIL);
    assert_eq!(subject.nonce, jwt_nonce(&pair.access_token));
    Ok(())
}

#[tokio::test]
async fn test_authenticate_bearer_header() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;

    let header = format!("Bearer {}", pair.access_token);
    let subject = harness.manager.authenticate_bearer(&header).await?;
    assert_eq!(subject.email, TEST_EMAIL);

    for header in [
        String::new(),
        "Bearer ".to_string(),
        pair.access_token.clone(),
        format!("Basic {}", pair.access_token),
    ] {
        assert_unauthorized(harness.manager.authenticate_bearer(&header).await);
    }
    Ok(())
}

#[tokio::test]
async fn test_authenticate_rejects_expired_token() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let nonce = Uuid::new_v4();
    // Nonce is live, so only the expiry check can reject.
    harness
        .store
        .put(&nonce.to_string(), ACCESS_MARKER, Duration::from_secs(60))
        .await?;

    let token = TestTokenBuilder::access().with_nonce(nonce).expired().sign();

    assert_unauthorized(harness.manager.authenticate(&token).await);
    Ok(())
}

#[tokio::test]
async fn test_authenticate_rejects_foreign_signature() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let nonce = Uuid::new_v4();
    harness
        .store
        .put(&nonce.to_string(), ACCESS_MARKER, Duration::from_secs(60))
        .await?;

    let forged = TestTokenBuilder::access()
        .with_nonce(nonce)
        .signed_with(TEST_FOREIGN_SECRET)
        .sign();
    assert_unauthorized(harness.manager.authenticate(&forged).await);

    let wrong_class = TestTokenBuilder::access()
        .with_nonce(nonce)
        .signed_with(TEST_REFRESH_SECRET)
        .sign();
    assert_unauthorized(harness.manager.authenticate(&wrong_class).await);
    Ok(())
}

#[tokio::test]
async fn test_authenticate_rejects_refresh_token() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;

    assert_unauthorized(harness.manager.authenticate(&pair.refresh_token).await);
    Ok(())
}

#[tokio::test]
async fn test_authenticate_rejects_unregistered_nonce() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;

    // Correctly signed and unexpired, but never issued by a login.
    let token = TestTokenBuilder::access().sign();

    assert_unauthorized(harness.manager.authenticate(&token).await);
    Ok(())
}

#[tokio::test]
async fn test_authenticate_rejects_malformed_tokens() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;

    let missing_nonce = TestTokenBuilder::access().without_claim("uuid").sign();
    let hs512 = TestTokenBuilder::access()
        .with_algorithm(jsonwebtoken::Algorithm::HS512)
        .sign();

    for token in [
        "".to_string(),
        "garbage".to_string(),
        "a.b.c".to_string(),
        missing_nonce,
        hs512,
        "x".repeat(5000),
    ] {
        assert_unauthorized(harness.manager.authenticate(&token).await);
    }
    Ok(())
}

#[tokio::test]
async fn test_authenticate_fails_once_nonce_entry_expires() -> Result<(), anyhow::Error> {
    let mut config = test_config();
    config.access_store_ttl = Duration::from_secs(30);
    let harness = TestSessionHarness::with_config(config)?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;

    tokio::time::pause();
    harness.manager.authenticate(&pair.access_token).await?;

    // The token itself is valid for 15 minutes; only the store entry lapses.
    tokio::time::advance(Duration::from_secs(31)).await;
    assert_unauthorized(harness.manager.authenticate(&pair.access_token).await);
    Ok(())
}

#[tokio::test]
async fn test_authenticate_does_not_consume_nonce() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;

    for _ in 0..3 {
        harness.manager.authenticate(&pair.access_token).await?;
    }
    Ok(())
}
