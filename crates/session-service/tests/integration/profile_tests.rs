//! Profile reads and forced revocation.

use session_service::errors::{ErrorClass, SessionError};
use session_test_utils::*;

#[tokio::test]
async fn test_me_returns_profile() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let registered = harness.register(TEST_EMAIL).await?;
    let pair = harness.login(TEST_EMAIL, TEST_PASSWORD).await?;
    let subject = harness.manager.authenticate(&pair.access_token).await?;

    let me = harness.manager.me(&subject).await?;

    assert_eq!(me.data, registered.data);
    let json = serde_json::to_value(&me)?;
    assert_eq!(json["data"]["email"], TEST_EMAIL);
    assert!(json["data"].get("passwordHash").is_none());
    Ok(())
}

#[tokio::test]
async fn test_me_after_logout_is_unauthorized() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;
    let subject = harness.manager.authenticate(&pair.access_token).await?;

    harness.manager.logout(&subject, &pair.refresh_token).await?;

    let result = harness.manager.me(&subject).await;
    assert!(matches!(result, Err(SessionError::Unauthorized(_))));
    Ok(())
}

#[tokio::test]
async fn test_profile_by_id() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;
    let bob = harness.register(TEST_EMAIL_BOB).await?;
    let subject = harness.manager.authenticate(&pair.access_token).await?;

    let profile = harness.manager.profile_by_id(&subject, bob.data.id).await?;
    assert_eq!(profile.data.email, TEST_EMAIL_BOB);

    let missing = bob.data.id + 100;
    let err = harness
        .manager
        .profile_by_id(&subject, missing)
        .await
        .expect_err("no such user");
    assert_eq!(err.class(), ErrorClass::NotFound);
    assert_eq!(
        err.client_message(),
        format!("Cannot find user with id: {missing}")
    );
    Ok(())
}

#[tokio::test]
async fn test_profile_by_id_requires_live_nonce() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;
    let subject = harness.manager.authenticate(&pair.access_token).await?;

    harness.manager.revoke_access(&subject.nonce).await?;

    let result = harness.manager.profile_by_id(&subject, subject.id).await;
    assert!(matches!(result, Err(SessionError::Unauthorized(_))));
    Ok(())
}

#[tokio::test]
async fn test_revoke_access_is_idempotent() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;
    let subject = harness.manager.authenticate(&pair.access_token).await?;

    harness.manager.revoke_access(&subject.nonce).await?;
    harness.manager.revoke_access(&subject.nonce).await?;

    let result = harness.manager.authenticate(&pair.access_token).await;
    assert!(matches!(result, Err(SessionError::Unauthorized(_))));
    // The refresh side is independent.
    harness.manager.refresh(&pair.refresh_token).await?;
    Ok(())
}

#[tokio::test]
async fn test_revoke_refresh_is_idempotent() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;

    harness.manager.revoke_refresh(&pair.refresh_token).await?;
    harness.manager.revoke_refresh(&pair.refresh_token).await?;

    let result = harness.manager.refresh(&pair.refresh_token).await;
    assert!(matches!(result, Err(SessionError::Unauthorized(_))));
    harness.manager.authenticate(&pair.access_token).await?;
    Ok(())
}

#[tokio::test]
async fn test_me_for_removed_user_is_user_not_found() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    let pair = harness.register_and_login(TEST_EMAIL).await?;
    let subject = harness.manager.authenticate(&pair.access_token).await?;

    assert!(harness.directory.remove_by_email(TEST_EMAIL));

    let err = harness.manager.me(&subject).await.expect_err("user is gone");
    assert!(matches!(err, SessionError::UserNotFound));
    assert_eq!(err.class(), ErrorClass::NotFound);
    // The session itself is still live.
    harness.manager.authenticate(&pair.access_token).await?;
    Ok(())
}
