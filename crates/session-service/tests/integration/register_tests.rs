//! Registration: input rules, duplicate detection, stored hash.

use session_service::crypto::verify_password;
use session_service::directory::UserDirectory;
use session_service::errors::{ErrorClass, SessionError};
use session_test_utils::*;

#[tokio::test]
async fn test_register_returns_public_profile() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;

    let response = harness.register(TEST_EMAIL).await?;

    assert_eq!(response.message, "Register successfully.");
    assert_eq!(response.data.email, TEST_EMAIL);
    assert_eq!(response.data.first_name, TEST_FIRST_NAME);
    assert_eq!(response.data.last_name, TEST_LAST_NAME);
    assert!(response.data.avatar.is_none());

    let json = serde_json::to_value(&response)?;
    assert_eq!(json["message"], "Register successfully.");
    assert_eq!(json["data"]["firstName"], TEST_FIRST_NAME);
    assert!(json["data"].get("passwordHash").is_none());
    assert!(json["data"].get("password").is_none());

    Ok(())
}

#[tokio::test]
async fn test_register_stores_bcrypt_hash() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    harness.register(TEST_EMAIL).await?;

    let record = harness
        .directory
        .find_by_email(TEST_EMAIL)
        .await?
        .expect("registered user");

    assert_ne!(record.password_hash, TEST_PASSWORD);
    assert!(record.password_hash.starts_with("$2b$10$"));
    assert!(verify_password(TEST_PASSWORD, &record.password_hash));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_registration_is_email_taken() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    harness.register(TEST_EMAIL).await?;

    for password in [TEST_PASSWORD, "0ther$Ecret"] {
        let result = harness
            .manager
            .register(register_request(TEST_EMAIL, password))
            .await;

        let err = result.expect_err("second registration must fail");
        assert!(matches!(err, SessionError::EmailTaken));
        assert_eq!(err.class(), ErrorClass::Conflict);
        assert_eq!(err.client_message(), "This email has already been used");
    }
    assert_eq!(harness.directory.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_taken_email_with_weak_password() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    harness.register(TEST_EMAIL).await?;

    let err = harness
        .manager
        .register(register_request(TEST_EMAIL, "0ther$ecret"))
        .await
        .expect_err("weak password must be rejected");

    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(err.class(), ErrorClass::BadRequest);
    assert_eq!(harness.directory.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_invalid_input() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;

    let cases = [
        register_request("not-an-email", TEST_PASSWORD),
        register_request(TEST_EMAIL, "short1!"),
        register_request(TEST_EMAIL, "nouppercase1!"),
        register_request(TEST_EMAIL, "Has Space1!"),
    ];

    for request in cases {
        let err = harness
            .manager
            .register(request)
            .await
            .expect_err("invalid input must fail");
        assert!(matches!(err, SessionError::Validation(_)), "got {err:?}");
        assert_eq!(err.class(), ErrorClass::BadRequest);
    }

    let mut blank_name = register_request(TEST_EMAIL, TEST_PASSWORD);
    blank_name.first_name = String::new();
    let err = harness
        .manager
        .register(blank_name)
        .await
        .expect_err("blank first name must fail");
    assert!(matches!(err, SessionError::Validation(_)));

    assert!(harness.directory.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_register_does_not_open_a_session() -> Result<(), anyhow::Error> {
    let harness = TestSessionHarness::new()?;
    harness.register(TEST_EMAIL).await?;

    assert!(harness.store.is_empty().await);
    Ok(())
}
