//! Fixed test constants.
//!
//! Secrets are at least 32 bytes and differ from each other, so they pass
//! `Config` validation.

use secrecy::SecretString;
use session_service::config::{Config, LogFormat, DEFAULT_REDIS_URL, MIN_BCRYPT_COST};
use std::time::Duration;

pub const TEST_ACCESS_SECRET: &str = "test-access-secret-do-not-use-in-production";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-do-not-use-in-production";

/// A secret neither token class is signed with.
pub const TEST_FOREIGN_SECRET: &str = "test-foreign-secret-never-configured-anywhere";

pub const TEST_ACCESS_LIFETIME: Duration = Duration::from_secs(15 * 60);
pub const TEST_REFRESH_LIFETIME: Duration = Duration::from_secs(7 * 24 * 60 * 60);

// Users
pub const TEST_EMAIL: &str = "alice@example.com";
pub const TEST_EMAIL_BOB: &str = "bob@example.com";
pub const TEST_UNKNOWN_EMAIL: &str = "nobody@example.com";
pub const TEST_PASSWORD: &str = "Sup3r$ecret";
pub const TEST_WRONG_PASSWORD: &str = "Wr0ng$ecret";
pub const TEST_FIRST_NAME: &str = "Alice";
pub const TEST_LAST_NAME: &str = "Liddell";

/// Config with the test secrets, store TTLs equal to the lifetimes, and the
/// lowest accepted bcrypt cost.
pub fn test_config() -> Config {
    Config {
        access_secret: SecretString::from(TEST_ACCESS_SECRET),
        refresh_secret: SecretString::from(TEST_REFRESH_SECRET),
        access_token_lifetime: TEST_ACCESS_LIFETIME,
        access_store_ttl: TEST_ACCESS_LIFETIME,
        refresh_token_lifetime: TEST_REFRESH_LIFETIME,
        refresh_store_ttl: TEST_REFRESH_LIFETIME,
        bcrypt_cost: MIN_BCRYPT_COST,
        redis_url: DEFAULT_REDIS_URL.to_string(),
        database_url: None,
        log_format: LogFormat::Text,
    }
}
