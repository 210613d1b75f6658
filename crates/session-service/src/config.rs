use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default bcrypt cost factor (2^10 iterations).
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Lowest accepted bcrypt cost.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Highest accepted bcrypt cost. Beyond this login latency exceeds ~800ms.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Minimum length of each HS256 signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// HS256 key for access tokens (`ACCESS_SECRET`).
    pub access_secret: SecretString,
    /// HS256 key for refresh tokens (`REFRESH_SECRET`).
    pub refresh_secret: SecretString,
    /// Lifetime embedded in access tokens as `exp - iat`.
    pub access_token_lifetime: Duration,
    /// TTL of the access-nonce entry in the session store.
    pub access_store_ttl: Duration,
    /// Lifetime embedded in refresh tokens as `exp - iat`.
    pub refresh_token_lifetime: Duration,
    /// TTL of the refresh-token entry in the session store.
    pub refresh_store_ttl: Duration,
    pub bcrypt_cost: u32,
    pub redis_url: String,
    pub database_url: Option<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid signing secret: {0}")]
    InvalidSecret(String),

    #[error("Invalid lifetime: {0}")]
    InvalidLifetime(String),

    #[error("Invalid bcrypt cost: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let access_secret = required_secret(vars, "ACCESS_SECRET")?;
        let refresh_secret = required_secret(vars, "REFRESH_SECRET")?;

        if access_secret.expose_secret() == refresh_secret.expose_secret() {
            return Err(ConfigError::InvalidSecret(
                "ACCESS_SECRET and REFRESH_SECRET must differ".to_string(),
            ));
        }

        let access_token_lifetime = required_lifetime(vars, "AT_EXPIRES_IN")?;
        let refresh_token_lifetime = required_lifetime(vars, "RT_EXPIRES_IN")?;

        if refresh_token_lifetime <= access_token_lifetime {
            return Err(ConfigError::InvalidLifetime(format!(
                "RT_EXPIRES_IN ({}s) must be longer than AT_EXPIRES_IN ({}s)",
                refresh_token_lifetime.as_secs(),
                access_token_lifetime.as_secs()
            )));
        }

        let access_store_ttl =
            optional_ttl_ms(vars, "AT_EXPIRES_IN_MS")?.unwrap_or(access_token_lifetime);
        let refresh_store_ttl =
            optional_ttl_ms(vars, "RT_EXPIRES_IN_MS")?.unwrap_or(refresh_token_lifetime);

        // A mismatch is permitted.
        if access_store_ttl.as_secs() != access_token_lifetime.as_secs() {
            tracing::warn!(
                target: "session.config",
                token_lifetime_secs = access_token_lifetime.as_secs(),
                store_ttl_secs = access_store_ttl.as_secs(),
                "Access store TTL does not match access token lifetime"
            );
        }
        if refresh_store_ttl.as_secs() != refresh_token_lifetime.as_secs() {
            tracing::warn!(
                target: "session.config",
                token_lifetime_secs = refresh_token_lifetime.as_secs(),
                store_ttl_secs = refresh_store_ttl.as_secs(),
                "Refresh store TTL does not match refresh token lifetime"
            );
        }

        let bcrypt_cost = match vars.get("BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw.parse().map_err(|_| {
                    ConfigError::InvalidBcryptCost(format!("'{}' is not a number", raw))
                })?;
                if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                    return Err(ConfigError::InvalidBcryptCost(format!(
                        "{} (must be {}-{})",
                        cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
                    )));
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let redis_url = vars
            .get("REDIS_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());

        let database_url = vars.get("DATABASE_URL").cloned();

        let log_format = match vars.get("LOG_FORMAT").map(|s| s.to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(f) if f == "text" => LogFormat::Text,
            Some(f) if f == "json" => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other)),
        };

        Ok(Config {
            access_secret,
            refresh_secret,
            access_token_lifetime,
            access_store_ttl,
            refresh_token_lifetime,
            refresh_store_ttl,
            bcrypt_cost,
            redis_url,
            database_url,
            log_format,
        })
    }
}

fn required_secret(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<SecretString, ConfigError> {
    let value = vars
        .get(name)
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;

    if value.len() < MIN_SECRET_BYTES {
        return Err(ConfigError::InvalidSecret(format!(
            "{} must be at least {} bytes, got {}",
            name,
            MIN_SECRET_BYTES,
            value.len()
        )));
    }

    Ok(SecretString::from(value.as_str()))
}

fn required_lifetime(vars: &HashMap<String, String>, name: &str) -> Result<Duration, ConfigError> {
    let raw = vars
        .get(name)
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;

    parse_lifetime(raw).map_err(|reason| ConfigError::InvalidLifetime(format!("{name}: {reason}")))
}

fn optional_ttl_ms(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(None);
    };

    let millis: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidLifetime(format!("{name}: '{raw}' is not a number")))?;

    if millis == 0 {
        return Err(ConfigError::InvalidLifetime(format!(
            "{name}: must be greater than zero"
        )));
    }

    Ok(Some(Duration::from_millis(millis)))
}

/// Parse a token lifetime.
///
/// Accepts a bare number of seconds (`"900"`) or a number with a single unit
/// suffix: `s`, `m`, `h` or `d` (`"15m"`, `"7d"`). Zero is rejected.
pub fn parse_lifetime(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split_at = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split_at);

    if digits.is_empty() {
        return Err(format!("'{raw}' does not start with a number"));
    }

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("'{digits}' is out of range"))?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => return Err(format!("unknown unit '{other}'")),
    };

    let seconds = amount
        .checked_mul(multiplier)
        .ok_or_else(|| format!("'{raw}' is out of range"))?;

    if seconds == 0 {
        return Err("must be greater than zero".to_string());
    }

    Ok(Duration::from_secs(seconds))
}
