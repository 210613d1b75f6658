//! Observability for the session service.
//!
//! # Privacy by Default
//!
//! Every operation uses `#[instrument(skip_all)]` and records only allow-listed
//! fields:
//! - **SAFE**: outcomes, error classes, operation names
//! - **HASHED**: subject ids and emails, via [`hash_for_correlation`]
//! - **NEVER**: passwords, tokens, nonces, secrets

pub mod metrics;

use crate::config::LogFormat;
use crate::errors::ErrorClass;
use sha2::{Digest, Sha256};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "session_service=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way and truncated; for correlating log lines, not for protecting
/// secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Bounded label for an error class.
pub fn error_class_label(class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::BadRequest => "bad_request",
        ErrorClass::Unauthorized => "unauthorized",
        ErrorClass::NotFound => "not_found",
        ErrorClass::Conflict => "conflict",
        ErrorClass::Internal => "internal",
    }
}
