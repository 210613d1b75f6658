//! Metrics for the session service.
//!
//! - `session_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! - `status`: success, error
//! - `error_class`: none plus the five error classes
//! - `operation`: hash, verify (bcrypt only)

use crate::errors::SessionError;
use crate::observability::error_class_label;
use metrics::{counter, histogram};
use std::time::Duration;

fn outcome_labels<T>(result: &Result<T, SessionError>) -> (&'static str, &'static str) {
    match result {
        Ok(_) => ("success", "none"),
        Err(e) => ("error", error_class_label(e.class())),
    }
}

fn record_outcome<T>(name: &'static str, result: &Result<T, SessionError>) {
    let (status, error_class) = outcome_labels(result);
    counter!(name, "status" => status, "error_class" => error_class).increment(1);
}

/// Metric: `session_registrations_total`
pub fn record_registration<T>(result: &Result<T, SessionError>) {
    record_outcome("session_registrations_total", result);
}

/// Metric: `session_logins_total`
pub fn record_login<T>(result: &Result<T, SessionError>) {
    record_outcome("session_logins_total", result);
}

/// Metric: `session_authentications_total`
pub fn record_authentication<T>(result: &Result<T, SessionError>) {
    record_outcome("session_authentications_total", result);
}

/// Metric: `session_logouts_total`
pub fn record_logout<T>(result: &Result<T, SessionError>) {
    record_outcome("session_logouts_total", result);
}

/// Metric: `session_refreshes_total`
pub fn record_refresh<T>(result: &Result<T, SessionError>) {
    record_outcome("session_refreshes_total", result);
}

/// Metric: `session_revocations_total`
/// Labels: `kind` (access, refresh)
pub fn record_revocation(kind: &'static str) {
    counter!("session_revocations_total", "kind" => kind).increment(1);
}

/// Record bcrypt operation duration.
///
/// Metric: `session_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &'static str, duration: Duration) {
    histogram!("session_bcrypt_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}
