//! Registration input rules.

use crate::errors::SessionError;
use crate::models::RegisterRequest;
use secrecy::ExposeSecret;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 16;

const PASSWORD_RULES_MESSAGE: &str = "The password must contain at least one digit, one lowercase letter, one uppercase letter, one special character, no spaces, and must be between 8 to 16 characters in length.";

/// Validate a registration request, returning the first violation.
pub fn validate_registration(request: &RegisterRequest) -> Result<(), SessionError> {
    if !is_valid_email(&request.email) {
        return Err(SessionError::Validation("Invalid email format".to_string()));
    }

    if request.first_name.trim().is_empty() {
        return Err(SessionError::Validation(
            "First name cannot be empty".to_string(),
        ));
    }

    if request.last_name.trim().is_empty() {
        return Err(SessionError::Validation(
            "Last name cannot be empty".to_string(),
        ));
    }

    if !is_valid_password(request.password.expose_secret()) {
        return Err(SessionError::Validation(PASSWORD_RULES_MESSAGE.to_string()));
    }

    Ok(())
}

/// Basic shape check: one `@`, non-empty local part, dotted domain with no
/// empty labels and an alphabetic top-level label of two or more letters,
/// no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }

    labels.last().is_some_and(|tld| {
        tld.chars().count() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
    })
}

/// 8-16 characters with at least one digit, lowercase letter, uppercase
/// letter and non-word character, and no spaces or line breaks.
pub fn is_valid_password(password: &str) -> bool {
    let length = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return false;
    }

    if password.chars().any(|c| c == ' ' || c == '\n' || c == '\r') {
        return false;
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '_'));

    has_digit && has_lower && has_upper && has_special
}
