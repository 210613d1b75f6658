use crate::crypto::TokenError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    /// Any access/refresh gate failure. The reason is for logs only and is
    /// never shown to the caller.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Session store error: {0}")]
    Store(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

/// Response class of an error, independent of any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorClass {
    /// Conventional HTTP status for this class.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::BadRequest => 400,
            ErrorClass::Unauthorized => 401,
            ErrorClass::NotFound => 404,
            ErrorClass::Conflict => 409,
            ErrorClass::Internal => 500,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl SessionError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SessionError::InvalidCredentials | SessionError::Unauthorized(_) => {
                ErrorClass::Unauthorized
            }
            SessionError::EmailTaken => ErrorClass::Conflict,
            SessionError::UserNotFound | SessionError::NotFound(_) => ErrorClass::NotFound,
            SessionError::Validation(_) => ErrorClass::BadRequest,
            SessionError::Store(_)
            | SessionError::Directory(_)
            | SessionError::Crypto(_)
            | SessionError::Internal => ErrorClass::Internal,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::InvalidCredentials => "INVALID_CREDENTIALS",
            SessionError::EmailTaken => "EMAIL_TAKEN",
            SessionError::Unauthorized(_) => "UNAUTHORIZED",
            SessionError::UserNotFound => "USER_NOT_FOUND",
            SessionError::NotFound(_) => "NOT_FOUND",
            SessionError::Validation(_) => "VALIDATION_ERROR",
            SessionError::Store(_) => "STORE_ERROR",
            SessionError::Directory(_) => "DIRECTORY_ERROR",
            SessionError::Crypto(_) => "CRYPTO_ERROR",
            SessionError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Message that is safe to return to a client.
    ///
    /// Internal failures are collapsed to a generic message; their details
    /// belong in logs.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::InvalidCredentials => "Invalid email or password".to_string(),
            SessionError::EmailTaken => "This email has already been used".to_string(),
            SessionError::Unauthorized(_) => "Unauthorized".to_string(),
            SessionError::UserNotFound => "User does not exist".to_string(),
            SessionError::NotFound(msg) | SessionError::Validation(msg) => msg.clone(),
            SessionError::Store(_) => "An internal session store error occurred".to_string(),
            SessionError::Directory(_) => "An internal directory error occurred".to_string(),
            SessionError::Crypto(_) => "An internal cryptographic error occurred".to_string(),
            SessionError::Internal => "An internal error occurred".to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.client_message(),
            },
        }
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(reason) => SessionError::Crypto(reason),
            other => SessionError::Unauthorized(other.to_string()),
        }
    }
}
