//! Cryptographic primitives: password hashing and the token codec.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{AccessClaims, RefreshClaims, TokenCodec, TokenError, Verified};
