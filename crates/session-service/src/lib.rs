//! Session Service Library
//!
//! Session and token lifecycle for a multi-user service: credential
//! verification, access/refresh token issuance, bearer validation with
//! server-side revocation, and single-use refresh rotation.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Password hashing and the access/refresh token codec
//! - `directory` - User directory collaborator (trait + PostgreSQL implementation)
//! - `errors` - Error types
//! - `models` - Client-facing request and response shapes
//! - `observability` - Tracing setup, log correlation hashing, metrics
//! - `services` - Session manager (business logic layer)
//! - `store` - TTL session store (trait + Redis and in-memory implementations)

pub mod config;
pub mod crypto;
pub mod directory;
pub mod errors;
pub mod models;
pub mod observability;
pub mod services;
pub mod store;
