//! # Session Test Utilities
//!
//! Shared test utilities for the session service.
//!
//! This crate provides:
//! - An in-memory user directory (`InMemoryUserDirectory`)
//! - Fixed test constants and a ready-made `Config`
//! - Raw JWT builders for forged, expired or hand-shaped tokens
//! - Custom assertions (`TokenAssertions` trait)
//! - A harness wiring manager, store and directory (`TestSessionHarness`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let harness = TestSessionHarness::new()?;
//!     let pair = harness.register_and_login(TEST_EMAIL).await?;
//!
//!     pair.access_token.assert_hs256().assert_for_subject(1);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod harness;
pub mod mock_directory;
pub mod test_ids;
pub mod token_builders;

pub use assertions::*;
pub use harness::*;
pub use mock_directory::*;
pub use test_ids::*;
pub use token_builders::*;
