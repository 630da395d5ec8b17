//! # Stage Test Utilities
//!
//! Shared test utilities for the Limelight stage controller.
//!
//! ## Modules
//!
//! - `fake_session` - Scripted in-memory [`session_protocol::MediaSession`]
//!   with an emit handle and subscription accounting
//! - `fixtures` - Participant, track, and event builders
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stage_test_utils::{fixtures, FakeSession};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let (session, driver) = FakeSession::connected(fixtures::local("me"));
//!     // hand `session` to the stage, then drive it:
//!     driver.emit(fixtures::joined(&fixtures::publisher("alice"))).await;
//! }
//! ```

pub mod fake_session;
pub mod fixtures;

pub use fake_session::{FakeSession, FakeSessionHandle};
