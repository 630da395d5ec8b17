//! Stage controller error types.
//!
//! The stage runs inside a render loop: boundary conditions degrade into
//! defined states (empty rosters, zero-area tiles, logged no-ops) instead of
//! propagating. The errors here cover the only genuinely fallible surface,
//! talking to the stage actor.

use thiserror::Error;

/// Stage controller error type.
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage actor has shut down and its mailbox is closed.
    #[error("Stage terminated")]
    Terminated,

    /// Internal error (a reply channel was dropped mid-request).
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formatting() {
        assert_eq!(StageError::Terminated.to_string(), "Stage terminated");
        assert_eq!(
            StageError::Internal("reply dropped".to_string()).to_string(),
            "Internal error: reply dropped"
        );
    }
}
