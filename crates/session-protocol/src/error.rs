//! Session error taxonomy.
//!
//! Session failures are terminal from the stage core's perspective: a
//! failed construction or join is reported once and never retried by the
//! core (reconnection, if any, is the transport's responsibility).

use thiserror::Error;

/// Errors surfaced by the media session boundary.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The session object could not be constructed (e.g. malformed
    /// credentials). Reported once; event wiring is skipped entirely.
    #[error("Invalid session credentials: {0}")]
    InvalidCredentials(String),

    /// The asynchronous join was rejected by the transport.
    #[error("Session connect failed: {0}")]
    ConnectFailed(String),

    /// The transport dropped the connect completion without resolving it.
    #[error("Session closed before join completed")]
    Closed,
}
