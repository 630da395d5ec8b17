//! Identifier newtypes for Limelight components.
//!
//! Identifiers are issued by the media transport and are opaque to this
//! system: session-unique strings, stable for the lifetime of a connection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a participant connection.
///
/// Stable across the participant's reconnect-free lifetime; a participant
/// that leaves and rejoins receives a new identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// View the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a published media track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackSid(pub String);

impl TrackSid {
    /// View the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackSid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TrackSid {
    fn from(value: String) -> Self {
        Self(value)
    }
}
