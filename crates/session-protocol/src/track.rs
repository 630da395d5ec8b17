//! Published media track descriptors.

use common::TrackSid;
use serde::{Deserialize, Serialize};

/// Origin of a published track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackSource {
    /// Participant microphone audio
    Microphone,
    /// Participant camera video
    Camera,
    /// Screen-share video
    Screenshare,
    /// Audio captured alongside a screen-share
    ScreenshareAudio,
}

impl TrackSource {
    /// Whether tracks from this source carry video.
    #[must_use]
    pub const fn is_video(self) -> bool {
        matches!(self, TrackSource::Camera | TrackSource::Screenshare)
    }

    /// Whether tracks from this source carry audio.
    #[must_use]
    pub const fn is_audio(self) -> bool {
        matches!(self, TrackSource::Microphone | TrackSource::ScreenshareAudio)
    }
}

/// A live published track, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Transport-issued track identifier.
    pub sid: TrackSid,
    /// Origin of the track.
    pub source: TrackSource,
    /// Whether the local client is subscribed to this track.
    pub subscribed: bool,
}

impl TrackInfo {
    /// Create a descriptor for a newly published, unsubscribed track.
    #[must_use]
    pub fn new(sid: impl Into<TrackSid>, source: TrackSource) -> Self {
        Self {
            sid: sid.into(),
            source,
            subscribed: false,
        }
    }

    /// Mark the track as subscribed.
    #[must_use]
    pub fn subscribed(mut self) -> Self {
        self.subscribed = true;
        self
    }

    /// Whether this track carries video.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.source.is_video()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_source_classification() {
        assert!(TrackSource::Camera.is_video());
        assert!(TrackSource::Screenshare.is_video());
        assert!(!TrackSource::Microphone.is_video());
        assert!(TrackSource::Microphone.is_audio());
        assert!(TrackSource::ScreenshareAudio.is_audio());
        assert!(!TrackSource::ScreenshareAudio.is_video());
    }

    #[test]
    fn test_new_track_starts_unsubscribed() {
        let track = TrackInfo::new("TR_1", TrackSource::Camera);
        assert!(!track.subscribed);
        assert!(track.subscribed().subscribed);
    }
}
