//! Participant, track, and event fixtures.

use session_protocol::{
    LocalParticipant, Participant, RemoteParticipant, SessionEvent, TrackInfo, TrackSource,
};
use uuid::Uuid;

/// A fresh track sid.
fn sid(prefix: &str) -> String {
    format!("TR_{prefix}_{}", Uuid::new_v4())
}

/// A subscribed camera track.
pub fn camera_track() -> TrackInfo {
    TrackInfo::new(sid("cam"), TrackSource::Camera).subscribed()
}

/// A subscribed microphone track.
pub fn mic_track() -> TrackInfo {
    TrackInfo::new(sid("mic"), TrackSource::Microphone).subscribed()
}

/// A subscribed screen-share video track.
pub fn screenshare_track() -> TrackInfo {
    TrackInfo::new(sid("share"), TrackSource::Screenshare).subscribed()
}

/// A subscribed screen-share audio companion track.
pub fn screenshare_audio_track() -> TrackInfo {
    TrackInfo::new(sid("share_audio"), TrackSource::ScreenshareAudio).subscribed()
}

/// The local participant.
pub fn local(id: &str) -> LocalParticipant {
    LocalParticipant::new(id)
}

/// A remote participant with publish permission and no tracks.
pub fn remote(id: &str) -> RemoteParticipant {
    RemoteParticipant::new(id, true)
}

/// A remote participant publishing camera and microphone.
pub fn publisher(id: &str) -> RemoteParticipant {
    remote(id).with_track(camera_track()).with_track(mic_track())
}

/// A publishing remote participant who is also screen sharing.
pub fn screen_sharer(id: &str) -> RemoteParticipant {
    publisher(id).with_track(screenshare_track())
}

/// A `ParticipantJoined` event.
pub fn joined(participant: &RemoteParticipant) -> SessionEvent {
    SessionEvent::ParticipantJoined {
        participant: participant.clone(),
    }
}

/// A `ParticipantLeft` event.
pub fn left(participant: &RemoteParticipant) -> SessionEvent {
    SessionEvent::ParticipantLeft {
        participant: participant.clone(),
    }
}

/// A `TrackPublished` event.
pub fn published(participant: &RemoteParticipant, track: TrackInfo) -> SessionEvent {
    SessionEvent::TrackPublished {
        participant: participant.clone(),
        track,
    }
}

/// A `TrackUnpublished` event.
pub fn unpublished(participant: &RemoteParticipant, track: TrackInfo) -> SessionEvent {
    SessionEvent::TrackUnpublished {
        participant: participant.clone(),
        track,
    }
}

/// A `TrackSubscribed` event.
pub fn subscribed(participant: &RemoteParticipant, track: TrackInfo) -> SessionEvent {
    SessionEvent::TrackSubscribed {
        participant: participant.clone(),
        track,
    }
}

/// A `TrackUnsubscribed` event.
pub fn unsubscribed(participant: &RemoteParticipant, track: TrackInfo) -> SessionEvent {
    SessionEvent::TrackUnsubscribed {
        participant: participant.clone(),
        track,
    }
}

/// An `ActiveSpeakersChanged` event naming remote speakers.
pub fn speakers(participants: &[&RemoteParticipant]) -> SessionEvent {
    SessionEvent::ActiveSpeakersChanged {
        speakers: participants
            .iter()
            .map(|p| Participant::Remote((*p).clone()))
            .collect(),
    }
}
