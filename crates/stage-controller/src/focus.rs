//! Active-speaker and screen-share focus selection.
//!
//! Two independent focus tracks layered above the roster:
//!
//! - the **speaker track** follows `ActiveSpeakersChanged` reports, keeping
//!   the current focus while it is still speaking (stability over churn) and
//!   otherwise switching to the first reported remote speaker;
//! - the **share track** follows `Screenshare` subscriptions: the first
//!   sharer wins, concurrent sharers are ignored until the focused share
//!   stops.
//!
//! Both tracks hold references, not ownership. Whenever the referenced
//! participant drops off the roster, the track re-runs its default selection
//! in the same event-processing step; a focus reference never dangles.

use crate::roster::RosterStore;
use common::{ParticipantId, TrackSid};
use serde::{Deserialize, Serialize};
use session_protocol::{
    LocalParticipant, RemoteParticipant, SessionEvent, TrackInfo, TrackSource,
};
use tracing::{debug, error, warn};

/// The focused screen share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareFocus {
    /// Sharing participant.
    pub participant_id: ParticipantId,
    /// The screen-share video track.
    pub track_sid: TrackSid,
    /// Whether the share belongs to the local participant.
    pub is_local: bool,
}

/// Read-only focus state handed to the render tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSnapshot {
    /// Participant presented large in speaker-focused arrangements.
    pub active_speaker: Option<ParticipantId>,
    /// Currently focused screen share, if any.
    pub active_screen_share: Option<ShareFocus>,
    /// Companion audio track of the focused share, if published.
    pub screen_share_audio: Option<TrackSid>,
}

/// Speaker and screen-share focus state machine.
#[derive(Debug, Default)]
pub struct FocusSelector {
    active_speaker: Option<ParticipantId>,
    active_share: Option<ShareFocus>,
    share_audio: Option<TrackSid>,
}

impl FocusSelector {
    /// Create an empty selector (both tracks unset).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently focused speaker.
    #[must_use]
    pub fn active_speaker(&self) -> Option<&ParticipantId> {
        self.active_speaker.as_ref()
    }

    /// Currently focused screen share.
    #[must_use]
    pub fn active_share(&self) -> Option<&ShareFocus> {
        self.active_share.as_ref()
    }

    /// Companion audio track of the focused share.
    #[must_use]
    pub fn share_audio(&self) -> Option<&TrackSid> {
        self.share_audio.as_ref()
    }

    /// Read-only snapshot of both tracks.
    #[must_use]
    pub fn snapshot(&self) -> FocusSnapshot {
        FocusSnapshot {
            active_speaker: self.active_speaker.clone(),
            active_screen_share: self.active_share.clone(),
            screen_share_audio: self.share_audio.clone(),
        }
    }

    /// Observe one session event, after the roster has applied it.
    pub fn observe(&mut self, event: &SessionEvent, roster: &RosterStore) {
        match event {
            SessionEvent::ActiveSpeakersChanged { speakers } => {
                self.handle_speakers_changed(speakers, roster);
            }
            SessionEvent::TrackSubscribed { participant, track } => {
                self.handle_track_subscribed(participant, track);
            }
            SessionEvent::TrackUnsubscribed { participant, track }
            | SessionEvent::TrackUnpublished { participant, track } => {
                self.handle_track_removed(participant, track, roster);
            }
            SessionEvent::ParticipantLeft { participant } => {
                self.handle_participant_left(&participant.id, roster);
            }
            _ => {}
        }

        // A participant can also exit the roster through the unpublish
        // rule; whatever the event was, focused references must still
        // resolve against the roster afterwards.
        self.ensure_live(roster);
        self.ensure_default(roster);
    }

    /// Reset both tracks (session teardown).
    pub fn clear(&mut self) {
        self.active_speaker = None;
        self.active_share = None;
        self.share_audio = None;
    }

    fn handle_speakers_changed(
        &mut self,
        speakers: &[session_protocol::Participant],
        roster: &RosterStore,
    ) {
        if let Some(current) = &self.active_speaker {
            if speakers.iter().any(|s| s.id() == current) {
                // Still speaking; stability preferred over churn.
                return;
            }
        }

        let new_speaker = speakers
            .iter()
            .filter_map(session_protocol::Participant::as_remote)
            .find(|p| roster.contains(&p.id));

        if let Some(speaker) = new_speaker {
            debug!(
                target: "stage.focus",
                participant_id = %speaker.id,
                "Active speaker focus changed"
            );
            self.active_speaker = Some(speaker.id.clone());

            if let Some(track) = speaker.screen_share_track() {
                self.active_share = Some(ShareFocus {
                    participant_id: speaker.id.clone(),
                    track_sid: track.sid.clone(),
                    is_local: false,
                });
            }
        }
    }

    fn handle_track_subscribed(&mut self, participant: &RemoteParticipant, track: &TrackInfo) {
        match track.source {
            TrackSource::Screenshare => {
                if self.active_share.is_none() {
                    debug!(
                        target: "stage.focus",
                        participant_id = %participant.id,
                        track_sid = %track.sid,
                        "Screen share focused"
                    );
                    self.active_share = Some(ShareFocus {
                        participant_id: participant.id.clone(),
                        track_sid: track.sid.clone(),
                        is_local: false,
                    });
                }
                // A share is already focused: concurrent sharers are not
                // supported, later ones are ignored until the first stops.
            }
            TrackSource::ScreenshareAudio => {
                self.share_audio = Some(track.sid.clone());
            }
            _ => {}
        }
    }

    fn handle_track_removed(
        &mut self,
        participant: &RemoteParticipant,
        track: &TrackInfo,
        roster: &RosterStore,
    ) {
        match track.source {
            TrackSource::Screenshare => {
                let focused_here = self
                    .active_share
                    .as_ref()
                    .is_some_and(|share| !share.is_local && share.participant_id == participant.id);
                if focused_here {
                    self.reselect_share(roster, Some(&participant.id));
                }
            }
            TrackSource::ScreenshareAudio => {
                if self.share_audio.as_ref() == Some(&track.sid) {
                    self.share_audio = None;
                }
            }
            _ => {}
        }
    }

    fn handle_participant_left(&mut self, id: &ParticipantId, roster: &RosterStore) {
        if self.active_speaker.as_ref() == Some(id) {
            self.reselect_speaker(roster, Some(id));
        }
        let share_left = self
            .active_share
            .as_ref()
            .is_some_and(|share| &share.participant_id == id);
        if share_left {
            self.reselect_share(roster, Some(id));
        }
    }

    /// Focus the local participant's share, unless one is already focused.
    ///
    /// Returns whether the local share took focus.
    pub fn start_local_share(&mut self, local: &LocalParticipant, track: &TrackInfo) -> bool {
        if let Some(current) = &self.active_share {
            debug!(
                target: "stage.focus",
                focused_participant = %current.participant_id,
                "Local share started while another share is focused; focus unchanged"
            );
            return false;
        }
        self.active_share = Some(ShareFocus {
            participant_id: local.id.clone(),
            track_sid: track.sid.clone(),
            is_local: true,
        });
        true
    }

    /// Stop the local share.
    ///
    /// Valid only while the focused share is the local one. Stopping while a
    /// remote participant is sharing is an invalid-state condition: it is
    /// logged and ignored, never forcibly stopping someone else's share.
    /// Returns whether the share was stopped.
    pub fn stop_local_share(&mut self, roster: &RosterStore) -> bool {
        match &self.active_share {
            Some(share) if share.is_local => {
                let local_id = share.participant_id.clone();
                self.reselect_share(roster, Some(&local_id));
                true
            }
            Some(_) => {
                error!(
                    target: "stage.focus",
                    "Invalid state: screen share stop requested while another participant is sharing"
                );
                false
            }
            None => {
                warn!(
                    target: "stage.focus",
                    "Screen share stop requested with no share focused"
                );
                false
            }
        }
    }

    /// Default share selection: another currently-sharing roster member
    /// (excluding `exclude`), else unset.
    fn reselect_share(&mut self, roster: &RosterStore, exclude: Option<&ParticipantId>) {
        let replacement = roster
            .visible()
            .iter()
            .filter(|p| exclude != Some(&p.id))
            .find_map(|p| {
                p.screen_share_track().map(|track| ShareFocus {
                    participant_id: p.id.clone(),
                    track_sid: track.sid.clone(),
                    is_local: false,
                })
            });

        if let Some(share) = &replacement {
            debug!(
                target: "stage.focus",
                participant_id = %share.participant_id,
                "Screen share focus moved to remaining sharer"
            );
        }
        self.active_share = replacement;
    }

    /// Default speaker selection: a participant with video (excluding
    /// `exclude`), else the first remaining entry, else unset.
    fn reselect_speaker(&mut self, roster: &RosterStore, exclude: Option<&ParticipantId>) {
        let candidates: Vec<&RemoteParticipant> = roster
            .visible()
            .iter()
            .filter(|p| exclude != Some(&p.id))
            .collect();

        let replacement = candidates
            .iter()
            .find(|p| p.video_tracks().next().is_some())
            .or_else(|| candidates.first())
            .map(|p| p.id.clone());

        if let Some(id) = &replacement {
            debug!(
                target: "stage.focus",
                participant_id = %id,
                "Speaker focus re-selected"
            );
        }
        self.active_speaker = replacement;
    }

    /// Drop and re-derive any focus reference whose participant is gone.
    fn ensure_live(&mut self, roster: &RosterStore) {
        if let Some(id) = self.active_speaker.clone() {
            if !roster.contains(&id) {
                self.reselect_speaker(roster, Some(&id));
            }
        }
        let dangling_share = self
            .active_share
            .as_ref()
            .filter(|share| !share.is_local && !roster.contains(&share.participant_id))
            .map(|share| share.participant_id.clone());
        if let Some(id) = dangling_share {
            self.reselect_share(roster, Some(&id));
        }
    }

    /// Initial speaker default, once the roster is non-empty: prefer a
    /// screen-sharer, else a participant with video, else the first entry.
    fn ensure_default(&mut self, roster: &RosterStore) {
        if self.active_speaker.is_some() || roster.visible().is_empty() {
            return;
        }

        if let Some(sharer) = roster.visible().iter().find(|p| p.is_screen_sharing()) {
            self.active_speaker = Some(sharer.id.clone());
            if self.active_share.is_none() {
                self.active_share = sharer.screen_share_track().map(|track| ShareFocus {
                    participant_id: sharer.id.clone(),
                    track_sid: track.sid.clone(),
                    is_local: false,
                });
            }
        } else {
            self.reselect_speaker(roster, None);
        }

        if let Some(id) = &self.active_speaker {
            debug!(
                target: "stage.focus",
                participant_id = %id,
                "Initial speaker focus selected"
            );
        }
    }
}
