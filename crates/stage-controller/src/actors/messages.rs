//! Message types for stage actor communication.
//!
//! Commands use `tokio::sync::mpsc`; request-reply commands carry a
//! `tokio::sync::oneshot` sender for the response.

use crate::focus::FocusSnapshot;
use crate::layout::{Arrangement, LayoutMode, Viewport};
use serde::{Deserialize, Serialize};
use session_protocol::{LocalParticipant, RemoteParticipant, TrackInfo};
use tokio::sync::oneshot;

/// Commands sent to the `StageActor`.
#[derive(Debug)]
pub enum StageMessage {
    /// Get a read-only snapshot of the stage.
    GetSnapshot {
        /// Response channel for the snapshot.
        respond_to: oneshot::Sender<StageSnapshot>,
    },

    /// Compute the arrangement for the current roster/focus/viewport/mode.
    GetArrangement {
        /// Response channel for the arrangement.
        respond_to: oneshot::Sender<Arrangement>,
    },

    /// The rendering surface was resized.
    ViewportResized {
        /// New surface width in pixels.
        width: u32,
        /// New surface height in pixels.
        height: u32,
    },

    /// The user selected a different layout mode.
    SetLayoutMode {
        /// The newly selected mode.
        mode: LayoutMode,
    },

    /// The local participant started a screen share.
    StartScreenShare {
        /// The local screen-share track.
        track: TrackInfo,
        /// Responds with whether the local share took focus.
        respond_to: oneshot::Sender<bool>,
    },

    /// The local participant asked to stop their screen share.
    StopScreenShare {
        /// Responds with whether a local share was actually stopped.
        respond_to: oneshot::Sender<bool>,
    },
}

/// Read-only view of the stage, handed to the render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshot {
    /// The visible roster page, display order.
    pub participants: Vec<RemoteParticipant>,
    /// Participants tracked past the visible page.
    pub hidden_participants: usize,
    /// Speaker and screen-share focus.
    pub focus: FocusSnapshot,
    /// The local participant, once the join has completed.
    pub local_participant: Option<LocalParticipant>,
    /// Terminal join error, if construction or connection failed.
    pub join_error: Option<String>,
    /// Last sampled surface dimensions.
    pub viewport: Viewport,
    /// Current layout mode.
    pub layout_mode: LayoutMode,
    /// Background image URL, passed through untouched.
    pub background_image: Option<String>,
    /// Unix timestamp of stage creation.
    pub created_at: i64,
}
