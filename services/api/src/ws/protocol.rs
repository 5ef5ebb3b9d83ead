//! Defines the WebSocket message protocol between the browser client and the API server.
//!
//! Playback messages carry the generation of the request they belong to.
//! Clients must echo it back in `playback_started` / `playback_failed`;
//! acknowledgements for superseded generations are ignored by the server.

use crate::models::SnapshotView;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from the client (browser) to the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Opens a viewer for a topic. This must be the first message.
    Init { topic: String },
    Next,
    Previous,
    /// Moves to a zero-based step index, when the navigation policy allows it.
    JumpTo { index: usize },
    PlaybackStarted { generation: u64 },
    PlaybackFailed { generation: u64, reason: String },
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the viewer is open and provides its first step.
    Initialized {
        session_id: Uuid,
        curated: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suggestion: Option<String>,
        snapshot: SnapshotView,
    },
    /// The authoritative viewer state after a navigation command.
    StepChanged { snapshot: SnapshotView },
    /// Asks the client to start a clip from the beginning.
    PlayClip {
        generation: u64,
        path: String,
        muted: bool,
        controls: bool,
        looping: bool,
    },
    /// Asks the client to stop whatever the given generation started.
    StopClip { generation: u64 },
    /// Reports a rejected command; the viewer state is unchanged.
    Error { message: String },
}
