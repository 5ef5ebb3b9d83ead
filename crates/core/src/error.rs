//! Error taxonomy for the visualization core.
//!
//! Navigation and construction problems are reported synchronously to the
//! caller as [`ViewerError`]. Playback problems ([`PlaybackError`]) are
//! produced by a [`MediaPlayer`](crate::playback::MediaPlayer) and are always
//! contained inside the viewer.

/// Validation errors returned by viewer construction and navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("step sequence for '{topic}' is empty")]
    EmptySequence { topic: String },
    #[error("step index {index} is out of range for a sequence of {len} steps")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("jumping to an arbitrary step is disabled by the sequential navigation policy")]
    JumpDisabled,
    #[error("step {index} is invalid: {reason}")]
    InvalidStep { index: usize, reason: String },
}

/// Failures reported by a media player while starting a clip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The hosting environment refused to start playback (e.g. autoplay policy).
    #[error("playback of '{path}' was rejected: {reason}")]
    Rejected { path: String, reason: String },
    /// The request was withdrawn before the player answered.
    #[error("playback request {generation} was cancelled")]
    Cancelled { generation: u64 },
}

/// Errors raised while choosing a sequence for user-supplied topic text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Please enter a math concept")]
    BlankTopic,
}
