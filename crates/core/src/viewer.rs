//! Step Sequence Viewer
//!
//! [`ViewerState`] is the pure cursor over a [`StepSequence`]: one state per
//! step index, starting at 0, with saturating `advance`/`retreat`.
//! [`StepSequenceViewer`] wraps it and triggers the media side effect of the
//! new current step whenever the cursor moves.

use crate::{
    error::ViewerError,
    playback::{MediaPlayer, PlaybackController, PlaybackStatus},
    step::{Step, StepSequence},
};
use serde::Serialize;
use std::{fmt, str::FromStr, sync::Arc};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Whether arbitrary jumps between steps are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    /// `jump_to` may move to any valid index.
    #[default]
    FreeJump,
    /// Only `advance` and `retreat` move the cursor.
    Sequential,
}

impl FromStr for NavigationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" | "free_jump" => Ok(Self::FreeJump),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!("unknown navigation policy '{}'", other)),
        }
    }
}

impl fmt::Display for NavigationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationPolicy::FreeJump => write!(f, "free"),
            NavigationPolicy::Sequential => write!(f, "sequential"),
        }
    }
}

/// Cursor over a validated, non-empty sequence.
///
/// Invariant: `position < sequence.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerState {
    sequence: Arc<StepSequence>,
    position: usize,
}

impl ViewerState {
    /// Validates `sequence` and positions the cursor on its first step.
    pub fn initialize(sequence: StepSequence) -> Result<Self, ViewerError> {
        sequence.validate()?;
        Ok(Self {
            sequence: Arc::new(sequence),
            position: 0,
        })
    }

    pub fn sequence(&self) -> &StepSequence {
        &self.sequence
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn current(&self) -> &Step {
        &self.sequence.steps()[self.position]
    }

    pub fn can_advance(&self) -> bool {
        self.position + 1 < self.len()
    }

    pub fn can_retreat(&self) -> bool {
        self.position > 0
    }

    /// Moves one step forward. A no-op on the last step; returns whether the cursor moved.
    pub fn advance(&mut self) -> bool {
        if self.can_advance() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Moves one step back. A no-op on the first step; returns whether the cursor moved.
    pub fn retreat(&mut self) -> bool {
        if self.can_retreat() {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    /// Moves to `index`, leaving the state untouched on error.
    pub fn jump_to(&mut self, index: usize, policy: NavigationPolicy) -> Result<bool, ViewerError> {
        if policy == NavigationPolicy::Sequential {
            return Err(ViewerError::JumpDisabled);
        }
        if index >= self.len() {
            return Err(ViewerError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let moved = index != self.position;
        self.position = index;
        Ok(moved)
    }

    /// `(position + 1) / len`, reaching exactly 1.0 only on the last step.
    pub fn progress_ratio(&self) -> f64 {
        (self.position + 1) as f64 / self.len() as f64
    }

    /// Human-readable position, e.g. "Step 2 of 6".
    pub fn step_label(&self) -> String {
        format!("Step {} of {}", self.position + 1, self.len())
    }
}

/// Everything a display needs to render the current step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerSnapshot {
    pub topic: String,
    pub position: usize,
    pub total: usize,
    /// "Step N of M" for the current position.
    pub label: String,
    pub step: Step,
    pub progress: f64,
    pub can_advance: bool,
    pub can_retreat: bool,
    /// Playback generation issued for this position.
    pub generation: u64,
}

/// A viewer session: cursor, navigation policy and media side effects.
pub struct StepSequenceViewer<P: MediaPlayer> {
    state: ViewerState,
    policy: NavigationPolicy,
    playback: PlaybackController<P>,
}

impl<P: MediaPlayer> StepSequenceViewer<P> {
    /// Opens `sequence` at its first step and starts that step's media.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        sequence: StepSequence,
        policy: NavigationPolicy,
        player: Arc<P>,
    ) -> Result<Self, ViewerError> {
        let state = ViewerState::initialize(sequence)?;
        let mut viewer = Self {
            state,
            policy,
            playback: PlaybackController::new(player),
        };
        viewer.playback.request(&viewer.state.current().media);
        Ok(viewer)
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    pub fn current(&self) -> &Step {
        self.state.current()
    }

    pub fn position(&self) -> usize {
        self.state.position()
    }

    pub fn progress_ratio(&self) -> f64 {
        self.state.progress_ratio()
    }

    pub fn can_advance(&self) -> bool {
        self.state.can_advance()
    }

    pub fn can_retreat(&self) -> bool {
        self.state.can_retreat()
    }

    pub fn playback_status(&self) -> PlaybackStatus {
        self.playback.status()
    }

    pub fn subscribe_playback(&self) -> watch::Receiver<PlaybackStatus> {
        self.playback.subscribe()
    }

    pub fn advance(&mut self) -> bool {
        let moved = self.state.advance();
        self.after_navigation(moved);
        moved
    }

    pub fn retreat(&mut self) -> bool {
        let moved = self.state.retreat();
        self.after_navigation(moved);
        moved
    }

    pub fn jump_to(&mut self, index: usize) -> Result<bool, ViewerError> {
        let moved = self.state.jump_to(index, self.policy)?;
        self.after_navigation(moved);
        Ok(moved)
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            topic: self.state.sequence().topic().to_string(),
            position: self.state.position(),
            total: self.state.len(),
            label: self.state.step_label(),
            step: self.state.current().clone(),
            progress: self.state.progress_ratio(),
            can_advance: self.state.can_advance(),
            can_retreat: self.state.can_retreat(),
            generation: self.playback.generation(),
        }
    }

    #[instrument(skip(self), fields(position = self.state.position()))]
    fn after_navigation(&mut self, moved: bool) {
        if !moved {
            debug!("Navigation left the position unchanged");
            return;
        }
        let generation = self.playback.request(&self.state.current().media);
        debug!(generation, "Issued media request for new position");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{CuratedCatalog, TopicCatalog, generic_sequence},
        error::PlaybackError,
        playback::{MockMediaPlayer, PlayRequest, PlaybackPhase},
        step::Media,
    };
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn numbered(len: usize) -> StepSequence {
        let steps = (1..=len)
            .map(|i| Step::glyph(format!("Step {}", i), format!("Part {}", i), "•"))
            .collect();
        StepSequence::new("Numbers", steps)
    }

    fn silent_player() -> Arc<MockMediaPlayer> {
        let mut player = MockMediaPlayer::new();
        player.expect_play().returning(|_| Ok(()));
        player.expect_stop().returning(|_| ());
        Arc::new(player)
    }

    #[test]
    fn test_initialize_starts_at_first_step() {
        for len in 1..=6 {
            let sequence = numbered(len);
            let first = sequence.steps()[0].clone();
            let state = ViewerState::initialize(sequence).unwrap();
            assert_eq!(state.position(), 0);
            assert_eq!(state.current(), &first);
        }
    }

    #[test]
    fn test_initialize_rejects_empty_sequence() {
        let err = ViewerState::initialize(StepSequence::new("Nothing", vec![])).unwrap_err();
        assert_eq!(
            err,
            ViewerError::EmptySequence {
                topic: "Nothing".to_string()
            }
        );
    }

    #[test]
    fn test_advance_and_retreat_are_locally_inverse() {
        let mut state = ViewerState::initialize(numbered(5)).unwrap();
        state.jump_to(2, NavigationPolicy::FreeJump).unwrap();

        assert!(state.advance());
        assert!(state.retreat());
        assert_eq!(state.position(), 2);

        assert!(state.retreat());
        assert!(state.advance());
        assert_eq!(state.position(), 2);
    }

    #[test]
    fn test_navigation_saturates_at_bounds() {
        let len = 4;
        let mut state = ViewerState::initialize(numbered(len)).unwrap();
        for _ in 0..len {
            state.advance();
        }
        assert_eq!(state.position(), len - 1);
        assert!(!state.advance());
        assert_eq!(state.position(), len - 1);

        for _ in 0..len {
            state.retreat();
        }
        assert_eq!(state.position(), 0);
        assert!(!state.retreat());
    }

    #[test]
    fn test_single_step_sequence_is_both_first_and_last() {
        let state = ViewerState::initialize(numbered(1)).unwrap();
        assert!(!state.can_advance());
        assert!(!state.can_retreat());
        assert_relative_eq!(state.progress_ratio(), 1.0);
    }

    #[test]
    fn test_progress_ratio_reaches_one_only_on_last_step() {
        let len = 6;
        let mut state = ViewerState::initialize(numbered(len)).unwrap();
        assert_relative_eq!(state.progress_ratio(), 1.0 / len as f64);

        let mut previous = 0.0;
        loop {
            let ratio = state.progress_ratio();
            assert!(ratio > previous);
            assert_eq!(ratio == 1.0, state.position() == len - 1);
            previous = ratio;
            if !state.advance() {
                break;
            }
        }
    }

    #[test]
    fn test_jump_out_of_range_leaves_state_unchanged() {
        let mut state = ViewerState::initialize(numbered(3)).unwrap();
        state.advance();

        let err = state.jump_to(3, NavigationPolicy::FreeJump).unwrap_err();
        assert_eq!(err, ViewerError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(state.position(), 1);
    }

    #[test]
    fn test_sequential_policy_rejects_jumps() {
        let mut state = ViewerState::initialize(numbered(3)).unwrap();
        let err = state.jump_to(2, NavigationPolicy::Sequential).unwrap_err();
        assert_eq!(err, ViewerError::JumpDisabled);
        assert_eq!(state.position(), 0);
    }

    #[test]
    fn test_step_label() {
        let mut state = ViewerState::initialize(numbered(4)).unwrap();
        state.advance();
        assert_eq!(state.step_label(), "Step 2 of 4");
        assert_relative_eq!(state.progress_ratio(), 0.5);
    }

    #[test]
    fn test_navigation_policy_parsing() {
        assert_eq!("free".parse::<NavigationPolicy>(), Ok(NavigationPolicy::FreeJump));
        assert_eq!(
            " Sequential ".parse::<NavigationPolicy>(),
            Ok(NavigationPolicy::Sequential)
        );
        assert!("random".parse::<NavigationPolicy>().is_err());
        assert_eq!(NavigationPolicy::Sequential.to_string(), "sequential");
    }

    #[tokio::test]
    async fn test_generic_derivatives_walkthrough() {
        let mut viewer = StepSequenceViewer::new(
            generic_sequence("Derivatives"),
            NavigationPolicy::FreeJump,
            silent_player(),
        )
        .unwrap();
        assert_eq!(viewer.current().title, "Step 1");

        viewer.advance();
        assert_eq!(viewer.current().title, "Step 2");
        assert_relative_eq!(viewer.progress_ratio(), 2.0 / 3.0);

        viewer.advance();
        viewer.advance();
        assert_eq!(viewer.current().title, "Step 3");
        assert!(!viewer.can_advance());
    }

    #[tokio::test]
    async fn test_unmoved_navigation_issues_no_media_request() {
        let mut viewer =
            StepSequenceViewer::new(numbered(2), NavigationPolicy::FreeJump, silent_player())
                .unwrap();
        assert_eq!(viewer.snapshot().generation, 1);

        assert!(!viewer.retreat());
        assert_eq!(viewer.jump_to(0), Ok(false));
        assert_eq!(viewer.snapshot().generation, 1);

        assert!(viewer.advance());
        let snapshot = viewer.snapshot();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.label, "Step 2 of 2");
    }

    #[tokio::test]
    async fn test_playback_failure_does_not_affect_navigation() {
        let mut player = MockMediaPlayer::new();
        player.expect_play().returning(|req| {
            Err(PlaybackError::Rejected {
                path: req.path,
                reason: "autoplay denied".to_string(),
            })
        });
        player.expect_stop().returning(|_| ());

        let sequence = CuratedCatalog::builtin().lookup("Pythagorean Theorem");
        let mut viewer =
            StepSequenceViewer::new(sequence, NavigationPolicy::FreeJump, Arc::new(player))
                .unwrap();
        let mut rx = viewer.subscribe_playback();
        tokio::time::timeout(
            Duration::from_secs(1),
            rx.wait_for(|s| matches!(s.phase, PlaybackPhase::Failed { .. })),
        )
        .await
        .expect("failure should be recorded")
        .unwrap();

        assert!(viewer.advance());
        assert_eq!(viewer.position(), 1);
        assert_eq!(viewer.current().title, "Basic Concept");
    }

    /// Records every request and only completes plays when released.
    struct RecordingPlayer {
        gate: Notify,
        requests: Mutex<Vec<PlayRequest>>,
        stopped: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl MediaPlayer for RecordingPlayer {
        async fn play(&self, request: PlayRequest) -> Result<(), PlaybackError> {
            self.requests.lock().unwrap().push(request);
            self.gate.notified().await;
            Ok(())
        }

        fn stop(&self, generation: u64) {
            self.stopped.lock().unwrap().push(generation);
        }
    }

    #[tokio::test]
    async fn test_pythagorean_jump_back_supersedes_pending_clip() {
        let player = Arc::new(RecordingPlayer {
            gate: Notify::new(),
            requests: Mutex::new(vec![]),
            stopped: Mutex::new(vec![]),
        });
        let sequence = CuratedCatalog::builtin().lookup("Pythagorean Theorem");
        assert_eq!(sequence.len(), 6);

        let mut viewer =
            StepSequenceViewer::new(sequence, NavigationPolicy::FreeJump, Arc::clone(&player))
                .unwrap();
        viewer.jump_to(3).unwrap();
        assert_eq!(
            viewer.current().media,
            Media::Clip {
                path: "/videos/step4.mp4".to_string()
            }
        );
        let step4_generation = viewer.snapshot().generation;
        tokio::time::sleep(Duration::from_millis(10)).await;

        viewer.jump_to(0).unwrap();
        let step1_generation = viewer.snapshot().generation;
        tokio::time::sleep(Duration::from_millis(10)).await;
        player.gate.notify_waiters();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(player.stopped.lock().unwrap().contains(&step4_generation));
        let status = viewer.playback_status();
        assert_eq!(status.generation, step1_generation);
        assert_eq!(
            status.phase,
            PlaybackPhase::Playing {
                clip: "/videos/step1.mp4".to_string()
            }
        );
    }
}
