//! Media Playback Supersession
//!
//! Every position change in the viewer issues a new play request tagged with a
//! monotonically increasing generation. Only the newest generation may update
//! the shared [`PlaybackStatus`]; answers for stale generations are dropped.
//! The in-flight request is held by an exclusively owned [`PlaybackToken`] that
//! is cancelled whenever it is replaced.

use crate::{error::PlaybackError, step::Media};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

/// How a clip must be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackOptions {
    pub muted: bool,
    pub controls: bool,
    pub looping: bool,
    pub start_at_secs: u32,
}

impl Default for PlaybackOptions {
    /// Muted, no transport controls, played once from the beginning.
    fn default() -> Self {
        Self {
            muted: true,
            controls: false,
            looping: false,
            start_at_secs: 0,
        }
    }
}

/// A single request to start a clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    pub generation: u64,
    pub path: String,
    pub options: PlaybackOptions,
}

/// The seam between the viewer and whatever actually renders video.
///
/// `play` resolves once playback has started (or failed to start). The viewer
/// never waits for it: calls are issued from a background task.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaPlayer: Send + Sync + 'static {
    async fn play(&self, request: PlayRequest) -> Result<(), PlaybackError>;

    /// Stops or discards whatever the given generation started.
    fn stop(&self, generation: u64);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// The current step has no clip.
    #[default]
    Idle,
    Starting {
        clip: String,
    },
    Playing {
        clip: String,
    },
    Failed {
        clip: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackStatus {
    pub generation: u64,
    pub phase: PlaybackPhase,
}

/// Handle on the most recent play request.
#[derive(Debug)]
pub struct PlaybackToken {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl PlaybackToken {
    fn cancel<P: MediaPlayer + ?Sized>(self, player: &P) {
        if let Some(task) = self.task {
            task.abort();
            player.stop(self.generation);
            debug!(generation = self.generation, "Cancelled previous playback request");
        }
    }
}

/// Issues play requests and keeps the authoritative playback status.
///
/// Requests spawn onto the ambient tokio runtime, so `request` must be called
/// from within one.
pub struct PlaybackController<P: MediaPlayer> {
    player: Arc<P>,
    status: Arc<watch::Sender<PlaybackStatus>>,
    active: Option<PlaybackToken>,
}

impl<P: MediaPlayer> PlaybackController<P> {
    pub fn new(player: Arc<P>) -> Self {
        let (status, _) = watch::channel(PlaybackStatus::default());
        Self {
            player,
            status: Arc::new(status),
            active: None,
        }
    }

    /// The generation of the newest request, 0 before the first one.
    pub fn generation(&self) -> u64 {
        self.status.borrow().generation
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.status.subscribe()
    }

    /// Supersedes the previous request and starts `media` if it is a clip.
    ///
    /// Returns the generation assigned to this request.
    pub fn request(&mut self, media: &Media) -> u64 {
        if let Some(previous) = self.active.take() {
            previous.cancel(self.player.as_ref());
        }

        let clip = media.clip_path().map(str::to_owned);
        let mut generation = 0;
        self.status.send_modify(|status| {
            status.generation += 1;
            generation = status.generation;
            status.phase = match &clip {
                Some(path) => PlaybackPhase::Starting { clip: path.clone() },
                None => PlaybackPhase::Idle,
            };
        });

        let task = clip.map(|path| self.spawn_play(generation, path));
        self.active = Some(PlaybackToken { generation, task });
        generation
    }

    fn spawn_play(&self, generation: u64, path: String) -> JoinHandle<()> {
        let player = Arc::clone(&self.player);
        let status = Arc::clone(&self.status);
        let request = PlayRequest {
            generation,
            path: path.clone(),
            options: PlaybackOptions::default(),
        };

        tokio::spawn(async move {
            let outcome = player.play(request).await;
            let honored = status.send_if_modified(|current| {
                if current.generation != generation {
                    return false;
                }
                current.phase = match &outcome {
                    Ok(()) => PlaybackPhase::Playing { clip: path.clone() },
                    Err(e) => PlaybackPhase::Failed {
                        clip: path.clone(),
                        reason: e.to_string(),
                    },
                };
                true
            });

            if !honored {
                debug!(generation, clip = %path, "Discarding outcome of superseded playback request");
                return;
            }
            match outcome {
                Ok(()) => info!(generation, clip = %path, "Clip playback started"),
                Err(e) => warn!(generation, clip = %path, error = %e, "Clip playback failed; continuing without media"),
            }
        })
    }
}

impl<P: MediaPlayer> Drop for PlaybackController<P> {
    fn drop(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel(self.player.as_ref());
        }
    }
}
