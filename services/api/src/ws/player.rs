//! A `MediaPlayer` backed by the connected browser.

use super::protocol::ServerMessage;
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use visualmath_core::{MediaPlayer, PlayRequest, PlaybackError};

struct PendingPlay {
    path: String,
    reply: oneshot::Sender<Result<(), PlaybackError>>,
}

/// Sends `play_clip` / `stop_clip` to the client and resolves each play
/// request when the client acknowledges its generation.
pub struct SocketPlayer {
    outbound: mpsc::UnboundedSender<ServerMessage>,
    pending: Mutex<HashMap<u64, PendingPlay>>,
}

impl SocketPlayer {
    pub fn new(outbound: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<u64, PendingPlay>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reports that the client started the clip of `generation`.
    ///
    /// Returns `false` when no request for that generation is waiting.
    pub fn acknowledge_started(&self, generation: u64) -> bool {
        match self.pending().remove(&generation) {
            Some(pending) => pending.reply.send(Ok(())).is_ok(),
            None => false,
        }
    }

    /// Reports that the client could not start the clip of `generation`.
    pub fn acknowledge_failed(&self, generation: u64, reason: String) -> bool {
        match self.pending().remove(&generation) {
            Some(pending) => pending
                .reply
                .send(Err(PlaybackError::Rejected {
                    path: pending.path,
                    reason,
                }))
                .is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl MediaPlayer for SocketPlayer {
    async fn play(&self, request: PlayRequest) -> Result<(), PlaybackError> {
        let generation = request.generation;
        let (reply, answer) = oneshot::channel();
        self.pending().insert(
            generation,
            PendingPlay {
                path: request.path.clone(),
                reply,
            },
        );

        let msg = ServerMessage::PlayClip {
            generation,
            path: request.path.clone(),
            muted: request.options.muted,
            controls: request.options.controls,
            looping: request.options.looping,
        };
        if self.outbound.send(msg).is_err() {
            self.pending().remove(&generation);
            return Err(PlaybackError::Rejected {
                path: request.path,
                reason: "client disconnected".to_string(),
            });
        }

        answer
            .await
            .unwrap_or(Err(PlaybackError::Cancelled { generation }))
    }

    fn stop(&self, generation: u64) {
        if self.pending().remove(&generation).is_some() {
            debug!(generation, "Dropped unanswered play request");
        }
        let _ = self.outbound.send(ServerMessage::StopClip { generation });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use visualmath_core::PlaybackOptions;

    fn request(generation: u64) -> PlayRequest {
        PlayRequest {
            generation,
            path: format!("/videos/step{}.mp4", generation),
            options: PlaybackOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_play_waits_for_matching_acknowledgement() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let player = Arc::new(SocketPlayer::new(tx));

        let playing = tokio::spawn({
            let player = Arc::clone(&player);
            async move { player.play(request(2)).await }
        });

        let sent = rx.recv().await.unwrap();
        assert_eq!(
            sent,
            ServerMessage::PlayClip {
                generation: 2,
                path: "/videos/step2.mp4".to_string(),
                muted: true,
                controls: false,
                looping: false,
            }
        );

        assert!(!player.acknowledge_started(1));
        assert!(player.acknowledge_started(2));
        assert_eq!(playing.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_failed_acknowledgement_is_a_rejection() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let player = Arc::new(SocketPlayer::new(tx));

        let playing = tokio::spawn({
            let player = Arc::clone(&player);
            async move { player.play(request(1)).await }
        });
        rx.recv().await.unwrap();

        assert!(player.acknowledge_failed(1, "autoplay denied".to_string()));
        assert_eq!(
            playing.await.unwrap(),
            Err(PlaybackError::Rejected {
                path: "/videos/step1.mp4".to_string(),
                reason: "autoplay denied".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_stop_cancels_pending_request_and_notifies_client() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let player = Arc::new(SocketPlayer::new(tx));

        let playing = tokio::spawn({
            let player = Arc::clone(&player);
            async move { player.play(request(3)).await }
        });
        rx.recv().await.unwrap();

        player.stop(3);
        assert_eq!(rx.recv().await.unwrap(), ServerMessage::StopClip { generation: 3 });
        assert_eq!(
            playing.await.unwrap(),
            Err(PlaybackError::Cancelled { generation: 3 })
        );
        assert!(!player.acknowledge_started(3));
    }

    #[tokio::test]
    async fn test_play_fails_when_client_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let player = SocketPlayer::new(tx);

        let result = player.play(request(1)).await;
        assert!(matches!(result, Err(PlaybackError::Rejected { .. })));
    }
}
