//! Manages the WebSocket connection lifecycle for a viewer session.

use super::{
    player::SocketPlayer,
    protocol::{ClientMessage, ServerMessage},
};
use crate::{models::SnapshotView, state::AppState};
use anyhow::{Result, anyhow};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use visualmath_core::StepSequenceViewer;

type Viewer = StepSequenceViewer<SocketPlayer>;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// All outgoing messages go through a single writer task so that the viewer
/// and its media player can both emit messages without sharing the sink.
#[instrument(name = "viewer_session", skip_all, fields(session_id, topic))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    tracing::Span::current().record("session_id", tracing::field::display(session_id));
    info!("New WebSocket connection. Awaiting initialization...");

    let (socket_tx, mut socket_rx) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(forward_outbound(socket_tx, outbound_rx));

    // The first message from the client must be an `init` message.
    let init_text = match socket_rx.next().await {
        Some(Ok(Message::Text(text))) => Ok(text.as_str().to_owned()),
        Some(Ok(_)) => Err(anyhow!("First message was not a text `init` message.")),
        _ => {
            info!("Client disconnected before sending init message.");
            writer.abort();
            return;
        }
    };

    let player = Arc::new(SocketPlayer::new(outbound_tx.clone()));
    match init_text.and_then(|text| open_viewer(&text, &state, session_id, Arc::clone(&player)))
    {
        Ok((viewer, initialized)) => {
            let _ = outbound_tx.send(initialized);
            run_viewer_session(viewer, &player, &outbound_tx, socket_rx).await;
        }
        Err(e) => {
            error!("Session initialization failed: {:?}", e);
            let _ = outbound_tx.send(ServerMessage::Error {
                message: e.to_string(),
            });
        }
    }

    drop(player);
    drop(outbound_tx);
    if let Err(e) = writer.await {
        debug!(error = ?e, "Writer task ended abnormally");
    }
    info!("WebSocket connection closed and viewer session terminated.");
}

/// Parses the `init` message and opens a viewer on the selected sequence.
fn open_viewer(
    init_text: &str,
    state: &AppState,
    session_id: Uuid,
    player: Arc<SocketPlayer>,
) -> Result<(Viewer, ServerMessage)> {
    let ClientMessage::Init { topic } = serde_json::from_str::<ClientMessage>(init_text)? else {
        return Err(anyhow!("First message must be `init`"));
    };

    let sequence = state.catalog.select(&topic)?;
    tracing::Span::current().record("topic", sequence.topic());
    let curated = state.catalog.is_curated(sequence.topic());
    let suggestion = if curated {
        None
    } else {
        state.catalog.suggest(sequence.topic())
    };

    let viewer = StepSequenceViewer::new(sequence, state.config.navigation_policy, player)?;
    info!(
        curated,
        steps = viewer.state().len(),
        policy = %viewer.policy(),
        "Viewer opened"
    );
    let initialized = ServerMessage::Initialized {
        session_id,
        curated,
        suggestion,
        snapshot: SnapshotView::from(viewer.snapshot()),
    };
    Ok((viewer, initialized))
}

/// The main event loop for an open viewer.
async fn run_viewer_session(
    mut viewer: Viewer,
    player: &SocketPlayer,
    outbound: &mpsc::UnboundedSender<ServerMessage>,
    mut socket_rx: SplitStream<WebSocket>,
) {
    while let Some(msg_result) = socket_rx.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    if let Some(reply) = handle_client_message(&mut viewer, player, msg) {
                        let _ = outbound.send(reply);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed client message");
                    let _ = outbound.send(ServerMessage::Error {
                        message: format!("Invalid message: {}", e),
                    });
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client sent close frame. Shutting down session.");
                break;
            }
            Ok(Message::Binary(_)) => warn!("Ignoring unexpected binary message."),
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                error!("Error receiving from client WebSocket: {:?}", e);
                break;
            }
        }
    }
}

/// Applies one client command to the viewer and returns the reply, if any.
fn handle_client_message(
    viewer: &mut Viewer,
    player: &SocketPlayer,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    let navigation = match msg {
        ClientMessage::Next => Ok(viewer.advance()),
        ClientMessage::Previous => Ok(viewer.retreat()),
        ClientMessage::JumpTo { index } => viewer.jump_to(index),
        ClientMessage::PlaybackStarted { generation } => {
            if !player.acknowledge_started(generation) {
                debug!(generation, "Ignoring acknowledgement for superseded playback");
            }
            return None;
        }
        ClientMessage::PlaybackFailed { generation, reason } => {
            if !player.acknowledge_failed(generation, reason) {
                debug!(generation, "Ignoring failure report for superseded playback");
            }
            return None;
        }
        ClientMessage::Init { .. } => {
            warn!("Ignoring repeated init message.");
            return Some(ServerMessage::Error {
                message: "Session is already initialized".to_string(),
            });
        }
    };

    match navigation {
        Ok(moved) => {
            debug!(moved, position = viewer.position(), "Navigation applied");
            Some(ServerMessage::StepChanged {
                snapshot: SnapshotView::from(viewer.snapshot()),
            })
        }
        Err(e) => {
            warn!(error = %e, "Rejected navigation command");
            Some(ServerMessage::Error {
                message: e.to_string(),
            })
        }
    }
}

/// Writes queued server messages to the socket until every sender is gone.
async fn forward_outbound(
    mut socket_tx: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(msg) = outbound_rx.recv().await {
        if let Err(e) = send_msg(&mut socket_tx, msg).await {
            warn!(error = ?e, "Failed to write to client; stopping writer.");
            break;
        }
    }
    let _ = socket_tx.close().await;
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
