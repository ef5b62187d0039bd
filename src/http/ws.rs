use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use super::messages::AudioChunkMessage;
use super::state::AppState;
use crate::pipeline::{PipelineError, SummaryMessage, ViewerSink};

/// GET /ws/audio/:session_id
/// Attach an audio source; every received chunk lands in the session's
/// audio log
pub async fn audio_ws(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_audio_socket(socket, session_id, state))
}

async fn handle_audio_socket(mut socket: WebSocket, session_id: String, state: AppState) {
    let ingest = state.supervisor.attach_source(&session_id).await;
    info!("Audio source connected for session '{}'", session_id);

    while let Some(received) = socket.recv().await {
        let message = match received {
            Ok(message) => message,
            Err(err) => {
                debug!("Audio socket error for session '{}': {}", session_id, err);
                break;
            }
        };

        let chunk = match message {
            Message::Binary(data) => Bytes::from(data),
            Message::Text(text) => match decode_text_chunk(&text) {
                Ok(chunk) => chunk,
                Err(err) => {
                    warn!(
                        "Dropping undecodable audio frame for session '{}': {}",
                        session_id, err
                    );
                    continue;
                }
            },
            Message::Close(_) => break,
            // Ping/pong are handled by axum itself
            _ => continue,
        };

        if let Err(err) = ingest.push_chunk(chunk).await {
            warn!("Audio ingest for session '{}' stopped: {}", session_id, err);
            break;
        }
    }

    info!("Audio source disconnected from session '{}'", session_id);
}

fn decode_text_chunk(text: &str) -> anyhow::Result<Bytes> {
    let message: AudioChunkMessage = serde_json::from_str(text)?;
    message.decode()
}

/// GET /ws/summary/:session_id
/// Attach a viewer; replays the summary history, then tails live
pub async fn summary_ws(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_summary_socket(socket, session_id, state))
}

async fn handle_summary_socket(socket: WebSocket, session_id: String, state: AppState) {
    let stage = state.supervisor.attach_viewer(&session_id).await;
    info!("Viewer attached to session '{}'", session_id);

    let (sender, mut receiver) = socket.split();
    let mut sink = WsViewerSink { sender };

    tokio::select! {
        result = stage.run(&mut sink) => match result {
            Ok(()) => debug!("Summary delivery for session '{}' finished", session_id),
            Err(err) => debug!("Summary delivery for session '{}' ended: {}", session_id, err),
        },
        _ = drain(&mut receiver) => {
            debug!("Viewer closed the summary socket for session '{}'", session_id);
        }
    }

    info!("Viewer detached from session '{}'", session_id);
}

/// Consumes incoming frames so close handshakes and pings keep working
/// while the delivery loop only ever writes.
async fn drain(receiver: &mut SplitStream<WebSocket>) {
    while let Some(received) = receiver.next().await {
        match received {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        }
    }
}

struct WsViewerSink {
    sender: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl ViewerSink for WsViewerSink {
    async fn send(&mut self, message: SummaryMessage) -> Result<(), PipelineError> {
        let payload = serde_json::to_string(&message)
            .map_err(|err| PipelineError::ConnectionLost(format!("encode failed: {}", err)))?;
        self.sender
            .send(Message::Text(payload))
            .await
            .map_err(|err| PipelineError::ConnectionLost(err.to_string()))
    }
}
