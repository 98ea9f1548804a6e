//! WebSocket handler for mood detection sessions.
//!
//! One task per connection runs a strictly sequential
//! receive -> process -> send cycle: frame N+1 is not read until frame N's
//! result went out, which backpressures the sender naturally.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::metrics;
use crate::session::MoodSession;
use crate::state::AppState;

/// Global counter for active WebSocket sessions.
static ACTIVE_WS_SESSIONS: AtomicI64 = AtomicI64::new(0);

/// WebSocket mood detection endpoint.
pub async fn ws_mood(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    // Track connection
    let count = ACTIVE_WS_SESSIONS.fetch_add(1, Ordering::SeqCst) + 1;
    metrics::set_ws_active_sessions(count);
    metrics::record_ws_session();

    ws.on_upgrade(|socket| async move {
        handle_mood_socket(socket, state).await;
        // Decrement on disconnect
        let count = ACTIVE_WS_SESSIONS.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_ws_active_sessions(count);
    })
}

/// Handle one mood detection connection.
async fn handle_mood_socket(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();
    info!(%session_id, "Mood session connected");

    let (mut sender, mut receiver) = socket.split();
    let mut session = MoodSession::new(
        state.landmarks.clone(),
        state.demographics.clone(),
        Instant::now(),
    );

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                metrics::record_ws_message_received();

                let Some(result) = session.handle_text(&text, Instant::now()).await else {
                    continue;
                };

                let outcome = if !result.face_detected {
                    "no_face"
                } else if result.mood == "Calibrating..." {
                    "calibrating"
                } else {
                    "classified"
                };
                metrics::record_frame_processed(outcome);

                let json = match serde_json::to_string(&result) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!(%session_id, "Failed to serialize result: {}", e);
                        continue;
                    }
                };

                if sender.send(Message::Text(json)).await.is_err() {
                    warn!(%session_id, "WebSocket send failed, client disconnected");
                    break;
                }
            }
            Ok(Message::Ping(payload)) => {
                if sender.send(Message::Pong(payload)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!(%session_id, "Client closed connection");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(%session_id, "WebSocket receive error: {}", e);
                break;
            }
        }
    }

    // Dropping the session tears down all per-connection state; a late
    // demographics completion dies with the proxy's channel.
    info!(%session_id, "Mood session ended");
}
