//! WebSocket handler for spectators.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /watch`
//! 2. Server attaches the spectator to the coordinator
//! 3. Server spawns a send task forwarding every table event as one
//!    JSON text frame
//! 4. Client answers each `PING` frame with a `PONG` carrying the same
//!    checkpoint; the tournament does not advance past a hand until
//!    every attached spectator has answered (or timed out)
//! 5. On disconnect, the spectator is detached and no longer awaited
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/watch');
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.type === 'PING') {
//!     ws.send(JSON.stringify({ type: 'PONG', checkpoint: data.checkpoint }));
//!   }
//! };
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use serde::Deserialize;
use tokio::sync::mpsc;

use super::AppState;

const FEED_BUFFER: usize = 64;

/// Frames spectators may send upstream.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum SpectatorMessage {
    #[serde(rename = "PONG")]
    Pong { checkpoint: u64 },
}

/// Upgrade the HTTP connection to a spectator WebSocket.
pub async fn watch_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Pump one spectator connection until either side hangs up.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (feed_tx, mut feed_rx) = mpsc::channel::<String>(FEED_BUFFER);

    let Some(id) = state.handle.attach_spectator(feed_tx).await else {
        warn!("spectator refused, coordinator is gone");
        let _ = sender.send(Message::Close(None)).await;
        return;
    };
    info!("spectator {id} connected");

    // Forward coordinator events to the socket. The feed closing means
    // the coordinator detached us or shut down.
    let send_task = tokio::spawn(async move {
        while let Some(line) = feed_rx.recv().await {
            if sender.send(Message::Text(line.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<SpectatorMessage>(&text) {
                Ok(SpectatorMessage::Pong { checkpoint }) => {
                    state.handle.ack(id, checkpoint).await;
                }
                Err(e) => {
                    warn!("spectator {id} sent an unparseable frame: {e}");
                }
            },
            Ok(Message::Close(_)) => {
                info!("spectator {id} closed the connection");
                break;
            }
            Err(e) => {
                warn!("spectator {id} socket error: {e}");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    state.handle.detach_spectator(id).await;
    info!("spectator {id} disconnected");
}
