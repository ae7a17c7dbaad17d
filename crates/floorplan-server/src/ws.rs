//! WebSocket connections: one task per socket.

use crate::AppState;
use crate::registry::{ConnectionId, Outbox};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use floorplan_core::{ClientMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection protocol state.
struct Connection {
    id: ConnectionId,
    outbox: Outbox,
    /// Project this connection is subscribed to.
    project: Option<String>,
}

impl Connection {
    /// Handle one client message, returning a direct reply if there is one.
    async fn handle(&mut self, state: &AppState, msg: ClientMessage) -> Option<ServerMessage> {
        match msg {
            ClientMessage::Subscribe { project_id } => {
                if let Some(old) = self.project.take() {
                    state.hub.unsubscribe(&old, self.id);
                }
                match state.hub.subscribe(&project_id, self.id, self.outbox.clone()).await {
                    Ok(()) => {
                        self.project = Some(project_id);
                        None
                    }
                    Err(e) => Some(ServerMessage::Error { message: e.to_string() }),
                }
            }
            ClientMessage::Unsubscribe => {
                if let Some(old) = self.project.take() {
                    state.hub.unsubscribe(&old, self.id);
                }
                None
            }
            ClientMessage::Write { project, base_version } => match state.hub.write(project, base_version).await {
                Ok(reply) => Some(reply),
                Err(e) => {
                    warn!(conn = %self.id, "write failed: {}", e);
                    Some(ServerMessage::Error { message: e.to_string() })
                }
            },
        }
    }
}

async fn send(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> Result<(), axum::Error> {
    match msg.to_json() {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("failed to encode server message: {}", e);
            Ok(())
        }
    }
}

/// Handle a WebSocket connection
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    let mut conn = Connection {
        id: Uuid::new_v4(),
        outbox,
        project: None,
    };
    info!(conn = %conn.id, "connection opened");

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            // Handle incoming messages from client
            msg = receiver.next() => {
                let reply = match msg {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => conn.handle(&state, client_msg).await,
                        Err(e) => {
                            warn!(conn = %conn.id, "invalid message: {}", e);
                            Some(ServerMessage::Error {
                                message: format!("Invalid message: {}", e),
                            })
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => None,
                    Some(Err(e)) => {
                        warn!(conn = %conn.id, "WebSocket error: {}", e);
                        break;
                    }
                };
                if let Some(reply) = reply {
                    if send(&mut sender, &reply).await.is_err() {
                        break;
                    }
                }
            }

            // Snapshots and broadcasts queued for this connection
            Some(msg) = inbox.recv() => {
                if send(&mut sender, &msg).await.is_err() {
                    break;
                }
            }
        }
    }

    // Cleanup on disconnect
    state.hub.disconnect(conn.id);
    info!(conn = %conn.id, "connection closed");
}
