// Relay WebSocket endpoint
//
// A socket is anonymous until it sends {"type":"join","user_id":...}; from then
// on every RelayEvent published for that user is written to it. A second join
// on the same socket rebinds it.
//
// When the upgrade request carries X-User-Id the socket is bound to that user
// immediately and may only join as that user. Header-less sockets trust the
// join frame, same as the HTTP routes trust the gateway-set header.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::identity::CurrentUser;
use crate::relay::ConnectionRegistry;

/// Frames a client may send
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Join { user_id: Uuid },
    Ping,
}

/// App state for the relay socket
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

/// Create relay routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/ws", get(ws_handler))
        .with_state(state)
}

/// GET /v1/ws - Upgrade to the relay WebSocket
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Response {
    let identity = user.map(|u| u.id);
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry, identity))
}

/// Whether a socket may join as `requested`
fn join_allowed(identity: Option<Uuid>, requested: Uuid) -> bool {
    identity.map_or(true, |id| id == requested)
}

async fn handle_socket(
    socket: WebSocket,
    registry: Arc<ConnectionRegistry>,
    identity: Option<Uuid>,
) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut conn_id: Option<Uuid> = identity.map(|user_id| {
        let id = registry.register(user_id, tx.clone());
        send_json(&tx, &json!({ "event": "joined", "data": { "user_id": user_id } }));
        id
    });

    while let Some(next) = receiver.next().await {
        let text = match next {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        match serde_json::from_str::<ClientFrame>(&text) {
            Ok(ClientFrame::Join { user_id }) if !join_allowed(identity, user_id) => {
                tracing::warn!(%user_id, "Relay join rejected for another user");
                send_json(
                    &tx,
                    &json!({ "event": "error", "data": { "message": "Cannot join as another user" } }),
                );
            }
            Ok(ClientFrame::Join { user_id }) => {
                if let Some(previous) = conn_id.take() {
                    registry.unregister(previous);
                }
                conn_id = Some(registry.register(user_id, tx.clone()));
                send_json(&tx, &json!({ "event": "joined", "data": { "user_id": user_id } }));
            }
            Ok(ClientFrame::Ping) => {
                send_json(&tx, &json!({ "event": "pong", "data": {} }));
            }
            Err(e) => {
                tracing::debug!("Rejected relay frame: {}", e);
                send_json(
                    &tx,
                    &json!({ "event": "error", "data": { "message": "Unrecognized frame" } }),
                );
            }
        }
    }

    if let Some(id) = conn_id {
        registry.unregister(id);
    }
    drop(tx);
    let _ = send_task.await;
}

fn send_json(tx: &mpsc::UnboundedSender<Message>, value: &serde_json::Value) {
    let _ = tx.send(Message::Text(value.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_frame() {
        let user_id = Uuid::now_v7();
        let frame: ClientFrame =
            serde_json::from_value(json!({ "type": "join", "user_id": user_id })).unwrap();
        assert_eq!(frame, ClientFrame::Join { user_id });
    }

    #[test]
    fn test_parse_ping_frame() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(frame, ClientFrame::Ping);
    }

    #[test]
    fn test_join_bound_to_header_identity() {
        let me = Uuid::now_v7();
        assert!(join_allowed(Some(me), me));
        assert!(!join_allowed(Some(me), Uuid::now_v7()));
        assert!(join_allowed(None, Uuid::now_v7()));
    }

    #[test]
    fn test_client_cannot_send_session_events() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"endSession"}"#).is_err());
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"join"}"#).is_err());
    }
}
