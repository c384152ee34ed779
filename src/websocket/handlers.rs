use axum::{
    extract::{
        ws::{Message, WebSocket},
        WebSocketUpgrade,
    },
    response::IntoResponse,
    Extension,
};
use log::{error, info};

use crate::{app_state::AppState, services::message_log::Snapshot};

// Handles the initial WebSocket upgrade request for the live message log
pub async fn subscribe_handler(
    ws: WebSocketUpgrade,
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_subscription(socket, state))
}

fn encode_snapshot(snapshot: &Snapshot) -> Option<String> {
    match serde_json::to_string(snapshot.as_ref()) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to encode snapshot: {}", e);
            None
        }
    }
}

// Streams the full ordered snapshot on connect and after every change until
// the client disconnects
async fn handle_subscription(mut socket: WebSocket, state: AppState) {
    let mut updates = state.messages.subscribe();
    info!("Log subscriber connected");

    let initial = updates.borrow_and_update().clone();
    if let Some(json) = encode_snapshot(&initial) {
        if let Err(e) = socket.send(Message::Text(json)).await {
            error!("Failed to send initial snapshot: {}", e);
            return;
        }
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    // subscribers only listen; anything they send is ignored
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(json) = encode_snapshot(&snapshot) {
                    if let Err(e) = socket.send(Message::Text(json)).await {
                        error!("Failed to send snapshot: {}", e);
                        break;
                    }
                }
            }
        }
    }

    info!("Log subscriber disconnected");
}
