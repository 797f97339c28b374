use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::handler::AppState;
use super::hub::FeedMessage;

/// GET /ws — upgrades to the live price feed stream
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Greet before the connection joins the broadcast set
    if let Ok(json) = serde_json::to_string(&FeedMessage::connected()) {
        if sender.send(Message::Text(json)).await.is_err() {
            return;
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let id = state.hub.register(tx);
    info!("🔌 WebSocket client connected ({} total)", state.hub.subscriber_count());

    // Writer task: drains the hub's channel into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    // Reader loop: inbound messages carry no protocol meaning, log and move on
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Text(text)) => debug!("received: {text}"),
                Ok(Message::Close(_)) => break,
                Err(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.remove(id);
    info!("👋 WebSocket client disconnected ({} total)", state.hub.subscriber_count());
}
