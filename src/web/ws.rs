use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::server::AppState;
use crate::notify::{Notification, Publisher};

type WebSocketSink = SplitSink<WebSocket, Message>;

pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(upgrade))
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let publisher = state.fleet.publisher().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, publisher))
}

async fn handle_socket(socket: WebSocket, publisher: Publisher) {
    let connection_id = Uuid::new_v4();
    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut subscription = publisher.subscribe();
    info!(
        "Observer {} connected ({} total)",
        connection_id,
        publisher.observer_count()
    );

    if let Err(e) = send(&mut ws_sink, &Notification::greeting()).await {
        debug!("Observer {} dropped before greeting: {}", connection_id, e);
        return;
    }

    loop {
        tokio::select! {
            notification = subscription.recv() => match notification {
                Some(notification) => {
                    if let Err(e) = send(&mut ws_sink, &notification).await {
                        debug!("Observer {} not writable: {}", connection_id, e);
                        break;
                    }
                }
                None => break,
            },
            incoming = ws_stream.next() => match incoming {
                Some(Ok(Message::Close(reason))) => {
                    debug!("Observer {} requested close: {:?}", connection_id, reason);
                    break;
                }
                Some(Ok(_)) => debug!("Ignoring inbound message from {}", connection_id),
                Some(Err(e)) => {
                    error!("WebSocket error on {}: {}", connection_id, e);
                    break;
                }
                None => break,
            },
        }
    }

    info!("Observer {} disconnected", connection_id);
}

async fn send(sink: &mut WebSocketSink, notification: &Notification) -> Result<()> {
    let payload = serde_json::to_string(notification)?;
    sink.send(Message::Text(payload)).await?;
    Ok(())
}
