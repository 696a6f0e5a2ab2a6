//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered updates.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{FeedKind, FeedUpdate};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching updates from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(socket: WebSocket, mut update_rx: broadcast::Receiver<FeedUpdate>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_text_message(&text, &mut subs)
                            && ws_tx.send(Message::text(reply)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    _ => {}
                }
            }
            // Update from EventBus
            update = update_rx.recv() => {
                match update {
                    Ok(update) => {
                        if !subs.matches(&update) {
                            continue;
                        }
                        let Some(json) = encode_update(&update) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn encode(msg: &WsMessage) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode ws message");
            None
        }
    }
}

fn encode_update(update: &FeedUpdate) -> Option<String> {
    let payload = match serde_json::to_value(update) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(error = %err, update = update.update_type_str(), "failed to encode update");
            return None;
        }
    };
    encode(&WsMessage::new(
        uuid::Uuid::new_v4().to_string(),
        WsMessageType::Event,
        payload,
    ))
}

/// Splits client-supplied feed names into known feeds, the wildcard flag
/// and unrecognized names.
fn parse_feeds(names: &[String]) -> (Vec<FeedKind>, bool, Vec<String>) {
    let mut feeds = Vec::new();
    let mut wildcard = false;
    let mut rejected = Vec::new();
    for name in names {
        if name == "*" {
            wildcard = true;
        } else if let Ok(feed) = name.parse::<FeedKind>() {
            feeds.push(feed);
        } else {
            rejected.push(name.clone());
        }
    }
    (feeds, wildcard, rejected)
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return encode(&WsMessage::error(String::new(), 400, "malformed JSON"));
    };
    if msg.msg_type != WsMessageType::Command {
        return encode(&WsMessage::error(msg.id, 400, "expected a command"));
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return encode(&WsMessage::error(msg.id, 404, "unknown command"));
    };

    let payload = match command {
        WsCommand::Subscribe { feeds } => {
            let (feeds, wildcard, rejected) = parse_feeds(&feeds);
            subs.subscribe(&feeds, wildcard);
            serde_json::json!({
                "subscribed": subs.feeds(),
                "wildcard": subs.is_subscribed_all(),
                "rejected": rejected,
            })
        }
        WsCommand::Unsubscribe { feeds } => {
            let (feeds, wildcard, rejected) = parse_feeds(&feeds);
            subs.unsubscribe(&feeds, wildcard);
            serde_json::json!({
                "subscribed": subs.feeds(),
                "wildcard": subs.is_subscribed_all(),
                "rejected": rejected,
            })
        }
    };
    encode(&WsMessage::new(msg.id, WsMessageType::Response, payload))
}
