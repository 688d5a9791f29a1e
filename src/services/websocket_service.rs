//! Lifecycle handling for viewer WebSocket connections.
//!
//! A connection must identify itself with a `join` message naming the event
//! code it wants to watch. Once joined it is registered in that event's room
//! and receives the current results snapshot plus every subsequent full
//! refresh until it disconnects.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ClientMessage, ServerMessage},
    services::results_service,
    state::{SharedState, rooms::RoomMember},
};

const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle for an individual viewer WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps room broadcasts flowing even while we await
    // inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let initial_message = match tokio::time::timeout(JOIN_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(None) | Err(_) => {
            warn!("websocket join timed out");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let event_code = match serde_json::from_str::<ClientMessage>(&initial_message) {
        Ok(ClientMessage::Join { event_code }) => event_code,
        Ok(ClientMessage::Unknown) => {
            warn!("first websocket message was not a join");
            send_error(&outbound_tx, "expected a join message");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Err(err) => {
            warn!(error = %err, "failed to parse websocket message");
            send_error(&outbound_tx, "malformed message");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let event = match state.store().find_event_by_code(&event_code).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            send_error(&outbound_tx, "Event not found");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Err(err) => {
            warn!(error = %err, "failed to look up event for websocket join");
            send_error(&outbound_tx, "Event lookup failed");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let member_id = Uuid::new_v4();
    state.rooms().join(
        event.id,
        RoomMember {
            id: member_id,
            tx: outbound_tx.clone(),
        },
    );
    info!(member = %member_id, code = %event.code, "viewer joined event room");

    // Full refresh on join so late joiners start from the current picture.
    match results_service::results_for_event(&state, event.id).await {
        Ok(payload) => {
            send_message(&outbound_tx, &ServerMessage::ResultsUpdate(payload));
            send_message(
                &outbound_tx,
                &ServerMessage::EventStatus {
                    status: event.phase,
                },
            );
        }
        Err(err) => {
            warn!(code = %event.code, error = %err, "failed to build initial results snapshot");
        }
    }

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Join { .. }) => {
                    warn!(member = %member_id, "ignoring duplicate join message");
                }
                Ok(ClientMessage::Unknown) => {}
                Err(err) => {
                    warn!(member = %member_id, error = %err, "failed to parse websocket message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(member = %member_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.rooms().leave(event.id, member_id);
    info!(member = %member_id, code = %event.code, "viewer left event room");

    finalize(writer_task, outbound_tx).await;
}

fn send_message(tx: &mpsc::UnboundedSender<Message>, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(payload) => {
            let _ = tx.send(Message::Text(payload.into()));
        }
        Err(err) => warn!(error = %err, "failed to serialize websocket payload"),
    }
}

fn send_error(tx: &mpsc::UnboundedSender<Message>, message: &str) {
    send_message(
        tx,
        &ServerMessage::Error {
            message: message.to_string(),
        },
    );
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
