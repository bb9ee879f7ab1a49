//! `WebSocket` handler for tracking commands and live updates.
//!
//! Clients connect to `GET /ws` (after logging in) and may send
//! [`ClientCommand`] frames to start or stop tracking a registration.
//! Every connected client receives every [`ServerEvent::AircraftUpdate`]
//! published by any poller; command acknowledgements and errors go only
//! to the client that sent the command.
//!
//! Disconnecting never stops a tracker: the tracking namespace is shared
//! by all clients. If a client falls behind, missed updates are skipped
//! and it resumes from the most recent one.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use skywatch_tracker::TrackingRegistry;
use skywatch_types::{ClientCommand, ServerEvent};
use tracing::{debug, info, warn};

use crate::auth::Authenticated;
use crate::state::AppState;

/// Upgrade an authenticated request to a `WebSocket` connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_upgrade(
    _auth: Authenticated,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive one client connection until it closes or the server shuts down.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut updates = state.hub().subscribe();

    loop {
        tokio::select! {
            biased;

            // Shutdown first, then client commands, then fan-out.
            () = state.shutdown.cancelled() => {
                if let Err(e) = socket.send(Message::Close(None)).await {
                    debug!("WebSocket close failed: {e}");
                }
                break;
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text(&state.registry, text.as_str()).await;
                        if send_event(&mut socket, &reply).await.is_err() {
                            debug!("WebSocket client disconnected (reply failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Binary and pong frames carry no commands.
                    }
                }
            }

            // Fan-out from the pollers.
            update = updates.recv() => {
                let Some(update) = update else {
                    debug!("update hub closed, shutting down WebSocket");
                    break;
                };
                if send_event(&mut socket, &ServerEvent::AircraftUpdate(update)).await.is_err() {
                    debug!("WebSocket client disconnected (send failed)");
                    break;
                }
            }
        }
    }

    debug!(skipped = updates.skipped(), "WebSocket client disconnected");
}

/// Serialize an event and send it as a text frame.
async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize server event: {e}");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}

/// Parse one text frame and apply it, producing the reply for the sender.
pub async fn handle_text(registry: &TrackingRegistry, text: &str) -> ServerEvent {
    match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => apply_command(registry, command).await,
        Err(e) => {
            debug!(error = %e, "rejected WebSocket command");
            ServerEvent::Error {
                message: format!("invalid command: {e}"),
            }
        }
    }
}

/// Apply a tracking command to the registry.
pub async fn apply_command(registry: &TrackingRegistry, command: ClientCommand) -> ServerEvent {
    match command {
        ClientCommand::StartTracking { registration } => {
            let started = registry.start_tracking(registration).await;
            info!(
                registration = %started.key,
                generation = started.generation,
                replaced = started.replaced,
                "tracking started"
            );
            ServerEvent::TrackingStarted {
                registration: started.key,
                generation: started.generation,
                replaced: started.replaced,
            }
        }
        ClientCommand::StopTracking { registration } => {
            let was_active = registry.stop_tracking(&registration).await;
            info!(%registration, was_active, "tracking stopped");
            ServerEvent::TrackingStopped {
                registration,
                was_active,
            }
        }
    }
}
