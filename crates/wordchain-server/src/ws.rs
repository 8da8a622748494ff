use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use tokio::sync::mpsc;

use wordchain_core::GameError;
use wordchain_core::protocol::{ClientMessage, ServerMessage};

use crate::engine::{self, GameUpdate, LeaveOutcome};
use crate::state::AppState;

/// Messages allowed per second on one connection before it gets throttled.
const RATE_LIMIT_PER_SEC: u32 = 20;

/// Top-level WebSocket handler -- spawned per connection.
///
/// The connection starts anonymous; `bound` is set once the client creates
/// or joins a room and mirrors the registry entry. When the socket closes
/// the bound player leaves its room exactly as if it had sent `leave_room`.
pub async fn handle_socket(state: Arc<AppState>, mut socket: WebSocket) {
    state.connection_count.fetch_add(1, Ordering::Relaxed);

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let mut bound: Option<(i64, i64)> = None;
    let mut message_count = 0u32;
    let mut rate_window = Instant::now();

    loop {
        tokio::select! {
            // Outbound: forward queued ServerMessage to the WebSocket.
            Some(msg) = rx.recv() => {
                if let Ok(json) = serde_json::to_string(&msg) {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            // Inbound: read from the WebSocket.
            maybe_msg = socket.recv() => {
                match maybe_msg {
                    Some(Ok(Message::Text(text))) => {
                        let now = Instant::now();
                        if now.duration_since(rate_window) > Duration::from_secs(1) {
                            rate_window = now;
                            message_count = 0;
                        }
                        message_count += 1;
                        if message_count > RATE_LIMIT_PER_SEC {
                            let _ = tx.send(ServerMessage::Error {
                                kind: "rate_limited".into(),
                                message: "Rate limited".into(),
                            });
                            continue;
                        }

                        let client_msg: ClientMessage = match serde_json::from_str(&text) {
                            Ok(m) => m,
                            Err(err) => {
                                tracing::debug!(%err, "rejecting malformed message");
                                let _ = tx.send(ServerMessage::from_error(
                                    GameError::MalformedMessage,
                                ));
                                continue;
                            }
                        };

                        handle_message(&state, &tx, &mut bound, client_msg);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    _ => continue,
                }
            }
        }
    }

    // Disconnected: the bound player leaves its room.
    if let Some((player_id, room_id)) = bound {
        drop_player(&state, player_id, room_id);
    }
    state.connection_count.fetch_sub(1, Ordering::Relaxed);
}

/// Dispatch a single client message. All store and engine calls are
/// synchronous, so each command is applied atomically with respect to other
/// commands for the same room.
fn handle_message(
    state: &Arc<AppState>,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    bound: &mut Option<(i64, i64)>,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::CreateRoom { player_name } => {
            // A connection re-creating or re-joining first leaves its old room.
            if let Some((player_id, room_id)) = bound.take() {
                drop_player(state, player_id, room_id);
            }
            match engine::create_room(&state.store, &player_name) {
                Ok((room, player)) => {
                    state.registry.bind(player.id, room.id, tx.clone());
                    *bound = Some((player.id, room.id));
                    tracing::info!(code = %room.code, player = player.id, "room created");
                    let _ = tx.send(ServerMessage::RoomCreated {
                        room: room.summary(),
                        player: player.profile(),
                    });
                }
                Err(err) => {
                    tracing::warn!(%err, "create_room failed");
                    let _ = tx.send(ServerMessage::from_error(err));
                }
            }
        }

        ClientMessage::JoinRoom {
            room_code,
            player_name,
        } => {
            if let Some((player_id, room_id)) = bound.take() {
                drop_player(state, player_id, room_id);
            }
            match engine::join_room(&state.store, &room_code, &player_name) {
                Ok((room, player, players)) => {
                    state.registry.bind(player.id, room.id, tx.clone());
                    *bound = Some((player.id, room.id));
                    tracing::info!(code = %room.code, player = player.id, "player joined");
                    let _ = tx.send(ServerMessage::RoomJoined {
                        room: room.snapshot(),
                        player: player.profile(),
                        players: players.iter().map(|p| p.entry()).collect(),
                    });
                    // Everyone in the room, joiner included, refreshes.
                    broadcast_state(state, room.id, &GameUpdate { room, players });
                }
                Err(err) => {
                    let _ = tx.send(ServerMessage::from_error(err));
                }
            }
        }

        ClientMessage::SubmitWord {
            room_id,
            player_id,
            word,
        } => match engine::submit_word(&state.store, room_id, player_id, &word) {
            Ok(update) => broadcast_state(state, room_id, &update),
            Err(err) => {
                let _ = tx.send(ServerMessage::from_error(err));
            }
        },

        ClientMessage::SkipTurn { room_id, player_id } => {
            match engine::skip_turn(&state.store, room_id, player_id) {
                Ok(update) => broadcast_state(state, room_id, &update),
                Err(err) => {
                    let _ = tx.send(ServerMessage::from_error(err));
                }
            }
        }

        ClientMessage::LeaveRoom { room_id, player_id } => {
            match engine::leave_room(&state.store, room_id, player_id) {
                Ok(outcome) => {
                    state.registry.unbind(player_id);
                    if matches!(bound, Some((bound_player, _)) if *bound_player == player_id) {
                        *bound = None;
                    }
                    tracing::info!(room = room_id, player = player_id, "player left");
                    if let LeaveOutcome::Remaining(update) = outcome {
                        broadcast_state(state, room_id, &update);
                    }
                }
                Err(err) => {
                    let _ = tx.send(ServerMessage::from_error(err));
                }
            }
        }
    }
}

/// Remove a player whose connection is gone (or is switching rooms) and let
/// the rest of its room know.
fn drop_player(state: &AppState, player_id: i64, room_id: i64) {
    state.registry.unbind(player_id);
    match engine::leave_room(&state.store, room_id, player_id) {
        Ok(LeaveOutcome::Remaining(update)) => {
            tracing::info!(room = room_id, player = player_id, "player disconnected");
            broadcast_state(state, room_id, &update);
        }
        Ok(LeaveOutcome::RoomEmpty) => {
            tracing::info!(room = room_id, "room emptied and reaped");
        }
        // The room may already be gone; nothing left to clean up.
        Err(_) => {}
    }
}

fn broadcast_state(state: &AppState, room_id: i64, update: &GameUpdate) {
    state.registry.broadcast(
        room_id,
        ServerMessage::GameStateUpdated {
            room: update.room.snapshot(),
            players: update.players.iter().map(|p| p.entry()).collect(),
        },
    );
}
