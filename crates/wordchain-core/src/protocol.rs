use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Messages sent from client to server. The `type` tag is snake_case and
/// field names are camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    CreateRoom {
        player_name: String,
    },
    JoinRoom {
        room_code: String,
        player_name: String,
    },
    SubmitWord {
        room_id: i64,
        player_id: i64,
        word: String,
    },
    SkipTurn {
        room_id: i64,
        player_id: i64,
    },
    LeaveRoom {
        room_id: i64,
        player_id: i64,
    },
}

/// Room identity as sent in `room_created`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: i64,
    pub code: String,
}

/// Full room state as sent in `room_joined` / `game_state_updated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: i64,
    pub code: String,
    pub current_word: Option<String>,
    pub word_chain: Vec<String>,
    pub current_player_index: usize,
}

/// The recipient's own player record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: i64,
    pub name: String,
    pub is_host: bool,
}

/// One entry in a room's player list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub id: i64,
    pub name: String,
    pub is_ready: bool,
    pub is_host: bool,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    RoomCreated {
        room: RoomSummary,
        player: PlayerProfile,
    },
    RoomJoined {
        room: RoomSnapshot,
        player: PlayerProfile,
        players: Vec<PlayerEntry>,
    },
    GameStateUpdated {
        room: RoomSnapshot,
        players: Vec<PlayerEntry>,
    },
    Error {
        kind: String,
        message: String,
    },
}

impl ServerMessage {
    /// Direct error reply for the originating connection.
    pub fn from_error(err: GameError) -> Self {
        ServerMessage::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}
