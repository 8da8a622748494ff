use thiserror::Error;

/// Everything that can go wrong while handling a client command. The
/// `Display` string is what the client shows the user; `kind()` is the
/// stable machine-readable tag carried alongside it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Please enter a valid word (letters only, at least 2 characters)")]
    InvalidWord,
    #[error("Player not found")]
    PlayerNotFound,
    #[error("Invalid message format")]
    MalformedMessage,
    #[error("Internal server error")]
    Internal,
}

impl GameError {
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::RoomNotFound => "room_not_found",
            GameError::RoomFull => "room_full",
            GameError::NotYourTurn => "not_your_turn",
            GameError::InvalidWord => "invalid_word",
            GameError::PlayerNotFound => "player_not_found",
            GameError::MalformedMessage => "malformed_message",
            GameError::Internal => "internal",
        }
    }
}
