pub mod error;
pub mod protocol;
pub mod word;

pub use error::GameError;
pub use protocol::{ClientMessage, ServerMessage};
pub use word::normalize_word;
