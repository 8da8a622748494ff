use crate::error::GameError;

/// Shortest word a player may submit.
pub const MIN_WORD_LEN: usize = 2;

/// Trim, upper-case and validate a submitted word. This is the only
/// validation path for words; the dispatcher and engine both go through it.
/// Accepted words match `^[A-Z]+$` and are at least [`MIN_WORD_LEN`] long.
pub fn normalize_word(raw: &str) -> Result<String, GameError> {
    let word = raw.trim().to_uppercase();
    if word.len() < MIN_WORD_LEN || !word.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(GameError::InvalidWord);
    }
    Ok(word)
}
