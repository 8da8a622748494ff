//! Turn-order and word-chain rules, layered on top of the plain CRUD store.
//!
//! Every read-decide-write here runs inside `RoomStore::with_room_mut`, so
//! concurrent commands against the same room are serialized by the room's
//! map guard and the turn index can never be advanced twice for one turn.

use wordchain_core::GameError;
use wordchain_core::word::normalize_word;

use crate::codes::generate_room_code;
use crate::store::{Player, Room, RoomStore};

/// Hard cap on players per room, enforced at join time.
pub const ROOM_CAPACITY: usize = 6;

/// Give up on code generation after this many reservation misses.
const MAX_CODE_ATTEMPTS: usize = 64;

/// A room mutation plus the player list it was decided against, ready to be
/// fanned out as `game_state_updated`.
#[derive(Debug, Clone)]
pub struct GameUpdate {
    pub room: Room,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone)]
pub enum LeaveOutcome {
    /// The room still has players; broadcast the update to them.
    Remaining(GameUpdate),
    /// The departing player was the last one; the room has been reaped.
    RoomEmpty,
}

/// Create a room with a freshly reserved unique code and its host player.
pub fn create_room(store: &RoomStore, player_name: &str) -> Result<(Room, Player), GameError> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_room_code();
        if let Some(room) = store.create_room(&code) {
            let player = store.create_player(player_name, room.id, true);
            return Ok((room, player));
        }
    }
    // Only reachable if essentially the whole code space is live.
    Err(GameError::Internal)
}

/// Join an existing room by code. The capacity check and player creation
/// happen under the room guard so concurrent joins cannot overshoot the cap.
pub fn join_room(
    store: &RoomStore,
    room_code: &str,
    player_name: &str,
) -> Result<(Room, Player, Vec<Player>), GameError> {
    let room_id = store
        .get_room_by_code(&room_code.trim().to_uppercase())
        .ok_or(GameError::RoomNotFound)?
        .id;

    store
        .with_room_mut(room_id, |room| {
            let current = store.players_in_room(room_id);
            if current.len() >= ROOM_CAPACITY {
                return Err(GameError::RoomFull);
            }
            let player = store.create_player(player_name, room_id, false);
            let mut players = current;
            players.push(player.clone());
            Ok((room.clone(), player, players))
        })
        .ok_or(GameError::RoomNotFound)?
}

/// Append a word to the chain and pass the turn.
pub fn submit_word(
    store: &RoomStore,
    room_id: i64,
    player_id: i64,
    word: &str,
) -> Result<GameUpdate, GameError> {
    store
        .with_room_mut(room_id, |room| {
            let players = store.players_in_room(room_id);
            let turn_holder = current_player(room, &players)?;
            if !players.iter().any(|p| p.id == player_id) {
                return Err(GameError::PlayerNotFound);
            }
            if turn_holder.id != player_id {
                return Err(GameError::NotYourTurn);
            }
            let word = normalize_word(word)?;
            room.word_chain.push(word.clone());
            room.current_word = Some(word);
            room.current_player_index = (room.current_player_index + 1) % players.len();
            Ok(GameUpdate {
                room: room.clone(),
                players,
            })
        })
        .ok_or(GameError::RoomNotFound)?
}

/// Pass the turn without touching the chain.
pub fn skip_turn(store: &RoomStore, room_id: i64, player_id: i64) -> Result<GameUpdate, GameError> {
    store
        .with_room_mut(room_id, |room| {
            let players = store.players_in_room(room_id);
            let turn_holder = current_player(room, &players)?;
            if !players.iter().any(|p| p.id == player_id) {
                return Err(GameError::PlayerNotFound);
            }
            if turn_holder.id != player_id {
                return Err(GameError::NotYourTurn);
            }
            room.current_player_index = (room.current_player_index + 1) % players.len();
            Ok(GameUpdate {
                room: room.clone(),
                players,
            })
        })
        .ok_or(GameError::RoomNotFound)?
}

/// Remove a player from its room. The turn is tracked by identity across the
/// removal: if a non-current player leaves, the index is recomputed so the
/// same player still holds the turn; if the turn holder leaves, the turn
/// passes to the next seat in cyclic order. An emptied room is reaped.
pub fn leave_room(
    store: &RoomStore,
    room_id: i64,
    player_id: i64,
) -> Result<LeaveOutcome, GameError> {
    let outcome = store
        .with_room_mut(room_id, |room| {
            let players = store.players_in_room(room_id);
            if !players.iter().any(|p| p.id == player_id) {
                return Err(GameError::PlayerNotFound);
            }
            let turn_holder_id = current_player(room, &players)?.id;
            store.remove_player(player_id);

            let remaining: Vec<Player> = players.into_iter().filter(|p| p.id != player_id).collect();
            if remaining.is_empty() {
                return Ok(LeaveOutcome::RoomEmpty);
            }

            room.current_player_index = if player_id == turn_holder_id {
                // The next seat in the pre-removal order now sits at the old
                // index, except when the holder was last, which wraps to 0.
                room.current_player_index % remaining.len()
            } else {
                remaining
                    .iter()
                    .position(|p| p.id == turn_holder_id)
                    .unwrap_or(0)
            };
            Ok(LeaveOutcome::Remaining(GameUpdate {
                room: room.clone(),
                players: remaining,
            }))
        })
        .ok_or(GameError::RoomNotFound)??;

    if matches!(outcome, LeaveOutcome::RoomEmpty) {
        store.remove_room(room_id);
    }
    Ok(outcome)
}

fn current_player<'a>(room: &Room, players: &'a [Player]) -> Result<&'a Player, GameError> {
    players
        .get(room.current_player_index)
        .ok_or(GameError::PlayerNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_players(store: &RoomStore, names: &[&str]) -> (Room, Vec<Player>) {
        let (room, host) = create_room(store, names[0]).unwrap();
        let mut players = vec![host];
        for name in &names[1..] {
            let (_, p, _) = join_room(store, &room.code, name).unwrap();
            players.push(p);
        }
        (room, players)
    }

    #[test]
    fn create_room_makes_host() {
        let store = RoomStore::new();
        let (room, host) = create_room(&store, "Alice").unwrap();
        assert!(host.is_host);
        assert!(host.is_ready);
        assert_eq!(host.room_id, room.id);
        assert_eq!(room.current_player_index, 0);
        assert!(room.word_chain.is_empty());
    }

    #[test]
    fn join_unknown_code_fails() {
        let store = RoomStore::new();
        assert_eq!(
            join_room(&store, "NOPE00", "Bob").unwrap_err(),
            GameError::RoomNotFound
        );
    }

    #[test]
    fn join_is_case_insensitive_on_code() {
        let store = RoomStore::new();
        let (room, _) = create_room(&store, "Alice").unwrap();
        let (joined, player, _) = join_room(&store, &room.code.to_lowercase(), "Bob").unwrap();
        assert_eq!(joined.id, room.id);
        assert!(!player.is_host);
    }

    #[test]
    fn join_full_room_fails_and_creates_no_player() {
        let store = RoomStore::new();
        let (room, _) = room_with_players(&store, &["P1", "P2", "P3", "P4", "P5", "P6"]);
        assert_eq!(
            join_room(&store, &room.code, "P7").unwrap_err(),
            GameError::RoomFull
        );
        assert_eq!(store.players_in_room(room.id).len(), ROOM_CAPACITY);
    }

    #[test]
    fn submit_word_appends_and_advances_turn() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob"]);
        let update = submit_word(&store, room.id, players[0].id, " ocean ").unwrap();
        assert_eq!(update.room.word_chain, vec!["OCEAN"]);
        assert_eq!(update.room.current_word.as_deref(), Some("OCEAN"));
        assert_eq!(update.room.current_player_index, 1);
    }

    #[test]
    fn turn_wraps_around_modulo_player_count() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob", "Cara"]);
        submit_word(&store, room.id, players[0].id, "ocean").unwrap();
        submit_word(&store, room.id, players[1].id, "waves").unwrap();
        let update = submit_word(&store, room.id, players[2].id, "shore").unwrap();
        assert_eq!(update.room.current_player_index, 0);
        assert_eq!(update.room.word_chain.len(), 3);
    }

    #[test]
    fn submit_out_of_turn_leaves_state_unchanged() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob"]);
        assert_eq!(
            submit_word(&store, room.id, players[1].id, "waves").unwrap_err(),
            GameError::NotYourTurn
        );
        let unchanged = store.get_room(room.id).unwrap();
        assert!(unchanged.word_chain.is_empty());
        assert_eq!(unchanged.current_player_index, 0);
    }

    #[test]
    fn invalid_word_rejected_without_side_effects() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob"]);
        for bad in ["ocean2", "x", "", "two words"] {
            assert_eq!(
                submit_word(&store, room.id, players[0].id, bad).unwrap_err(),
                GameError::InvalidWord
            );
        }
        let unchanged = store.get_room(room.id).unwrap();
        assert!(unchanged.word_chain.is_empty());
        assert_eq!(unchanged.current_player_index, 0);
    }

    #[test]
    fn submit_from_stranger_is_player_not_found() {
        let store = RoomStore::new();
        let (room, _) = room_with_players(&store, &["Alice", "Bob"]);
        assert_eq!(
            submit_word(&store, room.id, 9999, "ocean").unwrap_err(),
            GameError::PlayerNotFound
        );
    }

    #[test]
    fn word_chain_is_append_only() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob"]);
        let mut expected = Vec::new();
        for (i, word) in ["ocean", "waves", "shore", "sands"].iter().enumerate() {
            let update = submit_word(&store, room.id, players[i % 2].id, word).unwrap();
            expected.push(word.to_uppercase());
            assert_eq!(update.room.word_chain, expected);
        }
    }

    #[test]
    fn skip_turn_advances_without_touching_chain() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob"]);
        let update = skip_turn(&store, room.id, players[0].id).unwrap();
        assert_eq!(update.room.current_player_index, 1);
        assert!(update.room.word_chain.is_empty());
        assert!(update.room.current_word.is_none());
    }

    #[test]
    fn skip_out_of_turn_rejected() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob"]);
        assert_eq!(
            skip_turn(&store, room.id, players[1].id).unwrap_err(),
            GameError::NotYourTurn
        );
    }

    #[test]
    fn current_player_leaving_passes_turn_to_next_seat() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob", "Cara"]);
        // Alice holds the turn and leaves; Bob (next seat) should hold it.
        match leave_room(&store, room.id, players[0].id).unwrap() {
            LeaveOutcome::Remaining(update) => {
                assert_eq!(update.players.len(), 2);
                assert_eq!(update.players[update.room.current_player_index].id, players[1].id);
            }
            LeaveOutcome::RoomEmpty => panic!("room should not be empty"),
        }
    }

    #[test]
    fn last_seat_holder_leaving_wraps_turn_to_first() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob", "Cara"]);
        submit_word(&store, room.id, players[0].id, "ocean").unwrap();
        submit_word(&store, room.id, players[1].id, "waves").unwrap();
        // Cara holds the turn at the last seat and leaves.
        match leave_room(&store, room.id, players[2].id).unwrap() {
            LeaveOutcome::Remaining(update) => {
                assert_eq!(update.room.current_player_index, 0);
                assert_eq!(update.players[0].id, players[0].id);
            }
            LeaveOutcome::RoomEmpty => panic!("room should not be empty"),
        }
    }

    #[test]
    fn earlier_player_leaving_keeps_turn_with_same_player() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob", "Cara"]);
        submit_word(&store, room.id, players[0].id, "ocean").unwrap();
        submit_word(&store, room.id, players[1].id, "waves").unwrap();
        // Cara holds the turn; Alice (seat before her) leaves. The turn must
        // stay with Cara, not fall back to whoever lands at her old index.
        match leave_room(&store, room.id, players[0].id).unwrap() {
            LeaveOutcome::Remaining(update) => {
                assert_eq!(update.players[update.room.current_player_index].id, players[2].id);
            }
            LeaveOutcome::RoomEmpty => panic!("room should not be empty"),
        }
    }

    #[test]
    fn two_player_room_clamps_index_for_survivor() {
        let store = RoomStore::new();
        let (room, players) = room_with_players(&store, &["Alice", "Bob"]);
        match leave_room(&store, room.id, players[0].id).unwrap() {
            LeaveOutcome::Remaining(update) => {
                assert_eq!(update.room.current_player_index, 0);
                assert_eq!(update.players.len(), 1);
                assert_eq!(update.players[0].id, players[1].id);
            }
            LeaveOutcome::RoomEmpty => panic!("room should not be empty"),
        }
    }

    #[test]
    fn last_player_leaving_reaps_the_room() {
        let store = RoomStore::new();
        let (room, host) = create_room(&store, "Alice").unwrap();
        let outcome = leave_room(&store, room.id, host.id).unwrap();
        assert!(matches!(outcome, LeaveOutcome::RoomEmpty));
        assert!(store.get_room(room.id).is_none());
        assert!(store.get_room_by_code(&room.code).is_none());
    }

    #[test]
    fn leave_by_stranger_is_player_not_found() {
        let store = RoomStore::new();
        let (room, _) = room_with_players(&store, &["Alice", "Bob"]);
        assert_eq!(
            leave_room(&store, room.id, 9999).unwrap_err(),
            GameError::PlayerNotFound
        );
    }

    #[test]
    fn generated_codes_are_unique_across_live_rooms() {
        let store = RoomStore::new();
        let mut codes = std::collections::HashSet::new();
        for i in 0..40 {
            let (room, _) = create_room(&store, &format!("P{i}")).unwrap();
            assert!(codes.insert(room.code.clone()), "duplicate code {}", room.code);
        }
    }
}
