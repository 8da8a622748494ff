use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use wordchain_core::protocol::{PlayerEntry, PlayerProfile, RoomSnapshot, RoomSummary};

/// A game room. Everything here is memory-resident and lost on restart.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: i64,
    pub code: String,
    pub current_word: Option<String>,
    pub word_chain: Vec<String>,
    pub current_player_index: usize,
    pub is_active: bool,
    pub created_at: Instant,
    pub last_activity: Instant,
}

impl Room {
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            code: self.code.clone(),
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            code: self.code.clone(),
            current_word: self.current_word.clone(),
            word_chain: self.word_chain.clone(),
            current_player_index: self.current_player_index,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub room_id: i64,
    pub is_ready: bool,
    pub is_host: bool,
    pub joined_at: Instant,
}

impl Player {
    pub fn profile(&self) -> PlayerProfile {
        PlayerProfile {
            id: self.id,
            name: self.name.clone(),
            is_host: self.is_host,
        }
    }

    pub fn entry(&self) -> PlayerEntry {
        PlayerEntry {
            id: self.id,
            name: self.name.clone(),
            is_ready: self.is_ready,
            is_host: self.is_host,
        }
    }
}

/// In-memory repository of rooms and players. Ids are monotonic and never
/// reused within a process lifetime, so player-id order is join order.
/// Holds no business rules; the turn engine layers those on top.
///
/// Lock order is rooms before players. `with_room_mut` holds the room's
/// shard guard for the whole closure, which serializes same-room
/// read-decide-write sequences.
pub struct RoomStore {
    rooms: DashMap<i64, Room>,
    /// code -> room id; doubles as the uniqueness reservation for codes.
    codes: DashMap<String, i64>,
    players: DashMap<i64, Player>,
    next_room_id: AtomicI64,
    next_player_id: AtomicI64,
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            codes: DashMap::new(),
            players: DashMap::new(),
            next_room_id: AtomicI64::new(1),
            next_player_id: AtomicI64::new(1),
        }
    }

    /// Create a room under `code`, reserving the code atomically. Returns
    /// `None` if the code is already taken; the caller retries with a fresh
    /// candidate.
    pub fn create_room(&self, code: &str) -> Option<Room> {
        match self.codes.entry(code.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let id = self.next_room_id.fetch_add(1, Ordering::Relaxed);
                slot.insert(id);
                let now = Instant::now();
                let room = Room {
                    id,
                    code: code.to_string(),
                    current_word: None,
                    word_chain: Vec::new(),
                    current_player_index: 0,
                    is_active: true,
                    created_at: now,
                    last_activity: now,
                };
                self.rooms.insert(id, room.clone());
                Some(room)
            }
        }
    }

    pub fn get_room(&self, id: i64) -> Option<Room> {
        self.rooms.get(&id).map(|r| r.value().clone())
    }

    pub fn get_room_by_code(&self, code: &str) -> Option<Room> {
        let id = *self.codes.get(code)?;
        self.get_room(id)
    }

    /// Run `f` with the room mutated under its shard guard and refresh the
    /// activity timestamp. Returns `None` for an unknown id.
    pub fn with_room_mut<T>(&self, id: i64, f: impl FnOnce(&mut Room) -> T) -> Option<T> {
        let mut room = self.rooms.get_mut(&id)?;
        let out = f(&mut room);
        room.last_activity = Instant::now();
        Some(out)
    }

    /// Delete a room, release its code and drop any players still in it.
    pub fn remove_room(&self, id: i64) -> Option<Room> {
        let (_, room) = self.rooms.remove(&id)?;
        self.codes.remove(&room.code);
        let stranded: Vec<i64> = self
            .players
            .iter()
            .filter(|p| p.room_id == id)
            .map(|p| p.id)
            .collect();
        for player_id in stranded {
            self.players.remove(&player_id);
        }
        Some(room)
    }

    pub fn create_player(&self, name: &str, room_id: i64, is_host: bool) -> Player {
        let id = self.next_player_id.fetch_add(1, Ordering::Relaxed);
        let player = Player {
            id,
            name: name.to_string(),
            room_id,
            is_ready: true,
            is_host,
            joined_at: Instant::now(),
        };
        self.players.insert(id, player.clone());
        player
    }

    pub fn get_player(&self, id: i64) -> Option<Player> {
        self.players.get(&id).map(|p| p.value().clone())
    }

    /// Players of a room in join order, which is also the turn order.
    pub fn players_in_room(&self, room_id: i64) -> Vec<Player> {
        let mut players: Vec<Player> = self
            .players
            .iter()
            .filter(|p| p.room_id == room_id)
            .map(|p| p.value().clone())
            .collect();
        players.sort_by_key(|p| p.id);
        players
    }

    /// Delete a player. Leaves the owning room's turn index untouched; the
    /// engine is responsible for recomputing it.
    pub fn remove_player(&self, id: i64) -> Option<Player> {
        self.players.remove(&id).map(|(_, p)| p)
    }

    /// Ids of rooms with no activity for at least `idle_for`.
    pub fn idle_room_ids(&self, idle_for: Duration) -> Vec<i64> {
        let now = Instant::now();
        self.rooms
            .iter()
            .filter(|r| now.duration_since(r.last_activity) >= idle_for)
            .map(|r| r.id)
            .collect()
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}
