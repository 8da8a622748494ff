use std::sync::atomic::AtomicU32;

use crate::registry::ConnectionRegistry;
use crate::store::RoomStore;

/// Shared application state, constructed once at startup and passed around
/// behind an `Arc`. Tests build their own isolated instances.
pub struct AppState {
    pub store: RoomStore,
    pub registry: ConnectionRegistry,
    pub connection_count: AtomicU32,
    pub max_connections: u32,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: RoomStore::new(),
            registry: ConnectionRegistry::new(),
            connection_count: AtomicU32::new(0),
            max_connections: 256,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
