use dashmap::DashMap;
use tokio::sync::mpsc;

use wordchain_core::protocol::ServerMessage;

/// Handle to push messages to a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub player_id: i64,
    pub room_id: i64,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

/// Side-table mapping a player identity to its live outbound channel.
/// Delivery is best-effort: sends to closed or missing channels are
/// silently dropped, so a disconnected-but-not-yet-cleaned-up player never
/// stalls a broadcast.
pub struct ConnectionRegistry {
    connections: DashMap<i64, ConnectionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn bind(&self, player_id: i64, room_id: i64, tx: mpsc::UnboundedSender<ServerMessage>) {
        self.connections.insert(
            player_id,
            ConnectionHandle {
                player_id,
                room_id,
                tx,
            },
        );
    }

    pub fn unbind(&self, player_id: i64) {
        self.connections.remove(&player_id);
    }

    pub fn send_to(&self, player_id: i64, msg: ServerMessage) {
        if let Some(conn) = self.connections.get(&player_id) {
            let _ = conn.tx.send(msg);
        }
    }

    /// Deliver `msg` to every connection currently bound to `room_id`.
    pub fn broadcast(&self, room_id: i64, msg: ServerMessage) {
        for conn in self.connections.iter() {
            if conn.room_id == room_id {
                let _ = conn.tx.send(msg.clone());
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordchain_core::GameError;

    fn channel() -> (
        mpsc::UnboundedSender<ServerMessage>,
        mpsc::UnboundedReceiver<ServerMessage>,
    ) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn send_to_reaches_only_the_bound_player() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        registry.bind(1, 10, tx1);
        registry.bind(2, 10, tx2);

        registry.send_to(1, ServerMessage::from_error(GameError::NotYourTurn));
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn broadcast_scoped_to_room() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        let (tx3, mut rx3) = channel();
        registry.bind(1, 10, tx1);
        registry.bind(2, 10, tx2);
        registry.bind(3, 11, tx3);

        registry.broadcast(10, ServerMessage::from_error(GameError::Internal));
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_err());
    }

    #[test]
    fn sends_to_unbound_or_closed_channels_are_noops() {
        let registry = ConnectionRegistry::new();
        registry.send_to(42, ServerMessage::from_error(GameError::Internal));

        let (tx, rx) = channel();
        registry.bind(1, 10, tx);
        drop(rx);
        // Closed receiver: broadcast must not panic or error out.
        registry.broadcast(10, ServerMessage::from_error(GameError::Internal));
    }

    #[test]
    fn unbind_removes_the_association() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel();
        registry.bind(1, 10, tx);
        registry.unbind(1);
        registry.send_to(1, ServerMessage::from_error(GameError::Internal));
        assert!(rx.try_recv().is_err());
        assert_eq!(registry.connection_count(), 0);
    }
}
