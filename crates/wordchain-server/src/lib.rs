pub mod codes;
pub mod engine;
pub mod registry;
pub mod routes;
pub mod state;
pub mod store;
pub mod ws;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// How long a room may sit idle before the reaper removes it.
const ROOM_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);
const REAPER_INTERVAL: Duration = Duration::from_secs(60);

/// Build a fully configured Router + shared state. Must run inside a tokio
/// runtime (spawns the room reaper).
pub fn build_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new());

    {
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REAPER_INTERVAL);
            loop {
                interval.tick().await;
                reap_idle_rooms(&state);
            }
        });
    }

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/ws", get(routes::ws_upgrade))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}

/// Rooms emptied through normal leaves are reaped inline; this sweep covers
/// rooms abandoned without a close handshake ever firing.
fn reap_idle_rooms(state: &AppState) {
    for room_id in state.store.idle_room_ids(ROOM_IDLE_TIMEOUT) {
        if state.store.remove_room(room_id).is_some() {
            tracing::info!(room = room_id, "reaped idle room");
        }
    }
}
