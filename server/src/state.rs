//! Shared handle threaded through the HTTP layer and the tick task.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::player_manager::PlayerManager;

/// Everything the server knows, behind the single simulation lock.
pub struct AppState {
    pub players: RwLock<PlayerManager>,
}

impl AppState {
    pub fn new(max_players: usize) -> Self {
        AppState {
            players: RwLock::new(PlayerManager::new(max_players)),
        }
    }
}

pub type SharedState = Arc<AppState>;
