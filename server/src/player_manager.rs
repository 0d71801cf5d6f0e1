//! Player session registry.
//!
//! Tracks every connected player's session and simulation state, enforces
//! the join rules (unique names, capacity cap), and hands out the opaque
//! session ids the rest of the API is keyed by.

use std::collections::HashMap;

use log::info;
use rand::distributions::Alphanumeric;
use rand::Rng;
use shared::{PlayerId, PlayerInfo, World, GRID_SIZE, MAX_NAME_LEN, SESSION_ID_LEN};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::broadcast::{Outbox, TickFrame};
use crate::events::EventBag;

/// Why a join request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("name is required")]
    NameRequired,
    #[error("name already taken")]
    NameTaken,
    #[error("server is full")]
    ServerFull,
}

/// One player's complete server-side state: their company world, the
/// session timers, their personal event deck, and the broadcast plumbing.
#[derive(Debug)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub world: World,
    /// Ticks until this player may attack again.
    pub attack_cooldown: u32,
    /// Ticks of remaining immunity from attacks and random events.
    pub defense_buffer: u32,
    /// Personal shuffle deck of pending random events.
    pub event_bag: EventBag,
    /// One-shot payloads staged for this player's next snapshot.
    pub outbox: Outbox,
    join_order: u64,
    subscriber: Option<oneshot::Sender<TickFrame>>,
}

impl PlayerState {
    fn new(id: PlayerId, name: String, join_order: u64, rng: &mut impl Rng) -> Self {
        PlayerState {
            id,
            name,
            world: World::new(GRID_SIZE),
            attack_cooldown: 0,
            defense_buffer: 0,
            event_bag: EventBag::shuffled(rng),
            outbox: Outbox::default(),
            join_order,
            subscriber: None,
        }
    }

    /// Parks a fresh subscriber in the single slot and returns its
    /// receiving end. Any previously parked subscriber is dropped, which
    /// closes that stream on its next wait.
    pub fn attach_subscriber(&mut self) -> oneshot::Receiver<TickFrame> {
        let (sender, receiver) = oneshot::channel();
        self.subscriber = Some(sender);
        receiver
    }

    /// Takes the parked subscriber, leaving the slot empty. The broadcast
    /// pass uses this so each subscriber receives at most one frame per
    /// wait.
    pub fn take_subscriber(&mut self) -> Option<oneshot::Sender<TickFrame>> {
        self.subscriber.take()
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }
}

/// Owns every player, keyed by session id.
///
/// The manager itself does no locking; the server wraps exactly one of
/// these in a `RwLock` and all mutation flows through that lock.
#[derive(Debug)]
pub struct PlayerManager {
    /// Global tick counter, advanced by the game loop. Doubles as the SSE
    /// event id so clients can spot gaps.
    pub tick: u64,
    players: HashMap<PlayerId, PlayerState>,
    next_join_order: u64,
    max_players: usize,
}

impl PlayerManager {
    pub fn new(max_players: usize) -> Self {
        PlayerManager {
            tick: 0,
            players: HashMap::new(),
            next_join_order: 0,
            max_players,
        }
    }

    /// Admits a new player and returns their session id.
    ///
    /// The name is trimmed and truncated before the uniqueness check, so
    /// two names that collapse to the same trimmed form collide.
    pub fn join(&mut self, name: &str, rng: &mut impl Rng) -> Result<PlayerId, JoinError> {
        let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();
        if name.is_empty() {
            return Err(JoinError::NameRequired);
        }
        if self.players.values().any(|p| p.name == name) {
            return Err(JoinError::NameTaken);
        }
        if self.players.len() >= self.max_players {
            return Err(JoinError::ServerFull);
        }

        let mut id = generate_session_id(rng);
        while self.players.contains_key(&id) {
            id = generate_session_id(rng);
        }

        let join_order = self.next_join_order;
        self.next_join_order += 1;
        let player = PlayerState::new(id.clone(), name, join_order, rng);
        info!("player {} joined as {}", player.id, player.name);
        self.players.insert(id.clone(), player);
        Ok(id)
    }

    /// Removes a player entirely. Dropping their state also drops any
    /// parked subscriber, which ends that player's stream.
    pub fn remove(&mut self, player_id: &str) -> bool {
        match self.players.remove(player_id) {
            Some(player) => {
                info!("player {} ({}) removed", player.id, player.name);
                true
            }
            None => false,
        }
    }

    /// Clears the whole registry and reports how many players went.
    pub fn remove_all(&mut self) -> usize {
        let count = self.players.len();
        self.players.clear();
        if count > 0 {
            info!("removed all {} players", count);
        }
        count
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.get(player_id)
    }

    pub fn get_mut(&mut self, player_id: &str) -> Option<&mut PlayerState> {
        self.players.get_mut(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Session ids in join order, for deterministic sweeps over the
    /// registry.
    pub fn ids(&self) -> Vec<PlayerId> {
        let mut entries: Vec<(&PlayerId, u64)> = self
            .players
            .iter()
            .map(|(id, p)| (id, p.join_order))
            .collect();
        entries.sort_by_key(|&(_, order)| order);
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }

    /// Builds a fresh scoreboard over the whole registry, in join order.
    pub fn scoreboard(&self) -> Vec<PlayerInfo> {
        let mut players: Vec<&PlayerState> = self.players.values().collect();
        players.sort_by_key(|p| p.join_order);
        players
            .iter()
            .map(|p| PlayerInfo {
                id: p.id.clone(),
                name: p.name.clone(),
                funds: p.world.funds,
                building_count: p.world.building_count(),
                employee_count: p.world.headcount(),
                defense_buffer: p.defense_buffer,
            })
            .collect()
    }
}

fn generate_session_id(rng: &mut impl Rng) -> PlayerId {
    rng.sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}
