//! Snapshot rendering and tick delivery.
//!
//! Delivery is strictly at-most-once: each parked subscriber is taken out
//! of its slot, sent the frame for this tick, and must re-arm the slot to
//! hear about the next one. Nothing is buffered for absent subscribers,
//! and one-shot payloads are cleared after every broadcast whether or not
//! anyone was listening.

use log::{debug, error};
use shared::{DamageReport, EventOutcome, GameState};

use crate::player_manager::{PlayerManager, PlayerState};

/// One rendered tick for one player, ready to go over the wire.
#[derive(Debug)]
pub struct TickFrame {
    pub tick: u64,
    pub data: String,
}

/// One-shot payloads staged between a tick's update phase and its
/// broadcast. Populated by combat and events, cleared by `deliver_all`.
#[derive(Debug, Default)]
pub struct Outbox {
    pub attack_report: Option<DamageReport>,
    pub event_result: Option<EventOutcome>,
}

impl Outbox {
    pub fn clear(&mut self) {
        self.attack_report = None;
        self.event_result = None;
    }
}

/// Renders one player's personalized snapshot: their own world in full,
/// everyone else reduced to scoreboard rows.
pub fn snapshot(manager: &PlayerManager, player: &PlayerState) -> GameState {
    GameState {
        phase: player.world.phase,
        funds: player.world.funds,
        map_defense: player.world.map_defense,
        grid: player.world.grid.clone(),
        attack_active: player.outbox.attack_report.clone(),
        event_result: player.outbox.event_result.clone(),
        event_timer: player.world.event_timer,
        attack_cooldown: player.attack_cooldown,
        defense_buffer: player.defense_buffer,
        players: manager.scoreboard(),
    }
}

/// The broadcast phase of a tick: serialize a frame for every player with
/// a parked subscriber, hand each frame to its subscriber, then clear
/// every outbox. A send failure just means the client went away between
/// arming the slot and this tick.
pub fn deliver_all(manager: &mut PlayerManager) {
    let tick = manager.tick;
    let ids = manager.ids();

    let mut frames = Vec::new();
    for id in &ids {
        if let Some(player) = manager.get(id) {
            if !player.has_subscriber() {
                continue;
            }
            match serde_json::to_string(&snapshot(manager, player)) {
                Ok(data) => frames.push((id.clone(), data)),
                Err(e) => error!("failed to serialize snapshot for {}: {}", id, e),
            }
        }
    }

    for (id, data) in frames {
        if let Some(sender) = manager.get_mut(&id).and_then(|p| p.take_subscriber()) {
            if sender.send(TickFrame { tick, data }).is_err() {
                debug!("subscriber for {} went away before tick {}", id, tick);
            }
        }
    }

    for id in &ids {
        if let Some(player) = manager.get_mut(id) {
            player.outbox.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::{
        Building, BuildingKind, DamageReport, EmployeeKind, EventOutcome, SideLosses,
        MAX_PLAYERS, STARTING_FUNDS,
    };

    fn manager_with(names: &[&str]) -> (PlayerManager, Vec<String>) {
        let mut manager = PlayerManager::new(MAX_PLAYERS);
        let mut rng = StdRng::seed_from_u64(5);
        let ids = names
            .iter()
            .map(|n| manager.join(n, &mut rng).unwrap())
            .collect();
        (manager, ids)
    }

    fn sample_report() -> DamageReport {
        DamageReport {
            attacker_name: "a".into(),
            defender_name: "b".into(),
            troops_sent: 1,
            attacker: SideLosses {
                employees_lost: 0,
                buildings_lost: 0,
            },
            defender: SideLosses {
                employees_lost: 1,
                buildings_lost: 0,
            },
            cash_stolen: 0,
            is_attacker: true,
        }
    }

    #[test]
    fn test_snapshot_carries_world_and_scoreboard() {
        let (mut manager, ids) = manager_with(&["alpha", "beta"]);
        let player = manager.get_mut(&ids[0]).unwrap();
        if let Some(tile) = player.world.tile_mut(0, 0) {
            tile.building = Some(Building::new(BuildingKind::Office));
        }
        player.world.add_employee(0, 0, EmployeeKind::OfficeWorker);

        let player = manager.get(&ids[0]).unwrap();
        let state = snapshot(&manager, player);
        assert_eq!(state.funds, STARTING_FUNDS);
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players[0].name, "alpha");
        assert_eq!(state.players[0].employee_count, 1);
        assert_eq!(state.players[1].employee_count, 0);
        assert!(state.attack_active.is_none());
    }

    #[test]
    fn test_snapshot_includes_staged_one_shots() {
        let (mut manager, ids) = manager_with(&["alpha"]);
        let player = manager.get_mut(&ids[0]).unwrap();
        player.outbox.attack_report = Some(sample_report());
        player.outbox.event_result = Some(EventOutcome::new("Tax Audit", "ouch"));

        let player = manager.get(&ids[0]).unwrap();
        let state = snapshot(&manager, player);
        assert!(state.attack_active.is_some());
        assert_eq!(state.event_result.as_ref().unwrap().title, "Tax Audit");
    }

    #[test]
    fn test_deliver_all_sends_one_frame_and_empties_slot() {
        let (mut manager, ids) = manager_with(&["alpha"]);
        manager.tick = 9;
        let mut receiver = manager.get_mut(&ids[0]).unwrap().attach_subscriber();

        deliver_all(&mut manager);

        let frame = receiver.try_recv().unwrap();
        assert_eq!(frame.tick, 9);
        assert!(frame.data.contains("\"funds\":1000"));
        // the slot is spent until the subscriber re-arms it
        assert!(!manager.get(&ids[0]).unwrap().has_subscriber());
    }

    #[test]
    fn test_deliver_all_without_subscriber_buffers_nothing() {
        let (mut manager, ids) = manager_with(&["alpha"]);
        deliver_all(&mut manager);

        // arming after the broadcast yields nothing until the next tick
        let mut receiver = manager.get_mut(&ids[0]).unwrap().attach_subscriber();
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_deliver_all_clears_outboxes_even_unobserved() {
        let (mut manager, ids) = manager_with(&["alpha"]);
        manager.get_mut(&ids[0]).unwrap().outbox.attack_report = Some(sample_report());

        deliver_all(&mut manager);

        let player = manager.get(&ids[0]).unwrap();
        assert!(player.outbox.attack_report.is_none());
        assert!(player.outbox.event_result.is_none());
    }

    #[test]
    fn test_one_shot_rides_exactly_one_frame() {
        let (mut manager, ids) = manager_with(&["alpha"]);
        manager.get_mut(&ids[0]).unwrap().outbox.event_result =
            Some(EventOutcome::new("Rebranded!", "oops"));

        manager.tick = 1;
        let mut receiver = manager.get_mut(&ids[0]).unwrap().attach_subscriber();
        deliver_all(&mut manager);
        let frame = receiver.try_recv().unwrap();
        assert!(frame.data.contains("Rebranded!"));

        manager.tick = 2;
        let mut receiver = manager.get_mut(&ids[0]).unwrap().attach_subscriber();
        deliver_all(&mut manager);
        let frame = receiver.try_recv().unwrap();
        assert!(!frame.data.contains("Rebranded!"));
        assert!(frame.data.contains("\"eventResult\":null"));
    }

    #[test]
    fn test_dropped_receiver_does_not_disturb_others() {
        let (mut manager, ids) = manager_with(&["alpha", "beta"]);
        let dropped = manager.get_mut(&ids[0]).unwrap().attach_subscriber();
        drop(dropped);
        let mut live = manager.get_mut(&ids[1]).unwrap().attach_subscriber();

        manager.tick = 3;
        deliver_all(&mut manager);

        let frame = live.try_recv().unwrap();
        assert_eq!(frame.tick, 3);
    }
}
