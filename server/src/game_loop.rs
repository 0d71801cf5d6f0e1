//! The fixed-period simulation driver.
//!
//! Runs the two-phase tick: update every player first, then broadcast to
//! every player. The whole step happens under one write lock, so no
//! snapshot can ever mix tick N and tick N+1 state.

use std::time::Duration;

use log::debug;
use rand::Rng;
use shared::EVENT_INTERVAL_TICKS;
use tokio::time::{interval, MissedTickBehavior};

use crate::player_manager::PlayerManager;
use crate::state::SharedState;
use crate::{broadcast, economy, events};

/// Drives the simulation forever at `period` per tick. Ticks that fall
/// behind are skipped rather than bunched up.
pub async fn run_game_loop(state: SharedState, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // the first tick completes immediately; consume it so tick 1 lands a
    // full period after startup
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let mut players = state.players.write().await;
        advance_tick(&mut players, &mut rand::thread_rng());

        if players.tick % 100 == 0 && !players.is_empty() {
            debug!("tick {}: {} players", players.tick, players.len());
        }
    }
}

/// One full simulation step.
///
/// Phase one updates every player in join order: income, the attack
/// cooldown, the event timer (drawing and applying an event on expiry
/// unless the player's shield is up), and finally the shield itself.
/// Phase two broadcasts a fresh snapshot to every parked subscriber and
/// clears all one-shot payloads.
pub fn advance_tick(manager: &mut PlayerManager, rng: &mut impl Rng) {
    manager.tick += 1;

    for id in manager.ids() {
        if let Some(player) = manager.get_mut(&id) {
            economy::collect_profits(&mut player.world);
            player.attack_cooldown = player.attack_cooldown.saturating_sub(1);

            player.world.event_timer = player.world.event_timer.saturating_sub(1);
            if player.world.event_timer == 0 {
                player.world.event_timer = EVENT_INTERVAL_TICKS;
                if player.defense_buffer == 0 {
                    let kind = player.event_bag.draw(rng);
                    let outcome = events::apply_event(kind, &mut player.world, rng);
                    player.outbox.event_result = Some(outcome);
                }
            }

            player.defense_buffer = player.defense_buffer.saturating_sub(1);
        }
    }

    broadcast::deliver_all(manager);
}
