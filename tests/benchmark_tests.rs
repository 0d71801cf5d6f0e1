//! Performance benchmarks for the simulation hot paths

use rand::rngs::StdRng;
use rand::SeedableRng;
use server::player_manager::PlayerManager;
use server::{broadcast, combat, economy, game_loop};
use shared::{Building, BuildingKind, EmployeeKind, TroopOrder, World, GRID_SIZE, MAX_PLAYERS};
use std::time::Instant;

/// Benchmarks the per-tick profit sweep over a fully built-out grid
#[test]
fn benchmark_profit_collection() {
    let mut world = World::new(GRID_SIZE);
    world.funds = 0;
    for (row, col) in world.tile_coords() {
        if let Some(tile) = world.tile_mut(row, col) {
            tile.building = Some(Building::new(BuildingKind::Tower));
        }
        for _ in 0..10 {
            world.add_employee(row, col, EmployeeKind::SalesRep);
        }
    }

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        economy::collect_profits(&mut world);
    }

    let duration = start.elapsed();
    println!(
        "Profit collection: {} sweeps of {} employees in {:?} ({:.2} μs/sweep)",
        iterations,
        world.headcount(),
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // 360 sales reps at 30 apiece per sweep
    assert_eq!(world.funds, iterations as i64 * 360 * 30);
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks full attack resolution including validation and duels
#[test]
fn benchmark_attack_resolution() {
    let iterations = 1_000;
    let mut r = StdRng::seed_from_u64(42);
    let start = Instant::now();

    for _ in 0..iterations {
        let mut manager = PlayerManager::new(MAX_PLAYERS);
        let attacker = manager.join("attacker", &mut r).unwrap();
        let defender = manager.join("defender", &mut r).unwrap();
        arm(&mut manager, &attacker, 8);
        arm(&mut manager, &defender, 6);

        combat::resolve_attack(
            &mut manager,
            &attacker,
            &defender,
            &[TroopOrder {
                row: 0,
                col: 0,
                count: 8,
            }],
            &mut r,
        )
        .unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Attack resolution: {} attacks in {:?} ({:.2} μs/attack)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks per-player snapshot assembly and JSON encoding
#[test]
fn benchmark_snapshot_serialization() {
    let mut manager = PlayerManager::new(MAX_PLAYERS);
    let mut r = StdRng::seed_from_u64(43);
    for i in 0..MAX_PLAYERS {
        let id = manager.join(&format!("corp-{}", i), &mut r).unwrap();
        arm(&mut manager, &id, 6);
    }
    let ids = manager.ids();

    let iterations = 500;
    let mut bytes = 0usize;
    let start = Instant::now();

    for _ in 0..iterations {
        for id in &ids {
            let player = manager.get(id).unwrap();
            let state = broadcast::snapshot(&manager, player);
            bytes += serde_json::to_string(&state).unwrap().len();
        }
    }

    let duration = start.elapsed();
    let snapshots = iterations * ids.len();
    println!(
        "Snapshot serialization: {} snapshots ({} bytes) in {:?} ({:.2} μs/snapshot)",
        snapshots,
        bytes,
        duration,
        duration.as_micros() as f64 / snapshots as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Stress tests a long sustained run of the full tick pipeline
#[test]
fn stress_test_sustained_tick_load() {
    let mut manager = PlayerManager::new(MAX_PLAYERS);
    let mut r = StdRng::seed_from_u64(44);
    for i in 0..MAX_PLAYERS {
        let id = manager.join(&format!("corp-{}", i), &mut r).unwrap();
        arm(&mut manager, &id, 6);
    }

    let ticks = 1_000u64;
    let start = Instant::now();

    for _ in 0..ticks {
        game_loop::advance_tick(&mut manager, &mut r);
    }

    let duration = start.elapsed();
    println!(
        "Tick pipeline: {} players × {} ticks in {:?} ({:.2} μs/tick)",
        manager.len(),
        ticks,
        duration,
        duration.as_micros() as f64 / ticks as f64
    );

    assert_eq!(manager.tick, ticks);
    // five event rounds ran per player; the structural invariants must hold
    for id in manager.ids() {
        let world = &manager.get(&id).unwrap().world;
        assert_eq!(world.map_defense, world.computed_defense());
    }
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks session churn through the registry
#[test]
fn benchmark_session_churn() {
    let mut manager = PlayerManager::new(MAX_PLAYERS);
    let mut r = StdRng::seed_from_u64(45);

    let iterations = 1_000;
    let start = Instant::now();

    for i in 0..iterations {
        let id = manager.join(&format!("corp-{}", i), &mut r).unwrap();
        manager.remove(&id);
    }

    let duration = start.elapsed();
    println!(
        "Session churn: {} join/leave cycles in {:?} ({:.2} μs/cycle)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(manager.is_empty());
    assert!(duration.as_millis() < 1000);
}

// HELPER FUNCTIONS

/// Puts a staffed tower at the player's (0, 0) so combat and the profit
/// sweep have something to chew on.
fn arm(manager: &mut PlayerManager, id: &str, staff: usize) {
    let world = &mut manager.get_mut(id).unwrap().world;
    if let Some(tile) = world.tile_mut(0, 0) {
        tile.building = Some(Building::new(BuildingKind::Tower));
    }
    for _ in 0..staff {
        world.add_employee(0, 0, EmployeeKind::OfficeWorker);
    }
}
