//! Attack resolution between two companies.
//!
//! An attack runs in fixed stages: validate everything up front, march
//! the troops out of the attacker's buildings, fight paired duels until
//! one side is gone, land the surviving casualty points on the defender,
//! and settle the cash steal. A validation failure anywhere leaves both
//! worlds untouched.

use std::collections::BTreeMap;

use log::info;
use rand::Rng;
use shared::{
    DamageReport, LossTally, SideLosses, TroopOrder, ATTACK_COOLDOWN_TICKS, CASH_STEAL_CAP,
    CASH_STEAL_RATE, DEFENSE_BUFFER_TICKS,
};
use thiserror::Error;

use crate::player_manager::PlayerManager;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttackError {
    #[error("player not found")]
    AttackerNotFound,
    #[error("target not found")]
    TargetNotFound,
    #[error("cannot attack yourself")]
    SelfAttack,
    #[error("attack on cooldown")]
    OnCooldown,
    #[error("target is under protection")]
    TargetProtected,
    #[error("no troops selected")]
    NoTroops,
    #[error("troop source out of bounds")]
    SourceOutOfBounds,
    #[error("no building at ({0},{1})")]
    NoSourceBuilding(usize, usize),
    #[error("invalid troop count at ({0},{1})")]
    BadTroopCount(usize, usize),
}

/// Resolves one attack end to end. On success both parties get a
/// `DamageReport` staged in their outbox, the attacker starts their
/// cooldown, and the defender starts their protection window.
pub fn resolve_attack(
    manager: &mut PlayerManager,
    attacker_id: &str,
    target_id: &str,
    troops: &[TroopOrder],
    rng: &mut impl Rng,
) -> Result<(), AttackError> {
    let sources = validate(manager, attacker_id, target_id, troops)?;

    let attacker_name = manager
        .get(attacker_id)
        .map(|p| p.name.clone())
        .ok_or(AttackError::AttackerNotFound)?;
    let defender_name = manager
        .get(target_id)
        .map(|p| p.name.clone())
        .ok_or(AttackError::TargetNotFound)?;

    // March the troops out. Emptied source buildings fall immediately.
    let mut attacker_buildings_lost = 0u32;
    let mut total_attackers = 0u32;
    if let Some(attacker) = manager.get_mut(attacker_id) {
        for (&(row, col), &count) in &sources {
            let removal = attacker.world.withdraw(row, col, count);
            total_attackers += removal.removed.len() as u32;
            if removal.building_destroyed {
                attacker_buildings_lost += 1;
            }
        }
    }

    // Every employee on the target's grid stands to defend.
    let total_defenders = manager.get(target_id).map_or(0, |t| t.world.headcount());

    let (attackers_left, defenders_left) = run_duels(total_attackers, total_defenders, rng);

    let defender_losses = total_defenders - defenders_left;
    let defender_tally = match manager.get_mut(target_id) {
        Some(target) => target.world.absorb_losses(defender_losses),
        None => LossTally::default(),
    };

    // Raiding the till: a cut of the target's cash per flattened building,
    // capped at half their pre-steal funds.
    let mut cash_stolen = 0i64;
    if defender_tally.buildings_lost > 0 {
        if let Some(target) = manager.get_mut(target_id) {
            let vault = target.world.funds.max(0);
            let cap = (vault as f64 * CASH_STEAL_CAP).floor() as i64;
            let cut = (vault as f64 * CASH_STEAL_RATE).floor() as i64
                * i64::from(defender_tally.buildings_lost);
            cash_stolen = cut.min(cap);
            target.world.funds -= cash_stolen;
        }
        if let Some(attacker) = manager.get_mut(attacker_id) {
            attacker.world.funds += cash_stolen;
        }
    }

    let report = DamageReport {
        attacker_name,
        defender_name,
        troops_sent: total_attackers,
        attacker: SideLosses {
            employees_lost: total_attackers - attackers_left,
            buildings_lost: attacker_buildings_lost,
        },
        defender: SideLosses {
            employees_lost: defender_tally.employees(),
            buildings_lost: defender_tally.buildings_lost,
        },
        cash_stolen,
        is_attacker: true,
    };

    info!(
        "{} attacked {}: {} troops vs {} defenders, {} buildings fell, ${} stolen",
        report.attacker_name,
        report.defender_name,
        total_attackers,
        total_defenders,
        defender_tally.buildings_lost,
        cash_stolen
    );

    if let Some(target) = manager.get_mut(target_id) {
        target.outbox.attack_report = Some(DamageReport {
            is_attacker: false,
            ..report.clone()
        });
        target.defense_buffer = DEFENSE_BUFFER_TICKS;
    }
    if let Some(attacker) = manager.get_mut(attacker_id) {
        attacker.outbox.attack_report = Some(report);
        attacker.attack_cooldown = ATTACK_COOLDOWN_TICKS;
    }

    Ok(())
}

/// Checks the whole attack before anything mutates. Orders naming the
/// same tile are validated against their combined demand.
fn validate(
    manager: &PlayerManager,
    attacker_id: &str,
    target_id: &str,
    troops: &[TroopOrder],
) -> Result<BTreeMap<(usize, usize), u32>, AttackError> {
    let attacker = manager
        .get(attacker_id)
        .ok_or(AttackError::AttackerNotFound)?;
    let target = manager.get(target_id).ok_or(AttackError::TargetNotFound)?;
    if attacker_id == target_id {
        return Err(AttackError::SelfAttack);
    }
    if attacker.attack_cooldown > 0 {
        return Err(AttackError::OnCooldown);
    }
    if target.defense_buffer > 0 {
        return Err(AttackError::TargetProtected);
    }
    if troops.is_empty() {
        return Err(AttackError::NoTroops);
    }

    let mut sources: BTreeMap<(usize, usize), u32> = BTreeMap::new();
    for order in troops {
        if order.count < 1 {
            return Err(AttackError::BadTroopCount(order.row, order.col));
        }
        *sources.entry((order.row, order.col)).or_insert(0) += order.count;
    }
    for (&(row, col), &count) in &sources {
        let tile = attacker
            .world
            .tile(row, col)
            .ok_or(AttackError::SourceOutOfBounds)?;
        let building = tile
            .building
            .as_ref()
            .ok_or(AttackError::NoSourceBuilding(row, col))?;
        if count as usize > building.employees.len() {
            return Err(AttackError::BadTroopCount(row, col));
        }
    }
    Ok(sources)
}

/// Paired duels until one side is wiped out. Each round both sides roll;
/// the higher roll wins and ties favor the defender.
fn run_duels(total_attackers: u32, total_defenders: u32, rng: &mut impl Rng) -> (u32, u32) {
    let mut attackers = total_attackers;
    let mut defenders = total_defenders;
    while attackers > 0 && defenders > 0 {
        let attack_roll: f64 = rng.gen();
        let defense_roll: f64 = rng.gen();
        if attack_roll > defense_roll {
            defenders -= 1;
        } else {
            attackers -= 1;
        }
    }
    (attackers, defenders)
}
