//! The random event deck.
//!
//! Every player carries their own shuffled deck of the eight event kinds.
//! Whenever their event timer expires an event is drawn from the deck, so
//! a player sees each event exactly once before any repeats. The effects
//! themselves are plain functions of the world plus an RNG; nothing here
//! knows about ticks, timers, or shields.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use shared::{
    EmployeeKind, EventOutcome, World, AFFAIR_PR_RATE, AI_BONUS_PER_ENGINEER,
    AUDIT_FINE_PER_BUILDING, AUDIT_MIN_FINE, INTERN_FUNDS_KEPT, RAID_KILL_CHANCE, TARIFF_FLAT,
    TARIFF_PER_BUILDING,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CorporateRaid,
    TalentPoach,
    TaxAudit,
    OfficeAffair,
    ImportTariffs,
    Rebrand,
    AiModelDrop,
    InternDeletesProd,
}

pub const EVENT_SET: [EventKind; 8] = [
    EventKind::CorporateRaid,
    EventKind::TalentPoach,
    EventKind::TaxAudit,
    EventKind::OfficeAffair,
    EventKind::ImportTariffs,
    EventKind::Rebrand,
    EventKind::AiModelDrop,
    EventKind::InternDeletesProd,
];

/// Shuffle deck of event kinds. Draws pop from the deck; an empty deck is
/// refilled with all kinds and reshuffled before the next draw.
#[derive(Debug)]
pub struct EventBag {
    remaining: Vec<EventKind>,
}

impl EventBag {
    pub fn shuffled(rng: &mut impl Rng) -> Self {
        let mut bag = EventBag {
            remaining: Vec::new(),
        };
        bag.refill(rng);
        bag
    }

    pub fn draw(&mut self, rng: &mut impl Rng) -> EventKind {
        if self.remaining.is_empty() {
            self.refill(rng);
        }
        self.remaining.pop().unwrap_or(EventKind::CorporateRaid)
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    fn refill(&mut self, rng: &mut impl Rng) {
        self.remaining = EVENT_SET.to_vec();
        self.remaining.shuffle(rng);
    }
}

/// Applies `kind` to the world and narrates what happened. The outcome is
/// staged by the caller for exactly one snapshot.
pub fn apply_event(kind: EventKind, world: &mut World, rng: &mut impl Rng) -> EventOutcome {
    debug!("applying event {:?}", kind);
    match kind {
        EventKind::CorporateRaid => corporate_raid(world, rng),
        EventKind::TalentPoach => talent_poach(world),
        EventKind::TaxAudit => tax_audit(world),
        EventKind::OfficeAffair => office_affair(world),
        EventKind::ImportTariffs => import_tariffs(world),
        EventKind::Rebrand => rebrand(world),
        EventKind::AiModelDrop => ai_model_drop(world),
        EventKind::InternDeletesProd => intern_deletes_prod(world),
    }
}

/// Each employee is targeted with independent probability; the hits that
/// land are absorbed like combat casualties, law staff first.
fn corporate_raid(world: &mut World, rng: &mut impl Rng) -> EventOutcome {
    let headcount = world.headcount();
    if headcount == 0 {
        return EventOutcome::new(
            "Raid Averted",
            "Corporate raiders found nothing to attack.",
        );
    }

    let mut hits = 0u32;
    for _ in 0..headcount {
        if rng.gen::<f64>() < RAID_KILL_CHANCE {
            hits += 1;
        }
    }
    if hits == 0 {
        return EventOutcome::new(
            "Raid Repelled",
            "Corporate raiders attacked but caused no damage!",
        );
    }

    let tally = world.absorb_losses(hits);
    EventOutcome::new(
        "Under Attack!",
        format!(
            "Corporate raiders attacked! You lost {} employees and {} buildings.",
            tally.employees(),
            tally.buildings_lost
        ),
    )
}

/// The single most expensive employee on the grid walks out. First hire
/// wins ties, scanning row-major.
fn talent_poach(world: &mut World) -> EventOutcome {
    let mut best: Option<(usize, usize, usize, EmployeeKind)> = None;
    let mut best_cost = i64::MIN;
    for row in &world.grid {
        for tile in row {
            if let Some(building) = &tile.building {
                for (idx, emp) in building.employees.iter().enumerate() {
                    if emp.kind.cost() > best_cost {
                        best_cost = emp.kind.cost();
                        best = Some((tile.row, tile.col, idx, emp.kind));
                    }
                }
            }
        }
    }

    match best {
        None => EventOutcome::new(
            "Poaching Attempt",
            "A competitor tried to poach your staff, but you have no employees!",
        ),
        Some((row, col, idx, kind)) => {
            world.remove_employees(row, col, vec![idx]);
            EventOutcome::new(
                "Talent Poached",
                format!(
                    "A competitor hired away your {} (${} to replace)!",
                    kind.label(),
                    kind.cost()
                ),
            )
        }
    }
}

fn tax_audit(world: &mut World) -> EventOutcome {
    let buildings = world.building_count();
    let fine = (i64::from(buildings) * AUDIT_FINE_PER_BUILDING).max(AUDIT_MIN_FINE);
    world.funds -= fine;
    if buildings > 0 {
        EventOutcome::new(
            "Tax Audit",
            format!(
                "Auditors found discrepancies across {} properties. You paid ${} in back taxes.",
                buildings, fine
            ),
        )
    } else {
        EventOutcome::new(
            "Tax Audit",
            format!("Routine audit. Minimum filing penalty: ${}.", fine),
        )
    }
}

/// Two colleagues in the first building with at least two employees
/// resign. With no such building the story runs as a PR fine instead.
fn office_affair(world: &mut World) -> EventOutcome {
    let mut pair: Option<(usize, usize, EmployeeKind, EmployeeKind)> = None;
    'scan: for row in &world.grid {
        for tile in row {
            if let Some(building) = &tile.building {
                if building.employees.len() >= 2 {
                    pair = Some((
                        tile.row,
                        tile.col,
                        building.employees[0].kind,
                        building.employees[1].kind,
                    ));
                    break 'scan;
                }
            }
        }
    }

    match pair {
        Some((row, col, first, second)) => {
            world.remove_employees(row, col, vec![0, 1]);
            EventOutcome::new(
                "Office Scandal!",
                format!(
                    "Your {} and {} were caught in an affair. Both resigned in disgrace.",
                    first.label(),
                    second.label()
                ),
            )
        }
        None => {
            let fine = (world.funds.max(0) as f64 * AFFAIR_PR_RATE).floor() as i64;
            world.funds -= fine;
            EventOutcome::new(
                "Tabloid Gossip",
                format!(
                    "Rumors about your company hit the tabloids. PR damage cost ${}.",
                    fine
                ),
            )
        }
    }
}

fn import_tariffs(world: &mut World) -> EventOutcome {
    let buildings = world.building_count();
    if buildings == 0 {
        world.funds -= TARIFF_FLAT;
        return EventOutcome::new(
            "New Tariffs!",
            format!(
                "New tariffs hit office supplies. Import fees cost you ${}.",
                TARIFF_FLAT
            ),
        );
    }
    let tariff = i64::from(buildings) * TARIFF_PER_BUILDING;
    world.funds -= tariff;
    EventOutcome::new(
        "New Tariffs!",
        format!(
            "New tariffs hit office supplies. Your {} buildings cost you ${} in import fees.",
            buildings, tariff
        ),
    )
}

/// Half of every building's roster (rounded up) quits, newest hires first.
fn rebrand(world: &mut World) -> EventOutcome {
    let mut lost = 0u32;
    for (row, col) in world.tile_coords() {
        let count = world
            .tile(row, col)
            .and_then(|t| t.building.as_ref())
            .map_or(0, |b| b.employees.len());
        if count == 0 {
            continue;
        }
        let cut = (count + 1) / 2;
        let picks: Vec<usize> = (count - cut..count).collect();
        let removal = world.remove_employees(row, col, picks);
        lost += removal.removed.len() as u32;
    }

    if lost == 0 {
        EventOutcome::new(
            "Rebranded!",
            "Your CEO rebranded the company overnight. Nobody noticed because you have no employees.",
        )
    } else {
        EventOutcome::new(
            "Rebranded!",
            format!(
                "Your CEO rebranded the company overnight. {} employees quit in embarrassment.",
                lost
            ),
        )
    }
}

/// A productivity windfall per engineer. A company with no engineers
/// instead loses one office worker to the machines.
fn ai_model_drop(world: &mut World) -> EventOutcome {
    let mut engineers = 0i64;
    let mut first_worker: Option<(usize, usize, usize)> = None;
    for row in &world.grid {
        for tile in row {
            if let Some(building) = &tile.building {
                for (idx, emp) in building.employees.iter().enumerate() {
                    if emp.kind == EmployeeKind::Engineer {
                        engineers += 1;
                    } else if emp.kind == EmployeeKind::OfficeWorker && first_worker.is_none() {
                        first_worker = Some((tile.row, tile.col, idx));
                    }
                }
            }
        }
    }

    if engineers > 0 {
        let bonus = engineers * AI_BONUS_PER_ENGINEER;
        world.funds += bonus;
        return EventOutcome::new(
            "New Model Released!",
            format!(
                "A rival lab shipped a new coding model. Your {} engineers automated a sprint and banked ${} in productivity gains.",
                engineers, bonus
            ),
        );
    }

    match first_worker {
        Some((row, col, idx)) => {
            world.remove_employees(row, col, vec![idx]);
            EventOutcome::new(
                "New Model Released!",
                "A rival lab shipped a new coding model. You had no engineers to use it, so it replaced an office worker.",
            )
        }
        None => EventOutcome::new(
            "New Model Released!",
            "A rival lab shipped a new coding model. Your company has no idea what to do with it.",
        ),
    }
}

/// Every building goes and only a sliver of the cash survives.
fn intern_deletes_prod(world: &mut World) -> EventOutcome {
    let previous_funds = world.funds;
    let mut buildings_lost = 0u32;
    let mut employees_lost = 0u32;
    for (row, col) in world.tile_coords() {
        if let Some(building) = world.demolish(row, col) {
            buildings_lost += 1;
            employees_lost += building.employees.len() as u32;
        }
    }
    world.funds = (world.funds as f64 * INTERN_FUNDS_KEPT).floor() as i64;
    let funds_lost = previous_funds - world.funds;

    if buildings_lost == 0 && funds_lost == 0 {
        return EventOutcome::new(
            "Intern Incident",
            "The intern tried to delete the production database, but there was nothing to delete.",
        );
    }
    EventOutcome::new(
        "Production Database Deleted",
        format!(
            "An unpaid intern ran DROP TABLE in production. You lost {} buildings, {} employees, and ${}.",
            buildings_lost, employees_lost, funds_lost
        ),
    )
}
