use serde::{Deserialize, Serialize};

use crate::config::{BuildingKind, Category, EmployeeKind};
use crate::{EVENT_INTERVAL_TICKS, STARTING_FUNDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "type")]
    pub kind: EmployeeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    #[serde(rename = "type")]
    pub kind: BuildingKind,
    pub employees: Vec<Employee>,
}

impl Building {
    pub fn new(kind: BuildingKind) -> Self {
        Building {
            kind,
            employees: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
    pub building: Option<Building>,
}

/// Employees taken off the grid by a single removal.
#[derive(Debug, Clone, Default)]
pub struct Removal {
    pub removed: Vec<EmployeeKind>,
    pub building_destroyed: bool,
}

/// Casualties from one batch of incoming hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LossTally {
    pub law_lost: u32,
    pub office_lost: u32,
    pub buildings_lost: u32,
}

impl LossTally {
    pub fn employees(&self) -> u32 {
        self.law_lost + self.office_lost
    }
}

/// One player's city: the square tile grid plus the company ledgers.
///
/// Structural rules the mutation helpers maintain:
/// - a building with zero employees is removed from its tile immediately
/// - `map_defense` moves in step with every hire and every removal
#[derive(Debug, Clone)]
pub struct World {
    pub grid: Vec<Vec<Tile>>,
    pub funds: i64,
    pub map_defense: i64,
    pub event_timer: u32,
    pub phase: Phase,
}

impl World {
    pub fn new(size: usize) -> Self {
        let grid = (0..size)
            .map(|row| {
                (0..size)
                    .map(|col| Tile {
                        row,
                        col,
                        building: None,
                    })
                    .collect()
            })
            .collect();
        World {
            grid,
            funds: STARTING_FUNDS,
            map_defense: 0,
            event_timer: EVENT_INTERVAL_TICKS,
            phase: Phase::Playing,
        }
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        self.tile(row, col).is_some()
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        self.grid.get(row)?.get(col)
    }

    pub fn tile_mut(&mut self, row: usize, col: usize) -> Option<&mut Tile> {
        self.grid.get_mut(row)?.get_mut(col)
    }

    /// Grid coordinates in row-major order, snapshotted so callers can
    /// mutate tiles while walking them.
    pub fn tile_coords(&self) -> Vec<(usize, usize)> {
        self.grid
            .iter()
            .flat_map(|row| row.iter().map(|t| (t.row, t.col)))
            .collect()
    }

    pub fn building_count(&self) -> u32 {
        self.grid
            .iter()
            .flatten()
            .filter(|t| t.building.is_some())
            .count() as u32
    }

    pub fn headcount(&self) -> u32 {
        self.grid
            .iter()
            .flatten()
            .filter_map(|t| t.building.as_ref())
            .map(|b| b.employees.len() as u32)
            .sum()
    }

    /// True when at least one profit-generating building has staff. Gates
    /// law firm construction so a fresh company builds an economy first.
    pub fn has_income_building(&self) -> bool {
        self.grid
            .iter()
            .flatten()
            .filter_map(|t| t.building.as_ref())
            .any(|b| b.kind.hires() == Category::Office && !b.employees.is_empty())
    }

    /// Defense recomputed from the live roster. Equals `map_defense`
    /// whenever hires and removals have been balanced correctly.
    pub fn computed_defense(&self) -> i64 {
        self.grid
            .iter()
            .flatten()
            .filter_map(|t| t.building.as_ref())
            .flat_map(|b| b.employees.iter())
            .map(|e| e.kind.defense_boost())
            .sum()
    }

    /// Hires `kind` into the building at (row, col) without any validation.
    /// Callers check capacity and funds before calling.
    pub fn add_employee(&mut self, row: usize, col: usize, kind: EmployeeKind) {
        if let Some(building) = self.tile_mut(row, col).and_then(|t| t.building.as_mut()) {
            building.employees.push(Employee { kind });
            self.map_defense += kind.defense_boost();
        }
    }

    /// Removes the employees at `picks` (positions within the building's
    /// roster) from the building at (row, col). The removal set is computed
    /// up front by the caller; this applies it in one step, keeps
    /// `map_defense` in sync, and tears down the building if it empties.
    pub fn remove_employees(&mut self, row: usize, col: usize, mut picks: Vec<usize>) -> Removal {
        picks.sort_unstable();
        picks.dedup();

        let mut removed = Vec::new();
        let mut building_destroyed = false;
        if let Some(tile) = self.tile_mut(row, col) {
            if let Some(building) = tile.building.as_mut() {
                // walk back to front so earlier indices stay valid
                for &idx in picks.iter().rev() {
                    if idx < building.employees.len() {
                        removed.push(building.employees.remove(idx).kind);
                    }
                }
                if building.employees.is_empty() {
                    tile.building = None;
                    building_destroyed = true;
                }
            }
        }

        let defense_lost: i64 = removed.iter().map(|k| k.defense_boost()).sum();
        self.map_defense -= defense_lost;
        Removal {
            removed,
            building_destroyed,
        }
    }

    /// Pulls up to `count` employees out of the building at (row, col) to
    /// serve as troops. Office staff march first; law staff only fill out
    /// the remainder once the office roster is exhausted.
    pub fn withdraw(&mut self, row: usize, col: usize, count: u32) -> Removal {
        let mut picks = Vec::new();
        if let Some(building) = self.tile(row, col).and_then(|t| t.building.as_ref()) {
            for (idx, emp) in building.employees.iter().enumerate() {
                if picks.len() as u32 == count {
                    break;
                }
                if emp.kind.category() == Category::Office {
                    picks.push(idx);
                }
            }
            if (picks.len() as u32) < count {
                for (idx, emp) in building.employees.iter().enumerate() {
                    if picks.len() as u32 == count {
                        break;
                    }
                    if emp.kind.category() == Category::Law {
                        picks.push(idx);
                    }
                }
            }
        }
        self.remove_employees(row, col, picks)
    }

    /// Spends `points` casualty points against the roster. Law staff soak
    /// hits first at their health rating; any points left over then fell
    /// office staff one point each. Selection runs over a coordinate
    /// snapshot, so each tile's removal set is decided before it is applied.
    pub fn absorb_losses(&mut self, points: u32) -> LossTally {
        let mut tally = LossTally::default();
        let mut remaining = points;

        for (row, col) in self.tile_coords() {
            if remaining == 0 {
                break;
            }
            let mut picks = Vec::new();
            if let Some(building) = self.tile(row, col).and_then(|t| t.building.as_ref()) {
                for (idx, emp) in building.employees.iter().enumerate() {
                    if remaining == 0 {
                        break;
                    }
                    if emp.kind.category() == Category::Law {
                        remaining = remaining.saturating_sub(emp.kind.health());
                        picks.push(idx);
                    }
                }
            }
            if picks.is_empty() {
                continue;
            }
            let removal = self.remove_employees(row, col, picks);
            tally.law_lost += removal.removed.len() as u32;
            if removal.building_destroyed {
                tally.buildings_lost += 1;
            }
        }

        for (row, col) in self.tile_coords() {
            if remaining == 0 {
                break;
            }
            let mut picks = Vec::new();
            if let Some(building) = self.tile(row, col).and_then(|t| t.building.as_ref()) {
                for (idx, emp) in building.employees.iter().enumerate() {
                    if remaining == 0 {
                        break;
                    }
                    if emp.kind.category() == Category::Office {
                        remaining -= 1;
                        picks.push(idx);
                    }
                }
            }
            if picks.is_empty() {
                continue;
            }
            let removal = self.remove_employees(row, col, picks);
            tally.office_lost += removal.removed.len() as u32;
            if removal.building_destroyed {
                tally.buildings_lost += 1;
            }
        }

        tally
    }

    /// Tears down the building at (row, col) outright, staff and all.
    pub fn demolish(&mut self, row: usize, col: usize) -> Option<Building> {
        let building = self.tile_mut(row, col)?.building.take()?;
        let defense: i64 = building
            .employees
            .iter()
            .map(|e| e.kind.defense_boost())
            .sum();
        self.map_defense -= defense;
        Some(building)
    }
}
