//! Build, hire, fire, sell, and upgrade.
//!
//! Each action validates completely against the current world and only
//! then mutates it, so a rejection never leaves a partial change behind.

use shared::{Building, BuildingKind, Category, EmployeeKind, World};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("out of bounds")]
    OutOfBounds,
    #[error("tile already has a building")]
    TileOccupied,
    #[error("build an office and hire employees first")]
    NoIncomeBase,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("no building on tile")]
    NoBuilding,
    #[error("building at capacity")]
    AtCapacity,
    #[error("employee cannot work in this building")]
    WrongCategory,
    #[error("no employees to fire")]
    NoEmployees,
    #[error("cannot fire a protected employee")]
    ProtectedEmployee,
    #[error("building cannot be upgraded")]
    NotUpgradeable,
}

/// Places a new building on an empty tile. Law firms additionally require
/// a staffed income building somewhere on the grid, so a company cannot
/// open with lawyers alone.
pub fn build(world: &mut World, row: usize, col: usize, kind: BuildingKind) -> Result<(), ActionError> {
    let tile = world.tile(row, col).ok_or(ActionError::OutOfBounds)?;
    if tile.building.is_some() {
        return Err(ActionError::TileOccupied);
    }
    if kind.hires() == Category::Law && !world.has_income_building() {
        return Err(ActionError::NoIncomeBase);
    }
    if world.funds < kind.cost() {
        return Err(ActionError::InsufficientFunds);
    }

    world.funds -= kind.cost();
    if let Some(tile) = world.tile_mut(row, col) {
        tile.building = Some(Building::new(kind));
    }
    Ok(())
}

/// Hires one employee into the building at (row, col).
pub fn hire(world: &mut World, row: usize, col: usize, kind: EmployeeKind) -> Result<(), ActionError> {
    let tile = world.tile(row, col).ok_or(ActionError::OutOfBounds)?;
    let building = tile.building.as_ref().ok_or(ActionError::NoBuilding)?;
    if building.kind.hires() != kind.category() {
        return Err(ActionError::WrongCategory);
    }
    if building.employees.len() >= building.kind.capacity() {
        return Err(ActionError::AtCapacity);
    }
    if world.funds < kind.cost() {
        return Err(ActionError::InsufficientFunds);
    }

    world.funds -= kind.cost();
    world.add_employee(row, col, kind);
    Ok(())
}

/// Dismisses the most recent hire. Firing the last employee tears the
/// building down with them, except that a law building's last employee is
/// protected and must be sold with the building instead.
pub fn fire(world: &mut World, row: usize, col: usize) -> Result<(), ActionError> {
    let tile = world.tile(row, col).ok_or(ActionError::OutOfBounds)?;
    let building = tile.building.as_ref().ok_or(ActionError::NoBuilding)?;
    let headcount = building.employees.len();
    if headcount == 0 {
        return Err(ActionError::NoEmployees);
    }
    let last = building.employees[headcount - 1].kind;
    if headcount == 1 && last.category() == Category::Law {
        return Err(ActionError::ProtectedEmployee);
    }

    world.remove_employees(row, col, vec![headcount - 1]);
    Ok(())
}

/// Sells the building for half its construction cost. The staff go with
/// it and their defense contribution is surrendered.
pub fn sell(world: &mut World, row: usize, col: usize) -> Result<(), ActionError> {
    let tile = world.tile(row, col).ok_or(ActionError::OutOfBounds)?;
    let building = tile.building.as_ref().ok_or(ActionError::NoBuilding)?;
    let refund = building.kind.sell_value();

    if world.demolish(row, col).is_some() {
        world.funds += refund;
    }
    Ok(())
}

/// Steps the building up one rung of its ladder for the discounted price
/// difference. The roster carries over unchanged.
pub fn upgrade(world: &mut World, row: usize, col: usize) -> Result<(), ActionError> {
    let tile = world.tile(row, col).ok_or(ActionError::OutOfBounds)?;
    let building = tile.building.as_ref().ok_or(ActionError::NoBuilding)?;
    let next = building.kind.upgrade().ok_or(ActionError::NotUpgradeable)?;
    let cost = building
        .kind
        .upgrade_cost()
        .ok_or(ActionError::NotUpgradeable)?;
    if world.funds < cost {
        return Err(ActionError::InsufficientFunds);
    }

    world.funds -= cost;
    if let Some(building) = world.tile_mut(row, col).and_then(|t| t.building.as_mut()) {
        building.kind = next;
    }
    Ok(())
}
