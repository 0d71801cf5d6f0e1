//! Per-tick income collection.

use shared::World;

/// Adds one tick of profit to the company funds: every employee on the
/// grid contributes their configured rate, law staff contribute nothing.
/// Deterministic for a fixed roster and touches nothing but `funds`.
pub fn collect_profits(world: &mut World) {
    let mut profit = 0i64;
    for row in &world.grid {
        for tile in row {
            if let Some(building) = &tile.building {
                for employee in &building.employees {
                    profit += employee.kind.profit_per_tick();
                }
            }
        }
    }
    world.funds += profit;
}
