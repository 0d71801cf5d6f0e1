use serde::{Deserialize, Serialize};

use crate::{SELL_PERCENTAGE, UPGRADE_COST_FACTOR};

/// Staffing category. Office staff generate profit and march in attacks;
/// law staff defend and absorb casualties first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Office,
    Law,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildingKind {
    Office,
    Tower,
    Campus,
    LawFirm,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Office,
        BuildingKind::Tower,
        BuildingKind::Campus,
        BuildingKind::LawFirm,
    ];

    pub fn cost(self) -> i64 {
        match self {
            BuildingKind::Office => 500,
            BuildingKind::Tower => 2_000,
            BuildingKind::Campus => 6_000,
            BuildingKind::LawFirm => 1_500,
        }
    }

    pub fn capacity(self) -> usize {
        match self {
            BuildingKind::Office => 4,
            BuildingKind::Tower => 10,
            BuildingKind::Campus => 24,
            BuildingKind::LawFirm => 3,
        }
    }

    /// Which staffing category this building accepts.
    pub fn hires(self) -> Category {
        match self {
            BuildingKind::LawFirm => Category::Law,
            _ => Category::Office,
        }
    }

    /// Next rung on the upgrade ladder, if any.
    pub fn upgrade(self) -> Option<BuildingKind> {
        match self {
            BuildingKind::Office => Some(BuildingKind::Tower),
            BuildingKind::Tower => Some(BuildingKind::Campus),
            BuildingKind::Campus | BuildingKind::LawFirm => None,
        }
    }

    /// Discounted price of stepping up to the next kind.
    pub fn upgrade_cost(self) -> Option<i64> {
        self.upgrade()
            .map(|next| ((next.cost() - self.cost()) as f64 * UPGRADE_COST_FACTOR) as i64)
    }

    /// Cash returned when the building is sold off.
    pub fn sell_value(self) -> i64 {
        (self.cost() as f64 * SELL_PERCENTAGE) as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            BuildingKind::Office => "Office",
            BuildingKind::Tower => "Office Tower",
            BuildingKind::Campus => "Corporate Campus",
            BuildingKind::LawFirm => "Law Firm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmployeeKind {
    OfficeWorker,
    SalesRep,
    Engineer,
    Paralegal,
    Lawyer,
}

impl EmployeeKind {
    pub const ALL: [EmployeeKind; 5] = [
        EmployeeKind::OfficeWorker,
        EmployeeKind::SalesRep,
        EmployeeKind::Engineer,
        EmployeeKind::Paralegal,
        EmployeeKind::Lawyer,
    ];

    pub fn category(self) -> Category {
        match self {
            EmployeeKind::Paralegal | EmployeeKind::Lawyer => Category::Law,
            _ => Category::Office,
        }
    }

    pub fn cost(self) -> i64 {
        match self {
            EmployeeKind::OfficeWorker => 100,
            EmployeeKind::SalesRep => 250,
            EmployeeKind::Engineer => 600,
            EmployeeKind::Paralegal => 300,
            EmployeeKind::Lawyer => 800,
        }
    }

    pub fn profit_per_tick(self) -> i64 {
        match self {
            EmployeeKind::OfficeWorker => 10,
            EmployeeKind::SalesRep => 30,
            EmployeeKind::Engineer => 80,
            EmployeeKind::Paralegal | EmployeeKind::Lawyer => 0,
        }
    }

    pub fn defense_boost(self) -> i64 {
        match self {
            EmployeeKind::OfficeWorker | EmployeeKind::SalesRep => 1,
            EmployeeKind::Engineer => 2,
            EmployeeKind::Paralegal => 5,
            EmployeeKind::Lawyer => 12,
        }
    }

    /// Casualty points this employee soaks before falling in an attack.
    pub fn health(self) -> u32 {
        match self {
            EmployeeKind::Paralegal => 2,
            EmployeeKind::Lawyer => 4,
            _ => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmployeeKind::OfficeWorker => "Office Worker",
            EmployeeKind::SalesRep => "Sales Rep",
            EmployeeKind::Engineer => "Engineer",
            EmployeeKind::Paralegal => "Paralegal",
            EmployeeKind::Lawyer => "Lawyer",
        }
    }
}
