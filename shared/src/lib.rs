pub mod config;
pub mod protocol;
pub mod world;

pub use config::{BuildingKind, Category, EmployeeKind};
pub use protocol::{
    Ack, Command, CommandEnvelope, DamageReport, ErrorBody, EventOutcome, GameState, JoinReply,
    JoinRequest, PlayerId, PlayerInfo, SideLosses, TroopOrder,
};
pub use world::{Building, Employee, LossTally, Phase, Removal, Tile, World};

pub const GRID_SIZE: usize = 6;
pub const TICK_RATE_MS: u64 = 150;
pub const STARTING_FUNDS: i64 = 1_000;
pub const MAX_PLAYERS: usize = 20;
pub const MAX_NAME_LEN: usize = 20;
pub const SESSION_ID_LEN: usize = 8;

pub const EVENT_INTERVAL_TICKS: u32 = 200;
pub const ATTACK_COOLDOWN_TICKS: u32 = 100;
pub const DEFENSE_BUFFER_TICKS: u32 = 400;

pub const SELL_PERCENTAGE: f64 = 0.5;
pub const UPGRADE_COST_FACTOR: f64 = 0.8;

pub const RAID_KILL_CHANCE: f64 = 0.3;
pub const CASH_STEAL_RATE: f64 = 0.1;
pub const CASH_STEAL_CAP: f64 = 0.5;

pub const AUDIT_FINE_PER_BUILDING: i64 = 1_000;
pub const AUDIT_MIN_FINE: i64 = 500;
pub const TARIFF_PER_BUILDING: i64 = 1_500;
pub const TARIFF_FLAT: i64 = 500;
pub const AI_BONUS_PER_ENGINEER: i64 = 2_000;
pub const AFFAIR_PR_RATE: f64 = 0.05;
pub const INTERN_FUNDS_KEPT: f64 = 0.1;
