use serde::{Deserialize, Serialize};

use crate::config::{BuildingKind, EmployeeKind};
use crate::world::{Phase, Tile};

/// Opaque session id handed out on join and quoted on every request.
pub type PlayerId = String;

/// One source building contributing troops to an attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopOrder {
    pub row: usize,
    pub col: usize,
    pub count: u32,
}

/// A player command as posted to the action endpoint. The `kind` field
/// selects the variant; remaining fields ride alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    Build {
        row: usize,
        col: usize,
        building_type: BuildingKind,
    },
    #[serde(rename_all = "camelCase")]
    Hire {
        row: usize,
        col: usize,
        employee_type: EmployeeKind,
    },
    Fire {
        row: usize,
        col: usize,
    },
    Sell {
        row: usize,
        col: usize,
    },
    Upgrade {
        row: usize,
        col: usize,
    },
    #[serde(rename_all = "camelCase")]
    Attack {
        target_id: PlayerId,
        troops: Vec<TroopOrder>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub command: Command,
}

/// Per-side casualty figures in a combat report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideLosses {
    pub employees_lost: u32,
    pub buildings_lost: u32,
}

/// Outcome of one resolved attack, delivered to both parties with only
/// the `is_attacker` flag differing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageReport {
    pub attacker_name: String,
    pub defender_name: String,
    pub troops_sent: u32,
    pub attacker: SideLosses,
    pub defender: SideLosses,
    pub cash_stolen: i64,
    pub is_attacker: bool,
}

/// Narrative result of a random event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl EventOutcome {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        EventOutcome {
            title: title.into(),
            message: message.into(),
            image: None,
        }
    }
}

/// Scoreboard row: the public slice of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub funds: i64,
    pub building_count: u32,
    pub employee_count: u32,
    pub defense_buffer: u32,
}

/// The full per-player snapshot broadcast every tick and served on the
/// polling endpoint. One-shot fields are present for exactly one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub phase: Phase,
    pub funds: i64,
    pub map_defense: i64,
    pub grid: Vec<Vec<Tile>>,
    pub attack_active: Option<DamageReport>,
    pub event_result: Option<EventOutcome>,
    pub event_timer: u32,
    pub attack_cooldown: u32,
    pub defense_buffer: u32,
    pub players: Vec<PlayerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReply {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
