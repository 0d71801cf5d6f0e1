//! The HTTP and SSE transport.
//!
//! Thin layer over the simulation: every handler takes the registry lock,
//! validates, applies, and answers. Command handling is synchronous, so a
//! client that receives a 2xx knows the action is already in the world.

use std::convert::Infallible;
use std::fmt::Display;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures_util::stream::{self, Stream};
use log::debug;
use serde::{Deserialize, Serialize};
use shared::{
    Ack, Command, CommandEnvelope, ErrorBody, GameState, JoinReply, JoinRequest, PlayerInfo,
    PlayerId, World,
};

use crate::combat::{self, AttackError};
use crate::player_manager::PlayerManager;
use crate::state::SharedState;
use crate::{actions, broadcast};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/game/join", post(join))
        .route("/game/action", post(action))
        .route("/game/stream", get(stream_ticks))
        .route("/api", get(fetch_state))
        .route("/admin/players", get(list_players).delete(remove_all_players))
        .route("/admin/players/{id}", delete(remove_player))
        .with_state(state)
}

/// A rejected request: the reason string and the 4xx status it rides on.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    reason: String,
}

impl ApiError {
    fn bad_request(reason: impl Display) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            reason: reason.to_string(),
        }
    }

    fn not_found(reason: impl Display) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            reason: reason.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("request rejected ({}): {}", self.status, self.reason);
        (self.status, Json(ErrorBody { error: self.reason })).into_response()
    }
}

async fn join(
    State(state): State<SharedState>,
    Json(request): Json<JoinRequest>,
) -> Result<Json<JoinReply>, ApiError> {
    let name = request.name.unwrap_or_default();
    let mut players = state.players.write().await;
    let player_id = players
        .join(&name, &mut rand::thread_rng())
        .map_err(ApiError::bad_request)?;
    Ok(Json(JoinReply { player_id }))
}

async fn action(
    State(state): State<SharedState>,
    Json(envelope): Json<CommandEnvelope>,
) -> Result<Json<Ack>, ApiError> {
    if envelope.player_id.is_empty() {
        return Err(ApiError::bad_request("playerId is required"));
    }
    let mut players = state.players.write().await;
    if players.get(&envelope.player_id).is_none() {
        return Err(ApiError::not_found("player not found"));
    }

    let player_id = envelope.player_id;
    match envelope.command {
        Command::Attack { target_id, troops } => combat::resolve_attack(
            &mut players,
            &player_id,
            &target_id,
            &troops,
            &mut rand::thread_rng(),
        )
        .map_err(|e| match e {
            AttackError::AttackerNotFound => ApiError::not_found(e),
            other => ApiError::bad_request(other),
        })?,
        Command::Build {
            row,
            col,
            building_type,
        } => with_world(&mut players, &player_id, |w| {
            actions::build(w, row, col, building_type)
        })?,
        Command::Hire {
            row,
            col,
            employee_type,
        } => with_world(&mut players, &player_id, |w| {
            actions::hire(w, row, col, employee_type)
        })?,
        Command::Fire { row, col } => {
            with_world(&mut players, &player_id, |w| actions::fire(w, row, col))?
        }
        Command::Sell { row, col } => {
            with_world(&mut players, &player_id, |w| actions::sell(w, row, col))?
        }
        Command::Upgrade { row, col } => {
            with_world(&mut players, &player_id, |w| actions::upgrade(w, row, col))?
        }
    }

    Ok(Json(Ack { ok: true }))
}

/// Runs a tile action against one player's world, mapping the outcome
/// onto the HTTP error vocabulary.
fn with_world<F>(
    players: &mut PlayerManager,
    player_id: &str,
    apply: F,
) -> Result<(), ApiError>
where
    F: FnOnce(&mut World) -> Result<(), actions::ActionError>,
{
    let player = players
        .get_mut(player_id)
        .ok_or_else(|| ApiError::not_found("player not found"))?;
    apply(&mut player.world).map_err(ApiError::bad_request)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerQuery {
    player_id: Option<PlayerId>,
}

async fn fetch_state(
    State(state): State<SharedState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<GameState>, ApiError> {
    let player_id = query
        .player_id
        .ok_or_else(|| ApiError::bad_request("playerId query param required"))?;
    let players = state.players.read().await;
    let player = players
        .get(&player_id)
        .ok_or_else(|| ApiError::not_found("player not found"))?;
    Ok(Json(broadcast::snapshot(&players, player)))
}

/// The tick stream. Each loop parks a fresh oneshot in the player's
/// subscriber slot under the write lock, then waits for the game loop to
/// fill it with the lock released. Frames the subscriber was not armed
/// for are simply never seen; the player's removal ends the stream.
async fn stream_ticks(
    State(state): State<SharedState>,
    Query(query): Query<PlayerQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let player_id = query
        .player_id
        .ok_or_else(|| ApiError::bad_request("playerId query param required"))?;
    {
        let players = state.players.read().await;
        if players.get(&player_id).is_none() {
            return Err(ApiError::not_found("player not found"));
        }
    }

    let ticks = stream::unfold((state, player_id), |(state, player_id)| async move {
        let pending = {
            let mut players = state.players.write().await;
            players.get_mut(&player_id)?.attach_subscriber()
        };
        let frame = pending.await.ok()?;
        let event = Event::default()
            .event("tick")
            .id(frame.tick.to_string())
            .data(frame.data);
        Some((Ok::<Event, Infallible>(event), (state, player_id)))
    });

    Ok(Sse::new(ticks).keep_alive(KeepAlive::default()))
}

async fn list_players(State(state): State<SharedState>) -> Json<Vec<PlayerInfo>> {
    let players = state.players.read().await;
    Json(players.scoreboard())
}

async fn remove_player(
    State(state): State<SharedState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<Ack>, ApiError> {
    let mut players = state.players.write().await;
    if players.remove(&player_id) {
        Ok(Json(Ack { ok: true }))
    } else {
        Err(ApiError::not_found("player not found"))
    }
}

#[derive(Debug, Serialize)]
struct Removed {
    removed: usize,
}

async fn remove_all_players(State(state): State<SharedState>) -> Json<Removed> {
    let mut players = state.players.write().await;
    Json(Removed {
        removed: players.remove_all(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use shared::{BuildingKind, EmployeeKind, TroopOrder, MAX_PLAYERS, STARTING_FUNDS};
    use std::sync::Arc;

    fn test_state() -> SharedState {
        Arc::new(AppState::new(MAX_PLAYERS))
    }

    async fn join_as(state: &SharedState, name: &str) -> PlayerId {
        let reply = join(
            State(Arc::clone(state)),
            Json(JoinRequest {
                name: Some(name.to_string()),
            }),
        )
        .await
        .unwrap();
        reply.0.player_id
    }

    fn envelope(player_id: &str, command: Command) -> Json<CommandEnvelope> {
        Json(CommandEnvelope {
            player_id: player_id.to_string(),
            command,
        })
    }

    #[tokio::test]
    async fn test_join_then_fetch_state() {
        let state = test_state();
        let id = join_as(&state, "Acme").await;

        let fetched = fetch_state(
            State(Arc::clone(&state)),
            Query(PlayerQuery {
                player_id: Some(id),
            }),
        )
        .await
        .unwrap();
        assert_eq!(fetched.0.funds, STARTING_FUNDS);
        assert_eq!(fetched.0.players.len(), 1);
        assert_eq!(fetched.0.players[0].name, "Acme");
    }

    #[tokio::test]
    async fn test_join_rejects_missing_name() {
        let state = test_state();
        let err = join(State(state), Json(JoinRequest { name: None }))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.reason, "name is required");
    }

    #[tokio::test]
    async fn test_fetch_state_requires_player_id() {
        let state = test_state();
        let err = fetch_state(State(state), Query(PlayerQuery { player_id: None }))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.reason, "playerId query param required");
    }

    #[tokio::test]
    async fn test_fetch_state_unknown_player() {
        let state = test_state();
        let err = fetch_state(
            State(state),
            Query(PlayerQuery {
                player_id: Some("missing1".into()),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.reason, "player not found");
    }

    #[tokio::test]
    async fn test_action_builds_a_building() {
        let state = test_state();
        let id = join_as(&state, "Acme").await;

        action(
            State(Arc::clone(&state)),
            envelope(
                &id,
                Command::Build {
                    row: 0,
                    col: 0,
                    building_type: BuildingKind::Office,
                },
            ),
        )
        .await
        .unwrap();

        let players = state.players.read().await;
        let world = &players.get(&id).unwrap().world;
        assert_eq!(world.building_count(), 1);
        assert_eq!(world.funds, STARTING_FUNDS - 500);
    }

    #[tokio::test]
    async fn test_action_surfaces_validation_reason() {
        let state = test_state();
        let id = join_as(&state, "Acme").await;

        let err = action(
            State(Arc::clone(&state)),
            envelope(
                &id,
                Command::Build {
                    row: 9,
                    col: 0,
                    building_type: BuildingKind::Office,
                },
            ),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.reason, "out of bounds");
    }

    #[tokio::test]
    async fn test_action_requires_known_player() {
        let state = test_state();
        let err = action(
            State(Arc::clone(&state)),
            envelope("ghost", Command::Fire { row: 0, col: 0 }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = action(
            State(state),
            envelope("", Command::Fire { row: 0, col: 0 }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.reason, "playerId is required");
    }

    #[tokio::test]
    async fn test_attack_command_routes_to_combat() {
        let state = test_state();
        let attacker = join_as(&state, "attacker").await;
        let defender = join_as(&state, "defender").await;

        // stage a garrison for the attacker
        {
            let mut players = state.players.write().await;
            let world = &mut players.get_mut(&attacker).unwrap().world;
            world.funds = 10_000;
            actions::build(world, 0, 0, BuildingKind::Office).unwrap();
            for _ in 0..3 {
                actions::hire(world, 0, 0, EmployeeKind::OfficeWorker).unwrap();
            }
        }

        action(
            State(Arc::clone(&state)),
            envelope(
                &attacker,
                Command::Attack {
                    target_id: defender.clone(),
                    troops: vec![TroopOrder {
                        row: 0,
                        col: 0,
                        count: 2,
                    }],
                },
            ),
        )
        .await
        .unwrap();

        let players = state.players.read().await;
        assert!(players
            .get(&attacker)
            .unwrap()
            .outbox
            .attack_report
            .is_some());
        assert!(players.get(&defender).unwrap().defense_buffer > 0);
    }

    #[tokio::test]
    async fn test_attack_error_maps_to_bad_request() {
        let state = test_state();
        let attacker = join_as(&state, "attacker").await;

        let err = action(
            State(Arc::clone(&state)),
            envelope(
                &attacker,
                Command::Attack {
                    target_id: "nobody".into(),
                    troops: vec![],
                },
            ),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.reason, "target not found");
    }

    #[tokio::test]
    async fn test_stream_requires_known_player() {
        let state = test_state();
        let err = stream_ticks(
            State(Arc::clone(&state)),
            Query(PlayerQuery { player_id: None }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = stream_ticks(
            State(state),
            Query(PlayerQuery {
                player_id: Some("ghost".into()),
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_listing_and_removal() {
        let state = test_state();
        let a = join_as(&state, "alpha").await;
        let _b = join_as(&state, "beta").await;

        let listed = list_players(State(Arc::clone(&state))).await;
        assert_eq!(listed.0.len(), 2);
        assert_eq!(listed.0[0].name, "alpha");

        remove_player(State(Arc::clone(&state)), Path(a.clone()))
            .await
            .unwrap();
        let err = remove_player(State(Arc::clone(&state)), Path(a))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let removed = remove_all_players(State(Arc::clone(&state))).await;
        assert_eq!(removed.0.removed, 1);
        assert!(state.players.read().await.is_empty());
    }
}
