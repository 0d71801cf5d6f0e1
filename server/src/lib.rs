//! # Corporate Clash Server Library
//!
//! This library provides the authoritative server implementation for the
//! multiplayer corporate strategy game. Every player manages a company on a
//! private tile grid; the server owns all of that state, advances it on a
//! fixed tick, resolves attacks between companies, and streams fresh
//! snapshots to connected clients.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! All economy, combat, and event outcomes are computed here. Clients only
//! submit commands and render the snapshots they are sent; nothing a client
//! says about its own funds, buildings, or defense is ever trusted.
//!
//! ### Player Lifecycle
//! Handles the complete lifecycle of a player session including:
//! - Join validation and session id assignment
//! - Command validation and application
//! - Administrative removal and full resets
//!
//! ### State Broadcasting
//! After every simulation tick the server renders one personalized snapshot
//! per player and pushes it over Server-Sent Events. Delivery is
//! at-most-once: a slow or absent subscriber misses ticks rather than
//! receiving a backlog of stale ones.
//!
//! ## Architecture Design
//!
//! ### Single Simulation Lock
//! The whole player registry sits behind one `tokio::sync::RwLock`. The tick
//! task takes the write lock for the duration of a step, so every handler
//! observes either the state before a tick or the state after it, never a
//! half-applied one. At the intended scale (tens of players, a 150ms tick)
//! lock contention is not a concern.
//!
//! ### Two-Phase Ticks
//! Each tick first updates every player (income, timers, random events) and
//! only then broadcasts. A snapshot therefore never mixes pre-tick and
//! post-tick state across players.
//!
//! ### Command Pipeline
//! Commands arrive over HTTP, are validated completely against the current
//! state, and are applied synchronously before the response is sent. A
//! rejected command leaves no trace in the world.
//!
//! ## Module Organization
//!
//! - `player_manager`: session registry, join rules, per-player state
//! - `game_loop`: the fixed-period driver and the per-tick update order
//! - `economy`: per-tick profit collection
//! - `events`: the random event deck and each event's effect
//! - `combat`: attack validation, duel resolution, casualties, cash steal
//! - `actions`: build/hire/fire/sell/upgrade validation and application
//! - `broadcast`: snapshot rendering and single-slot tick delivery
//! - `http`: the axum router, JSON endpoints, and the SSE stream
//! - `state`: the shared handle the transport and the tick task both hold
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::state::AppState;
//! use server::{game_loop, http};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = Arc::new(AppState::new(20));
//!
//!     // Drive the simulation at the fixed tick rate
//!     let sim = Arc::clone(&state);
//!     tokio::spawn(async move {
//!         game_loop::run_game_loop(sim, Duration::from_millis(150)).await;
//!     });
//!
//!     // Serve the HTTP API and the tick stream
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, http::router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod broadcast;
pub mod combat;
pub mod economy;
pub mod events;
pub mod game_loop;
pub mod http;
pub mod player_manager;
pub mod state;
