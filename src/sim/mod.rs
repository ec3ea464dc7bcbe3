//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through the frame delta passed in
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod collision;
pub mod group;
pub mod pool;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use group::{Group, NodeId};
pub use pool::{PipePool, pipe_offset, spawn_pipe, spawn_pipes};
pub use state::{
    Collision, GameEvent, GamePhase, GameState, Ground, Pipe, PipeKind, Player, SetupError,
    Sprites,
};
pub use tick::{TickInput, tick, update_game};
