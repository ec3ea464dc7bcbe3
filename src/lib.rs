//! Flappy - a side-scrolling flap-through-the-pipes arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pipe pool, physics, collisions, game state)
//! - `scene`: Seams to the host renderer (scene bounds, sprite loading)
//! - `tuning`: Data-driven game balance

pub mod scene;
pub mod sim;
pub mod tuning;

pub use scene::{HeadlessLoader, Scene, SpriteLoader};
pub use tuning::{Tuning, TuningError};

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Game configuration constants
pub mod consts {
    /// Frame timestep the pipe speed was authored against (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Leftward pipe and ground speed, units per frame
    pub const SPEED: f32 = 1.6;
    /// Downward acceleration on the player, units/s²
    pub const GRAVITY: f32 = 1100.0;
    /// Upward velocity set by a tap
    pub const FLAP: f32 = 320.0;
    /// Milliseconds between pipe pairs
    pub const SPAWN_RATE_MS: f32 = 2600.0;
    /// Vertical gap between a top and bottom pipe
    pub const OPENING: f32 = 120.0;
    /// Visible band of ground at the bottom of the scene
    pub const GROUND_HEIGHT: f32 = 64.0;

    pub const PIPE_WIDTH: f32 = 52.0;
    pub const PIPE_HEIGHT: f32 = 320.0;
    /// New pipes appear this far past the right edge
    pub const PIPE_SPAWN_MARGIN: f32 = 26.0;
    /// Gap centre varies by ±half this fraction of the scene height
    pub const CENTER_JITTER: f32 = 0.2;

    pub const PLAYER_WIDTH: f32 = 36.0;
    pub const PLAYER_HEIGHT: f32 = 26.0;
    /// Player x on reset, as a fraction of scene width
    pub const PLAYER_START_X: f32 = -0.3;

    /// Idle bobbing amplitude
    pub const HOVER_AMPLITUDE: f32 = 8.0;
    /// Idle bobbing period divisor (ms)
    pub const HOVER_PERIOD_MS: f64 = 200.0;

    /// Ground tile height as a fraction of scene width
    pub const GROUND_ASPECT: f32 = 0.333_333_33;
    /// Overlap applied when a ground tile wraps, hides the seam
    pub const GROUND_SEAM: f32 = 1.55;

    /// Bird flap animation
    pub const BIRD_TILES: u32 = 3;
    pub const BIRD_TILE_MS: f32 = 75.0;

    /// Undrained events kept before the oldest are dropped
    pub const MAX_PENDING_EVENTS: usize = 256;
}

/// Visual tilt for a vertical velocity.
///
/// `(flap + velocity) / flap`, clamped to `[-π/2, π/4]`: nose up right after a
/// flap, nose down once the bird is falling fast.
#[inline]
pub fn tilt_for_velocity(velocity: f32, flap: f32) -> f32 {
    ((flap + velocity) / flap).clamp(-FRAC_PI_2, FRAC_PI_4)
}
