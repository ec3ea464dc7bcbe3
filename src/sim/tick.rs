//! Per-frame update
//!
//! The host calls [`tick`] (or [`update_game`] plus [`GameState::tap`]) once
//! per rendered frame with the elapsed time. Player motion is integrated with
//! that delta; pipes and ground move a fixed distance per frame.

use std::f32::consts::FRAC_PI_2;

use super::pool::spawn_pipes;
use super::state::{Collision, GamePhase, GameState, PipeKind};
use crate::consts::*;
use crate::tilt_for_velocity;

/// Input gathered since the previous frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Touch-down happened
    pub tap: bool,
}

/// Apply input, then advance one frame
pub fn tick(state: &mut GameState, input: &TickInput, delta: f32) {
    if input.tap {
        state.tap();
    }
    update_game(state, delta);
}

/// Advance the game by one frame of `delta` seconds
pub fn update_game(state: &mut GameState, delta: f32) {
    state.clock_ms += delta as f64 * 1000.0;

    match state.phase {
        GamePhase::Idle => {
            state.player.update(delta);
            state.player.pos.y =
                HOVER_AMPLITUDE * (state.clock_ms / HOVER_PERIOD_MS).cos() as f32;
            state.player.angle = 0.0;
        }

        GamePhase::Playing | GamePhase::GameOver => {
            state.player.velocity -= state.tuning.gravity * delta;
            let ground_top = state.ground.top;

            if state.phase == GamePhase::Playing {
                run_spawn_schedule(state, delta);
                step_pipes(state);

                state.player.angle = tilt_for_velocity(state.player.velocity, state.tuning.flap);
                if state.player.pos.y <= ground_top {
                    state.set_game_over(Collision::Ground);
                }
                state.player.update(delta);
            }

            // After game over the bird keeps falling until it lands
            if state.player.pos.y <= ground_top {
                state.player.angle = -FRAC_PI_2;
                state.player.pos.y = ground_top;
                state.player.velocity = 0.0;
            } else {
                state.player.pos.y += state.player.velocity * delta;
            }
        }
    }

    if state.phase != GamePhase::GameOver {
        let width = state.scene.size.x;
        state.ground.scroll(state.tuning.speed, width);
    }
}

/// Spawn a pair every `spawn_rate_ms` of play, at most one per frame.
/// Pipes do not move between spawns within a frame, so extra pairs would
/// stack at the same x.
fn run_spawn_schedule(state: &mut GameState, delta: f32) {
    let rate = state.tuning.spawn_rate_ms;
    state.spawn_clock_ms += delta * 1000.0;
    if state.spawn_clock_ms >= rate {
        state.spawn_clock_ms = (state.spawn_clock_ms - rate).min(rate);
        spawn_pipes(state);
    }
}

/// Move live pipes, then resolve collisions and scoring against the player
/// box taken before they moved.
fn step_pipes(state: &mut GameState) {
    let player_box = state.player.aabb();
    let player_x = state.player.pos.x;
    let mut hit = false;
    let mut passed = 0;

    state.pipes.for_each_alive(|_, pipe| {
        pipe.pos.x += pipe.velocity;

        if pipe.aabb().intersects(&player_box) {
            hit = true;
        }

        if pipe.kind == PipeKind::Bottom && !pipe.passed && pipe.pos.x < player_x {
            pipe.passed = true;
            passed += 1;
        }
    });

    for _ in 0..passed {
        state.add_score();
    }
    if hit {
        state.set_game_over(Collision::Pipe);
    }
}
