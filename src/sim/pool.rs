//! Pipe pool and spawner
//!
//! Pipes are never freed during a run. When one scrolls off the left edge it
//! is killed in the group and its id goes onto the free list for its kind;
//! the next spawn of that kind pops it back out and moves it to the right
//! edge instead of allocating a new pipe.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::group::{Group, NodeId};
use super::state::{GameEvent, GameState, Pipe, PipeKind};
use crate::consts::*;
use crate::scene::SpriteHandle;

/// Live and retired pipes plus one free list per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipePool {
    pipes: Group<Pipe>,
    dead_tops: Vec<NodeId>,
    dead_bottoms: Vec<NodeId>,
    next_id: u32,
}

impl PipePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revive the most recently retired pipe of `kind` at `pos`, or build a
    /// new one if none is waiting.
    pub fn acquire(&mut self, kind: PipeKind, pos: Vec2, sprite: SpriteHandle) -> NodeId {
        if let Some(id) = self.free_list_mut(kind).pop() {
            if let Some(pipe) = self.pipes.revive(id) {
                pipe.reset(pos);
                log::trace!("Reused {:?} pipe {} at {:?}", kind, pipe.id, pos);
                return id;
            }
        }

        let pipe = Pipe::new(self.next_id, kind, pos, sprite);
        self.next_id += 1;
        let id = self.pipes.add(pipe);
        log::trace!("Allocated {:?} pipe, pool size {}", kind, self.pipes.len());
        id
    }

    /// Kill every live pipe whose right edge is left of `left` and queue it
    /// for reuse. Returns how many were retired.
    pub fn retire_offscreen(&mut self, left: f32) -> usize {
        let offscreen: Vec<(NodeId, PipeKind)> = self
            .pipes
            .iter_alive()
            .filter(|(_, pipe)| pipe.right() < left)
            .map(|(id, pipe)| (id, pipe.kind))
            .collect();

        for &(id, kind) in &offscreen {
            let id = self.pipes.kill(id);
            self.free_list_mut(kind).push(id);
        }
        offscreen.len()
    }

    /// Detach every pipe and forget the free lists
    pub fn clear(&mut self) {
        self.pipes.remove_all();
        self.dead_tops.clear();
        self.dead_bottoms.clear();
    }

    /// Retired pipes of `kind`, next to be reused last
    pub fn free_list(&self, kind: PipeKind) -> &[NodeId] {
        match kind {
            PipeKind::Top => &self.dead_tops,
            PipeKind::Bottom => &self.dead_bottoms,
        }
    }

    fn free_list_mut(&mut self, kind: PipeKind) -> &mut Vec<NodeId> {
        match kind {
            PipeKind::Top => &mut self.dead_tops,
            PipeKind::Bottom => &mut self.dead_bottoms,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Pipe> {
        self.pipes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Pipe> {
        self.pipes.get_mut(id)
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.pipes.is_alive(id)
    }

    pub fn for_each_alive(&mut self, visitor: impl FnMut(NodeId, &mut Pipe)) {
        self.pipes.for_each_alive(visitor);
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = (NodeId, &Pipe)> + '_ {
        self.pipes.iter_alive()
    }

    pub fn alive_count(&self) -> usize {
        self.pipes.alive_count()
    }

    /// Pipes ever created this run, alive or pooled
    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }
}

/// Vertical position of one half of a pair around the gap centre.
///
/// The top pipe's bottom edge sits half an opening above the centre; the
/// bottom pipe's top edge sits half an opening below it.
pub fn pipe_offset(center_y: f32, flipped: bool, opening: f32) -> f32 {
    if flipped {
        (center_y - opening / 2.0 - PIPE_HEIGHT).floor()
    } else {
        (center_y + opening / 2.0).floor()
    }
}

/// Place one half of a pair just past the right edge, moving left
pub fn spawn_pipe(state: &mut GameState, center_y: f32, flipped: bool) -> NodeId {
    let kind = if flipped {
        PipeKind::Bottom
    } else {
        PipeKind::Top
    };
    let pos = Vec2::new(
        state.scene.bounds.right + PIPE_SPAWN_MARGIN,
        pipe_offset(center_y, flipped, state.tuning.opening),
    );

    let id = state.pipes.acquire(kind, pos, state.sprites.pipe(kind));
    if let Some(pipe) = state.pipes.get_mut(id) {
        pipe.velocity = -state.tuning.speed;
    }
    id
}

/// Scheduled spawn: recycle pipes that have left the scene, then add a
/// top/bottom pair around a randomly jittered centre.
pub fn spawn_pipes(state: &mut GameState) -> (NodeId, NodeId) {
    let retired = state.pipes.retire_offscreen(state.scene.bounds.left);
    if retired > 0 {
        log::debug!("Retired {} pipes", retired);
        state.push_event(GameEvent::PipesRetired { count: retired });
    }

    let height = state.scene.size.y;
    let jitter = state.rng.random::<f32>() - 0.5;
    let center_y = height / 2.0 + jitter * height * state.tuning.center_jitter;

    let top = spawn_pipe(state, center_y, false);
    let bottom = spawn_pipe(state, center_y, true);

    log::debug!(
        "Spawned pipes around {:.1} ({} live, {} pooled)",
        center_y,
        state.pipes.alive_count(),
        state.pipes.len()
    );
    state.push_event(GameEvent::PipesSpawned { center_y });
    (top, bottom)
}
