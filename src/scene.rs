//! Seams to the host renderer
//!
//! The simulation never draws anything. It needs the visible area of the
//! scene, somewhere to record draw order, and a way to ask the host to build
//! sprites. Hosts implement [`SpriteLoader`]; [`HeadlessLoader`] is enough for
//! tests and the native runner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Visible extent of the scene in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

/// Top-level nodes the game adds to the scene, in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Pipes,
    Background,
    Ground,
    Player,
}

/// The host scene as seen by the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub size: Vec2,
    pub bounds: Bounds,
    pub layers: Vec<Layer>,
}

impl Scene {
    /// Scene of the given size with the origin at its centre
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            bounds: Bounds {
                left: -width / 2.0,
                right: width / 2.0,
                bottom: -height / 2.0,
                top: height / 2.0,
            },
            layers: Vec::new(),
        }
    }

    pub fn add(&mut self, layer: Layer) {
        self.layers.push(layer);
    }
}

/// Images the game asks the host for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    Background,
    Ground,
    Bird,
    PipeTop,
    PipeBottom,
}

/// Host-side texture or animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteHandle(pub u32);

/// What to build: image, display size and optional sprite-sheet layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteDesc {
    pub asset: Asset,
    pub size: Vec2,
    pub tiles_horiz: u32,
    pub tiles_vert: u32,
    pub num_tiles: u32,
    pub tile_display_ms: f32,
}

impl SpriteDesc {
    /// Single-frame image
    pub fn still(asset: Asset, size: Vec2) -> Self {
        Self {
            asset,
            size,
            tiles_horiz: 1,
            tiles_vert: 1,
            num_tiles: 1,
            tile_display_ms: 0.0,
        }
    }

    /// Horizontal strip of `num_tiles` frames, each shown for `tile_display_ms`
    pub fn animated(asset: Asset, size: Vec2, num_tiles: u32, tile_display_ms: f32) -> Self {
        Self {
            asset,
            size,
            tiles_horiz: num_tiles,
            tiles_vert: 1,
            num_tiles,
            tile_display_ms,
        }
    }

    pub fn animation(&self) -> SpriteAnimation {
        SpriteAnimation::new(self.num_tiles, self.tile_display_ms)
    }
}

/// Builds sprites on the host. Called only during setup, in order.
pub trait SpriteLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    fn setup(&mut self, desc: &SpriteDesc) -> Result<SpriteHandle, Self::Error>;
}

/// Loader with no backing renderer: hands out sequential handles
#[derive(Debug, Default)]
pub struct HeadlessLoader {
    next: u32,
    /// Every request, in the order it arrived
    pub requests: Vec<SpriteDesc>,
}

impl HeadlessLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpriteLoader for HeadlessLoader {
    type Error = std::convert::Infallible;

    fn setup(&mut self, desc: &SpriteDesc) -> Result<SpriteHandle, Self::Error> {
        let handle = SpriteHandle(self.next);
        self.next += 1;
        self.requests.push(desc.clone());
        Ok(handle)
    }
}

/// Frame selection for a sprite-sheet animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteAnimation {
    pub num_tiles: u32,
    pub tile_display_ms: f32,
    elapsed_ms: f32,
}

impl SpriteAnimation {
    pub fn new(num_tiles: u32, tile_display_ms: f32) -> Self {
        Self {
            num_tiles: num_tiles.max(1),
            tile_display_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Advance by `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        if self.num_tiles <= 1 || self.tile_display_ms <= 0.0 {
            return;
        }
        let cycle = self.tile_display_ms * self.num_tiles as f32;
        self.elapsed_ms = (self.elapsed_ms + delta * 1000.0) % cycle;
    }

    /// Index of the tile to show
    pub fn current_tile(&self) -> u32 {
        if self.num_tiles <= 1 || self.tile_display_ms <= 0.0 {
            return 0;
        }
        ((self.elapsed_ms / self.tile_display_ms) as u32).min(self.num_tiles - 1)
    }
}
