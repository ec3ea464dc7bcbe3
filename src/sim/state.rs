//! Game state and core simulation types
//!
//! Everything a frame needs lives in [`GameState`]: the player, the ground
//! strip, the pipe pool, the session flags and the seeded RNG.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::Aabb;
use super::pool::PipePool;
use crate::consts::*;
use crate::scene::{Asset, Layer, Scene, SpriteAnimation, SpriteDesc, SpriteHandle, SpriteLoader};
use crate::tuning::Tuning;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Bird hovers, waiting for the first tap
    Idle,
    /// Gravity, pipes and scoring are live
    Playing,
    /// Run ended; the bird may still be falling to the ground
    GameOver,
}

/// Which half of a pipe pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipeKind {
    /// Hangs down from above the gap
    Top,
    /// Rises up from below the gap
    Bottom,
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    Pipe,
    Ground,
}

/// Things the host may want to react to (sound, score text)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Flap,
    Scored { score: u32 },
    PipesSpawned { center_y: f32 },
    PipesRetired { count: usize },
    GameOver { cause: Collision },
    Reset,
}

/// One half of a pipe pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub id: u32,
    pub kind: PipeKind,
    /// Bottom-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal movement per frame (negative = leftward)
    pub velocity: f32,
    /// Already counted toward the score
    pub passed: bool,
    pub sprite: SpriteHandle,
}

impl Pipe {
    pub fn new(id: u32, kind: PipeKind, pos: Vec2, sprite: SpriteHandle) -> Self {
        Self {
            id,
            kind,
            pos,
            size: Vec2::new(PIPE_WIDTH, PIPE_HEIGHT),
            velocity: 0.0,
            passed: false,
            sprite,
        }
    }

    /// Reposition a recycled pipe. It has not been passed at its new spot.
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.passed = false;
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }
}

/// The bird
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Bottom-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity, units/s (positive = up)
    pub velocity: f32,
    /// Visual tilt (radians)
    pub angle: f32,
    pub animation: SpriteAnimation,
    pub sprite: SpriteHandle,
}

impl Player {
    pub fn new(sprite: SpriteHandle, animation: SpriteAnimation) -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            velocity: 0.0,
            angle: 0.0,
            animation,
            sprite,
        }
    }

    pub fn reset(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
        self.velocity = 0.0;
        self.angle = 0.0;
    }

    /// Advance the flap animation by `delta` seconds
    pub fn update(&mut self, delta: f32) {
        self.animation.advance(delta);
    }

    /// Bounding box of the tilted sprite
    pub fn aabb(&self) -> Aabb {
        Aabb::from_rotated(self.pos, self.size, self.angle)
    }
}

/// Two ground tiles that leapfrog each other to scroll forever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ground {
    /// Horizontal position of each tile
    pub tiles: [f32; 2],
    pub tile_size: Vec2,
    /// Vertical centre line of the strip (not a bottom-left corner like
    /// other positions). Tiles span `y - tile_size.y / 2` to `top`.
    pub y: f32,
    /// Upper edge of the strip, the line the player rests on
    pub top: f32,
    pub sprite: SpriteHandle,
}

impl Ground {
    /// Ground strip for a scene, tiles side by side starting at x = 0
    pub fn new(scene_size: Vec2, sprite: SpriteHandle) -> Self {
        let tile_size = Vec2::new(scene_size.x, scene_size.x * GROUND_ASPECT);
        let y = (scene_size.y + (tile_size.y - GROUND_HEIGHT)) * -0.5;
        Self {
            tiles: [0.0, tile_size.x],
            tile_size,
            y,
            top: y + tile_size.y / 2.0,
            sprite,
        }
    }

    /// Move both tiles left by `speed`; a tile that has fully left the
    /// scene jumps to just behind the other one.
    pub fn scroll(&mut self, speed: f32, scene_width: f32) {
        let count = self.tiles.len();
        for index in 0..count {
            self.tiles[index] -= speed;
            if self.tiles[index] < -scene_width {
                let next = (index + 1) % count;
                self.tiles[index] = self.tiles[next] + scene_width - GROUND_SEAM;
            }
        }
    }
}

/// Handles for every sprite the game uses
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sprites {
    pub background: SpriteHandle,
    pub ground: SpriteHandle,
    pub bird: SpriteHandle,
    pub pipe_top: SpriteHandle,
    pub pipe_bottom: SpriteHandle,
}

impl Sprites {
    pub fn pipe(&self, kind: PipeKind) -> SpriteHandle {
        match kind {
            PipeKind::Top => self.pipe_top,
            PipeKind::Bottom => self.pipe_bottom,
        }
    }
}

/// Setup stopped because the host could not build a sprite
#[derive(Debug, Error)]
#[error("failed to set up {asset:?} sprite")]
pub struct SetupError<E: std::error::Error + 'static> {
    pub asset: Asset,
    #[source]
    pub source: E,
}

fn load_sprite<L: SpriteLoader>(
    loader: &mut L,
    desc: &SpriteDesc,
) -> Result<SpriteHandle, SetupError<L::Error>> {
    loader.setup(desc).map_err(|source| {
        log::error!("Sprite setup failed for {:?}: {}", desc.asset, source);
        SetupError {
            asset: desc.asset,
            source,
        }
    })
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub scene: Scene,
    pub phase: GamePhase,
    pub score: u32,
    pub player: Player,
    pub ground: Ground,
    pub pipes: PipePool,
    pub sprites: Sprites,
    /// Simulation time, sum of every frame delta (ms)
    pub clock_ms: f64,
    /// Time since the last pipe pair was scheduled (ms)
    pub spawn_clock_ms: f32,
    /// Undrained events, oldest first. Hosts should call
    /// [`GameState::drain_events`] every frame; past `MAX_PENDING_EVENTS`
    /// the oldest are dropped.
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build the scene and the session. Sprites are requested in order:
    /// background, ground (two tiles), bird, then the two pipe textures.
    /// The first loader failure aborts setup.
    pub fn setup<L: SpriteLoader>(
        mut scene: Scene,
        tuning: Tuning,
        seed: u64,
        loader: &mut L,
    ) -> Result<Self, SetupError<L::Error>> {
        scene.add(Layer::Pipes);

        let background = load_sprite(loader, &SpriteDesc::still(Asset::Background, scene.size))?;
        scene.add(Layer::Background);

        let ground_size = Vec2::new(scene.size.x, scene.size.x * GROUND_ASPECT);
        let ground_desc = SpriteDesc::still(Asset::Ground, ground_size);
        let ground_sprite = load_sprite(loader, &ground_desc)?;
        // Second tile shares the texture but is its own node on the host
        load_sprite(loader, &ground_desc)?;
        let ground = Ground::new(scene.size, ground_sprite);
        scene.add(Layer::Ground);

        let bird_desc = SpriteDesc::animated(
            Asset::Bird,
            Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            BIRD_TILES,
            BIRD_TILE_MS,
        );
        let bird = load_sprite(loader, &bird_desc)?;
        let player = Player::new(bird, bird_desc.animation());
        scene.add(Layer::Player);

        let pipe_size = Vec2::new(PIPE_WIDTH, PIPE_HEIGHT);
        let pipe_top = load_sprite(loader, &SpriteDesc::still(Asset::PipeTop, pipe_size))?;
        let pipe_bottom = load_sprite(loader, &SpriteDesc::still(Asset::PipeBottom, pipe_size))?;

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            scene,
            phase: GamePhase::Idle,
            score: 0,
            player,
            ground,
            pipes: PipePool::new(),
            sprites: Sprites {
                background,
                ground: ground_sprite,
                bird,
                pipe_top,
                pipe_bottom,
            },
            clock_ms: 0.0,
            spawn_clock_ms: 0.0,
            events: Vec::new(),
        };
        state.reset();
        state.events.clear();

        log::info!(
            "Scene ready: {}x{}, ground top at {:.1}, seed {}",
            state.scene.size.x,
            state.scene.size.y,
            state.ground.top,
            seed
        );
        Ok(state)
    }

    pub fn game_started(&self) -> bool {
        self.phase != GamePhase::Idle
    }

    pub fn game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Touch-down handler. The first tap starts the run and its spawn
    /// schedule; taps while playing flap; a tap after game over resets.
    pub fn tap(&mut self) {
        if self.phase == GamePhase::Idle {
            self.phase = GamePhase::Playing;
            self.spawn_clock_ms = 0.0;
            self.push_event(GameEvent::Started);
            log::info!("Run started");
        }

        if self.phase != GamePhase::GameOver {
            self.player.velocity = self.tuning.flap;
            self.push_event(GameEvent::Flap);
        } else {
            self.reset();
        }
    }

    /// Back to a hovering bird with no pipes and a zero score
    pub fn reset(&mut self) {
        self.phase = GamePhase::Idle;
        self.score = 0;
        self.spawn_clock_ms = 0.0;
        let start = self.start_position();
        self.player.reset(start.x, start.y);
        self.pipes.clear();
        self.push_event(GameEvent::Reset);
        log::info!("Game reset");
    }

    /// Where the player sits after a reset
    pub fn start_position(&self) -> Vec2 {
        Vec2::new(self.scene.size.x * PLAYER_START_X, 0.0)
    }

    /// End the run. Returns false if it had already ended.
    pub fn set_game_over(&mut self, cause: Collision) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::GameOver;
        // No further pairs until the next run
        self.spawn_clock_ms = 0.0;
        self.push_event(GameEvent::GameOver { cause });
        log::info!("Game over ({:?}) with score {}", cause, self.score);
        true
    }

    pub fn add_score(&mut self) {
        self.score += 1;
        self.push_event(GameEvent::Scored { score: self.score });
        log::debug!("Score {}", self.score);
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Hand pending events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
impl GameState {
    /// 400x600 scene, default tuning, headless sprites
    pub(crate) fn for_test(seed: u64) -> Self {
        let mut loader = crate::scene::HeadlessLoader::new();
        match Self::setup(Scene::new(400.0, 600.0), Tuning::default(), seed, &mut loader) {
            Ok(state) => state,
            Err(err) => match err.source {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::HeadlessLoader;

    #[derive(Debug, Error)]
    #[error("texture missing")]
    struct MissingTexture;

    /// Fails on the n-th request
    struct FailingLoader {
        inner: HeadlessLoader,
        fail_at: usize,
    }

    impl SpriteLoader for FailingLoader {
        type Error = MissingTexture;

        fn setup(&mut self, desc: &SpriteDesc) -> Result<SpriteHandle, Self::Error> {
            if self.inner.requests.len() == self.fail_at {
                return Err(MissingTexture);
            }
            Ok(self.inner.setup(desc).unwrap())
        }
    }

    #[test]
    fn test_setup_loads_in_order() {
        let mut loader = HeadlessLoader::new();
        let state =
            GameState::setup(Scene::new(400.0, 600.0), Tuning::default(), 1, &mut loader).unwrap();

        let assets: Vec<_> = loader.requests.iter().map(|d| d.asset).collect();
        assert_eq!(
            assets,
            vec![
                Asset::Background,
                Asset::Ground,
                Asset::Ground,
                Asset::Bird,
                Asset::PipeTop,
                Asset::PipeBottom,
            ]
        );
        assert_eq!(
            state.scene.layers,
            vec![Layer::Pipes, Layer::Background, Layer::Ground, Layer::Player]
        );
        assert_eq!(loader.requests[3].num_tiles, 3);
        assert_eq!(loader.requests[3].tile_display_ms, 75.0);
    }

    #[test]
    fn test_setup_leaves_idle_session() {
        let state = GameState::for_test(1);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(!state.game_started());
        assert!(!state.game_over());
        assert_eq!(state.score, 0);
        assert_eq!(state.player.pos, state.start_position());
        assert_eq!(state.pipes.alive_count(), 0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_setup_failure_propagates_asset() {
        let mut loader = FailingLoader {
            inner: HeadlessLoader::new(),
            fail_at: 3,
        };
        let err = GameState::setup(Scene::new(400.0, 600.0), Tuning::default(), 1, &mut loader)
            .unwrap_err();
        assert_eq!(err.asset, Asset::Bird);
        assert_eq!(err.to_string(), "failed to set up Bird sprite");
    }

    #[test]
    fn test_ground_geometry() {
        let ground = Ground::new(Vec2::new(400.0, 600.0), SpriteHandle(0));
        let tile_h = 400.0 * GROUND_ASPECT;
        assert_eq!(ground.tiles, [0.0, 400.0]);
        assert!((ground.y - (600.0 + tile_h - 64.0) * -0.5).abs() < 1e-3);
        assert!((ground.top - (ground.y + tile_h / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_ground_y_is_centre_line() {
        let ground = Ground::new(Vec2::new(400.0, 600.0), SpriteHandle(0));
        let bottom = ground.y - ground.tile_size.y / 2.0;
        assert!((ground.top - bottom - ground.tile_size.y).abs() < 1e-3);
        assert!((ground.y - (bottom + ground.top) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_undrained_events_are_capped() {
        let mut state = GameState::for_test(1);
        state.tap();
        for _ in 0..(MAX_PENDING_EVENTS * 2) {
            state.tap();
        }
        state.add_score();

        let events = state.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        // Oldest were dropped, newest kept
        assert_ne!(events[0], GameEvent::Started);
        assert_eq!(events.last(), Some(&GameEvent::Scored { score: 1 }));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_ground_tile_wraps_behind_other() {
        let mut ground = Ground::new(Vec2::new(400.0, 600.0), SpriteHandle(0));
        ground.tiles = [-399.0, 1.0];
        ground.scroll(1.6, 400.0);
        // Tile 0 fell past -400 and now sits behind tile 1 (1.0, not yet moved)
        assert!((ground.tiles[0] - (1.0 + 400.0 - GROUND_SEAM)).abs() < 1e-3);
        assert!((ground.tiles[1] - (1.0 - 1.6)).abs() < 1e-3);
    }

    #[test]
    fn test_first_tap_starts_and_flaps() {
        let mut state = GameState::for_test(1);
        state.tap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.velocity, FLAP);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Started, GameEvent::Flap]
        );

        state.player.velocity = -100.0;
        state.tap();
        assert_eq!(state.player.velocity, FLAP);
        assert_eq!(state.drain_events(), vec![GameEvent::Flap]);
    }

    #[test]
    fn test_game_over_triggers_once() {
        let mut state = GameState::for_test(1);
        state.tap();
        assert!(state.set_game_over(Collision::Pipe));
        assert!(!state.set_game_over(Collision::Ground));
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_tap_after_game_over_resets_to_idle() {
        let mut state = GameState::for_test(1);
        state.tap();
        state.add_score();
        state.player.pos = Vec2::new(-120.0, -250.0);
        state.player.angle = -1.0;
        state.set_game_over(Collision::Pipe);

        state.tap();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.pos, state.start_position());
        assert_eq!(state.player.angle, 0.0);
        assert_eq!(state.player.velocity, 0.0);

        // Next tap starts a fresh run
        state.tap();
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_state_serializes() {
        let state = GameState::for_test(5);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, 5);
        assert_eq!(back.phase, GamePhase::Idle);
        assert_eq!(back.ground.tiles, state.ground.tiles);
    }
}
