//! Flappy native runner
//!
//! Drives the simulation headlessly at 60 Hz with a simple autopilot and logs
//! what happens. Usage: `flappy [tuning.json] [runs]`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::Context;
    use flappy::consts::*;
    use flappy::sim::{GameEvent, GamePhase, GameState, PipeKind, TickInput, tick};
    use flappy::{HeadlessLoader, Scene, Tuning};

    const SCENE_WIDTH: f32 = 400.0;
    const SCENE_HEIGHT: f32 = 600.0;
    /// Give up on a run after two minutes of play
    const MAX_FRAMES: u32 = 60 * 120;
    /// Aim this far above the lower lip of the next gap
    const AIM_MARGIN: f32 = 15.0;

    pub fn run() -> anyhow::Result<()> {
        let mut args = std::env::args().skip(1);

        let tuning = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading tuning file {path}"))?;
                Tuning::from_json(&json).with_context(|| format!("loading tuning from {path}"))?
            }
            None => Tuning::default(),
        };
        let runs: u32 = match args.next() {
            Some(n) => n.parse().with_context(|| format!("run count `{n}`"))?,
            None => 3,
        };

        let seed = 0x5eed_f1a9;
        let mut loader = HeadlessLoader::new();
        let mut state = GameState::setup(
            Scene::new(SCENE_WIDTH, SCENE_HEIGHT),
            tuning,
            seed,
            &mut loader,
        )?;
        log::info!("Loaded {} sprites", loader.requests.len());

        let mut best = 0;
        for run in 1..=runs {
            let (score, frames) = play_once(&mut state);
            best = best.max(score);
            println!(
                "run {run}: score {score} after {:.1}s",
                frames as f32 * FRAME_DT
            );
            state.reset();
            state.drain_events();
        }
        println!("best score: {best}");
        Ok(())
    }

    /// Play until game over (or the frame cap). Returns score and frames.
    fn play_once(state: &mut GameState) -> (u32, u32) {
        let mut frames = 0;
        while frames < MAX_FRAMES {
            let input = TickInput {
                tap: should_flap(state),
            };
            tick(state, &input, FRAME_DT);
            frames += 1;

            for event in state.drain_events() {
                match event {
                    GameEvent::Scored { score } => log::debug!("frame {frames}: score {score}"),
                    GameEvent::GameOver { cause } => log::info!("frame {frames}: hit {cause:?}"),
                    _ => {}
                }
            }

            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        (state.score, frames)
    }

    /// Flap when falling below the lower lip of the next gap
    fn should_flap(state: &GameState) -> bool {
        if state.phase == GamePhase::Idle {
            return true;
        }

        let player = &state.player;
        let target = state
            .pipes
            .iter_alive()
            .filter(|(_, pipe)| pipe.kind == PipeKind::Bottom && pipe.right() >= player.pos.x)
            .map(|(_, pipe)| pipe)
            .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
            .map(|pipe| pipe.pos.y + pipe.size.y + AIM_MARGIN)
            .unwrap_or(0.0);

        player.velocity < 0.0 && player.pos.y < target
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flappy (native) starting...");

    if let Err(err) = native::run() {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
