//! Headless runner for the Crawl dungeon generator.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `crawl-config.yaml`
//! 3. Load the configured floor and assemble it with a seeded RNG
//! 4. Tick and render for the configured number of ticks
//! 5. Log a summary and dispose the level

mod error;

use std::path::Path;

use crawl_core::{Level, LevelConfig, TracingDebugRenderer};
use crawl_events::EventBus;
use crawl_physics::BodyRegistry;
use crawl_world::Camera;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "crawl-config.yaml";

/// Ticks between progress log lines.
const REPORT_EVERY: u64 = 60;

fn main() -> Result<(), EngineError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("crawl-engine starting");

    let config = load_config()?;
    info!(
        assets_root = %config.assets_root.display(),
        floor = config.engine.floor,
        seed = config.engine.seed,
        ticks = config.engine.ticks,
        debug = config.debug,
        "Configuration loaded"
    );

    let mut bus = EventBus::new();
    let mut level = Level::load(config.engine.floor, &config, &mut bus)?;
    let mut rng = StdRng::seed_from_u64(config.engine.seed);
    level.create(&mut rng)?;

    let mut camera = Camera::new(config.camera.viewport());
    let mut overlay = TracingDebugRenderer::new();
    let delta = config.engine.tick_seconds;
    let mut cancelled_unlocks = 0_u64;

    for tick in 1..=config.engine.ticks {
        let report = level.tick(delta, &camera, &mut bus)?;
        if report.unlock_cancelled {
            cancelled_unlocks = cancelled_unlocks.saturating_add(1);
        }
        level.render(delta, &mut camera, Some(&mut overlay));

        if tick % REPORT_EVERY == 0 {
            info!(
                tick,
                simulated = report.step.simulated,
                sleeping = report.step.sleeping,
                contacts = report.step.contacts,
                camera_x = camera.position.x,
                camera_y = camera.position.y,
                "Progress"
            );
        }
    }

    let bodies = level.world().borrow().body_count();
    let player = level.player().map(|p| p.position());
    info!(
        floor = level.floor(),
        name = level.name(),
        rooms = level.rooms().len(),
        bodies,
        player_x = player.map(|p| p.x),
        player_y = player.map(|p| p.y),
        cancelled_unlocks,
        debug_frames = overlay.frames(),
        "Run complete"
    );

    level.dispose(&mut bus);
    Ok(())
}

/// Load configuration from `crawl-config.yaml`, or defaults if absent.
///
/// Environment overrides apply in both cases.
fn load_config() -> Result<LevelConfig, EngineError> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        Ok(LevelConfig::from_file(path)?)
    } else {
        info!("Config file not found, using defaults");
        let mut config = LevelConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}
