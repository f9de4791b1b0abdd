//! Configuration loading and typed config structures.
//!
//! The configuration lives in `crawl-config.yaml` next to the binary's
//! working directory. Every field is optional; missing sections and keys
//! fall back to the defaults documented on each field.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;
use tracing::warn;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LevelConfig {
    /// Directory holding `levels/floor-<N>/`.
    #[serde(default = "default_assets_root")]
    pub assets_root: PathBuf,

    /// Draw the physics debug overlay when a renderer is supplied.
    #[serde(default)]
    pub debug: bool,

    /// Physics world settings.
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// Camera follow settings.
    #[serde(default)]
    pub camera: CameraConfig,

    /// Settings for the engine binary's run loop.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            debug: false,
            physics: PhysicsConfig::default(),
            camera: CameraConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl LevelConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CRAWL_ASSETS_ROOT` overrides `assets_root`
    /// - `CRAWL_DEBUG` overrides `debug` (`1`/`true`/`yes` or `0`/`false`/`no`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `CRAWL_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("CRAWL_ASSETS_ROOT") {
            self.assets_root = PathBuf::from(root);
        }
        if let Some(raw) = lookup("CRAWL_DEBUG") {
            match parse_flag(&raw) {
                Some(flag) => self.debug = flag,
                None => warn!(value = raw, "Ignoring unrecognised CRAWL_DEBUG value"),
            }
        }
    }

    /// Directory holding one floor's resources.
    pub fn floor_dir(&self, floor: u32) -> PathBuf {
        self.assets_root.join("levels").join(format!("floor-{floor}"))
    }
}

/// Physics world settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhysicsConfig {
    /// Constant acceleration, `[x, y]`.
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 2],

    /// Whether resting bodies may sleep.
    #[serde(default = "default_true")]
    pub allow_sleep: bool,

    /// Velocity solver iterations per step.
    #[serde(default = "default_velocity_iterations")]
    pub velocity_iterations: u32,

    /// Position solver iterations per step.
    #[serde(default = "default_position_iterations")]
    pub position_iterations: u32,
}

impl PhysicsConfig {
    /// Gravity as a vector.
    pub const fn gravity(&self) -> Vec2 {
        Vec2::from_array(self.gravity)
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            allow_sleep: true,
            velocity_iterations: default_velocity_iterations(),
            position_iterations: default_position_iterations(),
        }
    }
}

/// Camera follow settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraConfig {
    /// Fraction of the remaining distance to the player covered per render.
    #[serde(default = "default_follow_factor")]
    pub follow_factor: f32,

    /// Visible width and height in world units.
    #[serde(default = "default_viewport")]
    pub viewport: [f32; 2],
}

impl CameraConfig {
    /// Viewport as a vector.
    pub const fn viewport(&self) -> Vec2 {
        Vec2::from_array(self.viewport)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            follow_factor: default_follow_factor(),
            viewport: default_viewport(),
        }
    }
}

/// Run loop settings for the engine binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Floor number to load.
    #[serde(default = "default_floor")]
    pub floor: u32,

    /// Seed for room selection.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of ticks to run before disposing the level.
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Simulated seconds per tick.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            floor: default_floor(),
            seed: default_seed(),
            ticks: default_ticks(),
            tick_seconds: default_tick_seconds(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_assets_root() -> PathBuf {
    PathBuf::from("assets")
}

const fn default_true() -> bool {
    true
}

const fn default_gravity() -> [f32; 2] {
    [0.0, -9.8]
}

const fn default_velocity_iterations() -> u32 {
    8
}

const fn default_position_iterations() -> u32 {
    3
}

const fn default_follow_factor() -> f32 {
    0.1
}

const fn default_viewport() -> [f32; 2] {
    [16.0, 9.0]
}

const fn default_floor() -> u32 {
    1
}

const fn default_seed() -> u64 {
    42
}

const fn default_ticks() -> u64 {
    600
}

fn default_tick_seconds() -> f32 {
    1.0 / 60.0
}
