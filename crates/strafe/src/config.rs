//! Game configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config and
//! a missing config file is not an error: the defaults are the game as
//! shipped. Point `STRAFE_CONFIG` at a JSON file to override any subset:
//!
//! ```text
//! STRAFE_CONFIG=easy.json strafe
//!
//! { "boss": { "fire_interval": 1.5 }, "bullets": { "damage": 25 } }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::math::{Rect, Vec2};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "STRAFE_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory holding the sprite PNGs and animation JSON files.
    pub asset_dir: PathBuf,
    /// RGBA, 0.0–1.0. Shows wherever the background doesn't cover.
    pub clear_color: [f32; 4],
    pub player: PlayerConfig,
    pub boss: BossConfig,
    pub enemies: EnemyConfig,
    pub bullets: BulletConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    pub position: Vec2,
    pub speed: f32,
    /// Seconds between shots while fire is held.
    pub fire_interval: f32,
    pub energy: i32,
    pub animation: String,
    pub animation_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BossConfig {
    pub position: Vec2,
    pub speed: f32,
    pub fire_interval: f32,
    pub energy: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyConfig {
    pub positions: Vec<Vec2>,
    pub energy: i32,
    pub animation: String,
    pub animation_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BulletConfig {
    pub damage: i32,
    /// Upward speed of the player's shots.
    pub player_speed: f32,
    /// Downward speed of the boss's shots.
    pub enemy_speed: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "strafe".to_string(),
            width: 640,
            height: 480,
            asset_dir: PathBuf::from("resources/images"),
            clear_color: [1.0, 1.0, 1.0, 1.0],
            player: PlayerConfig::default(),
            boss: BossConfig::default(),
            enemies: EnemyConfig::default(),
            bullets: BulletConfig::default(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: Vec2::new(100.0, 300.0),
            speed: 150.0,
            fire_interval: 0.2,
            energy: 100,
            animation: "player".to_string(),
            animation_speed: 0.6,
        }
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            position: Vec2::new(320.0, 200.0),
            speed: 50.0,
            fire_interval: 0.5,
            energy: 300,
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            positions: vec![
                Vec2::new(200.0, 50.0),
                Vec2::new(300.0, 100.0),
                Vec2::new(100.0, 180.0),
                Vec2::new(500.0, 80.0),
            ],
            energy: 100,
            animation: "ufo".to_string(),
            animation_speed: 0.5,
        }
    }
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            damage: 10,
            player_speed: 150.0,
            enemy_speed: 100.0,
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    /// Parsed fine but describes a game that can't run.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config '{}': {source}", path.display())
            }
            ConfigError::Parse { path, message } => {
                write!(f, "invalid config '{}': {message}", path.display())
            }
            ConfigError::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl GameConfig {
    /// Load from the file named by `STRAFE_CONFIG`, or defaults if unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => {
                log::debug!("{CONFIG_ENV} not set, using default config");
                Ok(Self::default())
            }
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        log::info!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        for (name, value) in [
            ("player.fire_interval", self.player.fire_interval),
            ("boss.fire_interval", self.boss.fire_interval),
            ("player.animation_speed", self.player.animation_speed),
            ("enemies.animation_speed", self.enemies.animation_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("player.energy", self.player.energy),
            ("boss.energy", self.boss.energy),
            ("enemies.energy", self.enemies.energy),
        ] {
            if value <= 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        Ok(())
    }

    /// Screen rectangle: viewport and default culling boundary.
    pub fn play_area(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}
