//! Player configuration
//!
//! Values come from three layers (highest wins):
//! 1. Command-line flags
//! 2. The TOML file passed with `--config`
//! 3. Compiled-in defaults

use crate::scenes::{SceneSettings, SCENE_NAMES};
use pulse_core::{PulseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `[window]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Frame cap; 0 runs uncapped
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// Scene shown at startup
    #[serde(default = "default_scene")]
    pub scene: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            target_fps: default_target_fps(),
            scene: default_scene(),
        }
    }
}

fn default_title() -> String {
    "Pulse".to_string()
}
fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_target_fps() -> u32 {
    60
}
fn default_scene() -> String {
    SCENE_NAMES[0].to_string()
}

/// `[heartbeat]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatSettings {
    /// Multiplier on every scene's native beat frequency
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Frequency change in Hz per beat-faster / beat-slower key press
    #[serde(default = "default_step")]
    pub step: f32,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            step: default_step(),
        }
    }
}

fn default_speed() -> f32 {
    1.0
}
fn default_step() -> f32 {
    0.05
}

/// `[particles]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSettings {
    /// Replaces each scene's main particle count
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default = "default_seed")]
    pub seed: u32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: None,
            seed: default_seed(),
        }
    }
}

fn default_seed() -> u32 {
    42
}

/// Values given on the command line; `None` keeps the file or default value
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scene: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub particles: Option<usize>,
    pub seed: Option<u32>,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatSettings,
    #[serde(default)]
    pub particles: ParticleSettings,
}

impl PulseConfig {
    pub const MAX_DIMENSION: u32 = 8192;
    pub const MAX_PARTICLES: usize = 100_000;

    /// Load a config file; missing sections and fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line values on top of this config
    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(scene) = overrides.scene {
            self.window.scene = scene;
        }
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if overrides.particles.is_some() {
            self.particles.count = overrides.particles;
        }
        if let Some(seed) = overrides.seed {
            self.particles.seed = seed;
        }
    }

    /// Reject values the player cannot start with
    pub fn validate(&self) -> Result<()> {
        check_dimension("window.width", self.window.width)?;
        check_dimension("window.height", self.window.height)?;
        if self.window.target_fps > 1000 {
            return Err(PulseError::ValueOutOfRange {
                field: "window.target_fps".into(),
                min: 0.0,
                max: 1000.0,
                value: self.window.target_fps as f64,
            });
        }
        if !SCENE_NAMES.contains(&self.window.scene.as_str()) {
            return Err(PulseError::UnknownScene {
                name: self.window.scene.clone(),
                allowed: SCENE_NAMES.iter().map(|s| s.to_string()).collect(),
            });
        }
        let speed = self.heartbeat.speed;
        if !speed.is_finite() || speed <= 0.0 || speed > 10.0 {
            return Err(PulseError::ValueOutOfRange {
                field: "heartbeat.speed".into(),
                min: 0.0,
                max: 10.0,
                value: speed as f64,
            });
        }
        let step = self.heartbeat.step;
        if !step.is_finite() || step < 0.0 {
            return Err(PulseError::config(format!(
                "heartbeat.step must be finite and non-negative, got {step}"
            )));
        }
        if let Some(count) = self.particles.count {
            if count == 0 || count > Self::MAX_PARTICLES {
                return Err(PulseError::ValueOutOfRange {
                    field: "particles.count".into(),
                    min: 1.0,
                    max: Self::MAX_PARTICLES as f64,
                    value: count as f64,
                });
            }
        }
        Ok(())
    }

    /// The subset of the config scenes are built from
    pub fn scene_settings(&self) -> SceneSettings {
        SceneSettings {
            particles: self.particles.count,
            seed: self.particles.seed,
            beat_speed: self.heartbeat.speed,
            beat_step: self.heartbeat.step,
        }
    }
}

fn check_dimension(field: &str, value: u32) -> Result<()> {
    if value == 0 || value > PulseConfig::MAX_DIMENSION {
        return Err(PulseError::ValueOutOfRange {
            field: field.into(),
            min: 1.0,
            max: PulseConfig::MAX_DIMENSION as f64,
            value: value as f64,
        });
    }
    Ok(())
}
