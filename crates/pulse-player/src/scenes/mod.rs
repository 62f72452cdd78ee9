//! Heart scenes
//!
//! Every scene owns its heartbeat, particle field(s), projector and
//! compositor. The player drives them through [`RuntimeSystem`] for updates
//! and [`Scene::draw`] for rastering.

mod cloud;
mod dance;
mod fountain;
mod outline;
mod stereo;
mod swarm;

pub use cloud::CloudScene;
pub use dance::DanceScene;
pub use fountain::FountainScene;
pub use outline::OutlineScene;
pub use stereo::StereoScene;
pub use swarm::SwarmScene;

use pulse_core::{PulseError, Result};
use pulse_particles::{Heartbeat, HeartbeatConfig};
use pulse_render::{FrameStats, RenderSurface};
use pulse_runtime::{RuntimeSystem, NOMINAL_FPS};
use std::f32::consts::TAU;

/// Scene names in cycling order
pub const SCENE_NAMES: [&str; 6] = ["cloud", "outline", "swarm", "fountain", "stereo", "dance"];

/// Player-wide knobs every scene honors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    /// Replaces the scene's main particle count
    pub particles: Option<usize>,
    pub seed: u32,
    /// Multiplier on the scene's native beat frequency
    pub beat_speed: f32,
    /// Frequency change per beat-faster / beat-slower action
    pub beat_step: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            particles: None,
            seed: 42,
            beat_speed: 1.0,
            beat_step: 0.05,
        }
    }
}

impl SceneSettings {
    /// Main particle count, `default` unless overridden
    pub fn particle_count(&self, default: usize) -> usize {
        self.particles.unwrap_or(default)
    }

    /// Build a heartbeat from a scene's native config, applying speed and step
    pub fn heartbeat(&self, config: HeartbeatConfig) -> Result<Heartbeat> {
        let mut heartbeat = Heartbeat::new(HeartbeatConfig {
            frequency_step: self.beat_step,
            ..config
        })?;
        if self.beat_speed != 1.0 {
            heartbeat.set_frequency(heartbeat.frequency() * self.beat_speed);
        }
        Ok(heartbeat)
    }
}

/// A drawable heart demo
pub trait Scene: RuntimeSystem {
    /// Raster the current state into `surface`
    fn draw(&mut self, surface: &mut dyn RenderSurface) -> FrameStats;

    /// Heartbeat driving this scene, for the speed controls
    fn heartbeat_mut(&mut self) -> &mut Heartbeat;
}

/// Construct a scene by name
pub fn create_scene(name: &str, settings: &SceneSettings) -> Result<Box<dyn Scene>> {
    let scene: Box<dyn Scene> = match name {
        "cloud" => Box::new(CloudScene::new(settings)?),
        "outline" => Box::new(OutlineScene::new(settings)?),
        "swarm" => Box::new(SwarmScene::new(settings)?),
        "fountain" => Box::new(FountainScene::new(settings)?),
        "stereo" => Box::new(StereoScene::new(settings)?),
        "dance" => Box::new(DanceScene::new(settings)?),
        _ => {
            return Err(PulseError::UnknownScene {
                name: name.to_string(),
                allowed: SCENE_NAMES.iter().map(|s| s.to_string()).collect(),
            })
        }
    };
    Ok(scene)
}

/// Index of `name` in [`SCENE_NAMES`]
pub fn scene_index(name: &str) -> Option<usize> {
    SCENE_NAMES.iter().position(|&n| n == name)
}

/// Beat frequency in Hz for a phase that advances `radians` every 60 Hz frame
pub(crate) fn per_frame_hz(radians: f32) -> f32 {
    radians * NOMINAL_FPS as f32 / TAU
}


#[cfg(test)]
mod tests {
    use super::*;
    use pulse_render::Canvas;
    use test_support::one_frame_clock;

    #[test]
    fn test_every_name_creates_a_scene() {
        let settings = SceneSettings {
            particles: Some(50),
            ..Default::default()
        };
        for name in SCENE_NAMES {
            let scene = create_scene(name, &settings).unwrap();
            assert_eq!(scene.name(), name);
        }
    }

    #[test]
    fn test_unknown_scene() {
        let err = create_scene("cube", &SceneSettings::default()).err().unwrap();
        match err {
            PulseError::UnknownScene { name, allowed } => {
                assert_eq!(name, "cube");
                assert_eq!(allowed.len(), SCENE_NAMES.len());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_scene_index() {
        assert_eq!(scene_index("cloud"), Some(0));
        assert_eq!(scene_index("dance"), Some(5));
        assert_eq!(scene_index("nope"), None);
    }

    #[test]
    fn test_per_frame_rates() {
        assert!((per_frame_hz(TAU / 60.0) - 1.0).abs() < 1e-5);
        assert!((per_frame_hz(0.05) - 0.4775).abs() < 1e-3);
    }

    #[test]
    fn test_beat_speed_scales_frequency() {
        let settings = SceneSettings {
            beat_speed: 2.0,
            beat_step: 0.1,
            ..Default::default()
        };
        let heartbeat = settings
            .heartbeat(HeartbeatConfig {
                frequency: 0.5,
                ..Default::default()
            })
            .unwrap();
        assert!((heartbeat.frequency() - 1.0).abs() < 1e-6);
        assert!((heartbeat.config().frequency_step - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_all_scenes_run_a_few_frames() {
        let settings = SceneSettings {
            particles: Some(200),
            ..Default::default()
        };
        let clock = one_frame_clock();
        for name in SCENE_NAMES {
            let mut scene = create_scene(name, &settings).unwrap();
            scene.initialize(160, 120).unwrap();
            let mut canvas = Canvas::new(160, 120);
            for _ in 0..5 {
                scene.update(&clock).unwrap();
                scene.draw(&mut canvas);
            }
            scene.resize(200, 100).unwrap();
            let mut canvas = Canvas::new(200, 100);
            scene.update(&clock).unwrap();
            scene.draw(&mut canvas);
            scene.shutdown().unwrap();
        }
    }

    #[test]
    fn test_heartbeat_controls_reach_the_scene() {
        let mut scene = create_scene("outline", &SceneSettings::default()).unwrap();
        let before = scene.heartbeat_mut().frequency();
        scene.heartbeat_mut().speed_up();
        assert!(scene.heartbeat_mut().frequency() > before);
        scene.heartbeat_mut().slow_down();
        scene.heartbeat_mut().slow_down();
        assert!(scene.heartbeat_mut().frequency() < before);
    }
}
