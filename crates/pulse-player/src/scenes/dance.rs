//! Dance: a twisted 3D heart that breathes, turns and swells with the beat

use super::{Scene, SceneSettings};
use pulse_core::{Color, Result, Vec3};
use pulse_particles::{
    Attraction, Damping, FieldConfig, HeartShape, Heartbeat, HeartbeatConfig, Palette,
    ParticleField, SpawnStrategy,
};
use pulse_render::{
    Compositor, CompositorConfig, Drawable, FrameStats, Projection, Projector, RenderSurface,
};
use pulse_runtime::{GameClock, RuntimeSystem};
use std::f32::consts::TAU;

/// Screen pixels per simulation unit, relative to the window height
const FOV_PER_HEIGHT: f32 = 0.4;
const TURN_DEGREES_PER_SECOND: f32 = 20.0;
const BREATH: f32 = 0.05;
const SWELL: f32 = 0.1;

pub struct DanceScene {
    heartbeat: Heartbeat,
    field: ParticleField,
    count: usize,
    /// Turn about the vertical axis in radians
    angle: f32,
    projector: Projector,
    compositor: Compositor,
    drawables: Vec<Drawable>,
}

impl DanceScene {
    pub fn new(settings: &SceneSettings) -> Result<Self> {
        let heartbeat = settings.heartbeat(HeartbeatConfig {
            frequency: 3.0 / TAU,
            ..Default::default()
        })?;

        let count = settings.particle_count(2000);
        let field = ParticleField::new(
            FieldConfig {
                max_particles: count,
                attraction: Attraction::None,
                damping: Damping::Constant(1.0),
                planar: false,
                palette: Palette::Range {
                    low: Color::new(0.8, 0.3, 0.4, 0.6),
                    high: Color::new(1.0, 0.6, 0.7, 0.9),
                },
                size_range: (1.5, 3.0),
                ..Default::default()
            },
            settings.seed,
        )?;

        Ok(Self {
            heartbeat,
            field,
            count,
            angle: 0.0,
            projector: Projector::new(perspective(1), 1, 1),
            compositor: Compositor::new(CompositorConfig {
                background: Color::new(0.1, 0.1, 0.2, 1.0),
                ..Default::default()
            }),
            drawables: Vec::with_capacity(count),
        })
    }

    /// Where a particle sits this frame: breathe, turn, then swell
    fn pose(&self, position: Vec3) -> Vec3 {
        let intensity = self.heartbeat.intensity();
        let breath = Vec3::new(0.0, BREATH * intensity, BREATH * intensity);
        (position + breath).rotate(Vec3::UP, self.angle) * (1.0 + SWELL * intensity)
    }
}

fn perspective(height: u32) -> Projection {
    Projection::Perspective {
        fov: height as f32 * FOV_PER_HEIGHT,
        camera_offset: Vec3::ZERO,
    }
}

impl RuntimeSystem for DanceScene {
    fn initialize(&mut self, width: u32, height: u32) -> Result<()> {
        self.resize(width, height)?;
        self.field.reset();
        self.angle = 0.0;
        let strategy = SpawnStrategy::Twisted {
            shape: HeartShape::Classic,
            size_scale: 1.0 / 15.0,
            scatter: 0.05,
        };
        let spawned = self.field.spawn(self.count, &strategy);
        log::debug!("dance spawned {spawned} particles");
        Ok(())
    }

    fn update(&mut self, clock: &GameClock) -> Result<()> {
        let seconds = clock.delta_time as f32;
        let intensity = self.heartbeat.advance(seconds);
        self.angle = (self.angle + TURN_DEGREES_PER_SECOND.to_radians() * seconds) % TAU;
        self.field.update(clock.frame_steps(), intensity);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.projector.set_viewport(width, height);
        self.projector.projection = perspective(height);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.field.reset();
        Ok(())
    }

    fn name(&self) -> &str {
        "dance"
    }
}

impl Scene for DanceScene {
    fn draw(&mut self, surface: &mut dyn RenderSurface) -> FrameStats {
        self.compositor.begin_frame(surface);

        let mut drawables = std::mem::take(&mut self.drawables);
        drawables.clear();
        drawables.extend(self.field.live_particles().iter().map(|p| Drawable::Particle {
            position: self.pose(p.position),
            velocity: p.velocity,
            color: p.color,
            size: p.size * 0.5,
        }));
        let stats = self
            .compositor
            .draw(surface, &drawables, &self.projector, None);
        self.drawables = drawables;
        stats
    }

    fn heartbeat_mut(&mut self) -> &mut Heartbeat {
        &mut self.heartbeat
    }
}
