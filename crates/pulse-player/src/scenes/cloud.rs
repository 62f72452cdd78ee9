//! Cloud: a spinning 3D heart shell of spring-bound particles

use super::{Scene, SceneSettings};
use pulse_core::{Color, Result, Vec3};
use pulse_particles::{
    Attraction, Bounds, Damping, FieldConfig, HeartShape, Heartbeat, HeartbeatConfig,
    HeartbeatCoupling, Palette, ParticleField, ParticleRng, SpawnStrategy, Waveform,
};
use pulse_render::{
    Compositor, CompositorConfig, Drawable, FrameStats, Light, LightingModel, Projection,
    Projector, RenderSurface,
};
use pulse_runtime::{GameClock, RuntimeSystem};
use std::f32::consts::TAU;

/// Fraction of the window height covered by one simulation unit
const FOV_PER_HEIGHT: f32 = 1.0 / 50.0;
const RING_CHANCE: f32 = 0.1;
const GIZMO_LENGTH: f32 = 50.0;

pub struct CloudScene {
    heartbeat: Heartbeat,
    field: ParticleField,
    count: usize,
    projector: Projector,
    compositor: Compositor,
    lighting: LightingModel,
    light: Light,
    rng: ParticleRng,
    drawables: Vec<Drawable>,
}

impl CloudScene {
    pub fn new(settings: &SceneSettings) -> Result<Self> {
        let heartbeat = settings.heartbeat(HeartbeatConfig {
            frequency: 2.5 / TAU,
            waveform: Waveform::Raised,
            ..Default::default()
        })?;

        let count = settings.particle_count(3000);
        let field = ParticleField::new(
            FieldConfig {
                max_particles: count,
                attraction: Attraction::Linear { gain: 0.1 },
                coupling: HeartbeatCoupling::ScaleHome {
                    gain: 0.15,
                    z_factor: 0.8,
                },
                damping: Damping::Constant(0.9),
                planar: false,
                bounds: Bounds::centered(48.0, 48.0, 24.0),
                home_spin: 0.02,
                home_tilt: 20f32.to_radians(),
                palette: Palette::Choice(vec![
                    Color::from_rgb8(255, 51, 153),
                    Color::from_rgb8(255, 105, 180),
                    Color::from_rgb8(255, 182, 193),
                ]),
                ..Default::default()
            },
            settings.seed,
        )?;

        let lighting = LightingModel::Diffuse {
            ambient: 0.2,
            diffuse: 0.8,
            min: 0.3,
            max: 1.0,
        };
        lighting.validate()?;

        Ok(Self {
            heartbeat,
            field,
            count,
            projector: Projector::new(perspective(1), 1, 1),
            compositor: Compositor::new(CompositorConfig::default()),
            lighting,
            light: Light::Static(Vec3::new(1.0, 1.0, -1.0)),
            rng: ParticleRng::new(settings.seed.wrapping_add(1)),
            drawables: Vec::with_capacity(count),
        })
    }
}

/// Centered camera whose zoom follows the window height
fn perspective(height: u32) -> Projection {
    Projection::Perspective {
        fov: height as f32 * FOV_PER_HEIGHT,
        camera_offset: Vec3::ZERO,
    }
}

/// Cheap wobbling normal from the particle position; not a surface normal
fn pseudo_normal(p: Vec3) -> Vec3 {
    Vec3::new((p.x * 0.5).sin() * 0.3, (p.y * 0.5).cos() * 0.3, 1.0).normalized()
}

/// Nearer particles are drawn larger, in whole pixels
fn depth_size(z: f32) -> f32 {
    (3.0 - z * 0.05).trunc().max(1.0)
}

impl RuntimeSystem for CloudScene {
    fn initialize(&mut self, width: u32, height: u32) -> Result<()> {
        self.resize(width, height)?;
        self.field.reset();
        let strategy = SpawnStrategy::Volume {
            shape: HeartShape::Classic,
            size_scale: 1.0,
        };
        let spawned = self.field.spawn(self.count, &strategy);
        log::debug!("cloud spawned {spawned} particles");
        Ok(())
    }

    fn update(&mut self, clock: &GameClock) -> Result<()> {
        let intensity = self.heartbeat.advance(clock.delta_time as f32);
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
        "cloud"
    }
}

impl Scene for CloudScene {
    fn draw(&mut self, surface: &mut dyn RenderSurface) -> FrameStats {
        self.compositor.begin_frame(surface);

        let light_dir = self.light.direction_at(0.0);
        let lighting = self.lighting;
        self.drawables.clear();
        self.drawables
            .extend(self.field.live_particles().iter().map(|p| {
                let light = lighting.shade(pseudo_normal(p.position), light_dir);
                Drawable::Particle {
                    position: p.position,
                    velocity: p.velocity,
                    color: p.color.scaled(light).clamped(),
                    size: depth_size(p.position.z),
                }
            }));
        let stats = self
            .compositor
            .draw(surface, &self.drawables, &self.projector, None);

        let (width, height) = surface.size();
        let ring = Color::WHITE.with_alpha(100.0 / 255.0);
        for p in self.field.live_particles() {
            if !self.rng.chance(RING_CHANCE) {
                continue;
            }
            if let Some(screen) = self
                .projector
                .project(p.position)
                .filter(|s| s.is_visible(width, height))
            {
                surface.draw_circle_outline(screen.xy(), depth_size(p.position.z) + 1.0, 1.0, ring);
            }
        }

        // light direction gizmo
        let (cx, cy) = self.projector.center();
        surface.draw_line(
            (cx, cy),
            (cx + light_dir.x * GIZMO_LENGTH, cy - light_dir.y * GIZMO_LENGTH),
            2.0,
            Color::from_rgb8(255, 255, 0),
        );

        stats
    }

    fn heartbeat_mut(&mut self) -> &mut Heartbeat {
        &mut self.heartbeat
    }
}
