//! Swarm: particles scattered over the window chase points on the heart

use super::{Scene, SceneSettings};
use pulse_core::{Color, Result};
use pulse_particles::{
    Attraction, Bounds, Damping, FieldConfig, HeartCurve, Heartbeat, HeartbeatConfig,
    HeartbeatCoupling, ParticleField, ParticleRng, SpawnStrategy,
};
use pulse_render::{
    Compositor, CompositorConfig, Drawable, FrameStats, Projection, Projector, RenderSurface,
};
use pulse_runtime::{GameClock, RuntimeSystem};
use std::f32::consts::TAU;

const DARK_PINK: Color = Color::new(1.0, 0.2, 0.6, 1.0);
const LIGHT_PINK: Color = Color::new(1.0, 182.0 / 255.0, 193.0 / 255.0, 1.0);
const TARGET_SAMPLES: usize = 300;
const TARGET_SCALE: f32 = 10.0;
const PARTICLE_RADIUS: f32 = 2.0;
const HIGHLIGHTS: usize = 50;

pub struct SwarmScene {
    heartbeat: Heartbeat,
    field: ParticleField,
    strategy: SpawnStrategy,
    count: usize,
    projector: Projector,
    compositor: Compositor,
    rng: ParticleRng,
    drawables: Vec<Drawable>,
}

impl SwarmScene {
    pub fn new(settings: &SceneSettings) -> Result<Self> {
        let heartbeat = settings.heartbeat(HeartbeatConfig {
            amplitude: 0.15,
            frequency: 0.75,
            tremor_amplitude: 0.01,
            tremor_frequency: 13.0 / TAU,
            ..Default::default()
        })?;

        let targets = HeartCurve::default()
            .generate(TARGET_SAMPLES, TARGET_SCALE, None)?
            .into_iter()
            .map(|p| p.position)
            .collect();
        let count = settings.particle_count(2000);
        let field = ParticleField::new(
            FieldConfig {
                max_particles: count,
                attraction: Attraction::Normalized {
                    base: 0.08,
                    per_distance: 0.02,
                },
                coupling: HeartbeatCoupling::ScaleHome {
                    gain: 1.0,
                    z_factor: 1.0,
                },
                damping: Damping::DistanceScaled {
                    base: 0.92,
                    per_distance: 0.002,
                },
                jitter: 0.2,
                clamp_to_bounds: true,
                size_range: (PARTICLE_RADIUS, PARTICLE_RADIUS),
                ..Default::default()
            },
            settings.seed,
        )?;

        Ok(Self {
            heartbeat,
            field,
            strategy: SpawnStrategy::Swarm { targets },
            count,
            projector: Projector::new(Projection::flat(), 1, 1),
            compositor: Compositor::new(CompositorConfig {
                background: Color::from_rgb8(30, 30, 40),
                fade_alpha: Some(15.0 / 255.0),
                ghost_steps: 3,
                ..Default::default()
            }),
            rng: ParticleRng::new(settings.seed.wrapping_add(1)),
            drawables: Vec::with_capacity(count),
        })
    }

    /// Drop every particle and scatter a fresh swarm over the window
    fn scatter(&mut self, width: u32, height: u32) {
        self.projector.set_viewport(width, height);
        self.field.reset();
        self.field
            .set_bounds(Bounds::centered(width as f32, height as f32, 0.0));
        let spawned = self.field.spawn(self.count, &self.strategy);
        log::debug!("swarm scattered {spawned} particles over {width}x{height}");
    }
}

/// Vertical gradient from dark pink at the top of the heart to light pink below
fn gradient(y: f32, intensity: f32) -> Color {
    let scale = 1.0 + intensity;
    let progress = ((150.0 * scale - y) / (300.0 * scale)).clamp(0.0, 1.0);
    DARK_PINK.lerp(LIGHT_PINK, progress)
}

impl RuntimeSystem for SwarmScene {
    fn initialize(&mut self, width: u32, height: u32) -> Result<()> {
        self.scatter(width, height);
        Ok(())
    }

    fn update(&mut self, clock: &GameClock) -> Result<()> {
        let intensity = self.heartbeat.advance(clock.delta_time as f32);
        self.field.update(clock.frame_steps(), intensity);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.scatter(width, height);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.field.reset();
        Ok(())
    }

    fn name(&self) -> &str {
        "swarm"
    }
}

impl Scene for SwarmScene {
    fn draw(&mut self, surface: &mut dyn RenderSurface) -> FrameStats {
        self.compositor.begin_frame(surface);

        let intensity = self.heartbeat.intensity();
        self.drawables.clear();
        self.drawables
            .extend(self.field.live_particles().iter().map(|p| Drawable::Particle {
                position: p.position,
                velocity: p.velocity,
                color: gradient(p.position.y, intensity),
                size: p.size,
            }));
        let stats = self
            .compositor
            .draw(surface, &self.drawables, &self.projector, None);

        let (width, height) = surface.size();
        let particles = self.field.live_particles();
        for _ in 0..HIGHLIGHTS.min(particles.len()) {
            let p = &particles[self.rng.index(particles.len())];
            let Some(screen) = self
                .projector
                .project(p.position)
                .filter(|s| s.is_visible(width, height))
            else {
                continue;
            };
            surface.draw_filled_circle(screen.xy(), PARTICLE_RADIUS, Color::WHITE);
            surface.draw_circle_outline(
                screen.xy(),
                4.0,
                1.0,
                Color::WHITE.with_alpha(100.0 / 255.0),
            );
        }

        stats
    }

    fn heartbeat_mut(&mut self) -> &mut Heartbeat {
        &mut self.heartbeat
    }
}
