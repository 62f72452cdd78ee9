//! Fountain: a solid rounded heart with a shadow, gradient rim and rising sparks

use super::{Scene, SceneSettings};
use pulse_core::{Color, Result, Vec3};
use pulse_particles::{
    Attraction, Bounds, Damping, FieldConfig, HeartCurve, HeartShape, Heartbeat, HeartbeatConfig,
    ParticleField, ParticleRng, SpawnStrategy,
};
use pulse_render::{
    Compositor, CompositorConfig, Drawable, FrameStats, Projection, Projector, RenderSurface,
};
use pulse_runtime::{GameClock, RuntimeSystem};
use std::f32::consts::TAU;

const DARK_PINK: Color = Color::new(1.0, 0.2, 0.6, 1.0);
const LIGHT_PINK: Color = Color::new(1.0, 182.0 / 255.0, 193.0 / 255.0, 1.0);
const SHADOW: Color = Color::new(200.0 / 255.0, 0.0, 100.0 / 255.0, 1.0);
const HEART_SIZE: f32 = 8.0;
/// Curve parameter step between outline vertices
const T_STEP: f32 = 0.02;
const TREMOR: f32 = 0.008;

pub struct FountainScene {
    heartbeat: Heartbeat,
    sparks: ParticleField,
    /// Unscaled outline, `HEART_SIZE` applied
    outline: Vec<Vec3>,
    /// Beat scale of the current frame, tremor included
    scale: f32,
    projector: Projector,
    compositor: Compositor,
    rng: ParticleRng,
    drawables: Vec<Drawable>,
}

impl FountainScene {
    pub fn new(settings: &SceneSettings) -> Result<Self> {
        let heartbeat = settings.heartbeat(HeartbeatConfig {
            amplitude: 0.08,
            frequency: 0.6,
            ..Default::default()
        })?;

        let samples = (TAU / T_STEP).ceil() as usize;
        let outline = HeartCurve::new(HeartShape::Rounded)
            .generate(samples, HEART_SIZE, None)?
            .into_iter()
            .map(|p| p.position)
            .collect();

        let sparks = ParticleField::new(
            FieldConfig {
                max_particles: settings.particle_count(50),
                attraction: Attraction::None,
                damping: Damping::Constant(1.0),
                gravity: Vec3::new(0.0, -0.08, 0.0),
                decay: 0.015,
                size_range: (1.0, 2.5),
                ..Default::default()
            },
            settings.seed,
        )?;

        Ok(Self {
            heartbeat,
            sparks,
            outline,
            scale: 1.0,
            projector: Projector::new(Projection::flat(), 1, 1),
            compositor: Compositor::new(CompositorConfig {
                background: Color::from_rgb8(30, 30, 30),
                ..Default::default()
            }),
            rng: ParticleRng::new(settings.seed.wrapping_add(1)),
            drawables: Vec::new(),
        })
    }

    /// Outline in screen space, scaled about the center and shifted by `offset` pixels
    fn screen_outline(&self, shrink: f32, offset: (f32, f32)) -> Vec<(f32, f32)> {
        self.outline
            .iter()
            .filter_map(|&p| self.projector.project(p * (self.scale * shrink)))
            .map(|s| (s.x + offset.0 * self.scale, s.y + offset.1 * self.scale))
            .collect()
    }
}

/// Sparks are born on a ring that breathes with the heart
fn spark_ring(scale: f32) -> SpawnStrategy {
    SpawnStrategy::Ring {
        radius_min: 8.0 * scale,
        radius_max: 15.0 * scale,
        velocity_min: Vec3::new(-0.8, 0.0, 0.0),
        velocity_max: Vec3::new(0.8, 1.5, 0.0),
    }
}

/// Gradient over the heart's height, dark at the top
fn rim_color(y: f32, scale: f32) -> Color {
    let progress = ((40.0 * scale - y) / (80.0 * scale)).clamp(0.0, 1.0);
    DARK_PINK.lerp(LIGHT_PINK, progress)
}

impl RuntimeSystem for FountainScene {
    fn initialize(&mut self, width: u32, height: u32) -> Result<()> {
        self.resize(width, height)?;
        self.sparks.reset();
        Ok(())
    }

    fn update(&mut self, clock: &GameClock) -> Result<()> {
        let beat = self.heartbeat.advance(clock.delta_time as f32);
        self.scale = 1.0 + beat + self.rng.symmetric(TREMOR);
        let dt = clock.frame_steps();
        let stats = self.sparks.update(dt, beat);
        if dt > 0.0 {
            self.sparks.spawn(1, &spark_ring(self.scale));
        }
        log::trace!("fountain: {} sparks, {} burnt out", stats.alive, stats.removed);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.projector.set_viewport(width, height);
        self.sparks
            .set_bounds(Bounds::centered(width as f32, height as f32, 0.0));
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.sparks.reset();
        Ok(())
    }

    fn name(&self) -> &str {
        "fountain"
    }
}

impl Scene for FountainScene {
    fn draw(&mut self, surface: &mut dyn RenderSurface) -> FrameStats {
        self.compositor.begin_frame(surface);

        self.drawables.clear();
        self.drawables
            .extend(self.sparks.live_particles().iter().map(|p| Drawable::Particle {
                position: p.position,
                velocity: p.velocity,
                color: Color::WHITE.with_alpha(200.0 / 255.0 * p.life),
                size: p.size,
            }));
        let mut stats = self
            .compositor
            .draw(surface, &self.drawables, &self.projector, None);

        let shadow = self.screen_outline(1.0, (4.0, 4.0));
        surface.draw_polygon(&shadow, SHADOW, None);

        let (width, height) = surface.size();
        let radius = 3.5 * self.scale;
        for &p in &self.outline {
            let p = p * self.scale;
            match self
                .projector
                .project(p)
                .filter(|s| s.is_visible(width, height))
            {
                Some(screen) => {
                    surface.draw_filled_circle(screen.xy(), radius, rim_color(p.y, self.scale));
                    stats.drawn += 1;
                }
                None => stats.skipped += 1,
            }
        }

        let highlight = self.screen_outline(0.85, (-2.0, -2.0));
        surface.draw_polygon(&highlight, Color::WHITE, Some(3.0));

        stats
    }

    fn heartbeat_mut(&mut self) -> &mut Heartbeat {
        &mut self.heartbeat
    }
}
