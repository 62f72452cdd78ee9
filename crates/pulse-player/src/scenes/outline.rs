//! Outline: tethered particles on and inside the heart, pushed outward on each beat

use super::{per_frame_hz, Scene, SceneSettings};
use pulse_core::{Color, Result};
use pulse_particles::{
    Asymmetry, Attraction, Bounds, Damping, FieldConfig, HeartCurve, HeartShape, Heartbeat,
    HeartbeatConfig, HeartbeatCoupling, Palette, ParticleField, SpawnStrategy, Waveform,
};
use pulse_render::{
    BlendMode, Compositor, CompositorConfig, Drawable, FrameStats, Projection, Projector,
    RenderSurface,
};
use pulse_runtime::{GameClock, RuntimeSystem};

const HEART_SIZE: f32 = 8.0;
const OUTLINE_SAMPLES: usize = 200;
const PER_POINT: usize = 2;
/// Peak beat displacement in pixels
const MAX_INTENSITY: f32 = 5.0;
const GLOW_THRESHOLD: f32 = 0.7;

pub struct OutlineScene {
    heartbeat: Heartbeat,
    outline: ParticleField,
    interior: ParticleField,
    outline_strategy: SpawnStrategy,
    interior_count: usize,
    projector: Projector,
    compositor: Compositor,
    drawables: Vec<Drawable>,
}

impl OutlineScene {
    pub fn new(settings: &SceneSettings) -> Result<Self> {
        let heartbeat = settings.heartbeat(HeartbeatConfig {
            amplitude: MAX_INTENSITY,
            frequency: per_frame_hz(0.05),
            waveform: Waveform::Squared,
            asymmetry: Some(Asymmetry {
                contraction: per_frame_hz(0.1),
                expansion: per_frame_hz(0.03),
            }),
            ..Default::default()
        })?;

        let points = HeartCurve::default()
            .generate(OUTLINE_SAMPLES, HEART_SIZE, None)?
            .into_iter()
            .map(|p| p.position)
            .collect();
        let outline_strategy = SpawnStrategy::Outline {
            points,
            per_point: PER_POINT,
            scatter: 2.0,
        };
        let interior_count = settings.particle_count(500);

        let base = FieldConfig {
            attraction: Attraction::Tether { gain: 0.01 },
            coupling: HeartbeatCoupling::Radial { gain: 1.0 },
            damping: Damping::Constant(1.0),
            position_jitter: 0.5,
            initial_speed: 0.5,
            size_range: (2.0, 4.0),
            drift_range: (5.0, 15.0),
            ..Default::default()
        };
        let outline = ParticleField::new(
            FieldConfig {
                max_particles: OUTLINE_SAMPLES * PER_POINT,
                palette: Palette::Range {
                    low: Color::from_rgb8(220, 20, 100),
                    high: Color::from_rgb8(255, 105, 180),
                },
                ..base.clone()
            },
            settings.seed,
        )?;
        let interior = ParticleField::new(
            FieldConfig {
                max_particles: interior_count,
                palette: Palette::Range {
                    low: Color::from_rgb8(230, 40, 120),
                    high: Color::from_rgb8(255, 120, 200),
                },
                ..base
            },
            settings.seed.wrapping_add(1),
        )?;

        Ok(Self {
            heartbeat,
            outline,
            interior,
            outline_strategy,
            interior_count,
            projector: Projector::new(Projection::flat(), 1, 1),
            compositor: Compositor::new(CompositorConfig {
                background: Color::BLACK,
                ..Default::default()
            }),
            drawables: Vec::new(),
        })
    }

    /// Beat intensity relative to its peak, in [0, 1]
    fn beat(&self) -> f32 {
        (self.heartbeat.intensity() / MAX_INTENSITY).clamp(0.0, 1.0)
    }
}

impl RuntimeSystem for OutlineScene {
    fn initialize(&mut self, width: u32, height: u32) -> Result<()> {
        self.resize(width, height)?;
        self.outline.reset();
        self.interior.reset();
        self.outline
            .spawn(OUTLINE_SAMPLES * PER_POINT, &self.outline_strategy);
        self.interior.spawn(
            self.interior_count,
            &SpawnStrategy::Interior {
                shape: HeartShape::Classic,
                size_scale: HEART_SIZE,
                max_radius: 0.8,
            },
        );
        Ok(())
    }

    fn update(&mut self, clock: &GameClock) -> Result<()> {
        let intensity = self.heartbeat.advance(clock.delta_time as f32);
        let dt = clock.frame_steps();
        let stats = self.outline.update(dt, intensity);
        let inner = self.interior.update(dt, intensity);
        log::trace!(
            "outline frame: {} alive, {} recovered",
            stats.alive + inner.alive,
            stats.recovered + inner.recovered
        );
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.projector.set_viewport(width, height);
        let bounds = Bounds::centered(width as f32, height as f32, 0.0);
        self.outline.set_bounds(bounds);
        self.interior.set_bounds(bounds);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.outline.reset();
        self.interior.reset();
        Ok(())
    }

    fn name(&self) -> &str {
        "outline"
    }
}

impl Scene for OutlineScene {
    fn draw(&mut self, surface: &mut dyn RenderSurface) -> FrameStats {
        self.compositor.begin_frame(surface);
        let beat = self.beat();

        if beat > GLOW_THRESHOLD {
            let (cx, cy) = self.projector.center();
            surface.set_blend_mode(BlendMode::Additive);
            surface.draw_filled_circle(
                (cx, cy),
                100.0 + 30.0 * beat,
                Color::from_rgb8(255, 100, 150).with_alpha(80.0 / 255.0 * beat),
            );
            surface.set_blend_mode(BlendMode::Alpha);
        }

        let size_mult = 1.0 + 0.3 * beat;
        let alpha = ((200.0 + 55.0 * beat) / 255.0).min(1.0);
        self.drawables.clear();
        for p in self
            .outline
            .live_particles()
            .iter()
            .chain(self.interior.live_particles())
        {
            self.drawables.push(Drawable::Particle {
                position: p.position,
                velocity: p.velocity,
                color: p.color.with_alpha(alpha),
                size: p.size * size_mult,
            });
        }
        self.compositor
            .draw(surface, &self.drawables, &self.projector, None)
    }

    fn heartbeat_mut(&mut self) -> &mut Heartbeat {
        &mut self.heartbeat
    }
}
