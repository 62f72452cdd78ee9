//! Stereo: a layered, Phong-lit heart surface spinning under an orbiting light

use super::{per_frame_hz, Scene, SceneSettings};
use pulse_core::{Color, Result, Vec3};
use pulse_particles::{
    Attraction, Bounds, Damping, DepthLayers, FieldConfig, HeartCurve, HeartShape, Heartbeat,
    HeartbeatConfig, ParticleField, SpawnStrategy,
};
use pulse_render::{
    Compositor, CompositorConfig, Drawable, FrameStats, Light, LightingModel, Projection,
    Projector, RenderSurface, SurfaceShading,
};
use pulse_runtime::{GameClock, RuntimeSystem};

const DEPTH: f32 = 3.0;
const LAYERS: usize = 3;
const SAMPLES: usize = 300;
/// Screen pixels per simulation unit before the beat
const BASE_SCALE: f32 = 10.0 * 0.7;
/// Spin per nominal frame
const SPIN_DEGREES: f32 = 0.7;
const AMBIENT_GLOW: Color = Color::new(1.0, 192.0 / 255.0, 203.0 / 255.0, 50.0 / 255.0);

pub struct StereoScene {
    heartbeat: Heartbeat,
    surface_points: Vec<Drawable>,
    motes: ParticleField,
    light: Light,
    shading: SurfaceShading,
    projector: Projector,
    compositor: Compositor,
    time: f32,
    drawables: Vec<Drawable>,
}

impl StereoScene {
    pub fn new(settings: &SceneSettings) -> Result<Self> {
        let heartbeat = settings.heartbeat(HeartbeatConfig {
            frequency: per_frame_hz(0.05),
            ..Default::default()
        })?;

        let surface_points = HeartCurve::new(HeartShape::Rounded)
            .generate(SAMPLES, 1.0, Some(DepthLayers::new(DEPTH, LAYERS)))?
            .into_iter()
            .map(|p| Drawable::Surface {
                position: p.position,
                normal: p.normal.unwrap_or(Vec3::ZERO),
                depth_t: (p.position.z + DEPTH) / (2.0 * DEPTH),
            })
            .collect();

        let motes = ParticleField::new(
            FieldConfig {
                max_particles: settings.particle_count(200),
                attraction: Attraction::None,
                damping: Damping::Constant(0.95),
                damp_after_move: true,
                planar: false,
                decay: 0.01,
                emit_per_frame: 1,
                emitter: Some(SpawnStrategy::Cloud {
                    half_extents: Vec3::new(50.0 / BASE_SCALE, 40.0 / BASE_SCALE, DEPTH),
                    velocity: Vec3::new(0.3, 0.3, 0.15),
                }),
                bounds: Bounds::centered(40.0, 40.0, 2.0 * DEPTH),
                ..Default::default()
            },
            settings.seed,
        )?;

        let model = LightingModel::Phong {
            ambient: 0.3,
            specular_power: 20.0,
        };
        model.validate()?;
        let light = Light::Orbiting { k1: 0.8, k2: 0.6 };

        Ok(Self {
            heartbeat,
            surface_points,
            motes,
            light,
            shading: SurfaceShading {
                model,
                light_dir: light.direction_at(0.0),
                near_color: Color::from_rgb8(255, 20, 147),
                far_color: Color::from_rgb8(255, 105, 180),
                specular_color: Color::from_rgb8(255, 255, 200),
                specular_exponent: 5,
            },
            projector: Projector::new(
                Projection::Spin {
                    weights: Vec3::new(1.0, 0.8, 0.3),
                    base_scale: BASE_SCALE,
                },
                1,
                1,
            ),
            compositor: Compositor::new(CompositorConfig {
                background: Color::from_rgb8(30, 30, 50),
                ..Default::default()
            }),
            time: 0.0,
            drawables: Vec::new(),
        })
    }
}

/// Motes shrink and cool toward the depth extremes
fn mote_style(z: f32, life: f32) -> (Color, f32) {
    let size = (3.0 - z.abs() / DEPTH * 2.0).floor().max(1.0);
    let color = Color::from_rgb8(
        255,
        (255.0 - size * 40.0) as u8,
        (255.0 - size * 60.0) as u8,
    )
    .with_alpha(200.0 / 255.0 * life.clamp(0.0, 1.0));
    (color, size)
}

impl RuntimeSystem for StereoScene {
    fn initialize(&mut self, width: u32, height: u32) -> Result<()> {
        self.resize(width, height)?;
        self.motes.reset();
        self.time = 0.0;
        Ok(())
    }

    fn update(&mut self, clock: &GameClock) -> Result<()> {
        let seconds = clock.delta_time as f32;
        self.time += seconds;
        let beat = self.heartbeat.advance(seconds);

        self.projector
            .spin(SPIN_DEGREES.to_radians() * clock.frame_steps());
        self.projector.set_beat(0.1 * beat);
        self.shading.light_dir = self.light.direction_at(self.time);

        self.motes.update(clock.frame_steps(), beat);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.projector.set_viewport(width, height);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.motes.reset();
        Ok(())
    }

    fn name(&self) -> &str {
        "stereo"
    }
}

impl Scene for StereoScene {
    fn draw(&mut self, surface: &mut dyn RenderSurface) -> FrameStats {
        self.compositor.begin_frame(surface);

        let (cx, cy) = self.projector.center();
        let glow = 180.0 + 30.0 * self.heartbeat.phase().sin();
        surface.draw_filled_circle((cx, cy), glow, AMBIENT_GLOW);

        self.drawables.clear();
        self.drawables.extend_from_slice(&self.surface_points);
        self.drawables
            .extend(self.motes.live_particles().iter().map(|p| {
                let (color, size) = mote_style(p.position.z, p.life);
                Drawable::Particle {
                    position: p.position,
                    velocity: p.velocity,
                    color,
                    size,
                }
            }));

        self.compositor.draw(
            surface,
            &self.drawables,
            &self.projector,
            Some(&self.shading),
        )
    }

    fn heartbeat_mut(&mut self) -> &mut Heartbeat {
        &mut self.heartbeat
    }
}
