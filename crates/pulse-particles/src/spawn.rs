//! Spawn strategies: where new particles start and what they are attracted to

use crate::config::{FieldConfig, Palette};
use crate::curve::{HeartCurve, HeartShape};
use crate::particle::Particle;
use crate::rand::ParticleRng;
use pulse_core::{Color, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Initial placement for newly spawned particles.
///
/// Curve-based strategies are relative to the field center and make the spawn
/// point the particle's home, except `Swarm`, which starts anywhere in bounds
/// and seeks its assigned target.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnStrategy {
    /// `per_point` particles around each outline point, scattered by `scatter`
    Outline {
        points: Vec<Vec3>,
        per_point: usize,
        scatter: f32,
    },
    /// Filled interior: random `t`, radius in `[0, max_radius)` of the curve
    Interior {
        shape: HeartShape,
        size_scale: f32,
        max_radius: f32,
    },
    /// Rounded 3D shell around the curve
    Volume { shape: HeartShape, size_scale: f32 },
    /// Curve with a slight z twist, scattered by `scatter`
    Twisted {
        shape: HeartShape,
        size_scale: f32,
        scatter: f32,
    },
    /// Random position in bounds; home is `targets[n % len]` for the n-th spawn
    Swarm { targets: Vec<Vec3> },
    /// Free particle on a ring around the center with a random velocity
    Ring {
        radius_min: f32,
        radius_max: f32,
        velocity_min: Vec3,
        velocity_max: Vec3,
    },
    /// Free particle inside a box around the center with per-axis velocity spread
    Cloud { half_extents: Vec3, velocity: Vec3 },
}

impl SpawnStrategy {
    /// Strategies built from an empty point list cannot place anything
    pub fn is_empty(&self) -> bool {
        match self {
            SpawnStrategy::Outline {
                points, per_point, ..
            } => points.is_empty() || *per_point == 0,
            SpawnStrategy::Swarm { targets } => targets.is_empty(),
            _ => false,
        }
    }
}

/// Fill in a freshly pooled particle. `serial` counts every spawn in the field.
pub(crate) fn init_particle(
    p: &mut Particle,
    strategy: &SpawnStrategy,
    serial: usize,
    config: &FieldConfig,
    rng: &mut ParticleRng,
) {
    let center = config.center;
    let noise_z = |scatter: f32, planar: bool| {
        Vec3::new(scatter, scatter, if planar { 0.0 } else { scatter })
    };

    let (position, home, velocity) = match strategy {
        SpawnStrategy::Outline {
            points,
            per_point,
            scatter,
        } => {
            let point = points[(serial / per_point) % points.len()];
            let pos = center + point + rng.jitter(noise_z(*scatter, config.planar));
            (pos, Some(pos), initial_velocity(config, rng))
        }
        SpawnStrategy::Interior {
            shape,
            size_scale,
            max_radius,
        } => {
            let t = rng.range(0.0, TAU);
            let r = rng.range(0.0, *max_radius);
            let pos = center + HeartCurve::new(*shape).interior_point(t, r, *size_scale);
            (pos, Some(pos), initial_velocity(config, rng))
        }
        SpawnStrategy::Volume { shape, size_scale } => {
            let u = rng.range(0.0, TAU);
            let v = rng.range(-FRAC_PI_2, FRAC_PI_2);
            let pos = center + HeartCurve::new(*shape).volume_point(u, v, *size_scale);
            (pos, Some(pos), initial_velocity(config, rng))
        }
        SpawnStrategy::Twisted {
            shape,
            size_scale,
            scatter,
        } => {
            let t = rng.range(0.0, TAU);
            let pos = center
                + HeartCurve::new(*shape).twisted_point(t, *size_scale)
                + rng.jitter(Vec3::new(*scatter, *scatter, *scatter));
            (pos, Some(pos), initial_velocity(config, rng))
        }
        SpawnStrategy::Swarm { targets } => {
            let pos = random_in_bounds(config, rng);
            let target = center + targets[serial % targets.len()];
            (pos, Some(target), Vec3::ZERO)
        }
        SpawnStrategy::Ring {
            radius_min,
            radius_max,
            velocity_min,
            velocity_max,
        } => {
            let angle = rng.range(0.0, TAU);
            let radius = rng.range(*radius_min, *radius_max);
            let pos = center + Vec3::new(angle.cos(), angle.sin(), 0.0) * radius;
            (pos, None, rng.point_in_box(*velocity_min, *velocity_max))
        }
        SpawnStrategy::Cloud {
            half_extents,
            velocity,
        } => {
            let pos = center + rng.jitter(*half_extents);
            (pos, None, rng.jitter(*velocity))
        }
    };

    p.position = position;
    p.origin = position;
    p.home = home;
    p.velocity = velocity;
    p.color = pick_color(&config.palette, rng);
    p.size = rng.range(config.size_range.0, config.size_range.1);
    p.drift = rng.range(config.drift_range.0, config.drift_range.1);
    p.life = 1.0;
    p.alive = true;
}

/// Random point inside the field bounds
pub(crate) fn random_in_bounds(config: &FieldConfig, rng: &mut ParticleRng) -> Vec3 {
    rng.point_in_box(config.bounds.min, config.bounds.max)
}

fn initial_velocity(config: &FieldConfig, rng: &mut ParticleRng) -> Vec3 {
    if config.initial_speed <= 0.0 {
        return Vec3::ZERO;
    }
    let s = config.initial_speed;
    rng.jitter(Vec3::new(s, s, if config.planar { 0.0 } else { s }))
}

fn pick_color(palette: &Palette, rng: &mut ParticleRng) -> Color {
    match palette {
        Palette::Choice(colors) => colors[rng.index(colors.len())],
        Palette::Range { low, high } => Color::new(
            rng.range(low.r, high.r),
            rng.range(low.g, high.g),
            rng.range(low.b, high.b),
            rng.range(low.a, high.a),
        ),
    }
}
