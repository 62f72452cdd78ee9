//! Particle field configuration and the update-rule building blocks

use crate::spawn::SpawnStrategy;
use pulse_core::{Color, PulseError, Result, Vec3};

/// How a particle is pulled toward its home
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attraction {
    None,
    /// Spring: `v += (home − p) · gain`
    Linear { gain: f32 },
    /// Unit direction scaled by `base + distance · per_distance`
    Normalized { base: f32, per_distance: f32 },
    /// Spring that only engages once the particle drifts past its tether radius
    Tether { gain: f32 },
}

/// How the heartbeat intensity deforms the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeartbeatCoupling {
    None,
    /// Push along `center → home` by `intensity · gain`
    Radial { gain: f32 },
    /// Scale every home about the center by `1 + intensity · gain`; z uses `gain · z_factor`
    ScaleHome { gain: f32, z_factor: f32 },
}

/// Per-frame velocity retention
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Damping {
    Constant(f32),
    /// `base − distance · per_distance`, so far-away particles coast less
    DistanceScaled { base: f32, per_distance: f32 },
}

impl Damping {
    /// Friction factor for a particle `distance` away from home, clamped to [0, 1]
    pub fn factor(&self, distance: f32) -> f32 {
        let f = match *self {
            Damping::Constant(f) => f,
            Damping::DistanceScaled { base, per_distance } => base - distance * per_distance,
        };
        if f.is_nan() {
            0.0
        } else {
            f.clamp(0.0, 1.0)
        }
    }
}

/// Color source for spawned particles
#[derive(Debug, Clone, PartialEq)]
pub enum Palette {
    Choice(Vec<Color>),
    /// Each channel drawn independently between `low` and `high`
    Range { low: Color, high: Color },
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Choice(vec![Color::WHITE])
    }
}

/// Axis-aligned simulation bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds centered on the origin with the given extents
    pub fn centered(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width * 0.5, height * 0.5, depth * 0.5);
        Self {
            min: -half,
            max: half,
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::centered(800.0, 600.0, 0.0)
    }
}

/// Everything the field's update rule needs
#[derive(Debug, Clone)]
pub struct FieldConfig {
    pub max_particles: usize,
    pub attraction: Attraction,
    pub coupling: HeartbeatCoupling,
    pub damping: Damping,
    /// Apply damping after the position step, so a particle moves with the
    /// velocity it carried into the frame
    pub damp_after_move: bool,
    pub gravity: Vec3,
    /// Uniform velocity noise per frame, per axis
    pub jitter: f32,
    /// Uniform position noise per frame, per axis
    pub position_jitter: f32,
    /// 2D fields never receive z noise
    pub planar: bool,
    /// Life lost per frame; 0 keeps particles alive forever
    pub decay: f32,
    /// Refill slots freed by decay with `emitter` so the pool stays full
    pub respawn_dead: bool,
    /// Continuous emission per frame (needs `emitter`)
    pub emit_per_frame: usize,
    pub emitter: Option<SpawnStrategy>,
    /// Initial per-axis speed range `[-initial_speed, initial_speed)` for curve spawns
    pub initial_speed: f32,
    pub center: Vec3,
    pub bounds: Bounds,
    pub clamp_to_bounds: bool,
    /// Home rotation about +Y, radians per frame
    pub home_spin: f32,
    /// Fixed home tilt about +X after the spin, radians
    pub home_tilt: f32,
    pub palette: Palette,
    pub size_range: (f32, f32),
    pub drift_range: (f32, f32),
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            attraction: Attraction::Linear { gain: 0.1 },
            coupling: HeartbeatCoupling::None,
            damping: Damping::Constant(0.9),
            damp_after_move: false,
            gravity: Vec3::ZERO,
            jitter: 0.0,
            position_jitter: 0.0,
            planar: true,
            decay: 0.0,
            respawn_dead: false,
            emit_per_frame: 0,
            emitter: None,
            initial_speed: 0.0,
            center: Vec3::ZERO,
            bounds: Bounds::default(),
            clamp_to_bounds: false,
            home_spin: 0.0,
            home_tilt: 0.0,
            palette: Palette::default(),
            size_range: (2.0, 2.0),
            drift_range: (0.0, 0.0),
        }
    }
}

impl FieldConfig {
    /// Reject configurations that would produce an empty or broken animation
    pub fn validate(&self) -> Result<()> {
        if self.max_particles == 0 {
            return Err(PulseError::config("particle field needs at least one particle"));
        }
        if !self.bounds.is_valid() {
            return Err(PulseError::config(format!(
                "invalid field bounds {:?}..{:?}",
                self.bounds.min, self.bounds.max
            )));
        }
        if self.decay < 0.0 || !self.decay.is_finite() {
            return Err(PulseError::config("life decay must be finite and non-negative"));
        }
        if (self.respawn_dead || self.emit_per_frame > 0) && self.emitter.is_none() {
            return Err(PulseError::config(
                "continuous emission or respawn requires an emitter strategy",
            ));
        }
        match &self.palette {
            Palette::Choice(colors) if colors.is_empty() => {
                return Err(PulseError::config("palette has no colors"));
            }
            _ => {}
        }
        let (lo, hi) = self.size_range;
        if !(lo.is_finite() && hi.is_finite() && lo <= hi && lo >= 0.0) {
            return Err(PulseError::config(format!(
                "particle size range {lo}..{hi} is invalid"
            )));
        }
        let (lo, hi) = self.drift_range;
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(PulseError::config(format!("drift range {lo}..{hi} is invalid")));
        }
        let scalars = [
            self.jitter,
            self.position_jitter,
            self.initial_speed,
            self.home_spin,
            self.home_tilt,
        ];
        if scalars.iter().any(|v| !v.is_finite()) || !self.gravity.is_finite() {
            return Err(PulseError::config("field parameters must be finite"));
        }
        Ok(())
    }
}
