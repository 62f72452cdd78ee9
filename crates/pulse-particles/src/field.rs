//! Particle field: owns the pool and applies the per-frame update rule

use crate::config::{Attraction, Bounds, FieldConfig, HeartbeatCoupling};
use crate::particle::{Particle, ParticlePool};
use crate::rand::ParticleRng;
use crate::spawn::{self, SpawnStrategy};
use pulse_core::{Result, Vec3};

/// Per-update bookkeeping returned by [`ParticleField::update`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    pub alive: usize,
    /// Particles emitted or respawned this update
    pub spawned: usize,
    /// Particles whose life ran out
    pub removed: usize,
    /// Particles reset after a non-finite position or velocity
    pub recovered: usize,
}

/// A bounded set of particles sharing one update rule.
///
/// Time is measured in nominal 60 Hz frames: `dt = 1.0` is one frame, and
/// every per-frame rate in [`FieldConfig`] is applied once per frame.
pub struct ParticleField {
    config: FieldConfig,
    pool: ParticlePool,
    rng: ParticleRng,
    /// Accumulated home spin about +Y, radians
    spin_angle: f32,
    /// Total spawns, drives round-robin target assignment
    serial: usize,
}

impl ParticleField {
    /// Largest step applied in one update, in frames
    pub const MAX_STEP: f32 = 4.0;

    pub fn new(config: FieldConfig, seed: u32) -> Result<Self> {
        config.validate()?;
        let pool = ParticlePool::new(config.max_particles);
        Ok(Self {
            config,
            pool,
            rng: ParticleRng::new(seed),
            spin_angle: 0.0,
            serial: 0,
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn len(&self) -> usize {
        self.pool.alive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.alive_count() == 0
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    /// Read-only view of the live particles for this frame
    pub fn live_particles(&self) -> &[Particle] {
        self.pool.alive_slice()
    }

    /// Spawn up to `n` particles; returns how many fit in the pool
    pub fn spawn(&mut self, n: usize, strategy: &SpawnStrategy) -> usize {
        fill(
            &mut self.pool,
            &mut self.rng,
            &mut self.serial,
            &self.config,
            strategy,
            n,
        )
    }

    /// Drop every particle and restart the spin
    pub fn reset(&mut self) {
        self.pool.clear();
        self.spin_angle = 0.0;
        self.serial = 0;
    }

    /// New bounds apply to recovery, clamping and later swarm spawns
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.config.bounds = bounds;
    }

    /// Advance the simulation by `dt` frames under the given heartbeat intensity.
    ///
    /// Non-finite or negative `dt` counts as zero; steps longer than
    /// [`MAX_STEP`](Self::MAX_STEP) are clamped.
    pub fn update(&mut self, dt: f32, intensity: f32) -> FieldStats {
        let dt = if dt.is_finite() && dt > 0.0 {
            dt.min(Self::MAX_STEP)
        } else {
            0.0
        };
        self.spin_angle = (self.spin_angle + self.config.home_spin * dt) % std::f32::consts::TAU;

        let mut stats = FieldStats::default();
        let Self {
            config,
            pool,
            rng,
            spin_angle,
            ..
        } = self;
        let config = &*config;
        let spin = *spin_angle;

        for p in pool.alive_slice_mut() {
            let target = p.home.map(|home| home_target(config, home, spin, intensity));
            // a linear spring damps only the carried velocity; its pull lands undamped
            let spring = matches!(config.attraction, Attraction::Linear { .. });
            if spring {
                let distance = target.map_or(0.0, |t| t.distance(p.position));
                p.velocity = p.velocity * config.damping.factor(distance).powf(dt);
            }

            // 1. attraction
            if let Some(target) = target {
                let to_home = target - p.position;
                let distance = to_home.magnitude();
                match config.attraction {
                    Attraction::None => {}
                    Attraction::Linear { gain } => {
                        p.velocity = p.velocity + to_home * (gain * dt);
                    }
                    Attraction::Normalized { base, per_distance } => {
                        if distance > 1e-6 {
                            let strength = base + distance * per_distance;
                            p.velocity = p.velocity + to_home * (strength * dt / distance);
                        }
                    }
                    Attraction::Tether { gain } => {
                        if distance > p.drift {
                            p.velocity = p.velocity + to_home * (gain * dt);
                        }
                    }
                }

                // 2. heartbeat displacement
                if let HeartbeatCoupling::Radial { gain } = config.coupling {
                    let outward = (target - config.center).normalized();
                    p.position = p.position + outward * (intensity * gain * dt);
                }
            }
            p.velocity = p.velocity + config.gravity * dt;

            // 3. damping
            if !spring && !config.damp_after_move {
                let distance = target.map_or(0.0, |t| t.distance(p.position));
                p.velocity = p.velocity * config.damping.factor(distance).powf(dt);
            }

            // 4. jitter
            let z_noise = |extent: f32| {
                Vec3::new(extent, extent, if config.planar { 0.0 } else { extent })
            };
            if config.jitter > 0.0 {
                p.velocity = p.velocity + rng.jitter(z_noise(config.jitter * dt));
            }

            // 5. integrate
            p.position = p.position + p.velocity * dt;
            if config.position_jitter > 0.0 {
                p.position = p.position + rng.jitter(z_noise(config.position_jitter * dt));
            }
            if config.clamp_to_bounds {
                p.position = config.bounds.clamp(p.position);
            }
            if config.damp_after_move && !spring {
                let distance = target.map_or(0.0, |t| t.distance(p.position));
                p.velocity = p.velocity * config.damping.factor(distance).powf(dt);
            }

            // 6. life
            if config.decay > 0.0 {
                p.life = (p.life - config.decay * dt).max(0.0);
            }

            // 7. fault check
            if !p.is_finite() {
                p.position = spawn::random_in_bounds(config, rng);
                p.velocity = Vec3::ZERO;
                stats.recovered += 1;
            }
        }

        if stats.recovered > 0 {
            log::warn!(
                "recovered {} particle(s) with non-finite state",
                stats.recovered
            );
        }

        stats.removed = self.pool.compact();

        let mut wanted = self.config.emit_per_frame;
        if self.config.respawn_dead {
            wanted += stats.removed;
        }
        if wanted > 0 && dt > 0.0 {
            if let Some(strategy) = &self.config.emitter {
                stats.spawned = fill(
                    &mut self.pool,
                    &mut self.rng,
                    &mut self.serial,
                    &self.config,
                    strategy,
                    wanted,
                );
            }
        }

        stats.alive = self.pool.alive_count();
        stats
    }
}

/// Home after spin, tilt and heartbeat scaling, all about the field center
fn home_target(config: &FieldConfig, home: Vec3, spin: f32, intensity: f32) -> Vec3 {
    let mut rel = home - config.center;
    if spin != 0.0 {
        rel = rel.rotate(Vec3::UP, spin);
    }
    if config.home_tilt != 0.0 {
        rel = rel.rotate(Vec3::RIGHT, config.home_tilt);
    }
    if let HeartbeatCoupling::ScaleHome { gain, z_factor } = config.coupling {
        let s = 1.0 + intensity * gain;
        let sz = 1.0 + intensity * gain * z_factor;
        rel = Vec3::new(rel.x * s, rel.y * s, rel.z * sz);
    }
    config.center + rel
}

fn fill(
    pool: &mut ParticlePool,
    rng: &mut ParticleRng,
    serial: &mut usize,
    config: &FieldConfig,
    strategy: &SpawnStrategy,
    n: usize,
) -> usize {
    if strategy.is_empty() {
        log::warn!("spawn strategy has no points to place particles on");
        return 0;
    }
    let mut spawned = 0;
    while spawned < n {
        let Some(p) = pool.spawn() else {
            break;
        };
        spawn::init_particle(p, strategy, *serial, config, rng);
        *serial += 1;
        spawned += 1;
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Damping;
    use crate::curve::HeartShape;
    use std::f32::consts::FRAC_PI_2;

    fn spring_field(gain: f32, friction: f32) -> ParticleField {
        ParticleField::new(
            FieldConfig {
                attraction: Attraction::Linear { gain },
                damping: Damping::Constant(friction),
                ..Default::default()
            },
            1,
        )
        .unwrap()
    }

    fn place(field: &mut ParticleField, position: Vec3, home: Vec3) {
        let p = field.pool.spawn().unwrap();
        p.position = position;
        p.origin = position;
        p.home = Some(home);
    }

    #[test]
    fn single_spring_step_arithmetic() {
        let mut field = spring_field(0.1, 0.9);
        place(&mut field, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));

        field.update(1.0, 0.0);

        let p = &field.live_particles()[0];
        // friction only touches the old (zero) velocity: (10 − 0)·0.1 = 1.0
        assert_eq!(p.velocity.x, 1.0);
        assert_eq!(p.velocity.y, 0.0);
        assert_eq!(p.position, p.velocity);
    }

    #[test]
    fn spring_damps_carried_velocity_before_pulling() {
        let mut field = spring_field(0.1, 0.9);
        place(&mut field, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        field.pool.alive_slice_mut()[0].velocity = Vec3::new(2.0, 0.0, 0.0);

        field.update(1.0, 0.0);

        // 2·0.9 + 10·0.1
        let p = &field.live_particles()[0];
        assert!((p.velocity.x - 2.8).abs() < 1e-6, "{:?}", p.velocity);
        assert!((p.position.x - 2.8).abs() < 1e-6);
    }

    #[test]
    fn normalized_pull_is_damped_in_the_same_step() {
        let mut field = ParticleField::new(
            FieldConfig {
                attraction: Attraction::Normalized {
                    base: 0.08,
                    per_distance: 0.02,
                },
                damping: Damping::Constant(0.5),
                ..Default::default()
            },
            1,
        )
        .unwrap();
        place(&mut field, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));

        field.update(1.0, 0.0);

        // (0.08 + 10·0.02)·0.5
        let p = &field.live_particles()[0];
        assert!((p.velocity.x - 0.14).abs() < 1e-6, "{:?}", p.velocity);
    }

    #[test]
    fn damping_after_move_keeps_the_carried_velocity_for_the_step() {
        let config = |damp_after_move| FieldConfig {
            attraction: Attraction::None,
            damping: Damping::Constant(0.5),
            damp_after_move,
            ..Default::default()
        };
        let mut before = ParticleField::new(config(false), 1).unwrap();
        let mut after = ParticleField::new(config(true), 1).unwrap();
        for field in [&mut before, &mut after] {
            let p = field.pool.spawn().unwrap();
            p.velocity = Vec3::new(2.0, 0.0, 0.0);
            field.update(1.0, 0.0);
        }

        let (b, a) = (&before.live_particles()[0], &after.live_particles()[0]);
        assert_eq!(b.position.x, 1.0);
        assert_eq!(a.position.x, 2.0);
        assert_eq!(a.velocity, b.velocity);
        assert_eq!(a.velocity.x, 1.0);
    }

    #[test]
    fn zero_config_is_rejected() {
        let config = FieldConfig {
            max_particles: 0,
            ..Default::default()
        };
        assert!(ParticleField::new(config, 1).is_err());
    }

    #[test]
    fn invalid_dt_freezes_the_field() {
        let mut field = spring_field(0.1, 0.9);
        place(&mut field, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        for dt in [f32::NAN, -1.0, f32::NEG_INFINITY, 0.0] {
            field.update(dt, 0.0);
        }
        assert_eq!(field.live_particles()[0].position, Vec3::ZERO);
    }

    #[test]
    fn fuzzed_updates_never_leave_non_finite_particles() {
        let targets: Vec<Vec3> = (0..16)
            .map(|i| Vec3::new(i as f32 * 3.0 - 24.0, (i % 4) as f32 * 5.0, 0.0))
            .collect();
        let mut field = ParticleField::new(
            FieldConfig {
                max_particles: 64,
                attraction: Attraction::Normalized {
                    base: 0.08,
                    per_distance: 0.02,
                },
                coupling: HeartbeatCoupling::Radial { gain: 5.0 },
                damping: Damping::DistanceScaled {
                    base: 0.92,
                    per_distance: 0.002,
                },
                jitter: 0.2,
                planar: false,
                ..Default::default()
            },
            42,
        )
        .unwrap();
        field.spawn(64, &SpawnStrategy::Swarm { targets });

        let dts = [f32::NAN, f32::INFINITY, -1.0, 1e30, 0.5, 4.0, 1000.0, 1.0];
        let beats = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 1e30, -1e30, 0.3];
        for round in 0..50 {
            let dt = dts[round % dts.len()];
            let beat = beats[round % beats.len()];
            field.update(dt, beat);
            for p in field.live_particles() {
                assert!(p.is_finite(), "round {round}: {p:?}");
            }
        }
        assert_eq!(field.len(), 64);
    }

    #[test]
    fn non_finite_beat_on_scaled_homes_is_recovered() {
        let mut field = ParticleField::new(
            FieldConfig {
                max_particles: 32,
                attraction: Attraction::Linear { gain: 0.1 },
                coupling: HeartbeatCoupling::ScaleHome {
                    gain: 0.15,
                    z_factor: 0.8,
                },
                damping: Damping::Constant(0.9),
                planar: false,
                bounds: Bounds::centered(48.0, 48.0, 24.0),
                home_spin: 0.02,
                ..Default::default()
            },
            5,
        )
        .unwrap();
        field.spawn(
            32,
            &SpawnStrategy::Volume {
                shape: HeartShape::Classic,
                size_scale: 1.0,
            },
        );

        for beat in [f32::NAN, f32::INFINITY, 0.5, f32::NEG_INFINITY, f32::NAN] {
            let stats = field.update(1.0, beat);
            if !beat.is_finite() {
                assert_eq!(stats.recovered, 32);
            }
            for p in field.live_particles() {
                assert!(p.is_finite(), "beat {beat}: {p:?}");
            }
        }
        assert_eq!(field.len(), 32);
    }

    #[test]
    fn recovery_lands_in_bounds_with_zero_velocity() {
        let mut field = spring_field(0.1, 0.9);
        place(&mut field, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        field.pool.alive_slice_mut()[0].velocity = Vec3::new(f32::NAN, 0.0, 0.0);

        let stats = field.update(1.0, 0.0);

        assert_eq!(stats.recovered, 1);
        let p = &field.live_particles()[0];
        assert_eq!(p.velocity, Vec3::ZERO);
        assert!(field.config().bounds.contains(p.position));
        assert_eq!(p.home, Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn pool_never_exceeds_capacity() {
        let emitter = SpawnStrategy::Ring {
            radius_min: 8.0,
            radius_max: 15.0,
            velocity_min: Vec3::new(-0.8, 0.0, 0.0),
            velocity_max: Vec3::new(0.8, 1.5, 0.0),
        };
        let mut field = ParticleField::new(
            FieldConfig {
                max_particles: 20,
                attraction: Attraction::None,
                damping: Damping::Constant(1.0),
                gravity: Vec3::new(0.0, -0.08, 0.0),
                decay: 0.015,
                emit_per_frame: 7,
                emitter: Some(emitter.clone()),
                ..Default::default()
            },
            9,
        )
        .unwrap();

        assert_eq!(field.spawn(100, &emitter), 20);
        for _ in 0..300 {
            let stats = field.update(1.0, 0.0);
            assert!(stats.alive <= 20);
            assert!(field.len() <= field.capacity());
        }
    }

    #[test]
    fn decay_removes_exhausted_particles() {
        let mut field = ParticleField::new(
            FieldConfig {
                max_particles: 10,
                decay: 0.5,
                ..Default::default()
            },
            3,
        )
        .unwrap();
        let strategy = SpawnStrategy::Interior {
            shape: HeartShape::Classic,
            size_scale: 8.0,
            max_radius: 0.8,
        };
        field.spawn(10, &strategy);

        let stats = field.update(1.0, 0.0);
        assert_eq!(stats.removed, 0);
        assert!(field.live_particles().iter().all(|p| p.life == 0.5));

        let stats = field.update(1.0, 0.0);
        assert_eq!(stats.removed, 10);
        assert!(field.is_empty());
    }

    #[test]
    fn respawn_keeps_pool_size_constant() {
        let strategy = SpawnStrategy::Volume {
            shape: HeartShape::Classic,
            size_scale: 10.0,
        };
        let mut field = ParticleField::new(
            FieldConfig {
                max_particles: 30,
                decay: 0.25,
                respawn_dead: true,
                emitter: Some(strategy.clone()),
                planar: false,
                ..Default::default()
            },
            5,
        )
        .unwrap();
        field.spawn(30, &strategy);
        for _ in 0..12 {
            let stats = field.update(1.0, 0.0);
            assert_eq!(stats.alive, 30);
            assert_eq!(stats.spawned, stats.removed);
        }
    }

    #[test]
    fn home_spin_rotates_targets_about_up() {
        let mut field = ParticleField::new(
            FieldConfig {
                attraction: Attraction::Linear { gain: 1.0 },
                damping: Damping::Constant(1.0),
                home_spin: FRAC_PI_2,
                ..Default::default()
            },
            1,
        )
        .unwrap();
        place(&mut field, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));

        field.update(1.0, 0.0);

        let p = field.live_particles()[0].position;
        assert!(p.distance(Vec3::new(0.0, 0.0, -10.0)) < 1e-4, "{p:?}");
    }

    #[test]
    fn radial_coupling_pushes_outward() {
        let mut field = ParticleField::new(
            FieldConfig {
                attraction: Attraction::None,
                coupling: HeartbeatCoupling::Radial { gain: 1.0 },
                damping: Damping::Constant(0.0),
                ..Default::default()
            },
            1,
        )
        .unwrap();
        let home = Vec3::new(0.0, 20.0, 0.0);
        place(&mut field, home, home);

        field.update(1.0, 5.0);
        assert!((field.live_particles()[0].position.y - 25.0).abs() < 1e-5);
        field.update(1.0, -5.0);
        assert!((field.live_particles()[0].position.y - 20.0).abs() < 1e-5);
    }

    #[test]
    fn clamp_keeps_particles_in_bounds() {
        let mut field = ParticleField::new(
            FieldConfig {
                attraction: Attraction::None,
                damping: Damping::Constant(1.0),
                gravity: Vec3::new(0.0, -100.0, 0.0),
                bounds: Bounds::centered(100.0, 100.0, 0.0),
                clamp_to_bounds: true,
                ..Default::default()
            },
            1,
        )
        .unwrap();
        field.spawn(
            5,
            &SpawnStrategy::Cloud {
                half_extents: Vec3::new(10.0, 10.0, 0.0),
                velocity: Vec3::ZERO,
            },
        );
        for _ in 0..5 {
            field.update(1.0, 0.0);
        }
        for p in field.live_particles() {
            assert_eq!(p.position.y, -50.0);
        }
    }

    #[test]
    fn reset_empties_the_field() {
        let mut field = spring_field(0.1, 0.9);
        field.spawn(
            3,
            &SpawnStrategy::Swarm {
                targets: vec![Vec3::ZERO],
            },
        );
        field.reset();
        assert!(field.is_empty());
        assert_eq!(field.spin_angle(), 0.0);
    }
}
