//! Particle record and the fixed-capacity pool that owns them

use pulse_core::{Color, Vec3};

/// CPU-side particle state
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Where the particle was spawned
    pub origin: Vec3,
    /// Attraction target; `None` for free-flying particles
    pub home: Option<Vec3>,
    pub velocity: Vec3,
    pub color: Color,
    /// Remaining life in [0, 1]; stays at 1 when the field does not decay
    pub life: f32,
    pub size: f32,
    /// Distance from home tolerated before a tether pulls back
    pub drift: f32,
    pub alive: bool,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            position: Vec3::ZERO,
            origin: Vec3::ZERO,
            home: None,
            velocity: Vec3::ZERO,
            color: Color::WHITE,
            life: 0.0,
            size: 0.0,
            drift: 0.0,
            alive: false,
        }
    }

    /// Position and velocity both finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Swap-remove pool for O(1) particle kill and contiguous alive iteration.
///
/// Capacity is fixed at construction; spawning into a full pool fails.
pub struct ParticlePool {
    particles: Vec<Particle>,
    alive_count: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::dead(); capacity],
            alive_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    pub fn is_full(&self) -> bool {
        self.alive_count >= self.particles.len()
    }

    /// Spawn one particle, returning a mutable ref to initialize it.
    /// Returns None if pool is full.
    pub fn spawn(&mut self) -> Option<&mut Particle> {
        if self.is_full() {
            return None;
        }
        let idx = self.alive_count;
        self.particles[idx] = Particle::dead();
        self.particles[idx].alive = true;
        self.particles[idx].life = 1.0;
        self.alive_count += 1;
        Some(&mut self.particles[idx])
    }

    /// Drop dead or exhausted particles via swap-remove. Returns how many were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.alive_count;
        let mut i = 0;
        while i < self.alive_count {
            if !self.particles[i].alive || self.particles[i].life <= 0.0 {
                self.particles[i].alive = false;
                self.alive_count -= 1;
                if i < self.alive_count {
                    self.particles.swap(i, self.alive_count);
                }
                // Don't increment i: the swapped-in particle needs checking
            } else {
                i += 1;
            }
        }
        before - self.alive_count
    }

    pub fn clear(&mut self) {
        for p in &mut self.particles[..self.alive_count] {
            p.alive = false;
        }
        self.alive_count = 0;
    }

    /// Access alive particles slice for reading (first `alive_count` elements)
    pub fn alive_slice(&self) -> &[Particle] {
        &self.particles[..self.alive_count]
    }

    /// Access alive particles mutably
    pub fn alive_slice_mut(&mut self) -> &mut [Particle] {
        &mut self.particles[..self.alive_count]
    }
}
