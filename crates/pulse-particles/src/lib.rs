//! Pulse Particles - heart-shaped particle simulation
//!
//! Provides the CPU-side simulation shared by every scene:
//! - Parametric heart curve sampling with optional depth layers
//! - Heartbeat oscillator (sinusoid, tremor, asymmetric beats)
//! - Swap-remove particle pool with a fixed capacity
//! - Spring/friction update rule with heartbeat coupling and fault recovery

pub mod config;
pub mod curve;
pub mod field;
pub mod heartbeat;
pub mod particle;
pub mod rand;
pub mod spawn;

pub use config::{Attraction, Bounds, Damping, FieldConfig, HeartbeatCoupling, Palette};
pub use curve::{DepthLayers, HeartCurve, HeartPoint, HeartShape};
pub use field::{FieldStats, ParticleField};
pub use heartbeat::{Asymmetry, Heartbeat, HeartbeatConfig, Waveform};
pub use particle::{Particle, ParticlePool};
pub use rand::ParticleRng;
pub use spawn::SpawnStrategy;
