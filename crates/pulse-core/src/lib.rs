//! Pulse Core - Foundational types for the Pulse heart demos
//!
//! This crate provides the types every other Pulse crate depends on:
//! - `Vec3` - 3D vector math (dot, cross, axis-angle rotation)
//! - `Color` - RGBA color with interpolation helpers
//! - Error types and Result alias

mod error;
mod types;

pub use error::{PulseError, Result};
pub use types::{Color, Vec3};
