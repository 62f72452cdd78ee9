//! Simulation space to screen space projection
//!
//! Simulation space is Y-up and centered on the origin; screen space has its
//! origin in the top-left corner with Y growing downward.

use pulse_core::Vec3;
use std::f32::consts::TAU;

/// A projected point in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// View-space depth after any rotation, larger is farther
    pub depth: f32,
}

impl ScreenPoint {
    /// True when the point lies in `[0, width) × [0, height)`
    pub fn is_visible(&self, width: u32, height: u32) -> bool {
        self.x >= 0.0 && self.x < width as f32 && self.y >= 0.0 && self.y < height as f32
    }

    pub fn offset(&self, dx: f32, dy: f32) -> ScreenPoint {
        ScreenPoint {
            x: self.x + dx,
            y: self.y + dy,
            depth: self.depth,
        }
    }

    pub fn xy(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// `scale = h / (h + z)`, then `center + (p − camera)·fov·scale`
    Perspective { fov: f32, camera_offset: Vec3 },
    /// Spin about the vertical axis, then weight x, y and the rotated z onto
    /// the screen with a heartbeat-driven scale
    Spin { weights: Vec3, base_scale: f32 },
}

impl Projection {
    /// Identity mapping for 2D scenes laid out in pixels
    pub fn flat() -> Self {
        Projection::Perspective {
            fov: 1.0,
            camera_offset: Vec3::ZERO,
        }
    }
}

/// Camera state for one scene.
pub struct Projector {
    pub projection: Projection,
    width: u32,
    height: u32,
    /// Spin angle in radians
    rotation: f32,
    /// Extra relative scale, e.g. `0.1 · sin(beat)`
    beat_scale: f32,
}

impl Projector {
    pub fn new(projection: Projection, width: u32, height: u32) -> Self {
        Self {
            projection,
            width,
            height,
            rotation: 0.0,
            beat_scale: 0.0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Screen center in pixels
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 * 0.5, self.height as f32 * 0.5)
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Advance the spin by `delta` radians
    pub fn spin(&mut self, delta: f32) {
        if delta.is_finite() {
            self.rotation = (self.rotation + delta) % TAU;
        }
    }

    pub fn set_beat(&mut self, beat: f32) {
        self.beat_scale = if beat.is_finite() { beat } else { 0.0 };
    }

    /// Project a simulation-space point. `None` for degenerate or non-finite results.
    pub fn project(&self, point: Vec3) -> Option<ScreenPoint> {
        if !point.is_finite() {
            return None;
        }
        let (cx, cy) = self.center();

        let projected = match self.projection {
            Projection::Perspective { fov, camera_offset } => {
                let h = self.height as f32;
                let denom = h + point.z;
                if denom <= 0.0 {
                    return None;
                }
                let scale = h / denom * fov;
                ScreenPoint {
                    x: cx + (point.x - camera_offset.x) * scale,
                    y: cy - (point.y - camera_offset.y) * scale,
                    depth: point.z,
                }
            }
            Projection::Spin {
                weights,
                base_scale,
            } => {
                let (sin, cos) = self.rotation.sin_cos();
                let x = point.x * cos - point.z * sin;
                let z = point.x * sin + point.z * cos;
                let s = base_scale * (1.0 + self.beat_scale);
                ScreenPoint {
                    x: cx + x * s * weights.x,
                    y: cy - point.y * s * weights.y + z * s * weights.z,
                    depth: z,
                }
            }
        };

        (projected.x.is_finite() && projected.y.is_finite()).then_some(projected)
    }
}
