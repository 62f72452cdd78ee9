//! Parametric heart curve sampling
//!
//! The classic heart silhouette is
//!
//! ```text
//! x(t) = 16 sin³(t)
//! y(t) = 13 cos(t) − 5 cos(2t) − 2 cos(3t) − cos(4t)
//! ```
//!
//! Points live in Y-up simulation space; projectors flip Y for the screen.

use pulse_core::{PulseError, Result, Vec3};
use std::f32::consts::TAU;

/// Coefficients of the heart curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HeartShape {
    /// `16 sin³t`, `13 cos t − 5 cos 2t − 2 cos 3t − cos 4t`
    #[default]
    Classic,
    /// Softer lobes: `15 sin³t`, `12.5 cos t − 4.5 cos 2t − 2 cos 3t − 0.5 cos 4t`
    Rounded,
}

impl HeartShape {
    /// Unscaled curve point at parameter `t` (z = 0)
    pub fn point_at(self, t: f32) -> Vec3 {
        let s = t.sin();
        let (ax, ay, by, cy, dy) = match self {
            HeartShape::Classic => (16.0, 13.0, 5.0, 2.0, 1.0),
            HeartShape::Rounded => (15.0, 12.5, 4.5, 2.0, 0.5),
        };
        Vec3::new(
            ax * s * s * s,
            ay * t.cos() - by * (2.0 * t).cos() - cy * (3.0 * t).cos() - dy * (4.0 * t).cos(),
            0.0,
        )
    }
}

/// One sampled point of the heart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartPoint {
    /// Curve parameter the point was sampled at
    pub t: f32,
    pub position: Vec3,
    /// Unit normal, present only for depth-layered generation
    pub normal: Option<Vec3>,
}

/// Replicates the 2D curve across z-offsets to fake a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthLayers {
    /// Layers span `[-depth, depth]`
    pub depth: f32,
    pub count: usize,
}

impl DepthLayers {
    pub fn new(depth: f32, count: usize) -> Self {
        Self { depth, count }
    }

    /// Evenly spaced z-offsets, far to near. Empty when `count` is zero.
    pub fn offsets(&self) -> Vec<f32> {
        match self.count {
            0 => return Vec::new(),
            1 => return vec![0.0],
            _ => {}
        }
        let step = 2.0 * self.depth / (self.count - 1) as f32;
        (0..self.count)
            .map(|i| -self.depth + step * i as f32)
            .collect()
    }
}

/// Deterministic heart curve generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartCurve {
    pub shape: HeartShape,
}

impl HeartCurve {
    pub const MIN_SAMPLES: usize = 3;

    pub fn new(shape: HeartShape) -> Self {
        Self { shape }
    }

    /// Sample `sample_count` points at `t = 2π·i/n`, scaled by `size_scale`.
    ///
    /// With `layers`, every sample is repeated once per layer (layer-major
    /// within each sample) and carries an approximate normal built from
    /// `(sin t, cos t, z/depth)`. That normal only points roughly away from
    /// the heart's center; it is not derived from the surface.
    pub fn generate(
        &self,
        sample_count: usize,
        size_scale: f32,
        layers: Option<DepthLayers>,
    ) -> Result<Vec<HeartPoint>> {
        if sample_count < Self::MIN_SAMPLES {
            return Err(PulseError::config(format!(
                "heart curve needs at least {} samples, got {sample_count}",
                Self::MIN_SAMPLES
            )));
        }
        if !size_scale.is_finite() || size_scale <= 0.0 {
            return Err(PulseError::config(format!(
                "heart size scale must be positive, got {size_scale}"
            )));
        }

        let step = TAU / sample_count as f32;

        let Some(layers) = layers else {
            return Ok((0..sample_count)
                .map(|i| {
                    let t = step * i as f32;
                    HeartPoint {
                        t,
                        position: self.shape.point_at(t) * size_scale,
                        normal: None,
                    }
                })
                .collect());
        };

        if layers.count == 0 {
            return Err(PulseError::config("depth layer count must be at least 1"));
        }
        if !layers.depth.is_finite() || layers.depth <= 0.0 {
            return Err(PulseError::config(format!(
                "depth layer depth must be positive, got {}",
                layers.depth
            )));
        }

        let offsets = layers.offsets();
        let mut points = Vec::with_capacity(sample_count * offsets.len());
        for i in 0..sample_count {
            let t = step * i as f32;
            let base = self.shape.point_at(t);
            for &z in &offsets {
                let widen = 1.0 + z.abs() / layers.depth * 0.1;
                let normal =
                    Vec3::new(t.sin() * widen, t.cos() * widen, z / layers.depth).normalized();
                points.push(HeartPoint {
                    t,
                    position: Vec3::new(base.x * widen * size_scale, base.y * widen * size_scale, z),
                    normal: Some(normal),
                });
            }
        }
        Ok(points)
    }

    /// Point on the curve's interior, `radius` in [0, 1] shrinking toward the center
    pub fn interior_point(&self, t: f32, radius: f32, size_scale: f32) -> Vec3 {
        self.shape.point_at(t) * (radius * size_scale)
    }

    /// Point on a rounded 3D shell around the curve.
    /// `u` walks the silhouette, `v` in [-π/2, π/2] sweeps front to back.
    pub fn volume_point(&self, u: f32, v: f32, size_scale: f32) -> Vec3 {
        let base = self.shape.point_at(u);
        Vec3::new(
            base.x * (1.0 + 0.2 * v.cos()),
            base.y * (1.0 + 0.2 * v.sin()),
            8.0 * v.sin(),
        ) * size_scale
    }

    /// Curve point with a gentle z twist of `sin t · cos t`
    pub fn twisted_point(&self, t: f32, size_scale: f32) -> Vec3 {
        let base = self.shape.point_at(t);
        Vec3::new(base.x, base.y, t.sin() * t.cos()) * size_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-4;

    #[test]
    fn rejects_degenerate_sample_counts() {
        let curve = HeartCurve::default();
        for n in 0..3 {
            assert!(curve.generate(n, 1.0, None).is_err());
        }
        assert!(curve.generate(3, 1.0, None).is_ok());
    }

    #[test]
    fn rejects_bad_scale_and_layers() {
        let curve = HeartCurve::default();
        assert!(curve.generate(10, 0.0, None).is_err());
        assert!(curve.generate(10, f32::NAN, None).is_err());
        assert!(curve
            .generate(10, 1.0, Some(DepthLayers::new(0.0, 3)))
            .is_err());
        assert!(curve
            .generate(10, 1.0, Some(DepthLayers::new(3.0, 0)))
            .is_err());
    }

    #[test]
    fn four_samples_match_closed_form() {
        let points = HeartCurve::default().generate(4, 1.0, None).unwrap();
        assert_eq!(points.len(), 4);

        let expected = [
            (0.0, 0.0, 13.0 - 5.0 - 2.0 - 1.0),
            (FRAC_PI_2, 16.0, 0.0 + 5.0 - 0.0 - 1.0),
            (PI, 0.0, -13.0 - 5.0 + 2.0 - 1.0),
            (3.0 * FRAC_PI_2, -16.0, 0.0 + 5.0 - 0.0 - 1.0),
        ];
        for (point, (t, x, y)) in points.iter().zip(expected) {
            assert!((point.t - t).abs() < EPS, "t {} vs {t}", point.t);
            assert!((point.position.x - x).abs() < EPS, "x({t}) = {}", point.position.x);
            assert!((point.position.y - y).abs() < EPS, "y({t}) = {}", point.position.y);
            assert_eq!(point.position.z, 0.0);
            assert!(point.normal.is_none());
        }
    }

    #[test]
    fn curve_closes_for_any_sample_count() {
        let curve = HeartCurve::default();
        for n in [3usize, 4, 7, 50, 200, 301] {
            let points = curve.generate(n, 1.0, None).unwrap();
            let step = TAU / n as f32;
            let first = points.first().unwrap();
            let last = points.last().unwrap();
            assert_eq!(first.t, 0.0);
            // Wrapping one more step from the last sample lands on the first
            assert!((TAU - last.t - step).abs() < EPS, "n = {n}");
            let wrapped = curve.shape.point_at(last.t + step);
            assert!(wrapped.distance(first.position) < 1e-3, "n = {n}");
        }
    }

    #[test]
    fn size_scale_multiplies_positions() {
        let curve = HeartCurve::default();
        let unit = curve.generate(12, 1.0, None).unwrap();
        let big = curve.generate(12, 8.0, None).unwrap();
        for (a, b) in unit.iter().zip(&big) {
            assert!(b.position.distance(a.position * 8.0) < 1e-3);
        }
    }

    #[test]
    fn rounded_shape_coefficients() {
        let p = HeartShape::Rounded.point_at(0.0);
        assert!((p.y - (12.5 - 4.5 - 2.0 - 0.5)).abs() < EPS);
        let q = HeartShape::Rounded.point_at(FRAC_PI_2);
        assert!((q.x - 15.0).abs() < EPS);
    }

    #[test]
    fn layered_points_carry_unit_normals() {
        let layers = DepthLayers::new(3.0, 3);
        let points = HeartCurve::new(HeartShape::Rounded)
            .generate(30, 1.0, Some(layers))
            .unwrap();
        assert_eq!(points.len(), 90);

        let zs: Vec<f32> = points[..3].iter().map(|p| p.position.z).collect();
        assert_eq!(zs, vec![-3.0, 0.0, 3.0]);

        for p in &points {
            let n = p.normal.expect("layered points have normals");
            assert!((n.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn single_layer_sits_at_zero_depth() {
        assert_eq!(DepthLayers::new(5.0, 1).offsets(), vec![0.0]);
        assert_eq!(DepthLayers::new(2.0, 5).offsets(), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn zero_layers_have_no_offsets() {
        assert!(DepthLayers::new(3.0, 0).offsets().is_empty());
    }

    #[test]
    fn volume_points_stay_within_shell() {
        let curve = HeartCurve::default();
        for i in 0..20 {
            let u = i as f32 * 0.3;
            let v = -FRAC_PI_2 + i as f32 * (PI / 20.0);
            let p = curve.volume_point(u, v, 1.0);
            assert!(p.z.abs() <= 8.0 + EPS);
            assert!(p.x.abs() <= 16.0 * 1.2 + EPS);
        }
    }
}
