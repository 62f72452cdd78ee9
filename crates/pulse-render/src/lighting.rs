//! Lighting models for particles and heart surface points

use pulse_core::{Color, PulseError, Result, Vec3};

/// Scalar light intensity from a normal and a light direction.
///
/// Both vectors are normalized before use; a zero vector stays zero, which
/// leaves only the ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightingModel {
    /// `clamp(ambient + diffuse · (n·l), min, max)`
    Diffuse {
        ambient: f32,
        diffuse: f32,
        min: f32,
        max: f32,
    },
    /// `clamp(ambient + d + d^power, 0, 1)` with `d = max(0, n·l)`
    Phong { ambient: f32, specular_power: f32 },
}

impl LightingModel {
    pub fn validate(&self) -> Result<()> {
        let ok = match *self {
            LightingModel::Diffuse {
                ambient,
                diffuse,
                min,
                max,
            } => {
                ambient.is_finite()
                    && diffuse.is_finite()
                    && min.is_finite()
                    && max.is_finite()
                    && min <= max
            }
            LightingModel::Phong {
                ambient,
                specular_power,
            } => ambient.is_finite() && specular_power.is_finite() && specular_power >= 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(PulseError::config(format!("invalid lighting model {self:?}")))
        }
    }

    /// Output bounds of [`shade`](Self::shade)
    pub fn range(&self) -> (f32, f32) {
        match *self {
            LightingModel::Diffuse { min, max, .. } => (min.min(max), max.max(min)),
            LightingModel::Phong { .. } => (0.0, 1.0),
        }
    }

    pub fn shade(&self, normal: Vec3, light_dir: Vec3) -> f32 {
        let cos = normal.normalized().dot(&light_dir.normalized());
        let raw = match *self {
            LightingModel::Diffuse {
                ambient, diffuse, ..
            } => ambient + diffuse * cos,
            LightingModel::Phong {
                ambient,
                specular_power,
            } => {
                let diff = cos.max(0.0);
                ambient + diff + diff.powf(specular_power)
            }
        };
        let (lo, hi) = self.range();
        if raw.is_finite() {
            raw.max(lo).min(hi)
        } else {
            lo
        }
    }
}

/// Light direction source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Static(Vec3),
    /// `normalize(cos t, sin(k1·t), sin(k2·t))`
    Orbiting { k1: f32, k2: f32 },
}

impl Light {
    pub fn direction_at(&self, time: f32) -> Vec3 {
        match *self {
            Light::Static(dir) => dir.normalized(),
            Light::Orbiting { k1, k2 } => {
                Vec3::new(time.cos(), (time * k1).sin(), (time * k2).sin()).normalized()
            }
        }
    }
}

/// Colors a heart surface point: depth-interpolated base color scaled by the
/// light intensity, plus a tinted specular highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceShading {
    pub model: LightingModel,
    /// Current light direction, updated each frame
    pub light_dir: Vec3,
    /// Base color at `depth_t = 0`
    pub near_color: Color,
    /// Base color at `depth_t = 1`
    pub far_color: Color,
    pub specular_color: Color,
    /// Highlight strength is `intensity^specular_exponent`
    pub specular_exponent: i32,
}

impl SurfaceShading {
    /// Returns the final color and the raw light intensity
    pub fn shade(&self, normal: Vec3, depth_t: f32) -> (Color, f32) {
        let intensity = self.model.shade(normal, self.light_dir);
        let t = if depth_t.is_finite() {
            depth_t.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let base = self.near_color.lerp(self.far_color, t);
        let highlight = self
            .specular_color
            .scaled(intensity.powi(self.specular_exponent));
        let color = base.scaled(intensity).add_rgb(highlight).clamped();
        (color, intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diffuse() -> LightingModel {
        LightingModel::Diffuse {
            ambient: 0.2,
            diffuse: 0.8,
            min: 0.3,
            max: 1.0,
        }
    }

    fn phong() -> LightingModel {
        LightingModel::Phong {
            ambient: 0.3,
            specular_power: 20.0,
        }
    }

    #[test]
    fn diffuse_facing_light_is_full() {
        let n = Vec3::new(0.0, 0.0, 1.0);
        assert!((diffuse().shade(n, n) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn diffuse_clamps_to_min() {
        let n = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(diffuse().shade(n, -n), 0.3);
        // Perpendicular: ambient only, below min
        assert_eq!(diffuse().shade(n, Vec3::RIGHT), 0.3);
    }

    #[test]
    fn phong_adds_specular() {
        let n = Vec3::UP;
        let at_45 = Vec3::new(1.0, 1.0, 0.0);
        let d = std::f32::consts::FRAC_1_SQRT_2;
        let expected = (0.3 + d + d.powf(20.0)).min(1.0);
        assert!((phong().shade(n, at_45) - expected).abs() < 1e-5);
        assert_eq!(phong().shade(n, n), 1.0);
        assert!((phong().shade(n, -n) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn shade_stays_in_range_for_any_input() {
        let vectors = [
            Vec3::ZERO,
            Vec3::UP,
            -Vec3::UP,
            Vec3::new(1e30, -1e30, 3.0),
            Vec3::new(f32::NAN, 0.0, 1.0),
            Vec3::new(0.3, -0.2, 0.9),
        ];
        for model in [diffuse(), phong()] {
            let (lo, hi) = model.range();
            for &n in &vectors {
                for &l in &vectors {
                    let v = model.shade(n, l);
                    assert!(v >= lo && v <= hi, "{model:?} {n:?} {l:?} -> {v}");
                }
            }
        }
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let bad = LightingModel::Diffuse {
            ambient: 0.2,
            diffuse: 0.8,
            min: 1.0,
            max: 0.3,
        };
        assert!(bad.validate().is_err());
        assert!(diffuse().validate().is_ok());
        assert!(phong().validate().is_ok());
    }

    #[test]
    fn orbiting_light_is_unit_length() {
        let light = Light::Orbiting { k1: 0.8, k2: 0.6 };
        for i in 0..50 {
            let d = light.direction_at(i as f32 * 0.37);
            assert!((d.magnitude() - 1.0).abs() < 1e-5);
        }
        assert_eq!(light.direction_at(0.0), Vec3::RIGHT);
    }

    #[test]
    fn surface_color_blends_depth_and_specular() {
        let shading = SurfaceShading {
            model: phong(),
            light_dir: Vec3::new(0.0, 0.0, 1.0),
            near_color: Color::from_rgb8(255, 20, 147),
            far_color: Color::from_rgb8(255, 105, 180),
            specular_color: Color::from_rgb8(255, 255, 200),
            specular_exponent: 5,
        };

        // Facing away: ambient only, no visible highlight
        let (dim, intensity) = shading.shade(Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!((intensity - 0.3).abs() < 1e-6);
        let expected = Color::from_rgb8(255, 20, 147).scaled(0.3);
        assert!((dim.g - (expected.g + 0.3f32.powi(5))).abs() < 1e-5);

        // Facing the light saturates toward white
        let (lit, intensity) = shading.shade(Vec3::new(0.0, 0.0, 1.0), 1.0);
        assert_eq!(intensity, 1.0);
        assert_eq!(lit.to_rgba8(), [255, 255, 255, 255]);
    }
}
