//! Depth-sorted drawing of particles and heart surface points

use crate::canvas::RenderSurface;
use crate::lighting::SurfaceShading;
use crate::projector::Projector;
use pulse_core::{Color, Vec3};
use std::cmp::Ordering;

/// Something the compositor can draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drawable {
    /// A colored dot; `velocity` feeds the motion ghosts
    Particle {
        position: Vec3,
        velocity: Vec3,
        color: Color,
        size: f32,
    },
    /// A lit heart surface sample; `depth_t` in [0, 1] picks the base color
    Surface {
        position: Vec3,
        normal: Vec3,
        depth_t: f32,
    },
}

impl Drawable {
    pub fn position(&self) -> Vec3 {
        match self {
            Drawable::Particle { position, .. } | Drawable::Surface { position, .. } => *position,
        }
    }
}

/// Radius and highlight rules for surface points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    /// Radius at `depth_t = 0.5`
    pub radius: f32,
    /// Radius lost toward either depth extreme
    pub radius_falloff: f32,
    pub min_radius: f32,
    /// Draw a small highlight dot when the light intensity exceeds this
    pub highlight_above: Option<f32>,
    /// Highlight offset along the normal, in pixels
    pub highlight_offset: f32,
    pub highlight_color: Color,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            radius: 4.0,
            radius_falloff: 2.0,
            min_radius: 2.0,
            highlight_above: Some(0.7),
            highlight_offset: 5.0,
            highlight_color: Color::WHITE.with_alpha(150.0 / 255.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositorConfig {
    pub background: Color,
    /// Per-frame translucent fill instead of a hard clear, for fading trails
    pub fade_alpha: Option<f32>,
    /// Ghost dots at `position − velocity·k` for `k` in `1..=ghost_steps`
    pub ghost_steps: u32,
    /// Alpha of the first ghost; ghost `k` uses `ghost_alpha / k`
    pub ghost_alpha: f32,
    pub surface: SurfaceStyle,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            background: Color::from_rgb8(25, 25, 35),
            fade_alpha: None,
            ghost_steps: 0,
            ghost_alpha: 150.0 / 255.0,
            surface: SurfaceStyle::default(),
        }
    }
}

/// Draw calls issued for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    /// Drawables that projected off-surface or to a non-finite point
    pub skipped: usize,
}

pub struct Compositor {
    pub config: CompositorConfig,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    /// Clear to the background, or fade the previous frame toward it
    pub fn begin_frame<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        match self.config.fade_alpha {
            Some(alpha) => surface.fill(self.config.background.with_alpha(alpha)),
            None => surface.fill(self.config.background.with_alpha(1.0)),
        }
    }

    /// Back-to-front draw order: descending z, ties keep input order, NaN last
    pub fn depth_order(drawables: &[Drawable]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..drawables.len()).collect();
        order.sort_by(|&a, &b| {
            let za = drawables[a].position().z;
            let zb = drawables[b].position().z;
            match (za.is_nan(), zb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => zb.partial_cmp(&za).unwrap_or(Ordering::Equal),
            }
        });
        order
    }

    /// Depth sort, project and raster every drawable.
    ///
    /// Surface points need `shading`; without it they are skipped.
    pub fn draw<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        drawables: &[Drawable],
        projector: &Projector,
        shading: Option<&SurfaceShading>,
    ) -> FrameStats {
        let (width, height) = surface.size();
        let mut stats = FrameStats::default();

        for index in Self::depth_order(drawables) {
            let drawable = &drawables[index];
            let Some(screen) = projector
                .project(drawable.position())
                .filter(|p| p.is_visible(width, height))
            else {
                stats.skipped += 1;
                continue;
            };

            match *drawable {
                Drawable::Particle {
                    position,
                    velocity,
                    color,
                    size,
                } => {
                    self.draw_ghosts(surface, projector, position, velocity, color, size);
                    surface.draw_filled_circle(screen.xy(), size, color);
                }
                Drawable::Surface {
                    normal, depth_t, ..
                } => {
                    let Some(shading) = shading else {
                        stats.skipped += 1;
                        continue;
                    };
                    let style = &self.config.surface;
                    let (color, intensity) = shading.shade(normal, depth_t);
                    let edge = (2.0 * depth_t - 1.0).abs();
                    let radius = (style.radius - edge * style.radius_falloff).max(style.min_radius);
                    surface.draw_filled_circle(screen.xy(), radius, color);

                    if style.highlight_above.is_some_and(|t| intensity > t) {
                        let spot = screen.offset(
                            normal.x * style.highlight_offset,
                            -normal.y * style.highlight_offset,
                        );
                        surface.draw_filled_circle(spot.xy(), 1.0, style.highlight_color);
                    }
                }
            }
            stats.drawn += 1;
        }

        stats
    }

    fn draw_ghosts<S: RenderSurface + ?Sized>(
        &self,
        surface: &mut S,
        projector: &Projector,
        position: Vec3,
        velocity: Vec3,
        color: Color,
        size: f32,
    ) {
        let (width, height) = surface.size();
        for k in 1..=self.config.ghost_steps {
            let trail = position - velocity * k as f32;
            let Some(screen) = projector
                .project(trail)
                .filter(|p| p.is_visible(width, height))
            else {
                continue;
            };
            let alpha = self.config.ghost_alpha / k as f32;
            let radius = (size - (k / 2) as f32).max(1.0);
            surface.draw_filled_circle(screen.xy(), radius, color.with_alpha(alpha));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{BlendMode, Canvas};
    use crate::lighting::LightingModel;
    use crate::projector::Projection;

    fn dot(z: f32) -> Drawable {
        Drawable::Particle {
            position: Vec3::new(0.0, 0.0, z),
            velocity: Vec3::ZERO,
            color: Color::WHITE,
            size: 1.0,
        }
    }

    fn flat(width: u32, height: u32) -> Projector {
        Projector::new(Projection::flat(), width, height)
    }

    /// Records primitive calls instead of rastering them
    #[derive(Default)]
    struct Recorder {
        circles: Vec<((f32, f32), f32, Color)>,
        fills: Vec<Color>,
    }

    impl RenderSurface for Recorder {
        fn size(&self) -> (u32, u32) {
            (100, 100)
        }
        fn fill(&mut self, color: Color) {
            self.fills.push(color);
        }
        fn draw_filled_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
            self.circles.push((center, radius, color));
        }
        fn draw_circle_outline(&mut self, _: (f32, f32), _: f32, _: f32, _: Color) {}
        fn draw_polygon(&mut self, _: &[(f32, f32)], _: Color, _: Option<f32>) {}
        fn draw_line(&mut self, _: (f32, f32), _: (f32, f32), _: f32, _: Color) {}
        fn set_blend_mode(&mut self, _: BlendMode) {}
    }

    #[test]
    fn depth_order_is_descending_z() {
        let drawables = [dot(3.0), dot(-1.0), dot(0.0)];
        assert_eq!(Compositor::depth_order(&drawables), vec![0, 2, 1]);
    }

    #[test]
    fn depth_order_is_stable_and_puts_nan_last() {
        let drawables = [dot(1.0), dot(f32::NAN), dot(1.0), dot(2.0), dot(1.0)];
        assert_eq!(Compositor::depth_order(&drawables), vec![3, 0, 2, 4, 1]);
    }

    #[test]
    fn off_screen_drawables_are_skipped() {
        let compositor = Compositor::new(CompositorConfig::default());
        let mut surface = Recorder::default();
        let drawables = [
            dot(0.0),
            Drawable::Particle {
                position: Vec3::new(500.0, 0.0, 0.0),
                velocity: Vec3::ZERO,
                color: Color::WHITE,
                size: 2.0,
            },
            Drawable::Particle {
                position: Vec3::new(f32::NAN, 0.0, 0.0),
                velocity: Vec3::ZERO,
                color: Color::WHITE,
                size: 2.0,
            },
        ];
        let stats = compositor.draw(&mut surface, &drawables, &flat(100, 100), None);
        assert_eq!(stats, FrameStats { drawn: 1, skipped: 2 });
        assert_eq!(surface.circles.len(), 1);
        assert_eq!(surface.circles[0].0, (50.0, 50.0));
    }

    #[test]
    fn ghosts_trail_behind_with_fading_alpha() {
        let compositor = Compositor::new(CompositorConfig {
            ghost_steps: 3,
            ..Default::default()
        });
        let mut surface = Recorder::default();
        let drawables = [Drawable::Particle {
            position: Vec3::ZERO,
            velocity: Vec3::new(2.0, 0.0, 0.0),
            color: Color::WHITE,
            size: 2.0,
        }];
        compositor.draw(&mut surface, &drawables, &flat(100, 100), None);

        assert_eq!(surface.circles.len(), 4);
        let ghost_x: Vec<f32> = surface.circles[..3].iter().map(|c| c.0 .0).collect();
        assert_eq!(ghost_x, vec![48.0, 46.0, 44.0]);
        let radii: Vec<f32> = surface.circles[..3].iter().map(|c| c.1).collect();
        assert_eq!(radii, vec![2.0, 1.0, 1.0]);
        assert!((surface.circles[1].2.a - 75.0 / 255.0).abs() < 1e-6);
        assert_eq!(surface.circles[3].2, Color::WHITE);
    }

    #[test]
    fn surface_points_need_shading() {
        let compositor = Compositor::new(CompositorConfig::default());
        let mut surface = Recorder::default();
        let drawables = [Drawable::Surface {
            position: Vec3::ZERO,
            normal: Vec3::new(0.0, 0.0, 1.0),
            depth_t: 0.5,
        }];
        let projector = flat(100, 100);

        let stats = compositor.draw(&mut surface, &drawables, &projector, None);
        assert_eq!(stats.skipped, 1);

        let shading = SurfaceShading {
            model: LightingModel::Phong {
                ambient: 0.3,
                specular_power: 20.0,
            },
            light_dir: Vec3::new(0.0, 0.0, 1.0),
            near_color: Color::from_rgb8(255, 20, 147),
            far_color: Color::from_rgb8(255, 105, 180),
            specular_color: Color::from_rgb8(255, 255, 200),
            specular_exponent: 5,
        };
        let stats = compositor.draw(&mut surface, &drawables, &projector, Some(&shading));
        assert_eq!(stats.drawn, 1);
        // Body dot at full radius, then the highlight
        assert_eq!(surface.circles.len(), 2);
        assert_eq!(surface.circles[0].1, 4.0);
        assert_eq!(surface.circles[1].1, 1.0);
    }

    #[test]
    fn begin_frame_fades_or_clears() {
        let mut surface = Recorder::default();
        Compositor::new(CompositorConfig::default()).begin_frame(&mut surface);
        Compositor::new(CompositorConfig {
            background: Color::BLACK,
            fade_alpha: Some(15.0 / 255.0),
            ..Default::default()
        })
        .begin_frame(&mut surface);
        assert_eq!(surface.fills[0].a, 1.0);
        assert!((surface.fills[1].a - 15.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn draws_into_a_canvas() {
        let compositor = Compositor::new(CompositorConfig::default());
        let mut canvas = Canvas::new(64, 64);
        compositor.begin_frame(&mut canvas);
        let stats = compositor.draw(&mut canvas, &[dot(0.0)], &flat(64, 64), None);
        assert_eq!(stats.drawn, 1);
        assert_eq!(canvas.pixel(32, 32), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(0, 0), Some([25, 25, 35, 255]));
    }
}
