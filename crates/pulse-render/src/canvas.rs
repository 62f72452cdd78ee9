//! Software raster target for the 2D draw primitives

use pulse_core::Color;

/// How drawn colors combine with what is already on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard source-over alpha blending
    #[default]
    Alpha,
    /// `dst += src · src_alpha`, saturating
    Additive,
}

/// Draw primitives a scene renders through.
///
/// Coordinates are pixels with the origin in the top-left corner. Anything
/// outside the surface is clipped silently.
pub trait RenderSurface {
    fn size(&self) -> (u32, u32);

    /// Cover the whole surface; translucent colors fade what is underneath
    fn fill(&mut self, color: Color);

    fn draw_filled_circle(&mut self, center: (f32, f32), radius: f32, color: Color);

    fn draw_circle_outline(&mut self, center: (f32, f32), radius: f32, width: f32, color: Color);

    /// Filled when `stroke` is `None`, otherwise outlined with that width
    fn draw_polygon(&mut self, points: &[(f32, f32)], color: Color, stroke: Option<f32>);

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color);

    fn set_blend_mode(&mut self, mode: BlendMode);
}

/// RGBA8 pixel buffer, row-major from the top-left corner
pub struct Canvas {
    pixels: Vec<[u8; 4]>,
    width: u32,
    height: u32,
    blend: BlendMode,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![[0, 0, 0, 255]; (width * height) as usize],
            width,
            height,
            blend: BlendMode::Alpha,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Reallocate for a new window size; contents are reset to black
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0, 0, 0, 255]; (width * height) as usize];
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Raw bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Read a pixel, `None` when out of bounds
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        self.in_bounds(x, y)
            .then(|| self.pixels[self.pixel_index(x as u32, y as u32)])
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Blend one pixel (bounds checked)
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.pixel_index(x as u32, y as u32);
        self.pixels[idx] = blend(self.pixels[idx], color, self.blend);
    }

    fn span(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i32 - 1);
        for x in x0..=x1 {
            self.blend_pixel(x, y, color);
        }
    }

    /// Rows of a disc of radius `r` around row `cy` that land on the surface
    fn disc_rows(&self, cy: i64, r: f64) -> std::ops::RangeInclusive<i64> {
        let reach = r.floor() as i64;
        cy.saturating_sub(reach).max(0)..=cy.saturating_add(reach).min(self.height as i64 - 1)
    }

    /// `span` for coordinates that may lie far outside the surface
    fn clipped_span(&mut self, y: i64, x0: i64, x1: i64, color: Color) {
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i64 - 1);
        if x0 <= x1 {
            self.span(y as i32, x0 as i32, x1 as i32, color);
        }
    }
}

fn blend(dst: [u8; 4], src: Color, mode: BlendMode) -> [u8; 4] {
    let src = src.clamped();
    let a = src.a;
    let channel = |d: u8, s: f32| -> u8 {
        let d = d as f32 / 255.0;
        let out = match mode {
            BlendMode::Alpha => s * a + d * (1.0 - a),
            BlendMode::Additive => d + s * a,
        };
        (out.clamp(0.0, 1.0) * 255.0).round() as u8
    };
    let out_a = match mode {
        BlendMode::Alpha => a + dst[3] as f32 / 255.0 * (1.0 - a),
        BlendMode::Additive => dst[3] as f32 / 255.0 + a,
    };
    [
        channel(dst[0], src.r),
        channel(dst[1], src.g),
        channel(dst[2], src.b),
        (out_a.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

fn finite_point(p: (f32, f32)) -> bool {
    p.0.is_finite() && p.1.is_finite()
}

/// Nearest pixel to a finite point; far-off coordinates saturate
fn lattice_center(p: (f32, f32)) -> (i64, i64) {
    (p.0.round() as i64, p.1.round() as i64)
}

/// Largest `dx >= 0` with `dx² + dy² <= r²`, given `|dy| <= r`
fn half_chord(r: f64, dy: f64) -> i64 {
    (r * r - dy * dy).max(0.0).sqrt().floor() as i64
}

impl RenderSurface for Canvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill(&mut self, color: Color) {
        let mode = self.blend;
        for px in &mut self.pixels {
            *px = blend(*px, color, mode);
        }
    }

    fn draw_filled_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
        if !finite_point(center) || !radius.is_finite() {
            return;
        }
        let (cx, cy) = lattice_center(center);
        let r = radius.max(0.5) as f64;
        for y in self.disc_rows(cy, r) {
            let half = half_chord(r, y as f64 - cy as f64);
            self.clipped_span(y, cx.saturating_sub(half), cx.saturating_add(half), color);
        }
    }

    fn draw_circle_outline(&mut self, center: (f32, f32), radius: f32, width: f32, color: Color) {
        if !finite_point(center) || !radius.is_finite() || !width.is_finite() {
            return;
        }
        let (cx, cy) = lattice_center(center);
        let outer = radius.max(0.5) as f64;
        let inner = (outer - width.max(1.0) as f64).max(0.0);
        for y in self.disc_rows(cy, outer) {
            let dy = y as f64 - cy as f64;
            let half = half_chord(outer, dy);
            if inner * inner < dy * dy {
                self.clipped_span(y, cx.saturating_sub(half), cx.saturating_add(half), color);
                continue;
            }
            // Pixels with dx² + dy² <= inner² belong to the hole
            let hole = half_chord(inner, dy).saturating_add(1);
            self.clipped_span(y, cx.saturating_sub(half), cx.saturating_sub(hole), color);
            self.clipped_span(y, cx.saturating_add(hole), cx.saturating_add(half), color);
        }
    }

    fn draw_polygon(&mut self, points: &[(f32, f32)], color: Color, stroke: Option<f32>) {
        if points.len() < 2 || !points.iter().all(|&p| finite_point(p)) {
            return;
        }
        if let Some(width) = stroke {
            for (i, &from) in points.iter().enumerate() {
                let to = points[(i + 1) % points.len()];
                self.draw_line(from, to, width, color);
            }
            return;
        }

        // Even-odd scanline fill, sampling each row at its pixel center
        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        let y0 = (min_y.floor() as i32).max(0);
        let y1 = (max_y.ceil() as i32).min(self.height as i32 - 1);
        let mut crossings = Vec::new();
        for y in y0..=y1 {
            let sy = y as f32 + 0.5;
            crossings.clear();
            for (i, &(ax, ay)) in points.iter().enumerate() {
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                    crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                let x0 = (pair[0] - 0.5).ceil() as i32;
                let x1 = (pair[1] - 0.5).floor() as i32;
                if x0 <= x1 {
                    self.span(y, x0, x1, color);
                }
            }
        }
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        if !finite_point(from) || !finite_point(to) {
            return;
        }
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        // Clip absurdly long lines to what can touch the surface
        if steps > 4.0 * (self.width + self.height) as f32 {
            return;
        }
        let half = (width * 0.5).max(0.5);
        let steps = steps as i32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = (from.0 + dx * t, from.1 + dy * t);
            if half <= 0.5 {
                self.blend_pixel(p.0.round() as i32, p.1.round() as i32, color);
            } else {
                self.draw_filled_circle(p, half, color);
            }
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(canvas: &Canvas) -> usize {
        canvas.pixels().iter().filter(|p| p[0] > 0).count()
    }

    #[test]
    fn new_canvas_is_opaque_black() {
        let canvas = Canvas::new(4, 3);
        assert_eq!(canvas.size(), (4, 3));
        assert_eq!(canvas.pixels().len(), 12);
        assert_eq!(canvas.as_bytes().len(), 48);
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(4, 0), None);
        assert_eq!(canvas.pixel(-1, 0), None);
    }

    #[test]
    fn opaque_fill_overwrites() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill(Color::from_rgb8(30, 30, 40));
        assert!(canvas.pixels().iter().all(|&p| p == [30, 30, 40, 255]));
    }

    #[test]
    fn translucent_fill_fades() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill(Color::WHITE);
        canvas.fill(Color::BLACK.with_alpha(0.5));
        assert_eq!(canvas.pixel(1, 1), Some([128, 128, 128, 255]));
    }

    #[test]
    fn additive_saturates() {
        let mut canvas = Canvas::new(1, 1);
        canvas.fill(Color::from_rgb8(200, 0, 0));
        canvas.set_blend_mode(BlendMode::Additive);
        canvas.fill(Color::from_rgb8(200, 100, 0));
        assert_eq!(canvas.pixel(0, 0), Some([255, 100, 0, 255]));
        assert_eq!(canvas.blend_mode(), BlendMode::Additive);
    }

    #[test]
    fn filled_circle_covers_disc() {
        let mut canvas = Canvas::new(20, 20);
        canvas.draw_filled_circle((10.0, 10.0), 2.0, Color::WHITE);
        // Lattice points with dx² + dy² <= 4
        assert_eq!(lit(&canvas), 13);
        assert_eq!(canvas.pixel(10, 8), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(11, 11).map(|p| p[0]), Some(255));
        assert_eq!(canvas.pixel(12, 12).map(|p| p[0]), Some(0));
    }

    #[test]
    fn tiny_circle_still_draws_one_pixel() {
        let mut canvas = Canvas::new(5, 5);
        canvas.draw_filled_circle((2.2, 2.4), 0.1, Color::WHITE);
        assert_eq!(lit(&canvas), 1);
        assert_eq!(canvas.pixel(2, 2).map(|p| p[0]), Some(255));
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut canvas = Canvas::new(10, 10);
        canvas.draw_filled_circle((-50.0, 5.0), 3.0, Color::WHITE);
        canvas.draw_filled_circle((f32::NAN, 5.0), 3.0, Color::WHITE);
        canvas.draw_line((-1e9, 0.0), (1e9, 0.0), 1.0, Color::WHITE);
        canvas.draw_polygon(&[(-5.0, -5.0), (-1.0, -5.0), (-1.0, -1.0)], Color::WHITE, None);
        canvas.draw_circle_outline((4.0, -1e9), 10.0, 1.0, Color::WHITE);
        assert_eq!(lit(&canvas), 0);

        canvas.draw_filled_circle((0.0, 0.0), 1.0, Color::WHITE);
        assert_eq!(lit(&canvas), 3);
    }

    #[test]
    fn circle_outline_is_hollow() {
        let mut canvas = Canvas::new(20, 20);
        canvas.draw_circle_outline((10.0, 10.0), 4.0, 1.0, Color::WHITE);
        assert_eq!(canvas.pixel(10, 10).map(|p| p[0]), Some(0));
        assert_eq!(canvas.pixel(13, 10).map(|p| p[0]), Some(0));
        assert_eq!(canvas.pixel(14, 10).map(|p| p[0]), Some(255));
        assert_eq!(canvas.pixel(10, 6).map(|p| p[0]), Some(255));
    }

    #[test]
    fn huge_radius_fills_only_the_surface() {
        let mut canvas = Canvas::new(8, 8);
        canvas.draw_filled_circle((4.0, 4.0), 1e30, Color::WHITE);
        assert_eq!(lit(&canvas), 64);

        let mut canvas = Canvas::new(8, 8);
        canvas.draw_filled_circle((-1e30, 4.0), f32::MAX, Color::WHITE);
        canvas.draw_circle_outline((4.0, 1e30), f32::MAX, 3.0, Color::WHITE);
        assert!(lit(&canvas) <= 64);
    }

    #[test]
    fn huge_outline_only_walks_visible_rows() {
        // The ring's bottom edge covers rows 0..=3 and touches row 4 at one pixel
        let mut canvas = Canvas::new(8, 8);
        canvas.draw_circle_outline((4.0, -1_000_000.0), 1_000_004.0, 10.0, Color::WHITE);
        assert_eq!(lit(&canvas), 33);
        assert_eq!(canvas.pixel(4, 4).map(|p| p[0]), Some(255));
        assert_eq!(canvas.pixel(3, 4).map(|p| p[0]), Some(0));
        assert_eq!(canvas.pixel(0, 5).map(|p| p[0]), Some(0));
    }

    #[test]
    fn filled_square_polygon() {
        let mut canvas = Canvas::new(10, 10);
        let square = [(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)];
        canvas.draw_polygon(&square, Color::WHITE, None);
        assert_eq!(lit(&canvas), 16);
        assert_eq!(canvas.pixel(2, 2).map(|p| p[0]), Some(255));
        assert_eq!(canvas.pixel(6, 6).map(|p| p[0]), Some(0));
    }

    #[test]
    fn stroked_polygon_leaves_interior_empty() {
        let mut canvas = Canvas::new(12, 12);
        let square = [(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)];
        canvas.draw_polygon(&square, Color::WHITE, Some(1.0));
        assert_eq!(canvas.pixel(5, 5).map(|p| p[0]), Some(0));
        assert_eq!(canvas.pixel(5, 1).map(|p| p[0]), Some(255));
        assert_eq!(canvas.pixel(9, 5).map(|p| p[0]), Some(255));
    }

    #[test]
    fn horizontal_line_hits_every_column() {
        let mut canvas = Canvas::new(10, 3);
        canvas.draw_line((0.0, 1.0), (9.0, 1.0), 1.0, Color::WHITE);
        assert_eq!(lit(&canvas), 10);
    }

    #[test]
    fn resize_reallocates() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill(Color::WHITE);
        canvas.resize(6, 2);
        assert_eq!(canvas.size(), (6, 2));
        assert_eq!(canvas.pixels().len(), 12);
        assert_eq!(lit(&canvas), 0);
    }
}
