//! Software RGBA pixel surface
//!
//! A CPU implementation of [`Surface`] used by the headless runner and tests.
//! Circles are rasterized by pixel-center coverage and composited with
//! straight-alpha source-over blending.

use crate::render::{Rgba, Surface};

/// Axis-aligned affine transform: `device = user * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Transform {
    const IDENTITY: Transform = Transform {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale_x + self.offset_x,
            y * self.scale_y + self.offset_y,
        )
    }
}

/// An RGBA8 framebuffer in row-major order
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    transform: Transform,
    stack: Vec<Transform>,
}

impl PixelSurface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            transform: Transform::IDENTITY,
            stack: Vec::new(),
        }
    }

    /// Reallocate the backing store, discarding pixels and transform state
    /// (as resizing an HTML canvas does)
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at a device pixel, or `None` outside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some(Rgba {
            r: self.pixels[i],
            g: self.pixels[i + 1],
            b: self.pixels[i + 2],
            a: self.pixels[i + 3],
        })
    }

    /// Number of pixels with nonzero alpha
    pub fn covered_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Clamp a device-space span to pixel indices whose centers may fall inside it
    fn pixel_span(lo: f64, hi: f64, limit: u32) -> Option<(u32, u32)> {
        let start = (lo - 0.5).ceil().max(0.0);
        let end = (hi - 0.5).floor().min(limit as f64 - 1.0);
        if !start.is_finite() || !end.is_finite() || start > end {
            return None;
        }
        Some((start as u32, end as u32))
    }

    fn blend(&mut self, x: u32, y: u32, src: Rgba) {
        let i = self.index(x, y);
        let src_a = src.a as f32 / 255.0;
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }

        let channel = |s: u8, d: u8| {
            let c = (s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a;
            c.round().clamp(0.0, 255.0) as u8
        };
        self.pixels[i] = channel(src.r, self.pixels[i]);
        self.pixels[i + 1] = channel(src.g, self.pixels[i + 1]);
        self.pixels[i + 2] = channel(src.b, self.pixels[i + 2]);
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }
}

impl Surface for PixelSurface {
    fn pixel_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.transform.scale_x *= x;
        self.transform.scale_y *= y;
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform.offset_x += x * self.transform.scale_x;
        self.transform.offset_y += y * self.transform.scale_y;
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (x0, y0) = self.transform.apply(x, y);
        let (x1, y1) = self.transform.apply(x + width, y + height);
        let Some((col_start, col_end)) = Self::pixel_span(x0.min(x1), x0.max(x1), self.width)
        else {
            return;
        };
        let Some((row_start, row_end)) = Self::pixel_span(y0.min(y1), y0.max(y1), self.height)
        else {
            return;
        };

        for row in row_start..=row_end {
            let start = self.index(col_start, row);
            let end = self.index(col_end, row) + 4;
            self.pixels[start..end].fill(0);
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        if color.is_transparent() || radius <= 0.0 {
            return;
        }

        let (center_x, center_y) = self.transform.apply(cx, cy);
        let radius_x = radius * self.transform.scale_x.abs();
        let radius_y = radius * self.transform.scale_y.abs();
        if radius_x <= 0.0 || radius_y <= 0.0 {
            return;
        }

        let Some((col_start, col_end)) =
            Self::pixel_span(center_x - radius_x, center_x + radius_x, self.width)
        else {
            return;
        };
        let Some((row_start, row_end)) =
            Self::pixel_span(center_y - radius_y, center_y + radius_y, self.height)
        else {
            return;
        };

        for row in row_start..=row_end {
            let dy = (row as f64 + 0.5 - center_y) / radius_y;
            for col in col_start..=col_end {
                let dx = (col as f64 + 0.5 - center_x) / radius_x;
                if dx * dx + dy * dy <= 1.0 {
                    self.blend(col, row, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: Rgba = Rgba::rgb(0x89, 0x86, 0x87);

    #[test]
    fn new_surface_is_transparent() {
        let surface = PixelSurface::new(4, 3);
        assert_eq!(surface.pixels().len(), 4 * 3 * 4);
        assert_eq!(surface.covered_pixels(), 0);
        assert_eq!(surface.pixel(4, 0), None);
    }

    #[test]
    fn fills_circle_around_center() {
        let mut surface = PixelSurface::new(10, 10);
        surface.fill_circle(5.0, 5.0, 2.0, GRAY);

        assert_eq!(surface.pixel(5, 5), Some(GRAY));
        assert_eq!(surface.pixel(4, 4), Some(GRAY));
        assert_eq!(surface.pixel(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.pixel(9, 9), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn transparent_fill_leaves_pixels_untouched() {
        let mut surface = PixelSurface::new(10, 10);
        surface.fill_circle(5.0, 5.0, 4.0, Rgba::TRANSPARENT);
        assert_eq!(surface.covered_pixels(), 0);
    }

    #[test]
    fn clipped_circle_does_not_panic() {
        let mut surface = PixelSurface::new(8, 8);
        surface.fill_circle(-100.0, 4.0, 3.0, GRAY);
        surface.fill_circle(7.5, 7.5, 30.0, GRAY);
        assert_eq!(surface.covered_pixels(), 64);
    }

    #[test]
    fn transforms_compose_like_canvas() {
        let mut surface = PixelSurface::new(20, 20);
        surface.save();
        surface.scale(2.0, 2.0);
        surface.translate(5.0, 5.0);
        // user (0,0) -> device (10,10), radius 1 -> 2
        surface.fill_circle(0.0, 0.0, 1.0, GRAY);
        surface.restore();

        assert_eq!(surface.pixel(10, 10), Some(GRAY));
        assert_eq!(surface.pixel(9, 9), Some(GRAY));
        assert_eq!(surface.pixel(13, 10), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.transform, Transform::IDENTITY);
    }

    #[test]
    fn clear_rect_respects_transform() {
        let mut surface = PixelSurface::new(4, 4);
        surface.fill_circle(2.0, 2.0, 10.0, GRAY);
        surface.scale(2.0, 2.0);
        surface.clear_rect(0.0, 0.0, 1.0, 1.0);

        assert_eq!(surface.pixel(0, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.pixel(1, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.pixel(2, 2), Some(GRAY));
        assert_eq!(surface.covered_pixels(), 12);
    }

    #[test]
    fn translucent_fill_blends_over_existing() {
        let mut surface = PixelSurface::new(1, 1);
        surface.fill_circle(0.5, 0.5, 1.0, Rgba::rgb(0, 0, 0));
        surface.fill_circle(
            0.5,
            0.5,
            1.0,
            Rgba {
                r: 255,
                g: 255,
                b: 255,
                a: 128,
            },
        );

        let px = surface.pixel(0, 0).unwrap();
        assert_eq!(px.a, 255);
        assert!((127..=129).contains(&px.r));
    }

    #[test]
    fn restore_without_save_is_harmless() {
        let mut surface = PixelSurface::new(2, 2);
        surface.restore();
        assert_eq!(surface.transform, Transform::IDENTITY);
    }

    #[test]
    fn resize_resets_pixels_and_transform() {
        let mut surface = PixelSurface::new(2, 2);
        surface.scale(3.0, 3.0);
        surface.fill_circle(0.0, 0.0, 5.0, GRAY);
        surface.resize(5, 4);

        assert_eq!((surface.width(), surface.height()), (5, 4));
        assert_eq!(surface.covered_pixels(), 0);
        assert_eq!(surface.transform, Transform::IDENTITY);
    }
}
