//! Drawing output for sketches.
//!
//! [`Surface`] is the narrow set of 2D raster commands the sketches need. The
//! browser implements it over `CanvasRenderingContext2d`; [`PixelSurface`]
//! is a software RGBA8 implementation for headless snapshots, and
//! [`RecordingSurface`] captures commands for assertions.

use glam::DVec2;

use crate::color::Srgb;
use crate::geometry::CanvasSize;

/// A 2D raster target.
pub trait Surface {
    /// Canvas-buffer size of the target.
    fn size(&self) -> CanvasSize;

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Paints a filled disc. `alpha <= 0` paints nothing; values above 1 are
    /// treated as 1.
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, alpha: f64);

    /// Replaces the surface content with a full-size RGBA8 image.
    fn put_rgba(&mut self, rgba: &[u8]);
}

/// Software RGBA8 raster with source-over blending.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    size: CanvasSize,
    pixels: Vec<u8>,
}

impl PixelSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            pixels: vec![0; size.width.saturating_mul(size.height).saturating_mul(4)],
        }
    }

    /// Raw RGBA8 buffer, row-major.
    pub fn rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = (y * self.size.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    fn blend(&mut self, x: usize, y: usize, rgb: [u8; 3], alpha: f64) {
        let i = (y * self.size.width + x) * 4;
        let dst_a = self.pixels[i + 3] as f64 / 255.0;
        let out_a = alpha + dst_a * (1.0 - alpha);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let src = rgb[c] as f64;
            let dst = self.pixels[i + c] as f64;
            let v = (src * alpha + dst * dst_a * (1.0 - alpha)) / out_a;
            self.pixels[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, alpha: f64) {
        if !(alpha > 0.0) || !(radius > 0.0) || self.size.is_empty() {
            return;
        }
        let alpha = alpha.min(1.0);
        let rgb = color.to_rgb8();
        let clamp_axis = |v: f64, len: usize| v.max(0.0).min(len as f64) as usize;
        let x0 = clamp_axis((center.x - radius).floor(), self.size.width);
        let x1 = clamp_axis((center.x + radius).ceil(), self.size.width);
        let y0 = clamp_axis((center.y - radius).floor(), self.size.height);
        let y1 = clamp_axis((center.y + radius).ceil(), self.size.height);
        let r2 = radius * radius;
        for y in y0..y1 {
            for x in x0..x1 {
                let d = DVec2::new(x as f64 + 0.5, y as f64 + 0.5) - center;
                if d.length_squared() <= r2 {
                    self.blend(x, y, rgb, alpha);
                }
            }
        }
    }

    fn put_rgba(&mut self, rgba: &[u8]) {
        let n = self.pixels.len().min(rgba.len());
        self.pixels[..n].copy_from_slice(&rgba[..n]);
    }
}

/// A draw command captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Circle {
        center: DVec2,
        radius: f64,
        color: Srgb,
        alpha: f64,
    },
    Image {
        len: usize,
    },
}

/// Records every command that would reach the raster.
///
/// Circles with `alpha <= 0` are dropped, mirroring what a real surface paints.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: CanvasSize,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Circles drawn since the last clear.
    pub fn circles_since_clear(&self) -> Vec<&DrawCommand> {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map_or(0, |i| i + 1);
        self.commands[start..]
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, alpha: f64) {
        if alpha > 0.0 {
            self.commands.push(DrawCommand::Circle {
                center,
                radius,
                color,
                alpha: alpha.min(1.0),
            });
        }
    }

    fn put_rgba(&mut self, rgba: &[u8]) {
        self.commands.push(DrawCommand::Image { len: rgba.len() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_transparent() {
        let s = PixelSurface::new(CanvasSize::new(4, 3));
        assert_eq!(s.rgba().len(), 48);
        assert_eq!(s.painted_pixels(), 0);
    }

    #[test]
    fn fill_circle_paints_disc_only() {
        let mut s = PixelSurface::new(CanvasSize::new(20, 20));
        s.fill_circle(DVec2::new(10.0, 10.0), 3.0, Srgb::WHITE, 1.0);
        assert_eq!(s.pixel(10, 10), Some([255, 255, 255, 255]));
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(s.pixel(10, 16), Some([0, 0, 0, 0]));
        let painted = s.painted_pixels();
        // Area of r=3 disc is ~28 px.
        assert!((20..=40).contains(&painted), "painted {painted}");
    }

    #[test]
    fn non_positive_alpha_paints_nothing() {
        let mut s = PixelSurface::new(CanvasSize::new(10, 10));
        s.fill_circle(DVec2::new(5.0, 5.0), 2.0, Srgb::WHITE, 0.0);
        s.fill_circle(DVec2::new(5.0, 5.0), 2.0, Srgb::WHITE, -0.4);
        s.fill_circle(DVec2::new(5.0, 5.0), 2.0, Srgb::WHITE, f64::NAN);
        assert_eq!(s.painted_pixels(), 0);
    }

    #[test]
    fn half_alpha_blends_over_transparent() {
        let mut s = PixelSurface::new(CanvasSize::new(4, 4));
        s.fill_circle(DVec2::new(2.0, 2.0), 1.0, Srgb::WHITE, 0.5);
        let px = s.pixel(1, 1).unwrap();
        assert_eq!(&px[..3], &[255, 255, 255]);
        assert_eq!(px[3], 128);
    }

    #[test]
    fn circle_partly_off_surface_is_clipped() {
        let mut s = PixelSurface::new(CanvasSize::new(5, 5));
        s.fill_circle(DVec2::new(-1.0, -1.0), 3.0, Srgb::WHITE, 1.0);
        s.fill_circle(DVec2::new(100.0, 100.0), 3.0, Srgb::WHITE, 1.0);
        assert!(s.painted_pixels() > 0);
        assert_eq!(s.pixel(4, 4), Some([0, 0, 0, 0]));
    }

    #[test]
    fn clear_and_put_rgba() {
        let mut s = PixelSurface::new(CanvasSize::new(2, 1));
        s.put_rgba(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(s.pixel(1, 0), Some([5, 6, 7, 8]));
        s.clear();
        assert_eq!(s.painted_pixels(), 0);
    }

    #[test]
    fn zero_sized_surface_ignores_draws() {
        let mut s = PixelSurface::new(CanvasSize::new(0, 0));
        s.fill_circle(DVec2::ZERO, 5.0, Srgb::WHITE, 1.0);
        assert!(s.rgba().is_empty());
        assert_eq!(s.pixel(0, 0), None);
    }

    #[test]
    fn recording_surface_drops_invisible_circles() {
        let mut s = RecordingSurface::new(CanvasSize::new(10, 10));
        s.clear();
        s.fill_circle(DVec2::ONE, 1.0, Srgb::WHITE, 0.0);
        s.fill_circle(DVec2::ONE, 1.0, Srgb::WHITE, 0.7);
        assert_eq!(s.commands().len(), 2);
        assert_eq!(s.circles_since_clear().len(), 1);
    }
}
