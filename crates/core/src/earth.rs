//! Rotating noise-shaded sphere.
//!
//! Each frame samples 3-D Perlin noise on the surface of a unit sphere turned
//! about its vertical axis, maps it to ocean or land shades, and applies a
//! fixed Lambert light. The pointer's horizontal position sets the contrast.
//! Output is a full-canvas RGBA8 image pushed with [`Surface::put_rgba`].

use glam::{DVec2, DVec3};
use noise::{NoiseFn, Perlin};
use serde_json::Value;

use crate::config::EarthConfig;
use crate::error::SwarmError;
use crate::geometry::{CanvasSize, DisplayMapping, Viewport};
use crate::sketch::Sketch;
use crate::surface::Surface;

/// Ambient floor of the Lambert term.
const AMBIENT: f64 = 0.15;

pub struct EarthSphere {
    config: EarthConfig,
    noise: Perlin,
    canvas: CanvasSize,
    pointer: Option<DVec2>,
    light: DVec3,
    pixels: Vec<u8>,
}

impl EarthSphere {
    pub fn new(config: EarthConfig, viewport: Viewport) -> Result<Self, SwarmError> {
        config.validate()?;
        let canvas = viewport.canvas_size().within_limit()?;
        Ok(Self {
            noise: Perlin::new(config.seed),
            config,
            canvas,
            pointer: None,
            light: DVec3::new(-0.4, -0.5, 0.75).normalize(),
            pixels: vec![0; rgba_len(canvas)],
        })
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Last rendered frame.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Contrast for the current pointer; the midpoint when there is none.
    pub fn contrast(&self) -> f64 {
        let t = match self.pointer {
            Some(p) if self.canvas.width > 0 => (p.x / self.canvas.width as f64).clamp(0.0, 1.0),
            _ => 0.5,
        };
        self.config.contrast_min + (self.config.contrast_max - self.config.contrast_min) * t
    }

    /// Renders the sphere at host time `now` into the internal buffer.
    pub fn render(&mut self, now: f64) {
        self.pixels.fill(0);
        if self.canvas.is_empty() {
            return;
        }
        let (w, h) = (self.canvas.width, self.canvas.height);
        let step = self.config.pixel_step.max(1) as usize;
        let center = self.canvas.as_vec2() * 0.5;
        let radius = self.config.radius_fraction * w.min(h) as f64;
        let (sin_t, cos_t) = (now * self.config.rotation_speed).sin_cos();
        let contrast = self.contrast();

        for by in (0..h).step_by(step) {
            for bx in (0..w).step_by(step) {
                let sample = DVec2::new(bx as f64, by as f64) + DVec2::splat(step as f64 * 0.5);
                let d = (sample - center) / radius;
                let r2 = d.length_squared();
                if r2 > 1.0 {
                    continue;
                }
                let normal = DVec3::new(d.x, d.y, (1.0 - r2).sqrt());
                let turned = DVec3::new(
                    normal.x * cos_t + normal.z * sin_t,
                    normal.y,
                    -normal.x * sin_t + normal.z * cos_t,
                ) * self.config.noise_scale;
                let n = (self.noise.get([turned.x, turned.y, turned.z]) + 1.0) * 0.5;
                let shade = (0.5 + (n.clamp(0.0, 1.0) - 0.5) * contrast).clamp(0.0, 1.0);
                let base = if shade > self.config.sea_level {
                    self.config.land.scale(0.6 + 0.4 * shade)
                } else {
                    self.config.ocean.scale(0.5 + 0.5 * shade)
                };
                let lambert = normal.dot(self.light).max(0.0) * (1.0 - AMBIENT) + AMBIENT;
                let [r, g, b] = base.scale(lambert).to_rgb8();
                self.fill_block(bx, by, step, [r, g, b, 255]);
            }
        }
    }

    fn fill_block(&mut self, x0: usize, y0: usize, step: usize, rgba: [u8; 4]) {
        let (w, h) = (self.canvas.width, self.canvas.height);
        for y in y0..(y0 + step).min(h) {
            for x in x0..(x0 + step).min(w) {
                let i = (y * w + x) * 4;
                self.pixels[i..i + 4].copy_from_slice(&rgba);
            }
        }
    }
}

impl Sketch for EarthSphere {
    fn frame(&mut self, now: f64, surface: &mut dyn Surface) {
        self.render(now);
        surface.clear();
        if !self.canvas.is_empty() {
            surface.put_rgba(&self.pixels);
        }
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), SwarmError> {
        self.canvas = viewport.canvas_size().within_limit()?;
        self.pixels = vec![0; rgba_len(self.canvas)];
        Ok(())
    }

    fn pointer_moved(&mut self, device: DVec2, mapping: &DisplayMapping) {
        self.pointer = Some(mapping.to_canvas(device));
    }

    fn pointer_left(&mut self) {
        self.pointer = None;
    }

    fn params(&self) -> Value {
        self.config.params()
    }

    fn param_schema(&self) -> Value {
        EarthConfig::param_schema()
    }
}

fn rgba_len(canvas: CanvasSize) -> usize {
    canvas.width.saturating_mul(canvas.height).saturating_mul(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, PixelSurface, RecordingSurface};

    fn sphere(w: f64, h: f64) -> EarthSphere {
        EarthSphere::new(EarthConfig::default(), Viewport::new(w, h, 1.0)).unwrap()
    }

    fn alpha_at(s: &EarthSphere, x: usize, y: usize) -> u8 {
        s.pixels()[(y * s.canvas().width + x) * 4 + 3]
    }

    #[test]
    fn disc_is_opaque_and_corners_transparent() {
        let mut s = sphere(200.0, 100.0);
        s.render(0.0);
        assert_eq!(alpha_at(&s, 100, 50), 255);
        assert_eq!(alpha_at(&s, 0, 0), 0);
        assert_eq!(alpha_at(&s, 199, 99), 0);
        // Radius is 0.35 * 100 = 35 px.
        assert_eq!(alpha_at(&s, 100 + 40, 50), 0);
    }

    #[test]
    fn render_is_deterministic() {
        let mut a = sphere(120.0, 120.0);
        let mut b = sphere(120.0, 120.0);
        a.render(1234.0);
        b.render(1234.0);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn sphere_rotates_over_time() {
        let mut s = sphere(120.0, 120.0);
        s.render(0.0);
        let first = s.pixels().to_vec();
        s.render(5000.0);
        assert_ne!(first, s.pixels());
    }

    #[test]
    fn pointer_x_drives_contrast() {
        let mut s = sphere(120.0, 120.0);
        assert!((s.contrast() - 1.2).abs() < 1e-12);
        s.pointer_moved(DVec2::new(0.0, 60.0), &DisplayMapping::identity());
        assert!((s.contrast() - 0.6).abs() < 1e-12);
        s.render(0.0);
        let low = s.pixels().to_vec();
        s.pointer_moved(DVec2::new(500.0, 60.0), &DisplayMapping::identity());
        assert!((s.contrast() - 1.8).abs() < 1e-12);
        s.render(0.0);
        assert_ne!(low, s.pixels());
        s.pointer_left();
        assert!((s.contrast() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn frame_pushes_full_image() {
        let mut s = sphere(40.0, 30.0);
        let mut surface = RecordingSurface::new(s.canvas());
        s.frame(0.0, &mut surface);
        assert_eq!(
            surface.commands(),
            &[DrawCommand::Clear, DrawCommand::Image { len: 40 * 30 * 4 }]
        );
    }

    #[test]
    fn frame_paints_pixel_surface() {
        let mut s = sphere(64.0, 64.0);
        let mut surface = PixelSurface::new(s.canvas());
        s.frame(0.0, &mut surface);
        assert!(surface.painted_pixels() > 0);
    }

    #[test]
    fn empty_canvas_renders_nothing() {
        let mut s = sphere(0.0, 0.0);
        let mut surface = RecordingSurface::new(CanvasSize::default());
        s.frame(0.0, &mut surface);
        assert_eq!(surface.commands(), &[DrawCommand::Clear]);
    }

    #[test]
    fn resize_reallocates_buffer() {
        let mut s = sphere(10.0, 10.0);
        s.resize(Viewport::new(20.0, 10.0, 2.0)).unwrap();
        assert_eq!(s.canvas(), CanvasSize::new(40, 20));
        assert_eq!(s.pixels().len(), 40 * 20 * 4);
    }

    #[test]
    fn oversized_viewport_is_rejected() {
        let huge = Viewport::new(1e7, 1e7, 1.0);
        assert!(matches!(
            EarthSphere::new(EarthConfig::default(), huge),
            Err(SwarmError::InvalidDimensions)
        ));
        let mut s = sphere(10.0, 10.0);
        assert!(matches!(s.resize(huge), Err(SwarmError::InvalidDimensions)));
        assert_eq!(s.canvas(), CanvasSize::new(10, 10));
    }

    #[test]
    fn different_seeds_render_different_spheres() {
        let render = |seed: u32| {
            let config = EarthConfig {
                seed,
                ..EarthConfig::default()
            };
            let mut s = EarthSphere::new(config, Viewport::new(96.0, 96.0, 1.0)).unwrap();
            s.render(0.0);
            s.pixels().to_vec()
        };
        assert_ne!(render(7), render(8));
        assert_eq!(render(7), render(7));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EarthConfig {
            pixel_step: 0,
            ..EarthConfig::default()
        };
        assert!(EarthSphere::new(config, Viewport::new(10.0, 10.0, 1.0)).is_err());
    }
}
