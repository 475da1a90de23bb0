use glam::DVec2;
use glyph_swarm_core::{CanvasSize, Srgb, Surface};
use std::f64::consts::TAU;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, ImageData};

/// [`Surface`] over a 2D canvas context.
pub struct Canvas2dSurface {
    ctx: CanvasRenderingContext2d,
    size: CanvasSize,
}

impl Canvas2dSurface {
    pub fn new(ctx: CanvasRenderingContext2d, size: CanvasSize) -> Self {
        Self { ctx, size }
    }

    /// Call after the canvas backing store has been resized.
    pub fn set_size(&mut self, size: CanvasSize) {
        self.size = size;
    }
}

impl Surface for Canvas2dSurface {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.size.width as f64, self.size.height as f64);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb, alpha: f64) {
        if alpha <= 0.0 {
            return;
        }
        self.ctx.begin_path();
        self.ctx.set_fill_style_str(&color.css_rgba(alpha));
        if self.ctx.arc(center.x, center.y, radius, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }

    fn put_rgba(&mut self, rgba: &[u8]) {
        if self.size.is_empty() {
            return;
        }
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(rgba),
            self.size.width as u32,
            self.size.height as u32,
        );
        match image {
            Ok(image) => {
                if let Err(e) = self.ctx.put_image_data(&image, 0.0, 0.0) {
                    crate::log_error(&e);
                }
            }
            Err(e) => crate::log_error(&e),
        }
    }
}
