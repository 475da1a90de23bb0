//! Viewport, canvas-buffer size, device-to-canvas mapping, and text bounds.
//!
//! All particle math happens in canvas-buffer pixels. The host reports sizes in
//! CSS pixels plus a display pixel ratio, and pointer positions in device
//! (client) coordinates; this module converts between the two.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::SwarmError;

/// Largest backing store, in pixels, that sketches will allocate.
pub const MAX_CANVAS_PIXELS: usize = 16_384 * 16_384;

/// Host viewport as reported by the page: CSS size plus display pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub css_width: f64,
    pub css_height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(css_width: f64, css_height: f64, pixel_ratio: f64) -> Self {
        Self {
            css_width,
            css_height,
            pixel_ratio,
        }
    }

    /// Pixel ratio with non-finite or non-positive values replaced by 1.
    pub fn effective_ratio(&self) -> f64 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }

    /// Backing-store size of a canvas that fills this viewport.
    ///
    /// Negative or non-finite CSS sizes collapse to zero.
    pub fn canvas_size(&self) -> CanvasSize {
        let ratio = self.effective_ratio();
        let px = |css: f64| {
            let v = (css * ratio).round();
            if v.is_finite() && v > 0.0 {
                v as usize
            } else {
                0
            }
        };
        CanvasSize::new(px(self.css_width), px(self.css_height))
    }
}

/// Canvas backing-store dimensions in pixels. Zero is a valid, empty canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: usize,
    pub height: usize,
}

impl CanvasSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_vec2(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }

    /// Returns `self` unless its area exceeds [`MAX_CANVAS_PIXELS`].
    /// Empty sizes pass.
    pub fn within_limit(self) -> Result<Self, SwarmError> {
        match self.width.checked_mul(self.height) {
            Some(area) if area <= MAX_CANVAS_PIXELS => Ok(self),
            _ => Err(SwarmError::InvalidDimensions),
        }
    }
}

/// Maps device coordinates onto canvas-buffer coordinates.
///
/// `origin` and `display_size` describe the canvas element's on-screen box
/// (its bounding client rect); `buffer` is its backing-store size. The scale
/// absorbs both the pixel ratio and any CSS stretching of the element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    origin: DVec2,
    scale: DVec2,
}

impl DisplayMapping {
    /// Identity mapping: device coordinates are already canvas coordinates.
    pub fn identity() -> Self {
        Self {
            origin: DVec2::ZERO,
            scale: DVec2::ONE,
        }
    }

    /// Builds the mapping for an element box at `origin` of `display_size`
    /// whose backing store is `buffer`. A degenerate axis maps with scale 1.
    pub fn new(origin: DVec2, display_size: DVec2, buffer: CanvasSize) -> Self {
        let axis = |buffer: f64, display: f64| {
            if display > 0.0 && display.is_finite() {
                buffer / display
            } else {
                1.0
            }
        };
        Self {
            origin,
            scale: DVec2::new(
                axis(buffer.width as f64, display_size.x),
                axis(buffer.height as f64, display_size.y),
            ),
        }
    }

    pub fn to_canvas(&self, device: DVec2) -> DVec2 {
        (device - self.origin) * self.scale
    }

    pub fn scale(&self) -> DVec2 {
        self.scale
    }
}

impl Default for DisplayMapping {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned rectangle in canvas pixels; `contains` is edge-inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}
