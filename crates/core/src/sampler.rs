//! Converts rendered text into the sample points that seed particles.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::FontSpec;
use crate::error::SwarmError;
use crate::geometry::CanvasSize;
use crate::text::{AlphaMask, TextAnchor, TextRasterizer};

/// A lit location of the rasterized text mask, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vec2(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Grid walk over a coverage mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSampler {
    stride: usize,
    threshold: u8,
}

impl TextSampler {
    /// A stride of 0 is raised to 1.
    pub fn new(stride: usize, threshold: u8) -> Self {
        Self {
            stride: stride.max(1),
            threshold,
        }
    }

    /// Stride for a display: `round(pixel_ratio * multiplier)`, at least 1.
    pub fn stride_for(pixel_ratio: f64, multiplier: f64) -> usize {
        let stride = (pixel_ratio * multiplier).round();
        if stride.is_finite() && stride >= 1.0 {
            stride as usize
        } else {
            1
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Emits a point at every stride cell whose coverage exceeds the
    /// threshold, rows first.
    pub fn sample_mask(&self, mask: &AlphaMask) -> Vec<SamplePoint> {
        (0..mask.height())
            .step_by(self.stride)
            .flat_map(|y| {
                (0..mask.width())
                    .step_by(self.stride)
                    .map(move |x| (x, y))
            })
            .filter(|&(x, y)| mask.get(x, y) > self.threshold)
            .map(|(x, y)| SamplePoint::new(x as f64, y as f64))
            .collect()
    }

    /// Rasterizes `text` at `anchor` and samples the result. The scratch mask
    /// is cleared before it is dropped.
    pub fn sample(
        &self,
        rasterizer: &mut dyn TextRasterizer,
        text: &str,
        font: &FontSpec,
        anchor: TextAnchor,
        canvas: CanvasSize,
    ) -> Result<Vec<SamplePoint>, SwarmError> {
        if canvas.is_empty() || text.is_empty() {
            return Ok(Vec::new());
        }
        let mut mask = rasterizer.rasterize(text, font, anchor, canvas)?;
        let points = self.sample_mask(&mask);
        mask.clear();
        Ok(points)
    }
}
