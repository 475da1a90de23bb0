//! Text rasterization seam: coverage masks, layout anchoring, and a built-in
//! bitmap rasterizer for headless use.
//!
//! The browser rasterizes with the canvas font engine (see the wasm crate);
//! everything here only depends on the [`TextRasterizer`] contract: measure a
//! string, and render it right-aligned at a baseline into an [`AlphaMask`] the
//! size of the canvas.

use glam::DVec2;

use crate::config::FontSpec;
use crate::error::SwarmError;
use crate::geometry::{Bounds, CanvasSize};

/// Row-major 8-bit coverage buffer. A zero-sized mask is valid and empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl AlphaMask {
    /// Creates a fully transparent mask.
    pub fn new(size: CanvasSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0; size.width.saturating_mul(size.height)],
        }
    }

    /// Wraps an existing coverage buffer, validating its length.
    pub fn from_data(size: CanvasSize, data: Vec<u8>) -> Result<Self, SwarmError> {
        if Some(data.len()) != size.width.checked_mul(size.height) {
            return Err(SwarmError::Raster(format!(
                "coverage buffer of {} bytes does not match {}x{}",
                data.len(),
                size.width,
                size.height
            )));
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            data,
        })
    }

    /// Extracts the alpha channel of an RGBA8 buffer (e.g. canvas `ImageData`).
    pub fn from_rgba(size: CanvasSize, rgba: &[u8]) -> Result<Self, SwarmError> {
        let alpha = rgba.chunks_exact(4).map(|px| px[3]).collect();
        Self::from_data(size, alpha)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Coverage at `(x, y)`; out-of-range reads are transparent.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            0
        }
    }

    /// Sets every pixel whose center lies in `[x0, x1) x [y0, y1)` to `alpha`,
    /// clipped to the mask.
    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, alpha: u8) {
        let span = |lo: f64, hi: f64, len: usize| {
            let start = (lo - 0.5).ceil().max(0.0);
            let end = (hi - 0.5).ceil().min(len as f64);
            if end > start {
                start as usize..end as usize
            } else {
                0..0
            }
        };
        let xs = span(x0, x1, self.width);
        for y in span(y0, y1, self.height) {
            let row = y * self.width;
            self.data[row + xs.start..row + xs.end].fill(alpha);
        }
    }

    /// Resets the mask to fully transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&a| a == 0)
    }
}

/// Where text is placed: right-aligned at `right`, sitting on `baseline`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextAnchor {
    pub right: f64,
    pub baseline: f64,
}

/// Anchor and hit box of the credit text on a particular canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub anchor: TextAnchor,
    pub bounds: Bounds,
}

impl TextLayout {
    /// Right-margin-anchored layout: the right edge sits `margin` from the
    /// canvas's right edge and the baseline `margin` from its bottom. The hit
    /// box is `text_width` wide and `line_height * font_size` tall, bottom
    /// aligned with the baseline.
    pub fn anchored(
        canvas: CanvasSize,
        margin: f64,
        text_width: f64,
        font_size: f64,
        line_height: f64,
    ) -> Self {
        let right = canvas.width as f64 - margin;
        let baseline = canvas.height as f64 - margin;
        Self {
            anchor: TextAnchor { right, baseline },
            bounds: Bounds::new(
                DVec2::new(right - text_width, baseline - font_size * line_height),
                DVec2::new(right, baseline),
            ),
        }
    }
}

/// The host's text rendering capability.
pub trait TextRasterizer {
    /// Advance width of `text` in canvas pixels.
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64;

    /// Renders `text` at `anchor` into a canvas-sized coverage mask.
    fn rasterize(
        &mut self,
        text: &str,
        font: &FontSpec,
        anchor: TextAnchor,
        canvas: CanvasSize,
    ) -> Result<AlphaMask, SwarmError>;
}

const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;
/// Glyph cell plus one column of spacing.
const ADVANCE_CELLS: f64 = 6.0;
/// Cell edge as a fraction of the font size (cap height = 0.7 em).
const CELL_EM: f64 = 0.1;

const UNKNOWN_GLYPH: [u8; GLYPH_ROWS] = [
    0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
];

/// Rows of a 5x7 glyph, top to bottom; bit 4 is the leftmost column.
fn glyph(c: char) -> [u8; GLYPH_ROWS] {
    match c.to_ascii_uppercase() {
        ' ' => [0; GLYPH_ROWS],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0, 0, 0, 0, 0, 0b01100, 0b01100],
        ',' => [0, 0, 0, 0, 0b01100, 0b00100, 0b01000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0, 0b00100],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
        '\'' => [0b00100, 0b00100, 0b01000, 0, 0, 0, 0],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '@' => [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        _ => UNKNOWN_GLYPH,
    }
}

/// Deterministic 5x7 block-font rasterizer.
///
/// Ignores family and weight; only the size matters. Lowercase letters are
/// drawn as capitals and unsupported characters as a hollow box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapRasterizer;

impl TextRasterizer for BitmapRasterizer {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * ADVANCE_CELLS * CELL_EM * font.size
    }

    fn rasterize(
        &mut self,
        text: &str,
        font: &FontSpec,
        anchor: TextAnchor,
        canvas: CanvasSize,
    ) -> Result<AlphaMask, SwarmError> {
        let mut mask = AlphaMask::new(canvas);
        let cell = CELL_EM * font.size;
        let left = anchor.right - self.measure(text, font);
        let top = anchor.baseline - GLYPH_ROWS as f64 * cell;
        for (i, c) in text.chars().enumerate() {
            let origin_x = left + i as f64 * ADVANCE_CELLS * cell;
            for (row, bits) in glyph(c).iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                        continue;
                    }
                    let x0 = origin_x + col as f64 * cell;
                    let y0 = top + row as f64 * cell;
                    mask.fill_rect(x0, y0, x0 + cell, y0 + cell, u8::MAX);
                }
            }
        }
        Ok(mask)
    }
}
