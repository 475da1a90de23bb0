//! Text rasterization through an offscreen canvas.

use glyph_swarm_core::{AlphaMask, CanvasSize, FontSpec, SwarmError, TextAnchor, TextRasterizer};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

/// Draws text with the browser's font engine on a detached canvas and reads
/// back its alpha channel.
pub struct CanvasRasterizer {
    scratch: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRasterizer {
    pub fn new(document: &Document) -> Result<Self, SwarmError> {
        let scratch: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(raster_error)?
            .dyn_into()
            .map_err(|_| SwarmError::Raster("scratch element is not a canvas".into()))?;
        let ctx = context_2d(&scratch)?;
        Ok(Self { scratch, ctx })
    }
}

pub(crate) fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, SwarmError> {
    canvas
        .get_context("2d")
        .map_err(raster_error)?
        .ok_or_else(|| SwarmError::Raster("2d context unavailable".into()))?
        .dyn_into()
        .map_err(|_| SwarmError::Raster("context is not 2d".into()))
}

fn raster_error(e: wasm_bindgen::JsValue) -> SwarmError {
    SwarmError::Raster(format!("{e:?}"))
}

impl TextRasterizer for CanvasRasterizer {
    fn measure(&mut self, text: &str, font: &FontSpec) -> f64 {
        self.ctx.set_font(&font.css());
        self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
    }

    fn rasterize(
        &mut self,
        text: &str,
        font: &FontSpec,
        anchor: TextAnchor,
        canvas: CanvasSize,
    ) -> Result<AlphaMask, SwarmError> {
        if canvas.is_empty() {
            return Ok(AlphaMask::new(canvas));
        }
        let (w, h) = (canvas.width as u32, canvas.height as u32);
        // Resizing a canvas resets its context state, so set it every time.
        if self.scratch.width() != w || self.scratch.height() != h {
            self.scratch.set_width(w);
            self.scratch.set_height(h);
        }
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        self.ctx.set_font(&font.css());
        self.ctx.set_text_align("right");
        self.ctx.set_text_baseline("alphabetic");
        self.ctx.set_fill_style_str("#fff");
        self.ctx
            .fill_text(text, anchor.right, anchor.baseline)
            .map_err(raster_error)?;
        let image = self
            .ctx
            .get_image_data(0.0, 0.0, w as f64, h as f64)
            .map_err(raster_error)?;
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        AlphaMask::from_rgba(canvas, &image.data())
    }
}
