//! Browser bindings for the glyph-swarm sketches.
//!
//! `start_swarm` and `start_earth` mount a sketch on an existing `<canvas>`,
//! size it to the window, wire pointer, click, touch, and resize events, and
//! drive it from `requestAnimationFrame`. Setup failures are reported to the
//! console; the page keeps working without the sketch.

mod surface;
mod text;

use glam::DVec2;
use glyph_swarm_core::{
    DisplayMapping, EarthConfig, EarthSphere, RedirectScheduler, Sketch, Swarm, SwarmConfig,
    SwarmError, Viewport, Xorshift64,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, Window};

pub use surface::Canvas2dSurface;
pub use text::CanvasRasterizer;

pub(crate) fn log_error(e: &JsValue) {
    web_sys::console::error_1(e);
}

fn to_js(e: SwarmError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_config(config_json: Option<String>) -> Result<serde_json::Value, JsValue> {
    match config_json.as_deref().map(str::trim) {
        None | Some("") => Ok(serde_json::Value::Null),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| JsValue::from_str(&format!("invalid config JSON: {e}"))),
    }
}

/// Schedules navigation with `setTimeout`.
struct WindowRedirect {
    window: Window,
}

impl RedirectScheduler for WindowRedirect {
    fn schedule(&mut self, _now: f64, delay_ms: f64, url: &str) {
        let url = url.to_owned();
        let window = self.window.clone();
        let navigate = Closure::once_into_js(move || {
            if let Err(e) = window.location().set_href(&url) {
                log_error(&e);
            }
        });
        let result = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                navigate.unchecked_ref(),
                delay_ms.round() as i32,
            );
        if let Err(e) = result {
            log_error(&e);
        }
    }
}

/// Mounted sketch plus the canvas it draws to.
struct Host {
    window: Window,
    canvas: HtmlCanvasElement,
    surface: Canvas2dSurface,
    sketch: Box<dyn Sketch>,
}

impl Host {
    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Maps client coordinates onto the canvas backing store.
    fn mapping(&self) -> DisplayMapping {
        let rect = self.canvas.get_bounding_client_rect();
        DisplayMapping::new(
            DVec2::new(rect.left(), rect.top()),
            DVec2::new(rect.width(), rect.height()),
            self.surface_size(),
        )
    }

    fn surface_size(&self) -> glyph_swarm_core::CanvasSize {
        glyph_swarm_core::Surface::size(&self.surface)
    }

    fn resize(&mut self) {
        let viewport = window_viewport(&self.window);
        let size = viewport.canvas_size();
        self.canvas.set_width(size.width as u32);
        self.canvas.set_height(size.height as u32);
        self.surface.set_size(size);
        if let Err(e) = self.sketch.resize(viewport) {
            log_error(&to_js(e));
        }
    }

    fn frame(&mut self, now: f64) {
        self.sketch.frame(now, &mut self.surface);
    }
}

fn window_viewport(window: &Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(
        dim(window.inner_width()),
        dim(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

/// Client position of a mouse event or of the first touch point.
fn event_point(ev: &Event) -> Option<DVec2> {
    if let Some(m) = ev.dyn_ref::<MouseEvent>() {
        return Some(DVec2::new(m.client_x() as f64, m.client_y() as f64));
    }
    let touch = ev.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some(DVec2::new(touch.client_x() as f64, touch.client_y() as f64))
}

fn listen(
    target: &EventTarget,
    name: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn acquire(canvas_id: &str) -> Result<(Window, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{canvas_id}")))?
        .dyn_into::<HtmlCanvasElement>()?;
    Ok((window, canvas))
}

fn mount(window: Window, canvas: HtmlCanvasElement, sketch: Box<dyn Sketch>) -> Result<(), JsValue> {
    let viewport = window_viewport(&window);
    let size = viewport.canvas_size();
    canvas.set_width(size.width as u32);
    canvas.set_height(size.height as u32);
    let ctx = text::context_2d(&canvas).map_err(to_js)?;
    let host = Rc::new(RefCell::new(Host {
        window: window.clone(),
        canvas,
        surface: Canvas2dSurface::new(ctx, size),
        sketch,
    }));

    for name in ["mousemove", "touchmove"] {
        let host = host.clone();
        listen(&window, name, move |ev| {
            if let Some(p) = event_point(&ev) {
                let mut host = host.borrow_mut();
                let mapping = host.mapping();
                host.sketch.pointer_moved(p, &mapping);
            }
        })?;
    }
    {
        let host = host.clone();
        // mouseout with no related target means the pointer left the window.
        listen(&window, "mouseout", move |ev| {
            let left = ev
                .dyn_ref::<MouseEvent>()
                .is_some_and(|m| m.related_target().is_none());
            if left {
                host.borrow_mut().sketch.pointer_left();
            }
        })?;
    }
    for name in ["click", "touchstart"] {
        let host = host.clone();
        listen(&window, name, move |ev| {
            if let Some(p) = event_point(&ev) {
                let mut host = host.borrow_mut();
                let (mapping, now) = (host.mapping(), host.now());
                host.sketch.activate(p, &mapping, now);
            }
        })?;
    }
    {
        let host = host.clone();
        listen(&window, "resize", move |_| host.borrow_mut().resize())?;
    }

    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        host.borrow_mut().frame(now);
        if let Some(cb) = f.borrow().as_ref() {
            if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                log_error(&e);
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(cb) = g.borrow().as_ref() {
        web_sys::window()
            .ok_or("no window")?
            .request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

fn try_start_swarm(canvas_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    let config = SwarmConfig::from_json(&parse_config(config_json)?).map_err(to_js)?;
    let (window, canvas) = acquire(canvas_id)?;
    let document = window.document().ok_or("no document")?;
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64 ^ js_sys::Date::now() as u64;
    let swarm = Swarm::new(
        config,
        window_viewport(&window),
        Box::new(CanvasRasterizer::new(&document).map_err(to_js)?),
        Box::new(WindowRedirect {
            window: window.clone(),
        }),
        Box::new(Xorshift64::new(seed)),
    )
    .map_err(to_js)?;
    mount(window, canvas, Box::new(swarm))
}

fn try_start_earth(canvas_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    let config = EarthConfig::from_json(&parse_config(config_json)?).map_err(to_js)?;
    let (window, canvas) = acquire(canvas_id)?;
    let sphere = EarthSphere::new(config, window_viewport(&window)).map_err(to_js)?;
    mount(window, canvas, Box::new(sphere))
}

/// Mounts the text swarm on `#canvas_id`. `config_json` overlays the
/// default swarm configuration.
#[wasm_bindgen]
pub fn start_swarm(canvas_id: &str, config_json: Option<String>) {
    if let Err(e) = try_start_swarm(canvas_id, config_json) {
        log_error(&e);
    }
}

/// Mounts the rotating sphere on `#canvas_id`.
#[wasm_bindgen]
pub fn start_earth(canvas_id: &str, config_json: Option<String>) {
    if let Err(e) = try_start_earth(canvas_id, config_json) {
        log_error(&e);
    }
}

/// Default swarm configuration and its schema, as JSON.
#[wasm_bindgen]
pub fn swarm_param_schema() -> String {
    serde_json::json!({
        "defaults": SwarmConfig::default().params(),
        "schema": SwarmConfig::param_schema(),
    })
    .to_string()
}
