//! The `Sketch` trait shared by the particle swarm and the sphere.
//!
//! The trait is object-safe so hosts can drive either sketch as
//! `Box<dyn Sketch>` from the same frame loop and event wiring.

use glam::DVec2;
use serde_json::Value;

use crate::error::SwarmError;
use crate::geometry::{DisplayMapping, Viewport};
use crate::surface::Surface;

/// A frame-driven canvas visualization.
///
/// Hosts call [`frame`](Sketch::frame) once per display refresh with a
/// monotonic clock in milliseconds, and forward resize, pointer, and
/// activation events in between. All calls come from one thread in program
/// order.
pub trait Sketch {
    /// Draws one frame at host time `now`. Must not block.
    fn frame(&mut self, now: f64, surface: &mut dyn Surface);

    /// Rebuilds internal state for a new viewport.
    fn resize(&mut self, viewport: Viewport) -> Result<(), SwarmError>;

    /// Records the pointer position, given in device coordinates.
    fn pointer_moved(&mut self, device: DVec2, mapping: &DisplayMapping);

    /// The pointer left the page.
    fn pointer_left(&mut self) {}

    /// Handles a click or tap in device coordinates. Returns `true` if the
    /// activation changed the sketch's state.
    fn activate(&mut self, _device: DVec2, _mapping: &DisplayMapping, _now: f64) -> bool {
        false
    }

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing the tunable parameters.
    fn param_schema(&self) -> Value;
}
