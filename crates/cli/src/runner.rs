//! Headless frame loops for the sketches.
//!
//! The swarm run replays a scripted pointer and activation against a manual
//! clock, so the redirect that a browser would perform shows up as a fired
//! entry in the outcome instead.

use glam::DVec2;
use glyph_swarm_core::{
    BitmapRasterizer, DisplayMapping, EarthConfig, EarthSphere, PixelSurface, Sketch, Swarm,
    SwarmConfig, SwarmError, SwarmSnapshot, TimerQueue, Viewport, Xorshift64,
};
use tracing::{debug, info};

/// Scripted input for a swarm run. Positions are in CSS pixels.
#[derive(Debug, Clone, Default)]
pub struct SwarmScript {
    pub frames: usize,
    pub frame_ms: f64,
    pub pointer: Option<DVec2>,
    pub activate_at: Option<usize>,
    /// Defaults to the centre of the text.
    pub activate_pos: Option<DVec2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiredRedirect {
    pub frame: usize,
    pub due_at: f64,
    pub url: String,
}

pub struct SwarmOutcome {
    pub surface: PixelSurface,
    pub snapshot: SwarmSnapshot,
    pub activated: bool,
    pub redirects: Vec<FiredRedirect>,
}

/// Maps CSS-pixel positions onto the backing store, as a full-page canvas would.
fn page_mapping(viewport: Viewport) -> DisplayMapping {
    DisplayMapping::new(
        DVec2::ZERO,
        DVec2::new(viewport.css_width, viewport.css_height),
        viewport.canvas_size(),
    )
}

pub fn run_swarm(
    config: SwarmConfig,
    viewport: Viewport,
    seed: u64,
    script: &SwarmScript,
) -> Result<SwarmOutcome, SwarmError> {
    let timers = TimerQueue::new();
    let mut swarm = Swarm::new(
        config,
        viewport,
        Box::new(BitmapRasterizer),
        Box::new(timers.clone()),
        Box::new(Xorshift64::new(seed)),
    )?;
    let mapping = page_mapping(viewport);
    let mut surface = PixelSurface::new(viewport.canvas_size());
    info!(
        particles = swarm.field().particles().len(),
        frames = script.frames,
        "swarm run started"
    );

    if let Some(p) = script.pointer {
        swarm.on_pointer_move(p, &mapping);
    }

    let mut activated = false;
    let mut redirects = Vec::new();
    for frame in 0..script.frames {
        let now = frame as f64 * script.frame_ms;
        if script.activate_at == Some(frame) {
            let pos = script.activate_pos.unwrap_or_else(|| {
                let b = swarm.field().bounds();
                (b.min + b.max) * 0.5 / mapping.scale()
            });
            activated = swarm.on_activate(pos, &mapping, now);
            debug!(frame, activated, "activation");
        }
        for r in timers.advance(now) {
            info!(frame, url = %r.url, "redirect fired");
            redirects.push(FiredRedirect {
                frame,
                due_at: r.due_at,
                url: r.url,
            });
        }
        swarm.tick(now, &mut surface);
    }

    Ok(SwarmOutcome {
        surface,
        snapshot: swarm.snapshot(),
        activated,
        redirects,
    })
}

/// Renders one sphere frame at `time_ms`, optionally with the pointer at a
/// CSS-pixel position.
pub fn run_earth(
    config: EarthConfig,
    viewport: Viewport,
    time_ms: f64,
    pointer: Option<DVec2>,
) -> Result<(PixelSurface, f64), SwarmError> {
    let mut sphere = EarthSphere::new(config, viewport)?;
    if let Some(p) = pointer {
        sphere.pointer_moved(p, &page_mapping(viewport));
    }
    let mut surface = PixelSurface::new(sphere.canvas());
    sphere.frame(time_ms, &mut surface);
    Ok((surface, sphere.contrast()))
}
