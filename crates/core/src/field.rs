//! The particle field and the controller that owns it.
//!
//! A [`ParticleField`] is one instance of the rendered text: its particles,
//! hit box, and lifecycle state. The [`Swarm`] controller owns the current
//! field plus everything that outlives it (config, pointer, rasterizer,
//! randomness, redirect scheduler) and replaces the field wholesale on resize.
//!
//! Lifecycle per field: `Idle` -> `Exploding` on an activation inside the text
//! bounds, then `Redirecting` once the explosion duration has elapsed. There
//! is no way back; a resize builds a fresh `Idle` field instead.

use glam::DVec2;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::color::Srgb;
use crate::config::SwarmConfig;
use crate::error::SwarmError;
use crate::geometry::{Bounds, CanvasSize, DisplayMapping, Viewport};
use crate::particle::{Explosion, Particle, ParticlePhysics};
use crate::prng::RandomSource;
use crate::redirect::RedirectScheduler;
use crate::sampler::{SamplePoint, TextSampler};
use crate::sketch::Sketch;
use crate::surface::Surface;
use crate::text::{TextLayout, TextRasterizer};

/// Lifecycle of one field instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FieldState {
    Idle,
    Exploding { explosion: Explosion },
    Redirecting { explosion: Explosion },
}

impl FieldState {
    /// Explosion timing once the field has left `Idle`.
    pub fn explosion(&self) -> Option<&Explosion> {
        match self {
            FieldState::Idle => None,
            FieldState::Exploding { explosion } | FieldState::Redirecting { explosion } => {
                Some(explosion)
            }
        }
    }

    /// True from the first qualifying activation onward.
    pub fn is_exploding(&self) -> bool {
        !matches!(self, FieldState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldState::Idle => "idle",
            FieldState::Exploding { .. } => "exploding",
            FieldState::Redirecting { .. } => "redirecting",
        }
    }
}

/// One instance of the text as particles.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    generation: u64,
    canvas: CanvasSize,
    layout: TextLayout,
    particles: Vec<Particle>,
    state: FieldState,
}

impl ParticleField {
    /// Builds an `Idle` field with one particle per sample point, in order.
    pub fn from_points(
        generation: u64,
        canvas: CanvasSize,
        layout: TextLayout,
        points: &[SamplePoint],
        particle_radius: f64,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let particles = points
            .iter()
            .map(|&p| Particle::new(p, particle_radius, rng))
            .collect();
        Self {
            generation,
            canvas,
            layout,
            particles,
            state: FieldState::Idle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn bounds(&self) -> Bounds {
        self.layout.bounds
    }

    pub fn layout(&self) -> TextLayout {
        self.layout
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn is_exploding(&self) -> bool {
        self.state.is_exploding()
    }

    /// Starts the explosion if the field is still `Idle`: records the start
    /// time and launches every particle exactly once. Returns `false` (and
    /// changes nothing) if the field already exploded.
    pub fn explode(
        &mut self,
        now: f64,
        duration_ms: f64,
        fade_ms: f64,
        physics: &ParticlePhysics,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if self.state.is_exploding() {
            return false;
        }
        self.state = FieldState::Exploding {
            explosion: Explosion {
                started_at: now,
                duration_ms,
                fade_ms,
            },
        };
        for particle in &mut self.particles {
            particle.explode(rng, physics);
        }
        true
    }

    /// Clears the surface, then updates and draws every particle in order.
    pub fn tick(
        &mut self,
        now: f64,
        pointer: Option<DVec2>,
        physics: &ParticlePhysics,
        color: Srgb,
        surface: &mut dyn Surface,
    ) {
        if let FieldState::Exploding { explosion } = self.state {
            if explosion.is_complete(now) {
                self.state = FieldState::Redirecting { explosion };
            }
        }
        let explosion = self.state.explosion().copied();
        surface.clear();
        for particle in &mut self.particles {
            particle.update(now, pointer, explosion.as_ref(), physics);
            particle.draw(surface, color);
        }
    }
}

/// Serializable summary of the controller, for logs and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct SwarmSnapshot {
    pub generation: u64,
    pub state: FieldState,
    pub particles: usize,
    pub visible_particles: usize,
    pub canvas: CanvasSize,
    pub bounds: Bounds,
    pub pointer: Option<DVec2>,
}

/// Controller for the text particle swarm.
pub struct Swarm {
    config: SwarmConfig,
    physics: ParticlePhysics,
    rasterizer: Box<dyn TextRasterizer>,
    scheduler: Box<dyn RedirectScheduler>,
    rng: Box<dyn RandomSource>,
    viewport: Viewport,
    pointer: Option<DVec2>,
    field: ParticleField,
}

impl Swarm {
    /// Validates `config`, samples the text for `viewport`, and builds the
    /// first field. The host starts its frame loop afterwards.
    pub fn new(
        config: SwarmConfig,
        viewport: Viewport,
        mut rasterizer: Box<dyn TextRasterizer>,
        scheduler: Box<dyn RedirectScheduler>,
        mut rng: Box<dyn RandomSource>,
    ) -> Result<Self, SwarmError> {
        config.validate()?;
        let field = build_field(&config, viewport, 1, rasterizer.as_mut(), rng.as_mut())?;
        Ok(Self {
            physics: ParticlePhysics::from(&config),
            config,
            rasterizer,
            scheduler,
            rng,
            viewport,
            pointer: None,
            field,
        })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pointer(&self) -> Option<DVec2> {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Re-samples for `viewport` and replaces the whole field. The previous
    /// field is dropped wherever it was in its lifecycle; a redirect it
    /// already scheduled is left to fire.
    pub fn on_viewport_resize(&mut self, viewport: Viewport) -> Result<(), SwarmError> {
        let generation = self.field.generation + 1;
        let field = build_field(
            &self.config,
            viewport,
            generation,
            self.rasterizer.as_mut(),
            self.rng.as_mut(),
        )?;
        if self.field.is_exploding() {
            debug!(
                retired = self.field.generation,
                "replacing field mid-explosion"
            );
        }
        self.viewport = viewport;
        self.field = field;
        Ok(())
    }

    /// Records the latest pointer position in canvas pixels.
    pub fn on_pointer_move(&mut self, device: DVec2, mapping: &DisplayMapping) {
        self.pointer = Some(mapping.to_canvas(device));
    }

    /// Forgets the pointer (e.g. it left the page).
    pub fn on_pointer_leave(&mut self) {
        self.pointer = None;
    }

    /// Handles a click or tap. Explodes the field and schedules the redirect
    /// if the point is inside the text bounds and the field is still idle.
    pub fn on_activate(&mut self, device: DVec2, mapping: &DisplayMapping, now: f64) -> bool {
        let point = mapping.to_canvas(device);
        if !self.field.bounds().contains(point) {
            return false;
        }
        let started = self.field.explode(
            now,
            self.config.explosion_duration_ms,
            self.config.fade_duration_ms,
            &self.physics,
            self.rng.as_mut(),
        );
        if !started {
            debug!(generation = self.field.generation, "activation ignored, already exploding");
            return false;
        }
        info!(
            generation = self.field.generation,
            particles = self.field.particles.len(),
            delay_ms = self.config.explosion_duration_ms,
            url = %self.config.redirect_url,
            "explosion started, redirect scheduled"
        );
        self.scheduler
            .schedule(now, self.config.explosion_duration_ms, &self.config.redirect_url);
        true
    }

    /// Draws one frame.
    pub fn tick(&mut self, now: f64, surface: &mut dyn Surface) {
        self.field
            .tick(now, self.pointer, &self.physics, self.config.color, surface);
    }

    pub fn snapshot(&self) -> SwarmSnapshot {
        SwarmSnapshot {
            generation: self.field.generation,
            state: self.field.state,
            particles: self.field.particles.len(),
            visible_particles: self
                .field
                .particles
                .iter()
                .filter(|p| p.alpha() > 0.0)
                .count(),
            canvas: self.field.canvas,
            bounds: self.field.bounds(),
            pointer: self.pointer,
        }
    }
}

impl Sketch for Swarm {
    fn frame(&mut self, now: f64, surface: &mut dyn Surface) {
        self.tick(now, surface);
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), SwarmError> {
        self.on_viewport_resize(viewport)
    }

    fn pointer_moved(&mut self, device: DVec2, mapping: &DisplayMapping) {
        self.on_pointer_move(device, mapping);
    }

    fn pointer_left(&mut self) {
        self.on_pointer_leave();
    }

    fn activate(&mut self, device: DVec2, mapping: &DisplayMapping, now: f64) -> bool {
        self.on_activate(device, mapping, now)
    }

    fn params(&self) -> Value {
        self.config.params()
    }

    fn param_schema(&self) -> Value {
        SwarmConfig::param_schema()
    }
}

/// Lays out and samples the text for `viewport`, then builds a field.
fn build_field(
    config: &SwarmConfig,
    viewport: Viewport,
    generation: u64,
    rasterizer: &mut dyn TextRasterizer,
    rng: &mut dyn RandomSource,
) -> Result<ParticleField, SwarmError> {
    let ratio = viewport.effective_ratio();
    let canvas = viewport.canvas_size().within_limit()?;
    let font = config.font(ratio);
    let text_width = rasterizer.measure(&config.text, &font);
    let layout = TextLayout::anchored(
        canvas,
        config.margin * ratio,
        text_width,
        font.size,
        config.line_height,
    );
    let sampler = TextSampler::new(
        TextSampler::stride_for(ratio, config.stride_multiplier),
        config.coverage_threshold,
    );
    let points = sampler.sample(rasterizer, &config.text, &font, layout.anchor, canvas)?;
    if points.is_empty() && !canvas.is_empty() {
        warn!(
            width = canvas.width,
            height = canvas.height,
            "text sampling produced no points"
        );
    }
    debug!(
        generation,
        particles = points.len(),
        stride = sampler.stride(),
        "built particle field"
    );
    Ok(ParticleField::from_points(
        generation,
        canvas,
        layout,
        &points,
        config.particle_radius * ratio,
        rng,
    ))
}
