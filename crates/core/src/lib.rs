#![deny(unsafe_code)]
//! Core types for the glyph-swarm canvas sketches.
//!
//! Provides the text [`TextSampler`], the [`Particle`] physics, the
//! [`ParticleField`]/[`Swarm`] controller with its explode-then-redirect
//! lifecycle, the [`EarthSphere`] noise sketch, the [`Sketch`] trait both
//! implement, and the host seams they draw through ([`Surface`],
//! [`TextRasterizer`], [`RedirectScheduler`], [`RandomSource`]).

pub mod color;
pub mod config;
pub mod earth;
pub mod error;
pub mod field;
pub mod geometry;
pub mod params;
pub mod particle;
pub mod prng;
pub mod redirect;
pub mod sampler;
pub mod sketch;
pub mod surface;
pub mod text;

pub use color::Srgb;
pub use config::{EarthConfig, FontSpec, SwarmConfig};
pub use earth::EarthSphere;
pub use error::SwarmError;
pub use field::{FieldState, ParticleField, Swarm, SwarmSnapshot};
pub use geometry::{Bounds, CanvasSize, DisplayMapping, Viewport};
pub use particle::{Explosion, Particle, ParticlePhysics};
pub use prng::{RandomSource, ScriptedRandom, Xorshift64};
pub use redirect::{RedirectScheduler, TimerQueue};
pub use sampler::{SamplePoint, TextSampler};
pub use sketch::Sketch;
pub use surface::{PixelSurface, RecordingSurface, Surface};
pub use text::{AlphaMask, BitmapRasterizer, TextAnchor, TextLayout, TextRasterizer};
