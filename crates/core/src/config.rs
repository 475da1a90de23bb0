//! Tunable constants for the particle swarm and the sphere sketch.
//!
//! Defaults reproduce the shipped behavior. Hosts may overlay a JSON object
//! with [`SwarmConfig::from_json`]; unknown keys are ignored and mistyped
//! values fall back to the default for that key.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::color::Srgb;
use crate::error::SwarmError;
use crate::params::{expect_object, param_f64, param_string, param_u64};

pub const DEFAULT_TEXT: &str = "made by hand";
pub const DEFAULT_REDIRECT_URL: &str = "https://example.com/";
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_FONT_WEIGHT: &str = "bold";
/// CSS pixels; multiplied by the pixel ratio at layout time.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;
/// Distance of the text's right edge and baseline from the canvas edges, CSS pixels.
pub const DEFAULT_MARGIN: f64 = 20.0;
/// Hit box height as a multiple of the font size.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;
pub const DEFAULT_EXPLOSION_DURATION_MS: f64 = 1500.0;
pub const DEFAULT_FADE_DURATION_MS: f64 = 500.0;
pub const DEFAULT_INTERACTION_RADIUS: f64 = 35.0;
pub const DEFAULT_STRIDE_MULTIPLIER: f64 = 3.0;
/// Alpha above which a rasterized pixel counts as part of the text.
pub const DEFAULT_COVERAGE_THRESHOLD: u8 = 200;
pub const DEFAULT_SPRING: f64 = 0.05;
pub const DEFAULT_DAMPING: f64 = 0.9;
pub const DEFAULT_PARTICLE_RADIUS: f64 = 1.5;
pub const DEFAULT_EXPLODE_SPEED_MIN: f64 = 2.0;
pub const DEFAULT_EXPLODE_SPEED_MAX: f64 = 7.0;
pub const DEFAULT_JITTER_AMPLITUDE: f64 = 0.1;

/// Font description handed to a [`TextRasterizer`](crate::text::TextRasterizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub weight: String,
    /// Size in canvas-buffer pixels.
    pub size: f64,
}

impl FontSpec {
    /// CSS shorthand, e.g. `bold 24px sans-serif`.
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight, self.size, self.family)
    }
}

/// Configuration for the text particle swarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub text: String,
    pub redirect_url: String,
    pub font_family: String,
    pub font_weight: String,
    pub font_size: f64,
    pub margin: f64,
    pub line_height: f64,
    pub explosion_duration_ms: f64,
    pub fade_duration_ms: f64,
    pub interaction_radius: f64,
    pub stride_multiplier: f64,
    pub coverage_threshold: u8,
    pub spring: f64,
    pub damping: f64,
    pub particle_radius: f64,
    pub explode_speed_min: f64,
    pub explode_speed_max: f64,
    pub jitter_amplitude: f64,
    pub color: Srgb,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.into(),
            redirect_url: DEFAULT_REDIRECT_URL.into(),
            font_family: DEFAULT_FONT_FAMILY.into(),
            font_weight: DEFAULT_FONT_WEIGHT.into(),
            font_size: DEFAULT_FONT_SIZE,
            margin: DEFAULT_MARGIN,
            line_height: DEFAULT_LINE_HEIGHT,
            explosion_duration_ms: DEFAULT_EXPLOSION_DURATION_MS,
            fade_duration_ms: DEFAULT_FADE_DURATION_MS,
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            stride_multiplier: DEFAULT_STRIDE_MULTIPLIER,
            coverage_threshold: DEFAULT_COVERAGE_THRESHOLD,
            spring: DEFAULT_SPRING,
            damping: DEFAULT_DAMPING,
            particle_radius: DEFAULT_PARTICLE_RADIUS,
            explode_speed_min: DEFAULT_EXPLODE_SPEED_MIN,
            explode_speed_max: DEFAULT_EXPLODE_SPEED_MAX,
            jitter_amplitude: DEFAULT_JITTER_AMPLITUDE,
            color: Srgb::WHITE,
        }
    }
}

impl SwarmConfig {
    /// Overlays `params` onto the defaults and validates the result.
    ///
    /// `params` must be a JSON object or `null`. A `color` that is present but
    /// not a valid hex string is an error rather than a silent fallback.
    pub fn from_json(params: &Value) -> Result<Self, SwarmError> {
        expect_object(params, "swarm config")?;
        let d = Self::default();
        let color = match params.get("color").and_then(Value::as_str) {
            Some(hex) => Srgb::from_hex(hex)?,
            None => d.color,
        };
        let threshold = param_u64(params, "coverage_threshold", d.coverage_threshold as u64);
        let config = Self {
            text: param_string(params, "text", &d.text),
            redirect_url: param_string(params, "redirect_url", &d.redirect_url),
            font_family: param_string(params, "font_family", &d.font_family),
            font_weight: param_string(params, "font_weight", &d.font_weight),
            font_size: param_f64(params, "font_size", d.font_size),
            margin: param_f64(params, "margin", d.margin),
            line_height: param_f64(params, "line_height", d.line_height),
            explosion_duration_ms: param_f64(params, "explosion_duration_ms", d.explosion_duration_ms),
            fade_duration_ms: param_f64(params, "fade_duration_ms", d.fade_duration_ms),
            interaction_radius: param_f64(params, "interaction_radius", d.interaction_radius),
            stride_multiplier: param_f64(params, "stride_multiplier", d.stride_multiplier),
            coverage_threshold: u8::try_from(threshold).unwrap_or(u8::MAX),
            spring: param_f64(params, "spring", d.spring),
            damping: param_f64(params, "damping", d.damping),
            particle_radius: param_f64(params, "particle_radius", d.particle_radius),
            explode_speed_min: param_f64(params, "explode_speed_min", d.explode_speed_min),
            explode_speed_max: param_f64(params, "explode_speed_max", d.explode_speed_max),
            jitter_amplitude: param_f64(params, "jitter_amplitude", d.jitter_amplitude),
            color,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the relationships the particle physics relies on.
    pub fn validate(&self) -> Result<(), SwarmError> {
        let invalid = |msg: &str| Err(SwarmError::InvalidConfig(msg.to_owned()));
        if !(self.explosion_duration_ms > 0.0) {
            return invalid("explosion_duration_ms must be positive");
        }
        if !(self.fade_duration_ms > 0.0) {
            return invalid("fade_duration_ms must be positive");
        }
        if self.fade_duration_ms > self.explosion_duration_ms {
            return invalid("fade_duration_ms must not exceed explosion_duration_ms");
        }
        if !(self.interaction_radius > 0.0) {
            return invalid("interaction_radius must be positive");
        }
        if !(self.stride_multiplier > 0.0) {
            return invalid("stride_multiplier must be positive");
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return invalid("damping must be in (0, 1]");
        }
        if !(self.font_size > 0.0) {
            return invalid("font_size must be positive");
        }
        if !(self.explode_speed_min >= 0.0 && self.explode_speed_min <= self.explode_speed_max) {
            return invalid("explode speed range must satisfy 0 <= min <= max");
        }
        Ok(())
    }

    /// Font at canvas-buffer scale for the given pixel ratio.
    pub fn font(&self, pixel_ratio: f64) -> FontSpec {
        FontSpec {
            family: self.font_family.clone(),
            weight: self.font_weight.clone(),
            size: self.font_size * pixel_ratio,
        }
    }

    /// Current values as a JSON object.
    pub fn params(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Schema describing the numeric knobs, their ranges, and defaults.
    pub fn param_schema() -> Value {
        json!({
            "text": {"type": "string", "default": DEFAULT_TEXT, "description": "Credit text rendered as particles"},
            "redirect_url": {"type": "string", "default": DEFAULT_REDIRECT_URL, "description": "Navigation target after the explosion"},
            "font_size": {"type": "number", "default": DEFAULT_FONT_SIZE, "min": 1.0, "max": 200.0, "description": "Font size in CSS pixels"},
            "margin": {"type": "number", "default": DEFAULT_MARGIN, "min": 0.0, "max": 500.0, "description": "Right and bottom text margin in CSS pixels"},
            "explosion_duration_ms": {"type": "number", "default": DEFAULT_EXPLOSION_DURATION_MS, "min": 1.0, "max": 10000.0, "description": "Delay from activation to redirect"},
            "fade_duration_ms": {"type": "number", "default": DEFAULT_FADE_DURATION_MS, "min": 1.0, "max": 10000.0, "description": "Length of the alpha fade at the end of the explosion"},
            "interaction_radius": {"type": "number", "default": DEFAULT_INTERACTION_RADIUS, "min": 1.0, "max": 500.0, "description": "Pointer influence radius in canvas pixels"},
            "stride_multiplier": {"type": "number", "default": DEFAULT_STRIDE_MULTIPLIER, "min": 0.5, "max": 16.0, "description": "Sampling stride per unit of pixel ratio"},
            "coverage_threshold": {"type": "integer", "default": DEFAULT_COVERAGE_THRESHOLD, "min": 0, "max": 255, "description": "Minimum mask alpha for a sample point"},
            "spring": {"type": "number", "default": DEFAULT_SPRING, "min": 0.0, "max": 1.0, "description": "Return-to-rest spring constant"},
            "damping": {"type": "number", "default": DEFAULT_DAMPING, "min": 0.0, "max": 1.0, "description": "Per-frame velocity damping"},
            "particle_radius": {"type": "number", "default": DEFAULT_PARTICLE_RADIUS, "min": 0.1, "max": 20.0, "description": "Particle disc radius"},
            "jitter_amplitude": {"type": "number", "default": DEFAULT_JITTER_AMPLITUDE, "min": 0.0, "max": 5.0, "description": "Organic jitter strength near the pointer"},
            "color": {"type": "string", "default": "#ffffff", "description": "Particle fill color"}
        })
    }
}

pub const DEFAULT_EARTH_RADIUS_FRACTION: f64 = 0.35;
/// Radians per millisecond.
pub const DEFAULT_EARTH_ROTATION_SPEED: f64 = 0.0002;
pub const DEFAULT_EARTH_NOISE_SCALE: f64 = 2.5;
pub const DEFAULT_EARTH_CONTRAST_MIN: f64 = 0.6;
pub const DEFAULT_EARTH_CONTRAST_MAX: f64 = 1.8;
pub const DEFAULT_EARTH_SEA_LEVEL: f64 = 0.5;
pub const DEFAULT_EARTH_PIXEL_STEP: u64 = 2;
pub const DEFAULT_EARTH_SEED: u32 = 7;

/// Configuration for the rotating noise-shaded sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthConfig {
    pub radius_fraction: f64,
    pub rotation_speed: f64,
    pub noise_scale: f64,
    pub contrast_min: f64,
    pub contrast_max: f64,
    pub sea_level: f64,
    pub pixel_step: u64,
    pub seed: u32,
    pub ocean: Srgb,
    pub land: Srgb,
}

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            radius_fraction: DEFAULT_EARTH_RADIUS_FRACTION,
            rotation_speed: DEFAULT_EARTH_ROTATION_SPEED,
            noise_scale: DEFAULT_EARTH_NOISE_SCALE,
            contrast_min: DEFAULT_EARTH_CONTRAST_MIN,
            contrast_max: DEFAULT_EARTH_CONTRAST_MAX,
            sea_level: DEFAULT_EARTH_SEA_LEVEL,
            pixel_step: DEFAULT_EARTH_PIXEL_STEP,
            seed: DEFAULT_EARTH_SEED,
            ocean: Srgb {
                r: 0.08,
                g: 0.2,
                b: 0.45,
            },
            land: Srgb {
                r: 0.3,
                g: 0.55,
                b: 0.25,
            },
        }
    }
}

impl EarthConfig {
    /// Overlays `params` onto the defaults and validates the result.
    pub fn from_json(params: &Value) -> Result<Self, SwarmError> {
        expect_object(params, "earth config")?;
        let d = Self::default();
        let color = |key: &str, fallback: Srgb| match params.get(key).and_then(Value::as_str) {
            Some(hex) => Srgb::from_hex(hex),
            None => Ok(fallback),
        };
        let config = Self {
            radius_fraction: param_f64(params, "radius_fraction", d.radius_fraction),
            rotation_speed: param_f64(params, "rotation_speed", d.rotation_speed),
            noise_scale: param_f64(params, "noise_scale", d.noise_scale),
            contrast_min: param_f64(params, "contrast_min", d.contrast_min),
            contrast_max: param_f64(params, "contrast_max", d.contrast_max),
            sea_level: param_f64(params, "sea_level", d.sea_level),
            pixel_step: param_u64(params, "pixel_step", d.pixel_step),
            seed: u32::try_from(param_u64(params, "seed", u64::from(d.seed))).map_err(|_| {
                SwarmError::InvalidConfig("seed must fit in 32 bits".into())
            })?,
            ocean: color("ocean", d.ocean)?,
            land: color("land", d.land)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SwarmError> {
        let invalid = |msg: &str| Err(SwarmError::InvalidConfig(msg.to_owned()));
        if !(self.radius_fraction > 0.0 && self.radius_fraction <= 0.5) {
            return invalid("radius_fraction must be in (0, 0.5]");
        }
        if self.pixel_step == 0 {
            return invalid("pixel_step must be at least 1");
        }
        if !(self.contrast_min <= self.contrast_max) {
            return invalid("contrast_min must not exceed contrast_max");
        }
        if !(self.noise_scale > 0.0) {
            return invalid("noise_scale must be positive");
        }
        Ok(())
    }

    pub fn params(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn param_schema() -> Value {
        json!({
            "radius_fraction": {"type": "number", "default": DEFAULT_EARTH_RADIUS_FRACTION, "min": 0.01, "max": 0.5, "description": "Sphere radius as a fraction of the shorter canvas side"},
            "rotation_speed": {"type": "number", "default": DEFAULT_EARTH_ROTATION_SPEED, "min": 0.0, "max": 0.01, "description": "Rotation in radians per millisecond"},
            "noise_scale": {"type": "number", "default": DEFAULT_EARTH_NOISE_SCALE, "min": 0.1, "max": 20.0, "description": "Noise frequency on the unit sphere"},
            "contrast_min": {"type": "number", "default": DEFAULT_EARTH_CONTRAST_MIN, "min": 0.0, "max": 5.0, "description": "Contrast with the pointer at the left edge"},
            "contrast_max": {"type": "number", "default": DEFAULT_EARTH_CONTRAST_MAX, "min": 0.0, "max": 5.0, "description": "Contrast with the pointer at the right edge"},
            "sea_level": {"type": "number", "default": DEFAULT_EARTH_SEA_LEVEL, "min": 0.0, "max": 1.0, "description": "Shade threshold between ocean and land"},
            "pixel_step": {"type": "integer", "default": DEFAULT_EARTH_PIXEL_STEP, "min": 1, "max": 16, "description": "Size of each shaded block in pixels"},
            "seed": {"type": "integer", "default": DEFAULT_EARTH_SEED, "min": 0, "max": u32::MAX, "description": "Noise seed"}
        })
    }
}
