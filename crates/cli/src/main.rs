#![deny(unsafe_code)]
//! CLI binary for the glyph-swarm sketches.
//!
//! Subcommands:
//! - `swarm` runs the text swarm for N frames with a scripted pointer and
//!   activation, then writes a PNG of the last frame
//! - `earth` renders one frame of the noise sphere
//! - `schema` prints the parameter schemas of both sketches

mod error;
mod runner;
mod snapshot;

use clap::{Parser, Subcommand};
use error::CliError;
use glam::DVec2;
use glyph_swarm_core::{EarthConfig, SwarmConfig, Viewport};
use runner::SwarmScript;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glyph-swarm", about = "Headless runner for the glyph-swarm sketches")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate the text swarm and write a PNG of the final frame.
    Swarm {
        /// Text to render (overrides the config).
        #[arg(short, long)]
        text: Option<String>,

        /// Viewport width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 640.0)]
        width: f64,

        /// Viewport height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 360.0)]
        height: f64,

        /// Display pixel ratio.
        #[arg(short = 'r', long, default_value_t = 1.0)]
        pixel_ratio: f64,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 60)]
        frames: usize,

        /// Milliseconds between frames.
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        frame_ms: f64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pointer position in CSS pixels, e.g. "600,330".
        #[arg(long)]
        pointer: Option<String>,

        /// Frame at which to click.
        #[arg(long)]
        activate_at: Option<usize>,

        /// Click position in CSS pixels (defaults to the text centre).
        #[arg(long)]
        activate_pos: Option<String>,

        /// Swarm configuration as a JSON string.
        #[arg(long, default_value = "{}")]
        config: String,

        /// Output file path.
        #[arg(short, long, default_value = "swarm.png")]
        output: PathBuf,
    },
    /// Render one frame of the noise sphere.
    Earth {
        /// Viewport width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 512.0)]
        width: f64,

        /// Viewport height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 512.0)]
        height: f64,

        /// Host time in milliseconds (drives rotation).
        #[arg(long, default_value_t = 0.0)]
        time: f64,

        /// Pointer position in CSS pixels; x sets the contrast.
        #[arg(long)]
        pointer: Option<String>,

        /// Noise seed (overrides the config).
        #[arg(long)]
        seed: Option<u32>,

        /// Sphere configuration as a JSON string.
        #[arg(long, default_value = "{}")]
        config: String,

        /// Output file path.
        #[arg(short, long, default_value = "earth.png")]
        output: PathBuf,
    },
    /// Print the parameter schemas.
    Schema,
}

/// Parses an `x,y` pair given to `flag`.
fn parse_point(flag: &str, raw: &str) -> Result<DVec2, CliError> {
    let invalid = |why: String| CliError::Input(format!("invalid --{flag} {raw:?}: {why}"));
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| invalid("expected \"x,y\"".into()))?;
    let coord = |v: &str| v.trim().parse::<f64>().map_err(|e| invalid(e.to_string()));
    let point = DVec2::new(coord(x)?, coord(y)?);
    if !point.is_finite() {
        return Err(invalid("coordinates must be finite".into()));
    }
    Ok(point)
}

fn parse_optional_point(flag: &str, raw: Option<&str>) -> Result<Option<DVec2>, CliError> {
    raw.map(|r| parse_point(flag, r)).transpose()
}

fn parse_config(raw: &str) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::Input(format!("invalid --config JSON: {e}")))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Swarm {
            text,
            width,
            height,
            pixel_ratio,
            frames,
            frame_ms,
            seed,
            pointer,
            activate_at,
            activate_pos,
            config,
            output,
        } => {
            let mut config = SwarmConfig::from_json(&parse_config(&config)?)?;
            if let Some(text) = text {
                config.text = text;
            }
            let viewport = Viewport::new(width, height, pixel_ratio);
            let script = SwarmScript {
                frames,
                frame_ms,
                pointer: parse_optional_point("pointer", pointer.as_deref())?,
                activate_at,
                activate_pos: parse_optional_point("activate-pos", activate_pos.as_deref())?,
            };
            let outcome = runner::run_swarm(config, viewport, seed, &script)?;
            snapshot::write_png(&outcome.surface, &output)?;

            let snap = &outcome.snapshot;
            if cli.json {
                let redirects: Vec<_> = outcome
                    .redirects
                    .iter()
                    .map(|r| serde_json::json!({"frame": r.frame, "due_at": r.due_at, "url": r.url}))
                    .collect();
                let info = serde_json::json!({
                    "snapshot": snap,
                    "activated": outcome.activated,
                    "redirects": redirects,
                    "frames": frames,
                    "seed": seed,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "swarm {}x{} ({} particles, {} visible, {}) after {frames} frames -> {}",
                    snap.canvas.width,
                    snap.canvas.height,
                    snap.particles,
                    snap.visible_particles,
                    snap.state.name(),
                    output.display()
                );
                for r in &outcome.redirects {
                    eprintln!("redirect to {} at frame {}", r.url, r.frame);
                }
            }
        }
        Command::Earth {
            width,
            height,
            time,
            pointer,
            seed,
            config,
            output,
        } => {
            let mut config = EarthConfig::from_json(&parse_config(&config)?)?;
            if let Some(seed) = seed {
                config.seed = seed;
            }
            let viewport = Viewport::new(width, height, 1.0);
            let pointer = parse_optional_point("pointer", pointer.as_deref())?;
            let (surface, contrast) = runner::run_earth(config, viewport, time, pointer)?;
            snapshot::write_png(&surface, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "width": width,
                    "height": height,
                    "time": time,
                    "contrast": contrast,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "earth {width}x{height} at t={time}ms (contrast {contrast:.2}) -> {}",
                    output.display()
                );
            }
        }
        Command::Schema => {
            let schema = serde_json::json!({
                "swarm": SwarmConfig::param_schema(),
                "earth": EarthConfig::param_schema(),
            });
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
