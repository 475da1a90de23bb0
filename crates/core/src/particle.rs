//! A single text particle: rest position, velocity, opacity, and jitter phase.
//!
//! Particles do not read any shared state. The field passes the pointer, the
//! clock, and the explosion timing into [`Particle::update`] every frame.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::Serialize;

use crate::color::Srgb;
use crate::config::SwarmConfig;
use crate::prng::RandomSource;
use crate::sampler::SamplePoint;
use crate::surface::Surface;

/// Per-frame physics constants, derived once from [`SwarmConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticlePhysics {
    pub interaction_radius: f64,
    pub spring: f64,
    pub damping: f64,
    pub jitter_amplitude: f64,
    pub explode_speed_min: f64,
    pub explode_speed_max: f64,
}

impl From<&SwarmConfig> for ParticlePhysics {
    fn from(c: &SwarmConfig) -> Self {
        Self {
            interaction_radius: c.interaction_radius,
            spring: c.spring,
            damping: c.damping,
            jitter_amplitude: c.jitter_amplitude,
            explode_speed_min: c.explode_speed_min,
            explode_speed_max: c.explode_speed_max,
        }
    }
}

/// Timing of an explosion in progress, in host milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Explosion {
    pub started_at: f64,
    pub duration_ms: f64,
    pub fade_ms: f64,
}

impl Explosion {
    /// Opacity implied by the clock: 1 until `duration - fade` has elapsed,
    /// then linear down to 0 at `duration`. Not clamped below 0.
    pub fn alpha_at(&self, now: f64) -> f64 {
        let elapsed = now - self.started_at;
        let fade_start = self.duration_ms - self.fade_ms;
        if elapsed > fade_start {
            1.0 - (elapsed - fade_start) / self.fade_ms
        } else {
            1.0
        }
    }

    pub fn is_complete(&self, now: f64) -> bool {
        now - self.started_at >= self.duration_ms
    }
}

/// Fixed per-particle jitter: phase offset and per-axis amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoisePhase {
    pub offset: f64,
    pub amplitude: DVec2,
}

impl NoisePhase {
    /// Draws offset in [0, 2pi) then x and y amplitudes in [0.5, 1.5).
    pub fn random(rng: &mut dyn RandomSource) -> Self {
        let offset = rng.next_range(0.0, TAU);
        let ax = rng.next_range(0.5, 1.5);
        let ay = rng.next_range(0.5, 1.5);
        Self {
            offset,
            amplitude: DVec2::new(ax, ay),
        }
    }

    /// Two phase-shifted periodic signals of `now`, scaled by the amplitudes.
    pub fn jitter(&self, now: f64, strength: f64) -> DVec2 {
        DVec2::new(
            (now * 0.002 + self.offset).sin() * self.amplitude.x,
            (now * 0.003 + self.offset).cos() * self.amplitude.y,
        ) * strength
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    position: DVec2,
    base: DVec2,
    velocity: DVec2,
    alpha: f64,
    noise: NoisePhase,
    size: f64,
}

impl Particle {
    /// A particle at rest on `point`, fully opaque.
    pub fn new(point: SamplePoint, size: f64, rng: &mut dyn RandomSource) -> Self {
        let base = point.to_vec2();
        Self {
            position: base,
            base,
            velocity: DVec2::ZERO,
            alpha: 1.0,
            noise: NoisePhase::random(rng),
            size,
        }
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn base(&self) -> DVec2 {
        self.base
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn noise(&self) -> NoisePhase {
        self.noise
    }

    /// Advances one frame.
    ///
    /// While exploding the particle coasts at constant velocity and only its
    /// opacity changes. Otherwise a pointer inside the interaction radius
    /// pulls it along the particle-to-pointer direction (plus jitter); with
    /// the pointer absent or outside the radius a spring returns it to rest.
    pub fn update(
        &mut self,
        now: f64,
        pointer: Option<DVec2>,
        explosion: Option<&Explosion>,
        physics: &ParticlePhysics,
    ) {
        if let Some(explosion) = explosion {
            self.position += self.velocity;
            self.alpha = self.alpha.min(explosion.alpha_at(now));
            return;
        }

        let near = pointer
            .map(|p| p - self.position)
            .filter(|d| d.length() < physics.interaction_radius);

        match near {
            Some(delta) => {
                let distance = delta.length();
                let force = (physics.interaction_radius - distance) / physics.interaction_radius;
                let angle = delta.y.atan2(delta.x);
                let push = DVec2::new(angle.cos(), angle.sin()) * force;
                self.velocity += push + self.noise.jitter(now, physics.jitter_amplitude);
            }
            None => {
                self.velocity += (self.base - self.position) * physics.spring;
            }
        }
        self.position += self.velocity;
        self.velocity *= physics.damping;
    }

    /// Launches the particle in a random direction at a random speed.
    ///
    /// Every call re-randomizes; the field calls it once per explosion.
    pub fn explode(&mut self, rng: &mut dyn RandomSource, physics: &ParticlePhysics) {
        let angle = rng.next_range(0.0, TAU);
        let speed = rng.next_range(physics.explode_speed_min, physics.explode_speed_max);
        self.velocity = DVec2::new(angle.cos(), angle.sin()) * speed;
    }

    pub fn draw(&self, surface: &mut dyn Surface, color: Srgb) {
        if self.alpha > 0.0 {
            surface.fill_circle(self.position, self.size, color, self.alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CanvasSize;
    use crate::prng::{ScriptedRandom, Xorshift64};
    use crate::surface::RecordingSurface;

    fn physics() -> ParticlePhysics {
        ParticlePhysics::from(&SwarmConfig::default())
    }

    fn quiet_physics() -> ParticlePhysics {
        ParticlePhysics {
            jitter_amplitude: 0.0,
            ..physics()
        }
    }

    fn particle_at(x: f64, y: f64) -> Particle {
        Particle::new(SamplePoint::new(x, y), 1.5, &mut Xorshift64::new(3))
    }

    fn explosion() -> Explosion {
        Explosion {
            started_at: 1000.0,
            duration_ms: 1500.0,
            fade_ms: 500.0,
        }
    }

    #[test]
    fn new_particle_rests_on_its_sample_point() {
        let p = particle_at(12.0, 34.0);
        assert_eq!(p.position(), DVec2::new(12.0, 34.0));
        assert_eq!(p.base(), p.position());
        assert_eq!(p.velocity(), DVec2::ZERO);
        assert_eq!(p.alpha(), 1.0);
    }

    #[test]
    fn noise_phase_draws_in_documented_ranges() {
        let mut rng = ScriptedRandom::new(vec![0.5, 0.0, 0.999]);
        let n = NoisePhase::random(&mut rng);
        assert!((n.offset - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(n.amplitude.x, 0.5);
        assert!(n.amplitude.y < 1.5 && n.amplitude.y > 1.49);
    }

    #[test]
    fn displaced_particle_returns_to_rest_without_pointer() {
        let mut p = particle_at(100.0, 100.0);
        p.position = DVec2::new(140.0, 60.0);
        for frame in 0..600 {
            p.update(frame as f64 * 16.0, None, None, &physics());
        }
        assert!(p.position().distance(p.base()) < 1e-3);
        assert!(p.velocity().length() < 1e-3);
    }

    #[test]
    fn far_pointer_behaves_like_absent_pointer() {
        let mut a = particle_at(50.0, 50.0);
        let mut b = a.clone();
        a.position = DVec2::new(60.0, 50.0);
        b.position = a.position;
        let far = Some(DVec2::new(500.0, 500.0));
        for frame in 0..50 {
            let now = frame as f64 * 16.0;
            a.update(now, None, None, &physics());
            b.update(now, far, None, &physics());
        }
        assert_eq!(a, b);
    }

    #[test]
    fn near_pointer_pulls_particle_toward_it() {
        let mut p = particle_at(100.0, 100.0);
        p.update(0.0, Some(DVec2::new(110.0, 100.0)), None, &quiet_physics());
        // force = (35 - 10) / 35 along +x.
        let expected = 25.0 / 35.0;
        assert!((p.position().x - (100.0 + expected)).abs() < 1e-12);
        assert!((p.position().y - 100.0).abs() < 1e-12);
        assert!((p.velocity().x - expected * 0.9).abs() < 1e-12);
    }

    #[test]
    fn pointer_exactly_on_radius_is_out_of_range() {
        let mut p = particle_at(100.0, 100.0);
        p.update(0.0, Some(DVec2::new(135.0, 100.0)), None, &quiet_physics());
        assert_eq!(p.position(), p.base());
    }

    #[test]
    fn jitter_is_added_only_near_pointer() {
        let mut p = particle_at(0.0, 0.0);
        let pointer = Some(DVec2::new(0.0, 10.0));
        let mut quiet = p.clone();
        p.update(250.0, pointer, None, &physics());
        quiet.update(250.0, pointer, None, &quiet_physics());
        let expected = p.noise().jitter(250.0, physics().jitter_amplitude);
        assert!((p.position() - quiet.position() - expected).length() < 1e-12);
    }

    #[test]
    fn velocity_stays_bounded_with_pointer_on_particle() {
        let mut p = particle_at(200.0, 200.0);
        let mut peak: f64 = 0.0;
        for frame in 0..2000 {
            let pointer = Some(p.position());
            p.update(frame as f64 * 16.0, pointer, None, &physics());
            peak = peak.max(p.velocity().length());
        }
        // Steady state of v = 0.9 (v + f) with |f| <= 1 + jitter is < 11.
        assert!(peak < 11.0, "velocity grew to {peak}");
    }

    #[test]
    fn explode_draws_heading_and_speed_in_range() {
        let mut p = particle_at(0.0, 0.0);
        p.explode(&mut ScriptedRandom::new(vec![0.0, 0.0]), &physics());
        assert!((p.velocity() - DVec2::new(2.0, 0.0)).length() < 1e-12);

        p.explode(&mut ScriptedRandom::new(vec![0.25, 1.0]), &physics());
        let v = p.velocity();
        assert!(v.length() <= 7.0 && v.length() > 6.99);
        assert!(v.x.abs() < 1e-9 && v.y > 0.0, "quarter turn should point +y: {v}");
    }

    #[test]
    fn explode_rerandomizes_on_each_call() {
        let mut p = particle_at(0.0, 0.0);
        let mut rng = Xorshift64::new(11);
        p.explode(&mut rng, &physics());
        let first = p.velocity();
        p.explode(&mut rng, &physics());
        assert_ne!(first, p.velocity());
    }

    #[test]
    fn exploding_particle_coasts_without_damping() {
        let mut p = particle_at(10.0, 10.0);
        p.explode(&mut ScriptedRandom::new(vec![0.0, 0.2]), &physics());
        let v = p.velocity();
        let e = explosion();
        // Pointer on top of the particle has no effect while exploding.
        p.update(1100.0, Some(p.position()), Some(&e), &physics());
        p.update(1200.0, Some(p.position()), Some(&e), &physics());
        assert_eq!(p.velocity(), v);
        assert_eq!(p.position(), DVec2::new(10.0, 10.0) + v * 2.0);
        assert_eq!(p.base(), DVec2::new(10.0, 10.0));
    }

    #[test]
    fn alpha_schedule_matches_fade_window() {
        let e = explosion();
        assert_eq!(e.alpha_at(1000.0 + 900.0), 1.0);
        assert_eq!(e.alpha_at(1000.0 + 1000.0), 1.0);
        assert!((e.alpha_at(1000.0 + 1250.0) - 0.5).abs() < 1e-12);
        assert!(e.alpha_at(1000.0 + 1500.0).abs() < 1e-12);
        assert!(e.alpha_at(1000.0 + 1600.0) < 0.0);
        assert!(!e.is_complete(2499.0));
        assert!(e.is_complete(2500.0));
    }

    #[test]
    fn alpha_never_rises_when_clock_regresses() {
        let mut p = particle_at(0.0, 0.0);
        let e = explosion();
        p.update(2250.0, None, Some(&e), &physics());
        let faded = p.alpha();
        p.update(1500.0, None, Some(&e), &physics());
        assert_eq!(p.alpha(), faded);
    }

    #[test]
    fn faded_particle_is_not_drawn() {
        let mut p = particle_at(5.0, 5.0);
        let mut surface = RecordingSurface::new(CanvasSize::new(10, 10));
        p.draw(&mut surface, Srgb::WHITE);
        assert_eq!(surface.commands().len(), 1);

        p.update(2600.0, None, Some(&explosion()), &physics());
        assert!(p.alpha() < 0.0);
        p.draw(&mut surface, Srgb::WHITE);
        assert_eq!(surface.commands().len(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn explosion_preserves_base_and_alpha_is_non_increasing(
                seed: u64,
                x in 0.0_f64..1000.0,
                y in 0.0_f64..1000.0,
                steps in prop::collection::vec(0.0_f64..40.0, 1..120),
            ) {
                let mut rng = Xorshift64::new(seed);
                let mut p = Particle::new(SamplePoint::new(x, y), 1.5, &mut rng);
                p.explode(&mut rng, &physics());
                let e = explosion();
                let mut now = e.started_at;
                let mut last_alpha = p.alpha();
                for dt in steps {
                    now += dt;
                    p.update(now, None, Some(&e), &physics());
                    prop_assert_eq!(p.base(), DVec2::new(x, y));
                    prop_assert!(p.alpha() <= last_alpha);
                    last_alpha = p.alpha();
                }
            }

            #[test]
            fn explode_speed_within_configured_range(seed: u64) {
                let mut rng = Xorshift64::new(seed);
                let mut p = Particle::new(SamplePoint::new(0.0, 0.0), 1.0, &mut rng);
                p.explode(&mut rng, &physics());
                let speed = p.velocity().length();
                prop_assert!((2.0 - 1e-9..7.0 + 1e-9).contains(&speed), "speed {speed}");
            }

            #[test]
            fn idle_particle_converges_to_base(
                seed: u64,
                dx in -200.0_f64..200.0,
                dy in -200.0_f64..200.0,
            ) {
                let mut p = Particle::new(SamplePoint::new(300.0, 300.0), 1.0, &mut Xorshift64::new(seed));
                p.position += DVec2::new(dx, dy);
                for frame in 0..800 {
                    p.update(frame as f64 * 16.0, None, None, &physics());
                }
                prop_assert!(p.position().distance(p.base()) < 1e-2);
            }
        }
    }
}
