//! Per-frame particle update.
//!
//! Two regimes, picked from the hand snapshot every frame:
//!
//! - **Aggregate** (no pinching hand): velocity decays, each particle eases
//!   toward its target and wobbles slightly.
//! - **Explode** (hand detected and pinched): every particle is kicked away
//!   from the hand's world position by a random fraction of the explosion
//!   force. Targets are ignored and nothing caps the speed, so the cloud
//!   keeps accelerating for as long as the pinch is held.
//!
//! In both regimes velocity is integrated into position afterwards.

use crate::gesture::HandState;
use crate::particles::ParticleBuffer;
use crate::sampling::Sampler;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Added to distances before normalizing so a particle sitting on the
/// reference point gets a zero kick instead of NaN.
pub const EXPLOSION_EPSILON: f32 = 1e-4;

/// Angular speed of the idle wobble, radians per second.
pub const JITTER_RATE: f32 = 2.0;

/// Simulation tunables.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationParams {
    /// Maximum velocity added per frame while exploding.
    pub explosion_force: f32,
    /// Fraction of the remaining distance to the target covered per frame.
    pub return_factor: f32,
    /// Velocity retained per frame while aggregating.
    pub damping: f32,
    /// Amplitude of the idle wobble.
    pub jitter_amplitude: f32,
    /// World units per unit of hand-space position.
    pub hand_world_scale: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            explosion_force: 0.03,
            return_factor: 0.08,
            damping: 0.90,
            jitter_amplitude: 0.002,
            hand_world_scale: 5.0,
        }
    }
}

/// Steps a [`ParticleBuffer`] once per rendered frame.
#[derive(Debug)]
pub struct Simulator {
    params: SimulationParams,
    sampler: Sampler,
}

impl Simulator {
    pub fn new(params: SimulationParams, sampler: Sampler) -> Self {
        Self { params, sampler }
    }

    /// World-space point the explosion pushes away from.
    ///
    /// The hand position is already mirrored by the interpreter; here it is
    /// only scaled onto the z = 0 plane. Without a hand the origin is used.
    pub fn reference_point(&self, hand: &HandState) -> Vec3 {
        if hand.detected {
            (hand.position * self.params.hand_world_scale).extend(0.0)
        } else {
            Vec3::ZERO
        }
    }

    /// Advance every particle by one frame.
    ///
    /// `elapsed` is the time since start in seconds and only drives the
    /// idle wobble.
    pub fn step(&mut self, buffer: &mut ParticleBuffer, hand: &HandState, elapsed: f32) {
        if hand.is_exploding() {
            self.explode(buffer, self.reference_point(hand));
        } else {
            self.aggregate(buffer, elapsed);
        }
    }

    fn explode(&mut self, buffer: &mut ParticleBuffer, reference: Vec3) {
        let force = self.params.explosion_force;
        let (positions, _, velocities) = buffer.split_mut();

        for (p, v) in positions.iter_mut().zip(velocities.iter_mut()) {
            let away = *p - reference;
            let dir = away / (away.length() + EXPLOSION_EPSILON);
            *v += dir * (force * self.sampler.unit());
            *p += *v;
        }
    }

    fn aggregate(&mut self, buffer: &mut ParticleBuffer, elapsed: f32) {
        let SimulationParams {
            return_factor,
            damping,
            jitter_amplitude,
            ..
        } = self.params;
        let (positions, targets, velocities) = buffer.split_mut();

        for (i, ((p, t), v)) in positions
            .iter_mut()
            .zip(targets.iter())
            .zip(velocities.iter_mut())
            .enumerate()
        {
            *v *= damping;
            *p += (*t - *p) * return_factor;

            let phase = elapsed * JITTER_RATE + i as f32;
            p.x += phase.sin() * jitter_amplitude;
            p.y += phase.cos() * jitter_amplitude;

            *p += *v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeConfig;
    use crate::shape::{generate_targets, ShapeSelector};
    use glam::Vec2;

    fn pinching_hand(position: Vec2) -> HandState {
        HandState {
            detected: true,
            pinched: true,
            position,
            pinch_distance: 0.01,
        }
    }

    #[test]
    fn test_reference_point_scales_hand() {
        let sim = Simulator::new(SimulationParams::default(), Sampler::seeded(0));
        let r = sim.reference_point(&pinching_hand(Vec2::new(0.5, -0.2)));
        assert!((r - Vec3::new(2.5, -1.0, 0.0)).length() < 1e-6);

        let none = HandState::default();
        assert_eq!(sim.reference_point(&none), Vec3::ZERO);
    }

    #[test]
    fn test_aggregate_moves_eight_percent() {
        let params = SimulationParams {
            jitter_amplitude: 0.0,
            ..SimulationParams::default()
        };
        let mut sim = Simulator::new(params, Sampler::seeded(0));
        let mut buffer = ParticleBuffer::new(1);
        buffer.set_targets(&[Vec3::new(10.0, 0.0, 0.0)]).unwrap();

        sim.step(&mut buffer, &HandState::default(), 0.0);
        assert!((buffer.positions()[0].x - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_aggregate_damps_velocity() {
        let mut sim = Simulator::new(SimulationParams::default(), Sampler::seeded(0));
        let mut buffer = ParticleBuffer::new(1);
        for _ in 0..5 {
            sim.step(&mut buffer, &pinching_hand(Vec2::new(1.0, 0.0)), 0.0);
        }
        let before = buffer.velocities()[0];

        sim.step(&mut buffer, &HandState::default(), 0.0);
        let after = buffer.velocities()[0];
        assert!((after - before * 0.9).length() < 1e-6);
    }

    #[test]
    fn test_explosion_ignores_targets() {
        let mut sim = Simulator::new(SimulationParams::default(), Sampler::seeded(5));
        let mut buffer = ParticleBuffer::new(1);
        buffer.set_targets(&[Vec3::new(-1.0, 0.0, 0.0)]).unwrap();
        buffer.snap_to_targets();
        // Target now sits beyond the hand; a pull term would drag +X.
        buffer.set_targets(&[Vec3::new(100.0, 0.0, 0.0)]).unwrap();

        for _ in 0..10 {
            sim.step(&mut buffer, &pinching_hand(Vec2::new(0.2, 0.0)), 0.0);
        }
        let v = buffer.velocities()[0];
        assert!(v.x <= 0.0);
        assert!(v.y.abs() < 1e-6 && v.z.abs() < 1e-6);
        assert!(buffer.positions()[0].x <= -1.0);
    }

    #[test]
    fn test_explosion_speed_never_drops() {
        let mut sim = Simulator::new(SimulationParams::default(), Sampler::seeded(6));
        let mut buffer = ParticleBuffer::new(200);
        let targets = generate_targets(
            &ShapeSelector::Sphere,
            &ShapeConfig::default(),
            200,
            &mut Sampler::seeded(7),
        );
        buffer.set_targets(&targets).unwrap();
        buffer.snap_to_targets();

        let hand = pinching_hand(Vec2::new(-0.3, 0.4));
        let mut speeds: Vec<f32> = buffer.velocities().iter().map(|v| v.length()).collect();
        for _ in 0..30 {
            sim.step(&mut buffer, &hand, 0.0);
            for (speed, v) in speeds.iter_mut().zip(buffer.velocities()) {
                assert!(v.length() + 1e-6 >= *speed);
                *speed = v.length();
            }
        }
    }

    #[test]
    fn test_aggregate_converges_to_targets() {
        let mut sim = Simulator::new(SimulationParams::default(), Sampler::seeded(8));
        let mut buffer = ParticleBuffer::new(100);
        let targets = generate_targets(
            &ShapeSelector::Ring,
            &ShapeConfig::default(),
            100,
            &mut Sampler::seeded(9),
        );
        buffer.set_targets(&targets).unwrap();

        let hand = HandState::default();
        for frame in 0..200 {
            sim.step(&mut buffer, &hand, frame as f32 / 60.0);
        }
        for (p, t) in buffer.positions().iter().zip(buffer.targets()) {
            // Residual wobble settles around amplitude / return factor.
            assert!(p.distance(*t) < 0.05, "{:?} vs {:?}", p, t);
        }
    }

    #[test]
    fn test_particle_on_reference_stays_finite() {
        let mut sim = Simulator::new(SimulationParams::default(), Sampler::seeded(1));
        let mut buffer = ParticleBuffer::new(3);
        for _ in 0..5 {
            sim.step(&mut buffer, &pinching_hand(Vec2::ZERO), 0.0);
        }
        assert!(buffer.positions().iter().all(|p| p.is_finite()));
        assert!(buffer.velocities().iter().all(|v| *v == Vec3::ZERO));
    }
}
