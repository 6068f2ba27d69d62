//! Random sampling helpers for target generation.
//!
//! Every shape in [`crate::shape`] is built from these primitives so that the
//! distribution of each shape lives in one place.

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Seedable random source with helpers for common point distributions.
///
/// ```ignore
/// let mut sampler = Sampler::seeded(7);
/// let p = sampler.on_sphere(2.5);
/// assert!((p.length() - 2.5).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: SmallRng,
}

impl Sampler {
    /// Sampler seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic sampler, for tests and benchmarks.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Independent sampler seeded from this one.
    pub fn fork(&mut self) -> Self {
        Self::seeded(self.rng.gen())
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[-half, half)`.
    #[inline]
    pub fn symmetric(&mut self, half: f32) -> f32 {
        (self.rng.gen::<f32>() - 0.5) * 2.0 * half
    }

    // ========== Position helpers ==========

    /// Unit direction with a cosine-corrected polar angle.
    ///
    /// Drawing `cos(phi)` uniformly in `[-1, 1]` keeps the poles from
    /// collecting extra points.
    pub fn direction(&mut self) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let cos_phi = self.rng.gen_range(-1.0f32..1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
        Vec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
    }

    /// Point inside a ball whose radius is drawn linearly.
    ///
    /// The radius is not cube-rooted, so points bunch up toward the centre.
    pub fn in_ball_linear(&mut self, radius: f32) -> Vec3 {
        let r = radius * self.unit();
        self.direction() * r
    }

    /// Point on the surface of a sphere of given radius.
    pub fn on_sphere(&mut self, radius: f32) -> Vec3 {
        self.direction() * radius
    }

    /// Point inside an axis-aligned cube of given half-size, centred at origin.
    pub fn in_cube(&mut self, half_size: f32) -> Vec3 {
        Vec3::new(
            self.symmetric(half_size),
            self.symmetric(half_size),
            self.symmetric(half_size),
        )
    }

    /// Point in the XY annulus between `inner` and `outer`, with Z in `[-z_jitter, z_jitter)`.
    pub fn in_annulus(&mut self, inner: f32, outer: f32, z_jitter: f32) -> Vec3 {
        let theta = self.rng.gen_range(0.0..TAU);
        let r = inner + (outer - inner) * self.unit();
        Vec3::new(r * theta.cos(), r * theta.sin(), self.symmetric(z_jitter))
    }

    /// Point in the XY square `[-half, half)²` at z = 0.
    pub fn in_square(&mut self, half: f32) -> Vec3 {
        let p = Vec2::new(self.symmetric(half), self.symmetric(half));
        p.extend(0.0)
    }

    /// Offset with independent per-axis jitter.
    pub fn jitter(&mut self, amount: Vec3) -> Vec3 {
        Vec3::new(
            self.symmetric(amount.x),
            self.symmetric(amount.y),
            self.symmetric(amount.z),
        )
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_unit() {
        let mut sampler = Sampler::seeded(1);
        for _ in 0..200 {
            assert!((sampler.direction().length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_in_ball_linear_bounds() {
        let mut sampler = Sampler::seeded(2);
        for _ in 0..200 {
            assert!(sampler.in_ball_linear(3.0).length() <= 3.0 + 1e-4);
        }
    }

    #[test]
    fn test_in_ball_linear_is_center_heavy() {
        // Linear radius puts half the points inside r/2; a volume-uniform
        // ball would put only an eighth there.
        let mut sampler = Sampler::seeded(3);
        let inner = (0..4000)
            .filter(|_| sampler.in_ball_linear(1.0).length() < 0.5)
            .count();
        assert!(inner > 1600, "only {} of 4000 inside half radius", inner);
    }

    #[test]
    fn test_symmetric_range() {
        let mut sampler = Sampler::seeded(4);
        for _ in 0..500 {
            let v = sampler.symmetric(0.25);
            assert!((-0.25..0.25).contains(&v));
        }
    }

    #[test]
    fn test_in_square_is_flat() {
        let mut sampler = Sampler::seeded(5);
        let p = sampler.in_square(1.0);
        assert_eq!(p.z, 0.0);
        assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0);
    }
}
