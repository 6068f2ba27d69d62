//! Target shapes.
//!
//! A [`ShapeSelector`] plus the density/diffusion of a [`ShapeConfig`] fully
//! determine where each particle slot wants to be. Slots past
//! `floor(N * density)` are exiled to a large cube far outside the view
//! instead of shrinking the shape.

use crate::config::ShapeConfig;
use crate::particles::ParticleBuffer;
use crate::sampling::Sampler;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Half-size of the cube that receives exiled particles.
pub const EXILE_HALF_EXTENT: f32 = 50.0;

/// Radius multiplier of the diffuse cloud.
pub const CLOUD_RADIUS: f32 = 3.0;
/// Radius multiplier of the sphere shell.
pub const SPHERE_RADIUS: f32 = 2.5;
/// Half-size multiplier of the cube (side is twice this).
pub const CUBE_HALF_SIZE: f32 = 2.0;
/// Inner and outer radius multipliers of the ring.
pub const RING_RADII: (f32, f32) = (2.0, 3.0);
/// Z thickness of the ring.
pub const RING_Z_JITTER: f32 = 0.25;
/// Scale applied to drawn points (which live in NDC, -1..1).
pub const CUSTOM_SCALE: f32 = 5.0;
/// Jitter around each drawn point.
pub const CUSTOM_JITTER: Vec3 = Vec3::new(0.1, 0.1, 0.25);
/// Half-size of the flat cluster used when nothing has been drawn.
pub const EMPTY_CUSTOM_HALF: f32 = 1.0;

/// Shape identifiers, as stored in config files and shown in the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    DiffuseCloud,
    #[default]
    Sphere,
    Cube,
    Ring,
    Custom,
}

impl ShapeKind {
    /// The built-in presets, in panel order.
    pub const PRESETS: [ShapeKind; 4] = [
        ShapeKind::DiffuseCloud,
        ShapeKind::Sphere,
        ShapeKind::Cube,
        ShapeKind::Ring,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::DiffuseCloud => "Cloud",
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Cube => "Cube",
            ShapeKind::Ring => "Ring",
            ShapeKind::Custom => "Custom",
        }
    }
}

/// The active target shape.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeSelector {
    DiffuseCloud,
    Sphere,
    Cube,
    Ring,
    /// User-drawn points in NDC with z = 0. May be empty.
    Custom(Vec<Vec3>),
}

impl ShapeSelector {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeSelector::DiffuseCloud => ShapeKind::DiffuseCloud,
            ShapeSelector::Sphere => ShapeKind::Sphere,
            ShapeSelector::Cube => ShapeKind::Cube,
            ShapeSelector::Ring => ShapeKind::Ring,
            ShapeSelector::Custom(_) => ShapeKind::Custom,
        }
    }

    /// Target for a slot that belongs to the shape.
    fn sample(&self, index: usize, diffusion: f32, sampler: &mut Sampler) -> Vec3 {
        match self {
            ShapeSelector::DiffuseCloud => sampler.in_ball_linear(CLOUD_RADIUS * diffusion),
            ShapeSelector::Sphere => sampler.on_sphere(SPHERE_RADIUS * diffusion),
            ShapeSelector::Cube => sampler.in_cube(CUBE_HALF_SIZE * diffusion),
            ShapeSelector::Ring => sampler.in_annulus(
                RING_RADII.0 * diffusion,
                RING_RADII.1 * diffusion,
                RING_Z_JITTER,
            ),
            ShapeSelector::Custom(points) if points.is_empty() => {
                sampler.in_square(EMPTY_CUSTOM_HALF)
            }
            ShapeSelector::Custom(points) => {
                let anchor = points[index % points.len()];
                anchor * CUSTOM_SCALE * diffusion + sampler.jitter(CUSTOM_JITTER)
            }
        }
    }
}

impl From<ShapeKind> for ShapeSelector {
    /// `Custom` maps to an empty drawing.
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::DiffuseCloud => ShapeSelector::DiffuseCloud,
            ShapeKind::Sphere => ShapeSelector::Sphere,
            ShapeKind::Cube => ShapeSelector::Cube,
            ShapeKind::Ring => ShapeSelector::Ring,
            ShapeKind::Custom => ShapeSelector::Custom(Vec::new()),
        }
    }
}

/// Number of slots that form the shape: `floor(count * density)`.
pub fn shaped_count(count: usize, density: f32) -> usize {
    ((count as f32 * density).floor().max(0.0) as usize).min(count)
}

/// Fill `out` with one target per slot.
///
/// Exiled slots draw from a stream forked off `sampler` before any shape
/// sampling, so for a given seed they come out identical whatever the
/// selector.
pub fn write_targets(
    out: &mut [Vec3],
    selector: &ShapeSelector,
    shape: &ShapeConfig,
    sampler: &mut Sampler,
) {
    let shaped = shaped_count(out.len(), shape.density);
    let mut exile = sampler.fork();

    for (i, target) in out.iter_mut().enumerate() {
        *target = if i < shaped {
            selector.sample(i, shape.diffusion, sampler)
        } else {
            exile.in_cube(EXILE_HALF_EXTENT)
        };
    }
}

/// Allocating version of [`write_targets`].
pub fn generate_targets(
    selector: &ShapeSelector,
    shape: &ShapeConfig,
    count: usize,
    sampler: &mut Sampler,
) -> Vec<Vec3> {
    let mut targets = vec![Vec3::ZERO; count];
    write_targets(&mut targets, selector, shape, sampler);
    targets
}

/// Regenerates targets only when something that affects them changed.
#[derive(Debug)]
pub struct TargetGenerator {
    sampler: Sampler,
    last: Option<(ShapeSelector, ShapeConfig)>,
}

impl TargetGenerator {
    pub fn new(sampler: Sampler) -> Self {
        Self { sampler, last: None }
    }

    /// Write fresh targets into `buffer` if the selector, density or
    /// diffusion differ from the previous call. Returns whether it did.
    pub fn update(
        &mut self,
        buffer: &mut ParticleBuffer,
        selector: &ShapeSelector,
        shape: &ShapeConfig,
    ) -> bool {
        let unchanged = match &self.last {
            Some((last_selector, last_shape)) => {
                last_selector == selector && !shape.changes_targets(last_shape)
            }
            None => false,
        };
        if unchanged {
            return false;
        }

        write_targets(buffer.targets_mut(), selector, shape, &mut self.sampler);
        log::debug!(
            "regenerated {} targets: {:?}, density {:.2}, diffusion {:.2}",
            buffer.len(),
            selector.kind(),
            shape.density,
            shape.diffusion
        );
        self.last = Some((selector.clone(), *shape));
        true
    }

    /// Force the next [`update`](Self::update) to regenerate.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
