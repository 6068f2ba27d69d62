//! The particle scene: buffer, active shape and the simulator that moves
//! particles toward it. Owned by the render loop, no GPU involved.

use crate::config::{AppConfig, ShapeConfig};
use crate::gesture::HandState;
use crate::particles::ParticleBuffer;
use crate::sampling::Sampler;
use crate::shape::{shaped_count, ShapeKind, ShapeSelector, TargetGenerator};
use crate::simulator::Simulator;
use glam::Vec3;

pub struct Scene {
    buffer: ParticleBuffer,
    selector: ShapeSelector,
    shape: ShapeConfig,
    generator: TargetGenerator,
    simulator: Simulator,
}

impl Scene {
    /// Build the scene described by `config`. All particles start at the
    /// origin and fly out to the initial shape.
    pub fn new(config: &AppConfig, mut sampler: Sampler) -> Self {
        let mut scene = Self {
            buffer: ParticleBuffer::new(config.particle_count),
            selector: ShapeSelector::from(config.initial_shape),
            shape: config.shape.clamped(),
            generator: TargetGenerator::new(sampler.fork()),
            simulator: Simulator::new(config.simulation, sampler),
        };
        scene.refresh_targets();
        scene
    }

    pub fn select(&mut self, selector: ShapeSelector) {
        log::info!("shape: {}", selector.kind().label());
        self.selector = selector;
    }

    pub fn kind(&self) -> ShapeKind {
        self.selector.kind()
    }

    pub fn shape(&self) -> &ShapeConfig {
        &self.shape
    }

    /// Live shape settings. Target changes take effect on the next
    /// [`step`](Self::step).
    pub fn shape_mut(&mut self) -> &mut ShapeConfig {
        &mut self.shape
    }

    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    pub fn positions(&self) -> &[Vec3] {
        self.buffer.positions()
    }

    /// Positions of the particles that form the shape. Exiled slots are
    /// always the index suffix and are left out, which keeps them off-screen
    /// whatever the camera does.
    pub fn visible_positions(&self) -> &[Vec3] {
        let positions = self.buffer.positions();
        &positions[..shaped_count(positions.len(), self.shape.density)]
    }

    fn refresh_targets(&mut self) -> bool {
        self.shape = self.shape.clamped();
        self.generator
            .update(&mut self.buffer, &self.selector, &self.shape)
    }

    /// One frame: regenerate targets if the shape changed, then simulate.
    pub fn step(&mut self, hand: &HandState, elapsed: f32) {
        self.refresh_targets();
        self.simulator.step(&mut self.buffer, hand, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> AppConfig {
        AppConfig {
            particle_count: 50,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_new_scene_has_targets() {
        let scene = Scene::new(&small_config(), Sampler::seeded(1));
        assert_eq!(scene.kind(), ShapeKind::Sphere);
        for t in scene.buffer().targets() {
            assert!((t.length() - 2.5).abs() < 1e-3);
        }
    }

    #[test]
    fn test_slider_change_applies_on_next_step() {
        let mut scene = Scene::new(&small_config(), Sampler::seeded(2));
        scene.shape_mut().diffusion = 2.0;
        assert!((scene.buffer().targets()[0].length() - 2.5).abs() < 1e-3);

        scene.step(&HandState::default(), 0.0);
        assert!((scene.buffer().targets()[0].length() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_exiled_particles_are_not_drawn() {
        let mut scene = Scene::new(&small_config(), Sampler::seeded(4));
        assert_eq!(scene.visible_positions().len(), 50);

        scene.shape_mut().density = 0.3;
        scene.step(&HandState::default(), 0.0);
        assert_eq!(scene.visible_positions().len(), 15);
        assert_eq!(scene.visible_positions(), &scene.positions()[..15]);
    }

    #[test]
    fn test_out_of_range_edit_is_clamped() {
        let mut scene = Scene::new(&small_config(), Sampler::seeded(3));
        scene.shape_mut().density = 0.0;
        scene.step(&HandState::default(), 0.0);
        assert_eq!(scene.shape().density, 0.1);
    }
}
