//! Particle storage.

use crate::error::BufferError;
use glam::Vec3;

/// Three parallel arrays indexed by particle slot.
///
/// The length is fixed at construction; slot `i` is the same logical
/// particle in every array for the life of the buffer.
#[derive(Debug, Clone)]
pub struct ParticleBuffer {
    positions: Vec<Vec3>,
    targets: Vec<Vec3>,
    velocities: Vec<Vec3>,
}

impl ParticleBuffer {
    /// Allocate `count` particles at rest at the origin.
    pub fn new(count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; count],
            targets: vec![Vec3::ZERO; count],
            velocities: vec![Vec3::ZERO; count],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Mutable view of the targets; the slice length cannot change.
    pub fn targets_mut(&mut self) -> &mut [Vec3] {
        &mut self.targets
    }

    /// Replace all targets at once.
    pub fn set_targets(&mut self, targets: &[Vec3]) -> Result<(), BufferError> {
        if targets.len() != self.targets.len() {
            return Err(BufferError::LengthMismatch {
                expected: self.targets.len(),
                actual: targets.len(),
            });
        }
        self.targets.copy_from_slice(targets);
        Ok(())
    }

    /// Move every particle onto its target and stop it.
    pub fn snap_to_targets(&mut self) {
        self.positions.copy_from_slice(&self.targets);
        self.velocities.fill(Vec3::ZERO);
    }

    /// Split borrow used by the simulator: positions and velocities mutable,
    /// targets shared.
    pub(crate) fn split_mut(&mut self) -> (&mut [Vec3], &[Vec3], &mut [Vec3]) {
        (&mut self.positions, &self.targets, &mut self.velocities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_has_matching_lengths() {
        let buffer = ParticleBuffer::new(42);
        assert_eq!(buffer.len(), 42);
        assert_eq!(buffer.targets().len(), 42);
        assert_eq!(buffer.velocities().len(), 42);
    }

    #[test]
    fn test_set_targets_rejects_wrong_length() {
        let mut buffer = ParticleBuffer::new(4);
        let err = buffer.set_targets(&[Vec3::ONE; 3]).unwrap_err();
        assert_eq!(err, BufferError::LengthMismatch { expected: 4, actual: 3 });
        assert_eq!(buffer.len(), 4);
        assert!(buffer.targets().iter().all(|t| *t == Vec3::ZERO));
    }

    #[test]
    fn test_snap_to_targets() {
        let mut buffer = ParticleBuffer::new(2);
        buffer.set_targets(&[Vec3::X, Vec3::Y]).unwrap();
        buffer.snap_to_targets();
        assert_eq!(buffer.positions(), &[Vec3::X, Vec3::Y]);
    }
}
