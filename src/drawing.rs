//! Freehand strokes as custom shape targets.
//!
//! While the drawing overlay is open, one press-drag-release gesture is
//! recorded in window pixels. On release the points are mapped to NDC
//! (Y up, z = 0) and become the anchors of [`ShapeSelector::Custom`].
//! Points are kept exactly as captured, duplicates included.
//!
//! [`ShapeSelector::Custom`]: crate::shape::ShapeSelector::Custom

use glam::{Vec2, Vec3};

/// Map a pixel position to NDC. `None` for a zero-sized viewport.
pub fn pixel_to_ndc(pixel: Vec2, width: f32, height: f32) -> Option<Vec2> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        (pixel.x / width) * 2.0 - 1.0,
        1.0 - (pixel.y / height) * 2.0,
    ))
}

/// Map every stroke point to NDC at z = 0.
///
/// A zero-sized viewport yields an empty list.
pub fn project_to_ndc(points: &[Vec2], width: f32, height: f32) -> Vec<Vec3> {
    points
        .iter()
        .filter_map(|p| pixel_to_ndc(*p, width, height))
        .map(|ndc| ndc.extend(0.0))
        .collect()
}

/// Records a single stroke.
#[derive(Debug, Default, Clone)]
pub struct StrokeRecorder {
    points: Vec<Vec2>,
    active: bool,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer went down: discard any previous stroke and start a new one.
    pub fn begin(&mut self, pixel: Vec2) {
        self.points.clear();
        self.points.push(pixel);
        self.active = true;
    }

    /// Pointer moved. Ignored unless a stroke is in progress.
    pub fn extend(&mut self, pixel: Vec2) {
        if self.active {
            self.points.push(pixel);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Captured pixels so far, for painting the overlay.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Pointer released: project the stroke for a viewport of the given
    /// size. Returns `None` if no stroke was in progress.
    pub fn finish(&mut self, width: f32, height: f32) -> Option<Vec<Vec3>> {
        if !self.active {
            return None;
        }
        self.active = false;
        let projected = project_to_ndc(&self.points, width, height);
        self.points.clear();
        Some(projected)
    }

    /// Abandon the current stroke.
    pub fn cancel(&mut self) {
        self.points.clear();
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_map_to_ndc_corners() {
        let out = project_to_ndc(&[Vec2::ZERO, Vec2::new(640.0, 480.0)], 640.0, 480.0);
        assert_eq!(out, vec![Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0)]);
    }

    #[test]
    fn test_zero_viewport_is_empty() {
        assert!(project_to_ndc(&[Vec2::new(1.0, 1.0)], 0.0, 480.0).is_empty());
        assert!(pixel_to_ndc(Vec2::ZERO, 640.0, 0.0).is_none());
    }

    #[test]
    fn test_stroke_keeps_duplicates() {
        let mut stroke = StrokeRecorder::new();
        stroke.extend(Vec2::new(5.0, 5.0));
        assert!(stroke.points().is_empty());

        stroke.begin(Vec2::new(50.0, 50.0));
        stroke.extend(Vec2::new(50.0, 50.0));
        stroke.extend(Vec2::new(100.0, 0.0));
        let points = stroke.finish(100.0, 100.0).unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0], points[1]);
        assert_eq!(points[2], Vec3::new(1.0, 1.0, 0.0));
        assert!(!stroke.is_active());
        assert!(stroke.finish(100.0, 100.0).is_none());
    }

    #[test]
    fn test_cancel_discards_stroke() {
        let mut stroke = StrokeRecorder::new();
        stroke.begin(Vec2::ZERO);
        stroke.cancel();
        assert!(stroke.finish(10.0, 10.0).is_none());
    }
}
