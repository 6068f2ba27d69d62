//! Gesture interpretation.
//!
//! Turns the 21 hand landmarks of a detector frame into a [`HandState`]:
//! whether a hand is present, whether thumb and index are pinched, and where
//! the hand sits in a mirrored -1..1 space.

use glam::{Vec2, Vec3};

/// Number of landmarks in one hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;

/// Thumb-to-index distance below which the hand counts as pinched.
pub const PINCH_THRESHOLD: f32 = 0.08;

/// One detected hand: 21 points in normalized image coordinates (0..1),
/// with z as the detector's relative depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks {
    pub points: [Vec3; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from raw `[x, y, z]` triples. Returns `None` unless there are
    /// exactly 21.
    pub fn from_triples(triples: &[[f32; 3]]) -> Option<Self> {
        if triples.len() != LANDMARK_COUNT {
            return None;
        }
        let mut points = [Vec3::ZERO; LANDMARK_COUNT];
        for (point, t) in points.iter_mut().zip(triples) {
            *point = Vec3::from_array(*t);
        }
        Some(Self { points })
    }

    /// Distance between thumb tip and index tip.
    pub fn pinch_distance(&self) -> f32 {
        self.points[THUMB_TIP].distance(self.points[INDEX_TIP])
    }

    /// Midpoint of wrist and middle-finger base, in image coordinates.
    pub fn palm_center(&self) -> Vec2 {
        let mid = (self.points[WRIST] + self.points[MIDDLE_MCP]) * 0.5;
        mid.truncate()
    }
}

/// Instantaneous hand snapshot consumed by the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandState {
    pub detected: bool,
    pub pinched: bool,
    /// Hand position in -1..1, X mirrored.
    pub position: Vec2,
    pub pinch_distance: f32,
}

impl Default for HandState {
    fn default() -> Self {
        Self {
            detected: false,
            pinched: false,
            position: Vec2::ZERO,
            pinch_distance: 1.0,
        }
    }
}

impl HandState {
    /// A detected, pinching hand drives the explosion.
    #[inline]
    pub fn is_exploding(&self) -> bool {
        self.detected && self.pinched
    }
}

/// Map image coordinates (0..1) to the -1..1 hand space.
///
/// Both axes become `(v - 0.5) * -2`: X is mirrored like a selfie view and
/// Y flips from image-down to world-up.
pub fn to_hand_space(image: Vec2) -> Vec2 {
    (image - Vec2::splat(0.5)) * -2.0
}

/// Inverse of [`to_hand_space`].
pub fn from_hand_space(hand: Vec2) -> Vec2 {
    Vec2::splat(0.5) - hand * 0.5
}

/// Stateful interpreter. Keeps the last position and pinch distance so that
/// a frame without a hand only clears the flags.
#[derive(Debug, Default, Clone)]
pub struct GestureInterpreter {
    state: HandState,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one detector result into the state and return the new snapshot.
    pub fn interpret(&mut self, hand: Option<&HandLandmarks>) -> HandState {
        match hand {
            Some(landmarks) => {
                let pinch_distance = landmarks.pinch_distance();
                self.state = HandState {
                    detected: true,
                    pinched: pinch_distance < PINCH_THRESHOLD,
                    position: to_hand_space(landmarks.palm_center()),
                    pinch_distance,
                };
            }
            None => {
                self.state.detected = false;
                self.state.pinched = false;
            }
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_with(thumb: Vec3, index: Vec3, palm: Vec2) -> HandLandmarks {
        let mut points = [palm.extend(0.0); LANDMARK_COUNT];
        points[THUMB_TIP] = thumb;
        points[INDEX_TIP] = index;
        HandLandmarks::new(points)
    }

    #[test]
    fn test_pinch_below_threshold() {
        let hand = hand_with(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.55, 0.5, 0.0), Vec2::splat(0.5));
        let state = GestureInterpreter::new().interpret(Some(&hand));
        assert!(state.detected);
        assert!(state.pinched);
        assert!((state.pinch_distance - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_open_hand_not_pinched() {
        let hand = hand_with(Vec3::new(0.3, 0.5, 0.0), Vec3::new(0.6, 0.5, 0.0), Vec2::splat(0.5));
        let state = GestureInterpreter::new().interpret(Some(&hand));
        assert!(state.detected);
        assert!(!state.pinched);
    }

    #[test]
    fn test_palm_center_maps_to_hand_space() {
        let mut points = [Vec3::ZERO; LANDMARK_COUNT];
        points[WRIST] = Vec3::new(0.2, 0.8, 0.0);
        points[MIDDLE_MCP] = Vec3::new(0.2, 0.6, 0.0);
        points[INDEX_TIP] = Vec3::ONE;
        let state = GestureInterpreter::new().interpret(Some(&HandLandmarks::new(points)));

        // midpoint (0.2, 0.7) -> ((0.2-0.5)*-2, (0.7-0.5)*-2)
        assert!((state.position.x - 0.6).abs() < 1e-6);
        assert!((state.position.y + 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_lost_hand_keeps_stale_position() {
        let mut interp = GestureInterpreter::new();
        let hand = hand_with(Vec3::new(0.5, 0.5, 0.0), Vec3::new(0.52, 0.5, 0.0), Vec2::new(0.25, 0.75));
        let seen = interp.interpret(Some(&hand));
        assert!(seen.is_exploding());

        let lost = interp.interpret(None);
        assert!(!lost.detected);
        assert!(!lost.pinched);
        assert_eq!(lost.position, seen.position);
        assert_eq!(lost.pinch_distance, seen.pinch_distance);
    }

    #[test]
    fn test_from_triples_requires_21() {
        assert!(HandLandmarks::from_triples(&[[0.0; 3]; 20]).is_none());
        let hand = HandLandmarks::from_triples(&[[0.5, 0.25, 0.0]; 21]).unwrap();
        assert_eq!(hand.points[20], Vec3::new(0.5, 0.25, 0.0));
    }

    #[test]
    fn test_hand_space_round_trip() {
        let p = Vec2::new(0.3, -0.7);
        let back = to_hand_space(from_hand_space(p));
        assert!((back - p).length() < 1e-6);
    }
}
