//! Pointer-driven synthetic hand.
//!
//! The window owns a [`SimulatedHandControl`] and feeds it cursor, pinch and
//! presence changes. The [`SimulatedTracker`] on the tracker thread turns the
//! latest values into 21 landmarks laid out so that the interpreted hand
//! position equals the cursor's NDC position.

use super::{HandTracker, TrackedFrame};
use crate::error::TrackingError;
use crate::gesture::{
    from_hand_space, HandLandmarks, INDEX_TIP, LANDMARK_COUNT, MIDDLE_MCP, THUMB_TIP, WRIST,
};
use glam::{Vec2, Vec3};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

/// Thumb-to-index gap while pinching.
const PINCHED_GAP: f32 = 0.03;
/// Thumb-to-index gap with the hand open.
const OPEN_GAP: f32 = 0.2;
/// Vertical offset of wrist and middle-finger base from the palm centre.
const PALM_HALF_HEIGHT: f32 = 0.08;

/// What the synthetic hand is doing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulatedHand {
    pub present: bool,
    pub pinched: bool,
    /// Cursor position in NDC (-1..1, Y up).
    pub cursor_ndc: Vec2,
}

impl SimulatedHand {
    /// Landmarks for this hand, or `None` when it is hidden.
    pub fn landmarks(&self) -> Option<HandLandmarks> {
        if !self.present {
            return None;
        }

        let palm = from_hand_space(self.cursor_ndc).extend(0.0);
        let gap = if self.pinched { PINCHED_GAP } else { OPEN_GAP };

        let mut points = [palm; LANDMARK_COUNT];
        points[WRIST] = palm + Vec3::new(0.0, PALM_HALF_HEIGHT, 0.0);
        points[MIDDLE_MCP] = palm - Vec3::new(0.0, PALM_HALF_HEIGHT, 0.0);
        points[THUMB_TIP] = palm + Vec3::new(-gap * 0.5, -PALM_HALF_HEIGHT, 0.0);
        points[INDEX_TIP] = palm + Vec3::new(gap * 0.5, -PALM_HALF_HEIGHT, 0.0);
        Some(HandLandmarks::new(points))
    }
}

/// Window-side handle that steers the synthetic hand.
#[derive(Debug)]
pub struct SimulatedHandControl {
    tx: Sender<SimulatedHand>,
    hand: SimulatedHand,
}

impl SimulatedHandControl {
    pub fn toggle_presence(&mut self) {
        self.hand.present = !self.hand.present;
        log::info!(
            "simulated hand {}",
            if self.hand.present { "shown" } else { "hidden" }
        );
        self.publish();
    }

    pub fn set_pinched(&mut self, pinched: bool) {
        if self.hand.pinched != pinched {
            self.hand.pinched = pinched;
            self.publish();
        }
    }

    pub fn set_cursor(&mut self, ndc: Vec2) {
        if self.hand.cursor_ndc != ndc {
            self.hand.cursor_ndc = ndc;
            self.publish();
        }
    }

    fn publish(&self) {
        // The tracker thread may already be gone; the feed reports that.
        let _ = self.tx.send(self.hand);
    }
}

/// Tracker-thread side of the synthetic hand.
#[derive(Debug)]
pub struct SimulatedTracker {
    rx: Receiver<SimulatedHand>,
    hand: SimulatedHand,
    epoch: Instant,
}

/// Create a connected control/tracker pair. The hand starts hidden.
pub fn pair() -> (SimulatedHandControl, SimulatedTracker) {
    let (tx, rx) = mpsc::channel();
    let control = SimulatedHandControl {
        tx,
        hand: SimulatedHand::default(),
    };
    let tracker = SimulatedTracker {
        rx,
        hand: SimulatedHand::default(),
        epoch: Instant::now(),
    };
    (control, tracker)
}

impl SimulatedTracker {
    fn frame(&self) -> TrackedFrame {
        TrackedFrame {
            timestamp_ms: self.epoch.elapsed().as_millis() as u64,
            hand: self.hand.landmarks(),
        }
    }
}

impl HandTracker for SimulatedTracker {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn start(&mut self, _budget: Duration) -> Result<bool, TrackingError> {
        Ok(true)
    }

    /// Emits one frame per call, like a camera that always has a picture.
    fn poll(&mut self, timeout: Duration) -> Result<Option<TrackedFrame>, TrackingError> {
        match self.rx.recv_timeout(timeout) {
            Ok(hand) => self.hand = hand,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Err(TrackingError::Closed),
        }
        loop {
            match self.rx.try_recv() {
                Ok(hand) => self.hand = hand,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(TrackingError::Closed),
            }
        }
        Ok(Some(self.frame()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::GestureInterpreter;

    #[test]
    fn test_hidden_hand_has_no_landmarks() {
        assert!(SimulatedHand::default().landmarks().is_none());
    }

    #[test]
    fn test_interpreted_position_matches_cursor() {
        let hand = SimulatedHand {
            present: true,
            pinched: false,
            cursor_ndc: Vec2::new(0.4, -0.6),
        };
        let state = GestureInterpreter::new().interpret(hand.landmarks().as_ref());
        assert!(state.detected);
        assert!(!state.pinched);
        assert!((state.position - hand.cursor_ndc).length() < 1e-5);
    }

    #[test]
    fn test_pinch_gap_crosses_threshold() {
        let mut hand = SimulatedHand {
            present: true,
            pinched: true,
            cursor_ndc: Vec2::ZERO,
        };
        let mut interp = GestureInterpreter::new();
        assert!(interp.interpret(hand.landmarks().as_ref()).pinched);
        hand.pinched = false;
        assert!(!interp.interpret(hand.landmarks().as_ref()).pinched);
    }

    #[test]
    fn test_control_changes_reach_tracker() {
        let (mut control, mut tracker) = pair();
        control.toggle_presence();
        control.set_cursor(Vec2::new(-0.5, 0.5));
        control.set_pinched(true);

        let frame = tracker.poll(Duration::from_millis(10)).unwrap().unwrap();
        let state = GestureInterpreter::new().interpret(frame.hand.as_ref());
        assert!(state.is_exploding());
        assert!((state.position - Vec2::new(-0.5, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_dropped_control_closes_tracker() {
        let (control, mut tracker) = pair();
        drop(control);
        assert!(matches!(
            tracker.poll(Duration::from_millis(1)),
            Err(TrackingError::Closed)
        ));
    }
}
