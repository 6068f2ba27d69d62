//! Hand tracking.
//!
//! A [`HandTracker`] backend produces timestamped landmark frames. It runs
//! on a dedicated thread together with a [`GestureInterpreter`]. Each
//! resulting [`HandState`] overwrites a single shared slot, and lifecycle
//! changes travel separately over a channel:
//!
//! ```text
//! backend ──poll──▶ FrameGate ──▶ GestureInterpreter ──slot──▶ HandFeed::latest()
//!                                       run_tracker ──mpsc──▶ (Ready / Failed)
//! ```
//!
//! The render loop never blocks on the tracker. Snapshots it did not get
//! around to reading are simply replaced, so a window that stops redrawing
//! holds at most one.
//!
//! Two backends exist: [`simulated`] drives a synthetic hand from the mouse
//! and keyboard, [`stream`] receives frames from an external detector
//! process over UDP.

pub mod simulated;
pub mod stream;

use crate::error::TrackingError;
use crate::gesture::{GestureInterpreter, HandLandmarks, HandState};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub use simulated::{SimulatedHand, SimulatedHandControl, SimulatedTracker};
pub use stream::StreamTracker;

/// Default address the stream backend listens on.
pub const DEFAULT_STREAM_ADDR: SocketAddr =
    SocketAddr::V4(std::net::SocketAddrV4::new(std::net::Ipv4Addr::LOCALHOST, 7878));

/// Which landmark source to use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerBackend {
    /// Mouse-driven synthetic hand.
    #[default]
    Simulated,
    /// JSON landmark datagrams from an external detector.
    Stream { bind: SocketAddr },
}

/// Hand tracking settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    pub backend: TrackerBackend,
    /// How long the backend may take to deliver its first frame.
    pub startup_timeout_ms: u64,
    /// Upper bound on a single blocking call into the backend, during
    /// startup as well as afterwards. Also bounds how long shutdown waits
    /// for the tracker thread.
    pub poll_interval_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            backend: TrackerBackend::Simulated,
            startup_timeout_ms: 5000,
            poll_interval_ms: 16,
        }
    }
}

impl TrackingConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// One detector result.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrame {
    /// Capture time of the source frame, milliseconds. Only ordering matters.
    pub timestamp_ms: u64,
    /// The detected hand, if any.
    pub hand: Option<HandLandmarks>,
}

/// A source of landmark frames.
///
/// Implementations live on the tracker thread and may block, but never for
/// longer than the timeout they are given.
pub trait HandTracker: Send + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Make one attempt, lasting at most `budget`, to bring the source up.
    /// `Ok(false)` means not ready yet; the caller retries until its own
    /// startup deadline passes. Errors here are the one failure surfaced to
    /// the user.
    fn start(&mut self, budget: Duration) -> Result<bool, TrackingError>;

    /// Wait up to `timeout` for the next frame. `Ok(None)` means nothing new.
    fn poll(&mut self, timeout: Duration) -> Result<Option<TrackedFrame>, TrackingError>;
}

/// Drops frames whose timestamp did not advance past the last one admitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameGate {
    last: Option<u64>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame stamped `timestamp_ms` should be processed.
    pub fn admit(&mut self, timestamp_ms: u64) -> bool {
        match self.last {
            Some(last) if timestamp_ms <= last => false,
            _ => {
                self.last = Some(timestamp_ms);
                true
            }
        }
    }
}

/// Lifecycle message from the tracker thread. At most one of each is sent.
#[derive(Debug)]
pub enum TrackerEvent {
    /// The backend started and frames will follow.
    Ready,
    /// The backend failed; no further events follow.
    Failed(TrackingError),
}

/// Newest snapshot published by the tracker thread, not yet taken.
type HandSlot = Arc<Mutex<Option<HandState>>>;

fn lock_slot(slot: &Mutex<Option<HandState>>) -> MutexGuard<'_, Option<HandState>> {
    // The value is plain data, a panicked writer cannot leave it half-updated.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Tracker lifecycle as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerStatus {
    Starting,
    Running,
    /// Failure message for the status banner.
    Failed(String),
}

/// Owns the tracker thread. Stopping or dropping the handle signals the
/// thread and joins it.
pub struct TrackerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    events: Receiver<TrackerEvent>,
    latest: HandSlot,
}

impl TrackerHandle {
    /// Start `tracker` on its own thread.
    pub fn spawn(
        tracker: Box<dyn HandTracker>,
        config: &TrackingConfig,
    ) -> Result<Self, TrackingError> {
        let (tx, events) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let latest = HandSlot::default();
        let timing = Timing {
            startup_timeout: config.startup_timeout(),
            poll_interval: config.poll_interval(),
        };

        let thread_stop = Arc::clone(&stop);
        let thread_latest = Arc::clone(&latest);
        let thread = thread::Builder::new()
            .name(format!("tracker-{}", tracker.name()))
            .spawn(move || run_tracker(tracker, timing, tx, thread_latest, thread_stop))
            .map_err(TrackingError::Spawn)?;

        Ok(Self {
            stop,
            thread: Some(thread),
            events,
            latest,
        })
    }

    /// Next pending lifecycle event, without blocking.
    pub fn try_event(&self) -> Result<TrackerEvent, TryRecvError> {
        self.events.try_recv()
    }

    /// Take the newest hand snapshot published since the last call.
    pub fn take_hand(&self) -> Option<HandState> {
        lock_slot(&self.latest).take()
    }

    /// Signal the thread and wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("hand tracker thread panicked");
            }
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    startup_timeout: Duration,
    poll_interval: Duration,
}

/// Retry `tracker.start` in slices of at most `poll_interval` until it is
/// ready, the startup deadline passes, or `stop` is raised.
///
/// `Ok(false)` means the thread was asked to stop before the source came up.
fn start_tracker(
    tracker: &mut dyn HandTracker,
    timing: Timing,
    stop: &AtomicBool,
) -> Result<bool, TrackingError> {
    let deadline = Instant::now() + timing.startup_timeout;
    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(false);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(TrackingError::StartupTimeout(timing.startup_timeout));
        }
        if tracker.start(remaining.min(timing.poll_interval))? {
            return Ok(true);
        }
    }
}

fn run_tracker(
    mut tracker: Box<dyn HandTracker>,
    timing: Timing,
    tx: Sender<TrackerEvent>,
    latest: HandSlot,
    stop: Arc<AtomicBool>,
) {
    let name = tracker.name();
    match start_tracker(&mut *tracker, timing, &stop) {
        Ok(true) => {}
        Ok(false) => {
            log::info!("hand tracker '{}' stopped during startup", name);
            return;
        }
        Err(e) => {
            log::error!("{}", e);
            let _ = tx.send(TrackerEvent::Failed(e));
            return;
        }
    }
    log::info!("hand tracker '{}' running", name);
    if tx.send(TrackerEvent::Ready).is_err() {
        return;
    }

    let mut gate = FrameGate::new();
    let mut interpreter = GestureInterpreter::new();

    while !stop.load(Ordering::Relaxed) {
        match tracker.poll(timing.poll_interval) {
            Ok(Some(frame)) => {
                if !gate.admit(frame.timestamp_ms) {
                    continue;
                }
                let state = interpreter.interpret(frame.hand.as_ref());
                *lock_slot(&latest) = Some(state);
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("{}", e);
                let _ = tx.send(TrackerEvent::Failed(e));
                return;
            }
        }
    }
    log::info!("hand tracker '{}' stopped", name);
}

/// The render loop's view of the tracker: current status plus the newest
/// hand snapshot.
pub struct HandFeed {
    handle: Option<TrackerHandle>,
    status: TrackerStatus,
    hand: HandState,
}

impl HandFeed {
    /// Start the configured backend.
    ///
    /// Never fails: a backend that cannot start yields a feed in the
    /// [`TrackerStatus::Failed`] state that reports no hand. The simulated
    /// backend also returns the control the window uses to steer it.
    pub fn start(config: &TrackingConfig) -> (Self, Option<SimulatedHandControl>) {
        let (tracker, control): (Result<Box<dyn HandTracker>, TrackingError>, _) =
            match &config.backend {
                TrackerBackend::Simulated => {
                    let (control, tracker) = simulated::pair();
                    (Ok(Box::new(tracker) as Box<dyn HandTracker>), Some(control))
                }
                TrackerBackend::Stream { bind } => (
                    StreamTracker::bind(*bind).map(|t| Box::new(t) as Box<dyn HandTracker>),
                    None,
                ),
            };

        let feed = match tracker.and_then(|t| TrackerHandle::spawn(t, config)) {
            Ok(handle) => Self::from_handle(handle),
            Err(e) => {
                log::error!("{}", e);
                Self::failed(e.to_string())
            }
        };
        (feed, control)
    }

    pub fn from_handle(handle: TrackerHandle) -> Self {
        Self {
            handle: Some(handle),
            status: TrackerStatus::Starting,
            hand: HandState::default(),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            handle: None,
            status: TrackerStatus::Failed(message),
            hand: HandState::default(),
        }
    }

    pub fn status(&self) -> &TrackerStatus {
        &self.status
    }

    /// Drain lifecycle events and return the newest hand snapshot.
    ///
    /// After a failure this is always the default "no hand" state.
    pub fn latest(&mut self) -> HandState {
        let Some(handle) = &self.handle else {
            return self.hand;
        };

        if let Some(state) = handle.take_hand() {
            self.hand = state;
        }

        let mut finished = false;
        loop {
            match handle.try_event() {
                Ok(TrackerEvent::Ready) => self.status = TrackerStatus::Running,
                Ok(TrackerEvent::Failed(e)) => {
                    self.status = TrackerStatus::Failed(e.to_string());
                    finished = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !matches!(self.status, TrackerStatus::Failed(_)) {
                        self.status = TrackerStatus::Failed(TrackingError::Closed.to_string());
                    }
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.hand = HandState::default();
            self.handle = None;
        }
        self.hand
    }

    /// Stop the tracker thread.
    pub fn shutdown(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Instant;

    /// Replays a fixed list of frames, then reports nothing.
    struct Scripted {
        frames: VecDeque<TrackedFrame>,
        never_ready: bool,
    }

    impl Scripted {
        fn new(frames: Vec<TrackedFrame>) -> Self {
            Self {
                frames: VecDeque::from(frames),
                never_ready: false,
            }
        }
    }

    impl HandTracker for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn start(&mut self, budget: Duration) -> Result<bool, TrackingError> {
            if self.never_ready {
                thread::sleep(budget);
            }
            Ok(!self.never_ready)
        }

        fn poll(&mut self, timeout: Duration) -> Result<Option<TrackedFrame>, TrackingError> {
            match self.frames.pop_front() {
                Some(frame) => Ok(Some(frame)),
                None => {
                    thread::sleep(timeout);
                    Ok(None)
                }
            }
        }
    }

    fn hand_with_gap(gap: f32) -> HandLandmarks {
        let mut points = [glam::Vec3::splat(0.5); 21];
        points[crate::gesture::INDEX_TIP].x += gap;
        HandLandmarks::new(points)
    }

    fn pinched_hand() -> HandLandmarks {
        hand_with_gap(0.01)
    }

    fn open_hand() -> HandLandmarks {
        hand_with_gap(0.2)
    }

    fn wait_for<F: FnMut(&mut HandFeed) -> bool>(feed: &mut HandFeed, mut done: F) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !done(feed) {
            assert!(Instant::now() < deadline, "timed out, status {:?}", feed.status());
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_frame_gate_skips_stale_timestamps() {
        let mut gate = FrameGate::new();
        assert!(gate.admit(0));
        assert!(!gate.admit(0));
        assert!(gate.admit(5));
        assert!(!gate.admit(3));
        assert!(gate.admit(6));
    }

    #[test]
    fn test_feed_delivers_latest_snapshot() {
        let tracker = Scripted::new(vec![
            TrackedFrame { timestamp_ms: 1, hand: None },
            TrackedFrame { timestamp_ms: 2, hand: Some(pinched_hand()) },
        ]);
        let handle = TrackerHandle::spawn(Box::new(tracker), &TrackingConfig::default()).unwrap();
        let mut feed = HandFeed::from_handle(handle);

        wait_for(&mut feed, |f| f.latest().is_exploding());
        assert_eq!(feed.status(), &TrackerStatus::Running);
        feed.shutdown();
    }

    #[test]
    fn test_stale_frame_is_not_interpreted() {
        let tracker = Scripted::new(vec![
            TrackedFrame { timestamp_ms: 10, hand: Some(open_hand()) },
            TrackedFrame { timestamp_ms: 10, hand: Some(pinched_hand()) },
        ]);
        let handle = TrackerHandle::spawn(Box::new(tracker), &TrackingConfig::default()).unwrap();
        let mut feed = HandFeed::from_handle(handle);

        wait_for(&mut feed, |f| f.latest().detected);
        thread::sleep(Duration::from_millis(50));
        assert!(!feed.latest().pinched);
    }

    #[test]
    fn test_unread_snapshots_do_not_pile_up() {
        let frames = (1..=1000)
            .map(|ts| TrackedFrame {
                timestamp_ms: ts,
                hand: Some(if ts == 1000 { pinched_hand() } else { open_hand() }),
            })
            .collect();
        let handle =
            TrackerHandle::spawn(Box::new(Scripted::new(frames)), &TrackingConfig::default())
                .unwrap();
        thread::sleep(Duration::from_millis(200));

        let mut events = 0;
        while handle.try_event().is_ok() {
            events += 1;
        }
        assert_eq!(events, 1, "only Ready should be queued");
        assert!(handle.take_hand().is_some_and(|s| s.is_exploding()));
        assert!(handle.take_hand().is_none());
    }

    #[test]
    fn test_startup_failure_reaches_status() {
        let tracker = Scripted {
            frames: VecDeque::new(),
            never_ready: true,
        };
        let config = TrackingConfig {
            startup_timeout_ms: 60,
            ..TrackingConfig::default()
        };
        let handle = TrackerHandle::spawn(Box::new(tracker), &config).unwrap();
        let mut feed = HandFeed::from_handle(handle);

        wait_for(&mut feed, |f| {
            f.latest();
            matches!(f.status(), TrackerStatus::Failed(_))
        });
        match feed.status() {
            TrackerStatus::Failed(msg) => assert!(msg.contains("no landmark frames")),
            other => panic!("unexpected status {:?}", other),
        }
        assert!(!feed.latest().detected);
    }

    #[test]
    fn test_stop_interrupts_startup() {
        let tracker = Scripted {
            frames: VecDeque::new(),
            never_ready: true,
        };
        let config = TrackingConfig {
            startup_timeout_ms: 10_000,
            poll_interval_ms: 16,
            ..TrackingConfig::default()
        };
        let mut handle = TrackerHandle::spawn(Box::new(tracker), &config).unwrap();
        thread::sleep(Duration::from_millis(20));

        let begun = Instant::now();
        handle.stop();
        assert!(begun.elapsed() < Duration::from_millis(500), "{:?}", begun.elapsed());
        assert!(matches!(handle.try_event(), Err(TryRecvError::Disconnected)));
    }

    #[test]
    fn test_backend_config_json() {
        let config = TrackingConfig {
            backend: TrackerBackend::Stream {
                bind: DEFAULT_STREAM_ADDR,
            },
            ..TrackingConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"kind\":\"stream\""));
        assert!(json.contains("127.0.0.1:7878"));
        let back: TrackingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let partial: TrackingConfig = serde_json::from_str(r#"{"backend":{"kind":"simulated"}}"#).unwrap();
        assert_eq!(partial, TrackingConfig::default());
    }
}
