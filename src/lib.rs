//! # Gesture Particles
//!
//! A glowing point cloud that forms shapes and reacts to a hand.
//!
//! Particles ease toward target positions generated from a preset shape
//! (cloud, sphere, cube, ring) or from a freehand stroke. A tracked hand
//! that pinches thumb and index together blows the cloud apart; releasing
//! the pinch lets it reassemble.
//!
//! ## Quick Start
//!
//! ```ignore
//! use gesture_particles::{run, AppConfig};
//!
//! fn main() -> Result<(), gesture_particles::AppError> {
//!     run(AppConfig::default())
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`shape`] turns a [`ShapeSelector`] and [`ShapeConfig`] into one target
//!   per particle, exiling the slots density leaves unused.
//! - [`simulator`] moves particles toward targets, or away from the hand
//!   while it pinches.
//! - [`gesture`] reads pinch and position from 21 hand landmarks.
//! - [`tracking`] runs a landmark source on its own thread and hands the
//!   render loop the newest [`HandState`].
//! - [`drawing`] turns a pointer stroke into custom targets.
//!
//! ## Hand Tracking
//!
//! The default `simulated` backend drives a synthetic hand from the mouse:
//! `H` shows or hides it, holding `Space` pinches. The `stream` backend
//! listens for JSON landmark datagrams from an external detector; see
//! [`tracking::stream`] for the format.
//!
//! ## Controls
//!
//! | Input | Action |
//! |-------|--------|
//! | `1`-`4` | Cloud, sphere, cube, ring |
//! | `C` | Draw a custom shape (`Esc` cancels) |
//! | Right drag | Orbit |
//! | Wheel | Zoom |

pub mod config;
pub mod drawing;
pub mod error;
pub mod gesture;
pub mod gpu;
pub mod input;
pub mod panel;
pub mod particles;
pub mod sampling;
pub mod scene;
pub mod shape;
pub mod simulator;
pub mod time;
pub mod tracking;

mod app;

pub use config::{AppConfig, ShapeConfig};
pub use error::{AppError, BufferError, ConfigError, GpuError, TrackingError};
pub use gesture::{GestureInterpreter, HandLandmarks, HandState};
pub use glam::{Vec2, Vec3};
pub use particles::ParticleBuffer;
pub use sampling::Sampler;
pub use scene::Scene;
pub use shape::{ShapeKind, ShapeSelector};
pub use simulator::{SimulationParams, Simulator};
pub use tracking::{HandFeed, TrackerBackend, TrackingConfig};

use winit::event_loop::{ControlFlow, EventLoop};

/// Open the window and run until it is closed.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(config);
    event_loop.run_app(&mut app)?;
    app.into_result()
}
