//! Error types for gesture-particles.
//!
//! GPU initialization, hand tracker startup, configuration files and the
//! particle buffer each get their own error type. [`AppError`] collects the
//! ones that can abort [`crate::run`].

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors raised while bringing up a hand tracker.
///
/// These are the only failures shown to the user. They end up in the status
/// banner and gesture control stays off for the rest of the session.
#[derive(Debug)]
pub enum TrackingError {
    /// The landmark socket could not be bound.
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    /// The external detector never sent a frame.
    StartupTimeout(Duration),
    /// The tracker thread could not be started.
    Spawn(std::io::Error),
    /// Reading from the landmark source failed after startup.
    Io(std::io::Error),
    /// The landmark source went away.
    Closed,
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::Bind { addr, source } => {
                write!(f, "Hand tracker unavailable: cannot listen on {}: {}", addr, source)
            }
            TrackingError::StartupTimeout(timeout) => write!(
                f,
                "Hand tracker unavailable: no landmark frames received within {:.1}s",
                timeout.as_secs_f32()
            ),
            TrackingError::Spawn(e) => write!(f, "Failed to start hand tracker: {}", e),
            TrackingError::Io(e) => write!(f, "Hand tracker stopped: {}", e),
            TrackingError::Closed => write!(f, "Hand tracker stopped: landmark source closed"),
        }
    }
}

impl std::error::Error for TrackingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackingError::Bind { source, .. } => Some(source),
            TrackingError::Spawn(e) | TrackingError::Io(e) => Some(e),
            TrackingError::StartupTimeout(_) | TrackingError::Closed => None,
        }
    }
}

/// A landmark datagram that could not be decoded. Logged and dropped.
#[derive(Debug)]
pub enum PacketError {
    /// Not valid packet JSON.
    Json(serde_json::Error),
    /// A hand with the wrong number of landmarks.
    LandmarkCount(usize),
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::Json(e) => write!(f, "malformed landmark packet: {}", e),
            PacketError::LandmarkCount(n) => {
                write!(f, "landmark packet has {} points, expected 21", n)
            }
        }
    }
}

impl std::error::Error for PacketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PacketError::Json(e) => Some(e),
            PacketError::LandmarkCount(_) => None,
        }
    }
}

impl From<serde_json::Error> for PacketError {
    fn from(e: serde_json::Error) -> Self {
        PacketError::Json(e)
    }
}

/// Errors that can occur loading or saving an [`crate::AppConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the file.
    Io { path: PathBuf, source: std::io::Error },
    /// The file is not valid configuration JSON.
    Json { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to access config {}: {}", path.display(), source)
            }
            ConfigError::Json { path, source } => {
                write!(f, "Invalid config {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json { source, .. } => Some(source),
        }
    }
}

/// Errors from mutating the particle buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A target list did not match the fixed particle count.
    LengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::LengthMismatch { expected, actual } => write!(
                f,
                "Target list has {} entries but the buffer holds {} particles",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for BufferError {}

/// Errors that can abort the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration could not be loaded or saved.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Config(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}
