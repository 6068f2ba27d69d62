//! Configuration types.
//!
//! [`AppConfig`] is what the binary loads from JSON at startup; every field
//! has a default so partial files work. [`ShapeConfig`] is also the live,
//! user-editable state behind the control panel.

use crate::error::ConfigError;
use crate::shape::ShapeKind;
use crate::simulator::SimulationParams;
use crate::tracking::TrackingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Allowed fraction of particles that form the shape.
pub const DENSITY_RANGE: RangeInclusive<f32> = 0.1..=1.0;
/// Allowed shape scale multiplier.
pub const DIFFUSION_RANGE: RangeInclusive<f32> = 0.5..=3.0;
/// Allowed sprite size.
pub const SIZE_RANGE: RangeInclusive<f32> = 2.0..=15.0;

/// User-tunable look of the particle shape.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShapeConfig {
    /// Fraction of particles assigned to the shape; the rest are exiled.
    pub density: f32,
    /// Scale multiplier applied to every shape.
    pub diffusion: f32,
    /// Particle RGB color, each channel 0-1.
    pub color: [f32; 3],
    /// Sprite size in UI units (2-15).
    pub particle_size: f32,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            diffusion: 1.0,
            color: [0.35, 0.75, 1.0],
            particle_size: 6.0,
        }
    }
}

impl ShapeConfig {
    /// Copy with every field pulled into its allowed range.
    ///
    /// NaN falls back to the default for that field.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            density: clamp_or(self.density, DENSITY_RANGE, defaults.density),
            diffusion: clamp_or(self.diffusion, DIFFUSION_RANGE, defaults.diffusion),
            color: self.color.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) }),
            particle_size: clamp_or(self.particle_size, SIZE_RANGE, defaults.particle_size),
        }
    }

    /// Whether switching from `other` to `self` requires new targets.
    ///
    /// Color and size only affect rendering.
    pub fn changes_targets(&self, other: &ShapeConfig) -> bool {
        self.density != other.density || self.diffusion != other.diffusion
    }
}

fn clamp_or(value: f32, range: RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

/// Window settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Gesture Particles".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    /// Number of particle slots. Fixed for the lifetime of the app.
    pub particle_count: usize,
    /// Preset shown at startup.
    pub initial_shape: ShapeKind,
    pub shape: ShapeConfig,
    pub simulation: SimulationParams,
    pub tracking: TrackingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            particle_count: 20_000,
            initial_shape: ShapeKind::Sphere,
            shape: ShapeConfig::default(),
            simulation: SimulationParams::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a configuration from a JSON file and clamp it into range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a configuration from JSON text and clamp it into range.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: AppConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        self.shape = self.shape.clamped();
        self.particle_count = self.particle_count.max(1);
        self
    }
}
