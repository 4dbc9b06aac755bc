//! Session settings
//!
//! Loaded from an optional JSON file on startup. Only configuration is stored
//! here; generated mazes are never persisted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_ITERATIONS, DEFAULT_WIDTH};
use crate::error::MazeError;
use crate::sim::{AgentTuning, validate_size};

/// How the host presents the maze and drives the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewMode {
    /// Top-down view, agent moves one cell per key press
    #[default]
    Grid2d,
    /// Top-down view, continuous physics
    Overhead,
    /// Depth-sampled first-person view, continuous physics
    FirstPerson,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid2d => "2D view and gameplay",
            ViewMode::Overhead => "2D view, 3D gameplay",
            ViewMode::FirstPerson => "3D view and gameplay",
        }
    }

    /// Next mode in the cycle
    pub fn next(self) -> Self {
        match self {
            ViewMode::Grid2d => ViewMode::Overhead,
            ViewMode::Overhead => ViewMode::FirstPerson,
            ViewMode::FirstPerson => ViewMode::Grid2d,
        }
    }

    /// Whether continuous physics runs in this mode
    pub fn is_continuous(&self) -> bool {
        !matches!(self, ViewMode::Grid2d)
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    /// Braid passes run after each carve
    pub iterations: u32,
    /// Fixed RNG seed; `None` seeds every generation from the clock
    pub seed: Option<u64>,
    pub tuning: AgentTuning,
    pub view_mode: ViewMode,

    // === Depth sampling ===
    /// Distance at which walls fade out completely
    pub camera_range: f32,
    /// Wall stripes per cell
    pub wall_frequency: u32,
    /// Rays per first-person frame
    pub columns: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            tuning: AgentTuning::default(),
            view_mode: ViewMode::Grid2d,
            camera_range: 5.0,
            wall_frequency: 10,
            columns: 320,
        }
    }
}

impl Settings {
    /// Check every value is usable
    pub fn validate(&self) -> Result<(), MazeError> {
        validate_size(self.width, self.height)?;
        let t = &self.tuning;
        let unit = |v: f32| v > 0.0 && v < 1.0;
        if !unit(t.friction) {
            return Err(MazeError::InvalidSetting("tuning.friction"));
        }
        if !unit(t.angular_friction) {
            return Err(MazeError::InvalidSetting("tuning.angular_friction"));
        }
        if !(t.acceleration >= 0.0 && t.angular_acceleration >= 0.0) {
            return Err(MazeError::InvalidSetting("tuning.acceleration"));
        }
        if !(self.camera_range >= 0.0) {
            return Err(MazeError::InvalidSetting("camera_range"));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, MazeError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, MazeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MazeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MazeError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
