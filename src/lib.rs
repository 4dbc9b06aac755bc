//! Braid Maze - procedural maze generation with a continuous ray-cast agent
//!
//! Core modules:
//! - `sim`: Grid storage, carving, braiding, ray casting and agent physics
//! - `session`: Owns the grid and agent, runs generation in the background
//! - `view`: Depth sampling for first-person renderers
//! - `settings`: Data-driven configuration

pub mod error;
pub mod session;
pub mod settings;
pub mod sim;
pub mod view;

pub use error::MazeError;
pub use session::Session;
pub use settings::{Settings, ViewMode};

/// Shared configuration constants
pub mod consts {
    /// Physics runs at a nominal 30 updates per second; real deltas are scaled by this
    pub const NOMINAL_RATE: f32 = 30.0;
    /// Longest real frame delta fed to physics, in seconds
    pub const MAX_FRAME_DELTA: f32 = 0.1;
    /// Smallest accepted maze side
    pub const MIN_SIDE: usize = 2;
    /// Default maze dimensions
    pub const DEFAULT_WIDTH: usize = 10;
    pub const DEFAULT_HEIGHT: usize = 10;
    /// Default number of braid passes
    pub const DEFAULT_ITERATIONS: u32 = 5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle`
#[inline]
pub fn heading(angle: f32) -> glam::Vec2 {
    glam::Vec2::new(angle.cos(), angle.sin())
}
