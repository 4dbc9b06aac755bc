//! Depth sampling for first-person and overhead renderers
//!
//! Casts a fan of rays from the agent using the same ray caster as collision,
//! and turns each hit into the values a renderer needs to draw one column.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use crate::heading;
use crate::settings::Settings;
use crate::sim::{Agent, Grid, cast_ray};

/// Horizontal field of view in radians
pub const FIELD_OF_VIEW: f32 = FRAC_PI_2;

/// Viewpoint for a fan of rays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pos: Vec2,
    pub orientation: f32,
    /// Distance at which walls fade to nothing
    pub range: f32,
    /// Wall stripes per cell
    pub wall_frequency: u32,
}

impl Camera {
    pub fn from_agent(agent: &Agent, settings: &Settings) -> Self {
        Self {
            pos: agent.position(),
            orientation: agent.orientation(),
            range: settings.camera_range,
            wall_frequency: settings.wall_frequency,
        }
    }
}

/// One ray of the fan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSample {
    /// Absolute ray angle
    pub angle: f32,
    /// Euclidean distance to the wall
    pub distance: f32,
    /// Distance projected onto the view direction (no fisheye)
    pub corrected: f32,
    /// Where the ray met the wall, in cell units
    pub hit: Vec2,
    /// The hit lies in the goal corner
    pub goal: bool,
    /// Alternating wall band
    pub stripe: bool,
    /// 1 at the camera, 0 at or beyond the camera range
    pub brightness: f32,
}

/// Cast `columns` rays evenly across the field of view, left to right
pub fn sample_fan(grid: &Grid, camera: &Camera, columns: usize) -> Vec<DepthSample> {
    if columns == 0 {
        return Vec::new();
    }
    let first = camera.orientation - FIELD_OF_VIEW / 2.0;
    let step = FIELD_OF_VIEW / columns as f32;
    (0..columns)
        .map(|i| sample(grid, camera, first + i as f32 * step))
        .collect()
}

/// Sample a single ray at `angle`
pub fn sample(grid: &Grid, camera: &Camera, angle: f32) -> DepthSample {
    let distance = cast_ray(grid, camera.pos, angle);
    let corrected = distance * (angle - camera.orientation).cos();
    let hit = camera.pos + heading(angle) * distance;

    let goal = hit.x >= grid.width() as f32 - 1.0 && hit.y >= grid.height() as f32 - 1.0;
    let f = camera.wall_frequency as f32;
    let stripe = ((f * hit.x).floor() as i64 + (f * hit.y).floor() as i64).rem_euclid(2) == 1;
    let brightness = if camera.range > 0.0 {
        1.0 - corrected.clamp(0.0, camera.range) / camera.range
    } else {
        0.0
    };

    DepthSample {
        angle,
        distance,
        corrected,
        hit,
        goal,
        stripe,
        brightness,
    }
}
