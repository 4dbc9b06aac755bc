//! Continuous point agent
//!
//! Physics is tied to a nominal 30 Hz update: a real delta of 1/30 s is one
//! unit of `dt`. Collision uses the ray-margin policy: cardinal rays gate each
//! axis, then a full ring of rays around the tentative position catches
//! corners the axis checks miss.

use std::f32::consts::{FRAC_PI_2, PI};
use std::time::Instant;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::carve::Direction;
use super::grid::{CellFlags, Grid};
use super::raycast::cast_ray;
use crate::consts::{MAX_FRAME_DELTA, NOMINAL_RATE};
use crate::{heading, normalize_angle};

/// Minimum wall clearance, in cells
pub const MIN_CLEARANCE: f32 = 0.1 - 0.01;

/// Rays sampled in the corner check (one every π/40)
pub const RING_SAMPLES: u32 = 80;

/// Physics constants, per nominal tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTuning {
    pub acceleration: f32,
    /// Fraction of linear velocity lost per tick, in (0, 1)
    pub friction: f32,
    pub angular_acceleration: f32,
    /// Fraction of angular velocity lost per tick, in (0, 1)
    pub angular_friction: f32,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            acceleration: 0.003,
            friction: 0.03,
            angular_acceleration: 0.005,
            angular_friction: 0.05,
        }
    }
}

/// One intent axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl Axis {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Axis::Negative => -1.0,
            Axis::Neutral => 0.0,
            Axis::Positive => 1.0,
        }
    }
}

/// What the agent is trying to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    /// Positive increases orientation
    pub turn: Axis,
    /// Positive moves along the heading
    pub thrust: Axis,
}

impl Intent {
    /// Decode raw key state. Forward beats backward; turning right beats left.
    pub fn from_keys(forward: bool, backward: bool, left: bool, right: bool) -> Self {
        let thrust = if forward {
            Axis::Positive
        } else if backward {
            Axis::Negative
        } else {
            Axis::Neutral
        };
        let turn = if right {
            Axis::Negative
        } else if left {
            Axis::Positive
        } else {
            Axis::Neutral
        };
        Self { turn, thrust }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Which parts of a proposed move were rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Blocked {
    pub x: bool,
    pub y: bool,
    /// The ring check reverted the whole move
    pub corner: bool,
}

/// The player agent
#[derive(Debug, Clone)]
pub struct Agent {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians, normalized to [-π, π)
    pub orientation: f32,
    pub angular_vel: f32,
    pub intent: Intent,
    pub tuning: AgentTuning,
    last_update: Option<Instant>,
}

impl Agent {
    pub fn new(tuning: AgentTuning) -> Self {
        Self {
            pos: Vec2::splat(0.5),
            vel: Vec2::ZERO,
            orientation: 0.0,
            angular_vel: 0.0,
            intent: Intent::default(),
            tuning,
            last_update: None,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn orientation(&self) -> f32 {
        self.orientation
    }

    /// Timestamp passed to the last `update`
    #[inline]
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn set_intent(&mut self, forward: bool, backward: bool, left: bool, right: bool) {
        self.intent = Intent::from_keys(forward, backward, left, right);
    }

    /// Zero linear and angular velocity, drop all intent and forget the last
    /// update time so the next `tick` starts from a zero delta
    pub fn reset(&mut self) {
        self.vel = Vec2::ZERO;
        self.angular_vel = 0.0;
        self.intent = Intent::default();
        self.last_update = None;
    }

    /// Place at the centre of `cell` facing along +x, at rest
    pub fn respawn(&mut self, cell: (i32, i32)) {
        self.reset();
        self.pos = Vec2::new(cell.0 as f32 + 0.5, cell.1 as f32 + 0.5);
        self.orientation = 0.0;
    }

    /// Cell currently containing the agent
    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        Grid::cell_of(self.pos)
    }

    /// Advance physics by `delta_seconds` and resolve collisions against `grid`.
    ///
    /// The delta is capped at [`MAX_FRAME_DELTA`]; friction never removes more
    /// than the whole velocity.
    pub fn update(&mut self, grid: &Grid, delta_seconds: f32, now: Instant) -> Blocked {
        self.last_update = Some(now);
        let dt = delta_seconds.clamp(0.0, MAX_FRAME_DELTA) * NOMINAL_RATE;
        let t = self.tuning;

        self.angular_vel += self.intent.turn.sign() * t.angular_acceleration * dt;
        self.angular_vel *= (1.0 - t.angular_friction * dt).max(0.0);
        self.orientation = normalize_angle(self.orientation + self.angular_vel * dt);

        self.vel += heading(self.orientation) * self.intent.thrust.sign() * t.acceleration * dt;
        self.vel *= (1.0 - t.friction * dt).max(0.0);

        self.resolve_collisions(grid, dt)
    }

    fn resolve_collisions(&mut self, grid: &Grid, dt: f32) -> Blocked {
        let step = self.vel * dt;
        let mut blocked = Blocked::default();

        if cast_ray(grid, self.pos, 0.0) - step.x < MIN_CLEARANCE
            || cast_ray(grid, self.pos, PI) + step.x < MIN_CLEARANCE
        {
            self.vel.x = 0.0;
            blocked.x = true;
        } else {
            self.pos.x += step.x;
        }

        // Y is checked from the already-moved X position
        if cast_ray(grid, self.pos, FRAC_PI_2) - step.y < MIN_CLEARANCE
            || cast_ray(grid, self.pos, -FRAC_PI_2) + step.y < MIN_CLEARANCE
        {
            self.vel.y = 0.0;
            blocked.y = true;
        } else {
            self.pos.y += step.y;
        }

        if blocked.x || blocked.y {
            return blocked;
        }

        let first = self.orientation - PI;
        let too_close = (0..RING_SAMPLES)
            .map(|i| first + i as f32 * (PI / 40.0))
            .any(|angle| cast_ray(grid, self.pos, angle) < MIN_CLEARANCE);
        if too_close {
            self.pos -= step;
            self.vel = Vec2::ZERO;
            blocked.corner = true;
        }
        blocked
    }

    /// Discrete move of one whole cell, only into a carved neighbour
    pub fn step(&mut self, grid: &Grid, dir: Direction) -> bool {
        let (nx, ny) = dir.apply(self.cell());
        if !grid.check(nx, ny, CellFlags::PATH) {
            return false;
        }
        let (dx, dy) = dir.offset();
        self.pos += Vec2::new(dx as f32, dy as f32);
        true
    }

    /// Move to the centre of the current cell
    pub fn snap_to_cell(&mut self) {
        let (x, y) = self.cell();
        self.pos = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
    }
}
