//! Session: owns the published grid, the agent and the generation job
//!
//! The host holds one `Session` and passes it by reference to its renderer
//! and input handling. While a job is carving, no grid is published: readers
//! see `None` until the finished grid arrives with a new version number.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::consts::MIN_SIDE;
use crate::error::MazeError;
use crate::settings::{Settings, ViewMode};
use crate::sim::{
    Agent, Blocked, CellFlags, Direction, GenerationJob, GenerationOutcome, GenerationRequest,
    Generated, Grid, cast_ray, validate_size,
};
use crate::view::{Camera, DepthSample, sample_fan};

pub struct Session {
    settings: Settings,
    grid: Option<Grid>,
    /// Version of the published grid (0 = nothing published yet)
    version: u64,
    next_version: u64,
    job: Option<GenerationJob>,
    agent: Agent,
    solution_revealed: bool,
}

impl Session {
    /// Create a session. No maze exists until [`Session::generate`] is called.
    pub fn new(settings: Settings) -> Result<Self, MazeError> {
        settings.validate()?;
        Ok(Self {
            agent: Agent::new(settings.tuning),
            settings,
            grid: None,
            version: 0,
            next_version: 0,
            job: None,
            solution_revealed: false,
        })
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Cancel any running job, allocate a fresh grid and start a new carve.
    ///
    /// Returns the version the new maze will be published under.
    pub fn generate(&mut self) -> Result<u64, MazeError> {
        if let Some(job) = self.job.take() {
            log::debug!("Cancelling in-flight maze {}", job.version());
            job.cancel_and_join();
        }

        let grid = Grid::try_new(self.settings.width, self.settings.height)?;
        let request = GenerationRequest {
            iterations: self.settings.iterations,
            seed: self.settings.seed.unwrap_or_else(clock_seed),
            version: self.next_version + 1,
        };
        self.job = Some(GenerationJob::spawn(grid, request)?);
        self.next_version = request.version;
        self.grid = None;

        self.agent.respawn((0, 0));
        self.solution_revealed = false;
        log::info!(
            "Generating maze {}: {}x{}, {} braid passes",
            request.version,
            self.settings.width,
            self.settings.height,
            request.iterations
        );
        Ok(request.version)
    }

    /// Pick up a finished job without blocking. Returns the newly published version.
    pub fn poll(&mut self) -> Option<u64> {
        match self.job.as_ref()?.try_take() {
            Ok(None) => None,
            Ok(Some(outcome)) => {
                self.job = None;
                self.accept(outcome)
            }
            Err(e) => {
                log::error!("{e}");
                self.job = None;
                None
            }
        }
    }

    /// Block until the running job finishes. Returns the newly published version.
    pub fn wait_for_maze(&mut self) -> Option<u64> {
        let outcome = self.job.as_ref()?.wait();
        self.job = None;
        outcome.and_then(|o| self.accept(o))
    }

    fn accept(&mut self, outcome: GenerationOutcome) -> Option<u64> {
        match outcome {
            GenerationOutcome::Complete(Generated { grid, version, .. }) => {
                self.grid = Some(grid);
                self.version = version;
                Some(version)
            }
            GenerationOutcome::Cancelled { .. } => None,
        }
    }

    /// Stop any running job; called by the host on shutdown
    pub fn shutdown(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel_and_join();
        }
    }

    #[inline]
    pub fn is_generating(&self) -> bool {
        self.job.is_some()
    }

    /// The published grid, if one is ready
    #[inline]
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    // === Size and braiding ===

    /// Change the maze size and regenerate. Invalid sizes leave everything untouched.
    pub fn set_size(&mut self, width: usize, height: usize) -> Result<(), MazeError> {
        validate_size(width, height)?;
        if (width, height) == (self.settings.width, self.settings.height) {
            return Ok(());
        }
        let previous = (self.settings.width, self.settings.height);
        self.settings.width = width;
        self.settings.height = height;
        if let Err(e) = self.generate() {
            (self.settings.width, self.settings.height) = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Grow or shrink each side, never below the minimum
    pub fn resize_by(&mut self, dw: isize, dh: isize) -> Result<(), MazeError> {
        let width = self.settings.width.saturating_add_signed(dw).max(MIN_SIDE);
        let height = self.settings.height.saturating_add_signed(dh).max(MIN_SIDE);
        self.set_size(width, height)
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.settings.iterations
    }

    /// Braid passes used by the next `generate`
    pub fn set_iterations(&mut self, iterations: u32) {
        self.settings.iterations = iterations;
    }

    pub fn increase_iterations(&mut self) {
        self.settings.iterations = self.settings.iterations.saturating_add(1);
    }

    pub fn decrease_iterations(&mut self) {
        self.settings.iterations = self.settings.iterations.saturating_sub(1);
    }

    // === Depth view tuning ===

    #[inline]
    pub fn camera_range(&self) -> f32 {
        self.settings.camera_range
    }

    pub fn increase_camera_range(&mut self) {
        self.settings.camera_range += 1.0;
    }

    /// Shorten the fog range by one cell, stopping at 0
    pub fn decrease_camera_range(&mut self) {
        self.settings.camera_range = (self.settings.camera_range - 1.0).max(0.0);
    }

    #[inline]
    pub fn wall_frequency(&self) -> u32 {
        self.settings.wall_frequency
    }

    pub fn increase_wall_frequency(&mut self) {
        self.settings.wall_frequency = self.settings.wall_frequency.saturating_add(1);
    }

    pub fn decrease_wall_frequency(&mut self) {
        self.settings.wall_frequency = self.settings.wall_frequency.saturating_sub(1);
    }

    // === Cell access for the host ===

    pub fn check(&self, x: i32, y: i32, mask: CellFlags) -> bool {
        self.grid.as_ref().is_some_and(|g| g.check(x, y, mask))
    }

    pub fn assign(&mut self, x: i32, y: i32, mask: CellFlags) {
        if let Some(grid) = self.grid.as_mut() {
            grid.assign(x, y, mask);
        }
    }

    pub fn remove(&mut self, x: i32, y: i32, mask: CellFlags) {
        if let Some(grid) = self.grid.as_mut() {
            grid.remove(x, y, mask);
        }
    }

    /// Wall distance from a point, `None` while no grid is published
    pub fn ray_cast(&self, x: f32, y: f32, direction: f32) -> Option<f32> {
        let grid = self.grid.as_ref()?;
        Some(cast_ray(grid, glam::Vec2::new(x, y), direction))
    }

    // === Agent ===

    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn set_intent(&mut self, forward: bool, backward: bool, left: bool, right: bool) {
        self.agent.set_intent(forward, backward, left, right);
    }

    /// Run one physics update with an explicit delta.
    ///
    /// Skipped (returns `None`) in grid-step mode or while no grid is published.
    pub fn update_agent(&mut self, delta_seconds: f32, now: Instant) -> Option<Blocked> {
        self.poll();
        if !self.settings.view_mode.is_continuous() {
            return None;
        }
        let grid = self.grid.as_ref()?;
        let blocked = self.agent.update(grid, delta_seconds, now);
        self.check_goal();
        Some(blocked)
    }

    /// Run one physics update using the time elapsed since the previous one
    pub fn tick(&mut self, now: Instant) -> Option<Blocked> {
        let delta = self
            .agent
            .last_update()
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.update_agent(delta, now)
    }

    /// Move one cell in grid-step mode
    pub fn step(&mut self, dir: Direction) -> bool {
        if self.settings.view_mode.is_continuous() {
            return false;
        }
        let Some(grid) = self.grid.as_ref() else {
            return false;
        };
        let moved = self.agent.step(grid, dir);
        if moved {
            self.check_goal();
        }
        moved
    }

    fn check_goal(&mut self) {
        if let Some(grid) = &self.grid {
            if self.agent.cell() == grid.goal() && !self.solution_revealed {
                log::info!("Goal reached in maze {}", self.version);
                self.solution_revealed = true;
            }
        }
    }

    // === Presentation state ===

    #[inline]
    pub fn view_mode(&self) -> ViewMode {
        self.settings.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.settings.view_mode = mode;
        self.agent.reset();
        if !mode.is_continuous() {
            self.agent.snap_to_cell();
        }
    }

    pub fn cycle_view_mode(&mut self) -> ViewMode {
        let next = self.settings.view_mode.next();
        self.set_view_mode(next);
        next
    }

    #[inline]
    pub fn solution_revealed(&self) -> bool {
        self.solution_revealed
    }

    pub fn toggle_solution(&mut self) {
        self.solution_revealed = !self.solution_revealed;
    }

    /// Depth fan from the agent's viewpoint, `None` while no grid is published
    pub fn depth_samples(&self) -> Option<Vec<DepthSample>> {
        let grid = self.grid.as_ref()?;
        let camera = Camera::from_agent(&self.agent, &self.settings);
        Some(sample_fan(grid, &camera, self.settings.columns))
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
