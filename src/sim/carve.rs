//! Randomized backtracking carver
//!
//! Walks a cursor from (0, 0) to the goal corner, only stepping into cells
//! whose neighbourhood holds exactly one carved cell (the cursor's own), so
//! the carved region stays a simple corridor. Dead ends are un-carved, closed
//! for the rest of the carve, and popped off the move stack.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use super::grid::{CellFlags, Grid};

/// Grid coordinate
pub type Coord = (i32, i32);

/// Cardinal step direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    West,
    East,
    North,
    South,
}

impl Direction {
    /// Candidate order used when collecting moves
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::East,
        Direction::North,
        Direction::South,
    ];

    #[inline]
    pub fn offset(self) -> Coord {
        match self {
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::North => (0, -1),
            Direction::South => (0, 1),
        }
    }

    #[inline]
    pub fn apply(self, (x, y): Coord) -> Coord {
        let (dx, dy) = self.offset();
        (x + dx, y + dy)
    }
}

/// Directions from `at` into an in-bounds neighbour that passes the leaf test
pub(crate) fn open_moves(
    grid: &Grid,
    at: Coord,
    mut allow: impl FnMut(Coord) -> bool,
) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|dir| {
            let (nx, ny) = dir.apply(at);
            grid.in_bounds(nx, ny) && grid.paths_around(nx, ny) == 1 && allow((nx, ny))
        })
        .collect()
}

/// How a carve ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarveOutcome {
    /// Goal reached; carries the recorded turn points
    Complete(Vec<Coord>),
    /// The cancel flag was observed; grid contents are unspecified
    Cancelled,
}

/// Result of one carve iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarveStep {
    Advanced(Direction),
    Backtracked,
    /// Move stack emptied before the goal; the carve restarted from scratch
    Restarted,
}

/// Carver state between iterations
#[derive(Debug, Clone)]
pub struct Carver {
    cursor: Coord,
    goal: Coord,
    last_direction: Option<Direction>,
    moves: Vec<Coord>,
    turns: Vec<Coord>,
    closed: HashSet<Coord>,
    restarts: u32,
}

impl Carver {
    /// Reset `grid` and seed the walk at the start cell
    pub fn begin(grid: &mut Grid) -> Self {
        let mut carver = Self {
            cursor: grid.start(),
            goal: grid.goal(),
            last_direction: None,
            moves: Vec::new(),
            turns: Vec::new(),
            closed: HashSet::new(),
            restarts: 0,
        };
        carver.reset(grid);
        carver
    }

    fn reset(&mut self, grid: &mut Grid) {
        grid.clear();
        self.moves.clear();
        self.turns.clear();
        self.closed.clear();
        self.last_direction = None;
        self.cursor = grid.start();
        grid.assign(self.cursor.0, self.cursor.1, CellFlags::SOLUTION);
        self.moves.push(self.cursor);
    }

    #[inline]
    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.cursor == self.goal
    }

    #[inline]
    pub fn turns(&self) -> &[Coord] {
        &self.turns
    }

    #[inline]
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Advance the walk by one move or one backtrack
    pub fn step<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> CarveStep {
        let closed = &self.closed;
        let candidates = open_moves(grid, self.cursor, |c| !closed.contains(&c));

        if !candidates.is_empty() {
            let dir = candidates[rng.random_range(0..candidates.len())];
            if self.last_direction != Some(dir) {
                self.last_direction = Some(dir);
                self.turns.push(self.cursor);
            }
            self.cursor = dir.apply(self.cursor);
            grid.assign(self.cursor.0, self.cursor.1, CellFlags::SOLUTION);
            self.moves.push(self.cursor);
            return CarveStep::Advanced(dir);
        }

        grid.remove(self.cursor.0, self.cursor.1, CellFlags::SOLUTION);
        self.closed.insert(self.cursor);
        self.moves.pop();
        match self.moves.last() {
            Some(&top) => {
                self.cursor = top;
                CarveStep::Backtracked
            }
            None => {
                self.restarts += 1;
                log::warn!(
                    "Carve exhausted every branch before the goal, restarting (attempt {})",
                    self.restarts + 1
                );
                self.reset(grid);
                CarveStep::Restarted
            }
        }
    }

    /// Give up the turn list; the closed set is dropped with the carver
    pub fn finish(self) -> Vec<Coord> {
        self.turns
    }
}

/// Carve a solution path from (0, 0) to the goal corner.
///
/// `cancel` is polled once per iteration.
pub fn carve<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
    cancel: &AtomicBool,
) -> CarveOutcome {
    let mut carver = Carver::begin(grid);
    while !carver.is_done() {
        if cancel.load(Ordering::Relaxed) {
            return CarveOutcome::Cancelled;
        }
        carver.step(grid, rng);
    }
    log::debug!(
        "Carved {}x{} maze: {} turn points, {} restarts",
        grid.width(),
        grid.height(),
        carver.turns().len(),
        carver.restarts()
    );
    CarveOutcome::Complete(carver.finish())
}
