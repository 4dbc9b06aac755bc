//! Bounds-checked bitmask grid
//!
//! One byte per cell, row-major. Reads outside the grid return `false` and
//! writes outside the grid are ignored; both the carver and the ray caster
//! rely on that to treat the border as solid wall.

use std::collections::VecDeque;
use std::ops::BitOr;

use glam::Vec2;

use crate::consts::MIN_SIDE;
use crate::error::MazeError;

/// Per-cell flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellFlags(u8);

impl CellFlags {
    pub const NONE: CellFlags = CellFlags(0);
    /// Cell is carved and passable
    pub const PATH: CellFlags = CellFlags(0b0000_0001);
    /// Cell lies on the original, pre-braid solution
    pub const TRUE_PATH: CellFlags = CellFlags(0b0000_0010);
    /// Both carve bits, as set by the initial carve
    pub const SOLUTION: CellFlags = CellFlags(0b0000_0011);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for CellFlags {
    type Output = CellFlags;

    fn bitor(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 | rhs.0)
    }
}

/// Rectangular maze grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Allocate an empty (all wall) grid.
    ///
    /// Fails with [`MazeError::InvalidDimensions`] when either side is below 2
    /// and with [`MazeError::Allocation`] when the buffer cannot be reserved.
    pub fn try_new(width: usize, height: usize) -> Result<Self, MazeError> {
        validate_size(width, height)?;
        let count = width
            .checked_mul(height)
            .ok_or(MazeError::Allocation { cells: usize::MAX })?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_| MazeError::Allocation { cells: count })?;
        cells.resize(count, 0);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The start cell, always (0, 0)
    #[inline]
    pub fn start(&self) -> (i32, i32) {
        (0, 0)
    }

    /// The goal cell in the opposite corner
    #[inline]
    pub fn goal(&self) -> (i32, i32) {
        (self.width as i32 - 1, self.height as i32 - 1)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// True if any bit of `mask` is set on the cell; false out of bounds.
    #[inline]
    pub fn check(&self, x: i32, y: i32, mask: CellFlags) -> bool {
        self.index(x, y)
            .is_some_and(|i| self.cells[i] & mask.bits() != 0)
    }

    /// Set `mask` on the cell. No-op out of bounds.
    #[inline]
    pub fn assign(&mut self, x: i32, y: i32, mask: CellFlags) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] |= mask.bits();
        }
    }

    /// Clear `mask` on the cell. No-op out of bounds.
    #[inline]
    pub fn remove(&mut self, x: i32, y: i32, mask: CellFlags) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] &= !mask.bits();
        }
    }

    /// Number of carved cells among the cell itself and its four neighbours.
    ///
    /// A value of exactly 1 is the leaf test used while carving: stepping
    /// into such a cell cannot close a loop.
    pub fn paths_around(&self, x: i32, y: i32) -> u8 {
        [(x, y), (x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .into_iter()
            .filter(|&(cx, cy)| self.check(cx, cy, CellFlags::PATH))
            .count() as u8
    }

    /// Reset every cell to wall.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Cell containing a continuous position
    #[inline]
    pub fn cell_of(pos: Vec2) -> (i32, i32) {
        (pos.x.floor() as i32, pos.y.floor() as i32)
    }

    /// Number of cells carrying any bit of `mask`
    pub fn count(&self, mask: CellFlags) -> usize {
        self.cells.iter().filter(|&&c| c & mask.bits() != 0).count()
    }

    /// Iterate over all coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height as i32).flat_map(move |y| (0..self.width as i32).map(move |x| (x, y)))
    }

    /// Breadth-first search over `Path` cells
    pub fn is_connected(&self, from: (i32, i32), to: (i32, i32)) -> bool {
        if !self.check(from.0, from.1, CellFlags::PATH) || !self.check(to.0, to.1, CellFlags::PATH)
        {
            return false;
        }
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();
        if let Some(i) = self.index(from.0, from.1) {
            seen[i] = true;
        }
        queue.push_back(from);
        while let Some((x, y)) = queue.pop_front() {
            if (x, y) == to {
                return true;
            }
            for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                if !self.check(nx, ny, CellFlags::PATH) {
                    continue;
                }
                if let Some(i) = self.index(nx, ny) {
                    if !seen[i] {
                        seen[i] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
        false
    }
}

/// Reject sides the carver cannot handle
pub fn validate_size(width: usize, height: usize) -> Result<(), MazeError> {
    if width < MIN_SIDE || height < MIN_SIDE {
        return Err(MazeError::InvalidDimensions { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_grid_is_all_wall() {
        let grid = Grid::try_new(4, 3).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.count(CellFlags::PATH), 0);
        assert_eq!(grid.goal(), (3, 2));
    }

    #[test]
    fn test_rejects_small_sizes() {
        assert!(matches!(
            Grid::try_new(1, 1),
            Err(MazeError::InvalidDimensions { width: 1, height: 1 })
        ));
        assert!(Grid::try_new(2, 1).is_err());
        assert!(Grid::try_new(2, 2).is_ok());
    }

    #[test]
    fn test_assign_and_remove_are_independent_bits() {
        assert_eq!(CellFlags::PATH | CellFlags::TRUE_PATH, CellFlags::SOLUTION);
        let mut grid = Grid::try_new(3, 3).unwrap();
        grid.assign(1, 1, CellFlags::SOLUTION);
        grid.remove(1, 1, CellFlags::TRUE_PATH);
        assert!(grid.check(1, 1, CellFlags::PATH));
        assert!(!grid.check(1, 1, CellFlags::TRUE_PATH));

        // Removing an unset bit must not toggle it on
        grid.remove(1, 1, CellFlags::TRUE_PATH);
        assert!(!grid.check(1, 1, CellFlags::TRUE_PATH));
    }

    #[test]
    fn test_out_of_bounds_writes_are_ignored() {
        let mut grid = Grid::try_new(3, 3).unwrap();
        let before = grid.clone();
        grid.assign(-1, 0, CellFlags::PATH);
        grid.assign(3, 0, CellFlags::PATH);
        grid.assign(0, 3, CellFlags::PATH);
        grid.remove(0, -1, CellFlags::PATH);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_paths_around_counts_self_and_neighbours() {
        let mut grid = Grid::try_new(3, 3).unwrap();
        assert_eq!(grid.paths_around(1, 1), 0);
        grid.assign(1, 1, CellFlags::PATH);
        assert_eq!(grid.paths_around(1, 1), 1);
        grid.assign(0, 1, CellFlags::PATH);
        grid.assign(2, 1, CellFlags::PATH);
        grid.assign(1, 0, CellFlags::PATH);
        grid.assign(1, 2, CellFlags::PATH);
        assert_eq!(grid.paths_around(1, 1), 5);
        // Diagonals don't count
        assert_eq!(grid.paths_around(0, 0), 2);
        // Outside the grid only in-bounds neighbours count
        assert_eq!(grid.paths_around(-1, 1), 1);
    }

    #[test]
    fn test_is_connected() {
        let mut grid = Grid::try_new(3, 3).unwrap();
        for (x, y) in [(0, 0), (1, 0), (2, 0), (2, 1)] {
            grid.assign(x, y, CellFlags::PATH);
        }
        assert!(!grid.is_connected((0, 0), (2, 2)));
        grid.assign(2, 2, CellFlags::PATH);
        assert!(grid.is_connected((0, 0), (2, 2)));
    }

    #[test]
    fn test_cell_of_floors() {
        assert_eq!(Grid::cell_of(Vec2::new(0.5, 1.99)), (0, 1));
        assert_eq!(Grid::cell_of(Vec2::new(-0.1, 0.0)), (-1, 0));
    }

    proptest! {
        #[test]
        fn prop_check_false_outside(
            x in prop_oneof![(-1000i32..0), (8i32..1000)],
            y in -1000i32..1000,
        ) {
            let mut grid = Grid::try_new(8, 8).unwrap();
            for (cx, cy) in grid.coords().collect::<Vec<_>>() {
                grid.assign(cx, cy, CellFlags::SOLUTION);
            }
            prop_assert!(!grid.check(x, y, CellFlags::PATH));
            prop_assert!(!grid.check(y, x, CellFlags::TRUE_PATH));
        }

        #[test]
        fn prop_paths_around_in_range(
            bits in proptest::collection::vec(any::<bool>(), 36),
            x in -2i32..8,
            y in -2i32..8,
        ) {
            let mut grid = Grid::try_new(6, 6).unwrap();
            for (i, set) in bits.iter().enumerate() {
                if *set {
                    grid.assign(i as i32 % 6, i as i32 / 6, CellFlags::PATH);
                }
            }
            let first = grid.paths_around(x, y);
            prop_assert!(first <= 5);
            prop_assert_eq!(first, grid.paths_around(x, y));
        }
    }
}
