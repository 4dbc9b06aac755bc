//! Grid ray casting
//!
//! Shared by agent collision and depth sampling. The ray is walked across
//! integer grid-line crossings on each axis independently; a crossing is a
//! hit when the cell just past it is not carved (or lies outside the grid).
//! The result is the nearest hit over both axes.

use glam::Vec2;

use super::grid::{CellFlags, Grid};

/// Direction components smaller than this are treated as exactly zero
const AXIS_EPSILON: f32 = 1e-6;

/// Distance from `origin` to the first wall along `direction` (radians).
pub fn cast_ray(grid: &Grid, origin: Vec2, direction: f32) -> f32 {
    let dir = Vec2::new(direction.cos(), direction.sin());
    let mut best = f32::INFINITY;

    if dir.y.abs() >= AXIS_EPSILON {
        if let Some(d) = scan_rows(grid, origin, dir) {
            best = best.min(d);
        }
    }
    if dir.x.abs() >= AXIS_EPSILON {
        if let Some(d) = scan_columns(grid, origin, dir) {
            best = best.min(d);
        }
    }

    best.sqrt()
}

/// Squared distance to the nearest blocked horizontal grid line
fn scan_rows(grid: &Grid, origin: Vec2, dir: Vec2) -> Option<f32> {
    let height = grid.height() as i32;
    let run = dir.x / dir.y;
    let cross = |row: i32| {
        let x0 = origin.x + (row as f32 - origin.y) * run;
        let dist = (x0 - origin.x).powi(2) + (row as f32 - origin.y).powi(2);
        (x0.floor() as i32, dist)
    };

    if dir.y > 0.0 {
        // Distances grow with each row, so the first hit is the nearest
        (origin.y.floor() as i32 + 1..=height)
            .map(|row| (row, cross(row)))
            .find(|&(row, (cx, _))| !grid.check(cx, row, CellFlags::PATH))
            .map(|(_, (_, dist))| dist)
    } else {
        (0..=origin.y.floor() as i32)
            .rev()
            .map(|row| (row, cross(row)))
            .find(|&(row, (cx, _))| row == 0 || !grid.check(cx, row - 1, CellFlags::PATH))
            .map(|(_, (_, dist))| dist)
    }
}

/// Squared distance to the nearest blocked vertical grid line
fn scan_columns(grid: &Grid, origin: Vec2, dir: Vec2) -> Option<f32> {
    let width = grid.width() as i32;
    let slope = dir.y / dir.x;
    let cross = |col: i32| {
        let y0 = origin.y + (col as f32 - origin.x) * slope;
        let dist = (col as f32 - origin.x).powi(2) + (y0 - origin.y).powi(2);
        (y0.floor() as i32, dist)
    };

    if dir.x > 0.0 {
        (origin.x.floor() as i32 + 1..=width)
            .map(|col| (col, cross(col)))
            .find(|&(col, (cy, _))| !grid.check(col, cy, CellFlags::PATH))
            .map(|(_, (_, dist))| dist)
    } else {
        (0..=origin.x.floor() as i32)
            .rev()
            .map(|col| (col, cross(col)))
            .find(|&(col, (cy, _))| col == 0 || !grid.check(col - 1, cy, CellFlags::PATH))
            .map(|(_, (_, dist))| dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn open_grid(width: usize, height: usize) -> Grid {
        let mut grid = Grid::try_new(width, height).unwrap();
        for (x, y) in grid.coords().collect::<Vec<_>>() {
            grid.assign(x, y, CellFlags::PATH);
        }
        grid
    }

    #[test]
    fn test_axis_aligned_in_open_grid() {
        let grid = open_grid(4, 4);
        let origin = Vec2::new(1.5, 1.5);
        assert!((cast_ray(&grid, origin, 0.0) - 2.5).abs() < 1e-4);
        assert!((cast_ray(&grid, origin, PI) - 1.5).abs() < 1e-4);
        assert!((cast_ray(&grid, origin, FRAC_PI_2) - 2.5).abs() < 1e-4);
        assert!((cast_ray(&grid, origin, -FRAC_PI_2) - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_single_cell_corridor() {
        let mut grid = Grid::try_new(3, 3).unwrap();
        grid.assign(1, 1, CellFlags::PATH);
        let origin = Vec2::new(1.25, 1.5);
        assert!((cast_ray(&grid, origin, 0.0) - 0.75).abs() < 1e-4);
        assert!((cast_ray(&grid, origin, PI) - 0.25).abs() < 1e-4);
        assert!((cast_ray(&grid, origin, FRAC_PI_2) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_diagonal_hits_corner() {
        let grid = open_grid(2, 2);
        let d = cast_ray(&grid, Vec2::new(0.5, 0.5), FRAC_PI_4);
        assert!((d - 1.5 * 2.0f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_wall_cell_beyond_crossing() {
        let mut grid = open_grid(5, 2);
        grid.remove(3, 0, CellFlags::PATH);
        let d = cast_ray(&grid, Vec2::new(0.5, 0.5), 0.0);
        assert!((d - 2.5).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_distance_finite_and_bounded(
            bits in proptest::collection::vec(any::<bool>(), 48),
            px in 0.01f32..7.99,
            py in 0.01f32..5.99,
            angle in -10.0f32..10.0,
        ) {
            let mut grid = Grid::try_new(8, 6).unwrap();
            for (i, set) in bits.iter().enumerate() {
                if *set {
                    grid.assign(i as i32 % 8, i as i32 / 8, CellFlags::PATH);
                }
            }
            let d = cast_ray(&grid, Vec2::new(px, py), angle);
            prop_assert!(d.is_finite());
            prop_assert!(d >= 0.0);
            prop_assert!(d <= 8.0 * 2.0f32.sqrt() + 1e-3);
        }
    }
}
