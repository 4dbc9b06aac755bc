//! Braiding: grow stub corridors off recorded turn points
//!
//! Each pass walks from every turn point known when the pass starts, using
//! the same leaf test as the carver but without a closed set and without
//! backtracking. Walks only ever set `Path`, so braiding never disturbs the
//! `TruePath` solution and never removes a carved cell.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use super::carve::{Coord, Direction, open_moves};
use super::grid::{CellFlags, Grid};

/// Run `iterations` braid passes over `grid`, appending new turn points to `turns`.
///
/// Returns `false` if `cancel` was observed before all passes finished.
pub fn braid<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
    turns: &mut Vec<Coord>,
    iterations: u32,
    cancel: &AtomicBool,
) -> bool {
    let carved_before = grid.count(CellFlags::PATH);
    for pass in 0..iterations {
        let mut last_direction: Option<Direction> = None;
        let known = turns.len();
        for i in 0..known {
            let mut cursor = turns[i];
            loop {
                if cancel.load(Ordering::Relaxed) {
                    return false;
                }
                let candidates = open_moves(grid, cursor, |_| true);
                if candidates.is_empty() {
                    break;
                }
                let dir = candidates[rng.random_range(0..candidates.len())];
                if last_direction != Some(dir) {
                    last_direction = Some(dir);
                    turns.push(cursor);
                }
                cursor = dir.apply(cursor);
                grid.assign(cursor.0, cursor.1, CellFlags::PATH);
            }
        }
        log::trace!("Braid pass {}: {} turn points", pass + 1, turns.len());
    }
    log::debug!(
        "Braided {} passes: {} -> {} carved cells",
        iterations,
        carved_before,
        grid.count(CellFlags::PATH)
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::carve::{CarveOutcome, carve};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn carved(width: usize, height: usize, seed: u64) -> (Grid, Vec<Coord>, Pcg32) {
        let mut grid = Grid::try_new(width, height).unwrap();
        let mut rng = Pcg32::seed_from_u64(seed);
        let turns = match carve(&mut grid, &mut rng, &AtomicBool::new(false)) {
            CarveOutcome::Complete(turns) => turns,
            CarveOutcome::Cancelled => unreachable!(),
        };
        (grid, turns, rng)
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let (mut grid, mut turns, mut rng) = carved(8, 8, 11);
        let before = grid.clone();
        let turn_count = turns.len();
        assert!(braid(&mut grid, &mut rng, &mut turns, 0, &AtomicBool::new(false)));
        assert_eq!(grid, before);
        assert_eq!(turns.len(), turn_count);
    }

    #[test]
    fn test_braid_preserves_solution() {
        let (mut grid, mut turns, mut rng) = carved(12, 12, 21);
        let before = grid.clone();
        braid(&mut grid, &mut rng, &mut turns, 5, &AtomicBool::new(false));

        for (x, y) in grid.coords() {
            assert_eq!(
                grid.check(x, y, CellFlags::TRUE_PATH),
                before.check(x, y, CellFlags::TRUE_PATH)
            );
            if before.check(x, y, CellFlags::PATH) {
                assert!(grid.check(x, y, CellFlags::PATH));
            }
        }
        assert!(grid.count(CellFlags::PATH) >= before.count(CellFlags::PATH));
        assert!(grid.is_connected(grid.start(), grid.goal()));
    }

    #[test]
    fn test_braid_observes_cancel() {
        let (mut grid, mut turns, mut rng) = carved(6, 6, 2);
        assert!(!braid(&mut grid, &mut rng, &mut turns, 5, &AtomicBool::new(true)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_more_iterations_is_superset(
            width in 2usize..14,
            height in 2usize..14,
            seed in any::<u64>(),
            k in 0u32..6,
        ) {
            let (grid, turns, rng) = carved(width, height, seed);
            let cancel = AtomicBool::new(false);

            let (mut fewer, mut fewer_turns, mut fewer_rng) =
                (grid.clone(), turns.clone(), rng.clone());
            braid(&mut fewer, &mut fewer_rng, &mut fewer_turns, k, &cancel);

            let (mut more, mut more_turns, mut more_rng) = (grid, turns, rng);
            braid(&mut more, &mut more_rng, &mut more_turns, k + 1, &cancel);

            for (x, y) in fewer.coords() {
                if fewer.check(x, y, CellFlags::PATH) {
                    prop_assert!(more.check(x, y, CellFlags::PATH));
                }
                if more.check(x, y, CellFlags::TRUE_PATH) {
                    prop_assert!(more.check(x, y, CellFlags::PATH));
                }
            }
        }
    }
}
