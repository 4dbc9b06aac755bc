//! Background maze generation
//!
//! A job owns its grid for the whole carve + braid run and hands it back
//! through a channel once finished. Nothing else can see the grid while it
//! is being carved.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::braid::braid;
use super::carve::{CarveOutcome, carve};
use super::grid::Grid;
use crate::error::MazeError;

/// Parameters for one generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub iterations: u32,
    pub seed: u64,
    /// Monotonic marker identifying this run
    pub version: u64,
}

/// A finished maze
#[derive(Debug, Clone)]
pub struct Generated {
    pub grid: Grid,
    pub version: u64,
    pub seed: u64,
    /// Turn points after braiding
    pub turn_points: usize,
}

/// What a job reports back
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Complete(Generated),
    Cancelled { version: u64 },
}

/// Handle to a running generation thread
pub struct GenerationJob {
    version: u64,
    cancel: Arc<AtomicBool>,
    rx: Receiver<GenerationOutcome>,
    thread: Option<JoinHandle<()>>,
}

impl GenerationJob {
    /// Start carving `grid` on a background thread
    pub fn spawn(grid: Grid, request: GenerationRequest) -> Result<Self, MazeError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let flag = Arc::clone(&cancel);

        let thread = thread::Builder::new()
            .name("maze-generator".to_string())
            .spawn(move || run(grid, request, &flag, tx))
            .map_err(MazeError::WorkerSpawn)?;

        Ok(Self {
            version: request.version,
            cancel,
            rx,
            thread: Some(thread),
        })
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Non-blocking check for a result.
    ///
    /// Fails with [`MazeError::WorkerLost`] once the thread is gone without
    /// having sent anything (it panicked, or the result was already taken).
    pub fn try_take(&self) -> Result<Option<GenerationOutcome>, MazeError> {
        match self.rx.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(MazeError::WorkerLost {
                version: self.version,
            }),
        }
    }

    /// Block until the job reports. `None` if the result was already taken.
    pub fn wait(&self) -> Option<GenerationOutcome> {
        self.rx.recv().ok()
    }

    /// Ask the job to stop and wait for the thread to exit
    pub fn cancel_and_join(mut self) {
        self.shutdown();
    }

    /// A job whose thread is already gone without a result
    #[cfg(test)]
    pub(crate) fn lost(version: u64) -> Self {
        let (_, rx) = mpsc::channel();
        Self {
            version,
            cancel: Arc::new(AtomicBool::new(false)),
            rx,
            thread: None,
        }
    }

    fn shutdown(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Maze generator thread panicked (version {})", self.version);
            }
        }
    }
}

impl Drop for GenerationJob {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    mut grid: Grid,
    request: GenerationRequest,
    cancel: &AtomicBool,
    tx: Sender<GenerationOutcome>,
) {
    let GenerationRequest {
        iterations,
        seed,
        version,
    } = request;
    let mut rng = Pcg32::seed_from_u64(seed);

    let outcome = match carve(&mut grid, &mut rng, cancel) {
        CarveOutcome::Complete(mut turns) => {
            if braid(&mut grid, &mut rng, &mut turns, iterations, cancel) {
                GenerationOutcome::Complete(Generated {
                    grid,
                    version,
                    seed,
                    turn_points: turns.len(),
                })
            } else {
                GenerationOutcome::Cancelled { version }
            }
        }
        CarveOutcome::Cancelled => GenerationOutcome::Cancelled { version },
    };

    match &outcome {
        GenerationOutcome::Complete(g) => log::info!(
            "Maze {} ready: {}x{}, seed {}, {} turn points",
            version,
            g.grid.width(),
            g.grid.height(),
            seed,
            g.turn_points
        ),
        GenerationOutcome::Cancelled { .. } => log::info!("Maze {} generation cancelled", version),
    }
    // Receiver may already be gone if the session was dropped
    let _ = tx.send(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::CellFlags;

    fn request(seed: u64, version: u64) -> GenerationRequest {
        GenerationRequest {
            iterations: 5,
            seed,
            version,
        }
    }

    #[test]
    fn test_job_completes() {
        let grid = Grid::try_new(9, 7).unwrap();
        let job = GenerationJob::spawn(grid, request(17, 1)).unwrap();
        match job.wait() {
            Some(GenerationOutcome::Complete(done)) => {
                assert_eq!(done.version, 1);
                assert_eq!(done.seed, 17);
                assert!(done.grid.is_connected(done.grid.start(), done.grid.goal()));
                assert!(done.grid.count(CellFlags::TRUE_PATH) <= done.grid.count(CellFlags::PATH));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // Result can only be taken once
        assert!(job.wait().is_none());
    }

    #[test]
    fn test_same_seed_same_grid() {
        let a = GenerationJob::spawn(Grid::try_new(8, 8).unwrap(), request(5, 1)).unwrap();
        let b = GenerationJob::spawn(Grid::try_new(8, 8).unwrap(), request(5, 2)).unwrap();
        let (Some(GenerationOutcome::Complete(a)), Some(GenerationOutcome::Complete(b))) =
            (a.wait(), b.wait())
        else {
            panic!("both jobs should complete");
        };
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn test_try_take_reports_lost_worker() {
        let job = GenerationJob::lost(4);
        assert!(matches!(
            job.try_take(),
            Err(MazeError::WorkerLost { version: 4 })
        ));
    }

    #[test]
    fn test_try_take_after_completion() {
        let job = GenerationJob::spawn(Grid::try_new(4, 4).unwrap(), request(1, 2)).unwrap();
        let outcome = loop {
            if let Some(outcome) = job.try_take().unwrap() {
                break outcome;
            }
            std::thread::yield_now();
        };
        assert!(matches!(outcome, GenerationOutcome::Complete(_)));
    }

    #[test]
    fn test_cancel_and_join_returns() {
        let job = GenerationJob::spawn(Grid::try_new(400, 400).unwrap(), request(3, 9)).unwrap();
        job.cancel_and_join();
    }
}
