//! Crate error type

use std::fmt;

/// Everything that can go wrong outside the normal control flow.
///
/// Cancelling a generation is not represented here; see
/// [`GenerationOutcome`](crate::sim::GenerationOutcome).
#[derive(Debug)]
pub enum MazeError {
    /// Width or height below the supported minimum of 2.
    InvalidDimensions { width: usize, height: usize },
    /// The cell buffer could not be allocated.
    Allocation { cells: usize },
    /// The background generation thread could not be started.
    WorkerSpawn(std::io::Error),
    /// The generation thread exited without reporting a result.
    WorkerLost { version: u64 },
    /// Settings file could not be read or written.
    Io(std::io::Error),
    /// Settings JSON was malformed.
    Json(serde_json::Error),
    /// A settings value is outside its accepted range.
    InvalidSetting(&'static str),
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeError::InvalidDimensions { width, height } => {
                write!(f, "invalid maze size {width}x{height} (both sides must be at least 2)")
            }
            MazeError::Allocation { cells } => write!(f, "failed to allocate {cells} maze cells"),
            MazeError::WorkerSpawn(e) => write!(f, "failed to spawn generation thread: {e}"),
            MazeError::WorkerLost { version } => {
                write!(f, "generation thread for maze {version} exited without a result")
            }
            MazeError::Io(e) => write!(f, "IO error: {e}"),
            MazeError::Json(e) => write!(f, "JSON error: {e}"),
            MazeError::InvalidSetting(name) => write!(f, "setting out of range: {name}"),
        }
    }
}

impl std::error::Error for MazeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MazeError::WorkerSpawn(e) | MazeError::Io(e) => Some(e),
            MazeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MazeError {
    fn from(e: std::io::Error) -> Self {
        MazeError::Io(e)
    }
}

impl From<serde_json::Error> for MazeError {
    fn from(e: serde_json::Error) -> Self {
        MazeError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_dimensions() {
        let err = MazeError::InvalidDimensions { width: 1, height: 1 };
        assert_eq!(
            err.to_string(),
            "invalid maze size 1x1 (both sides must be at least 2)"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_display_worker_lost() {
        let err = MazeError::WorkerLost { version: 3 };
        assert_eq!(
            err.to_string(),
            "generation thread for maze 3 exited without a result"
        );
    }

    #[test]
    fn test_json_error_has_source() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: MazeError = json_err.into();
        assert!(matches!(err, MazeError::Json(_)));
        assert!(err.source().is_some());
    }
}
