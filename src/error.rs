//! Crate-level error types.

use std::fmt;

use crate::points::PointStoreError;

/// Errors produced by the cloudpick crate.
#[derive(Debug)]
pub enum CloudpickError {
    /// Invalid point buffer.
    PointStore(PointStoreError),
    /// A selection query failed as a whole.
    Selection(SelectionError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a worker thread.
    ThreadSpawn(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for CloudpickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointStore(e) => write!(f, "point store error: {e}"),
            Self::Selection(e) => write!(f, "selection error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn worker thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for CloudpickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PointStore(e) => Some(e),
            Self::Selection(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            Self::OptionsParse(_) => None,
        }
    }
}

impl From<PointStoreError> for CloudpickError {
    fn from(e: PointStoreError) -> Self {
        Self::PointStore(e)
    }
}

impl From<SelectionError> for CloudpickError {
    fn from(e: SelectionError) -> Self {
        Self::Selection(e)
    }
}

impl From<std::io::Error> for CloudpickError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Failure of a single selection query.
///
/// A query either completes with every partition merged or fails with one
/// of these; partial results are never returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The scan of a partition panicked inside its worker.
    WorkerPanicked {
        /// Index of the failed partition.
        partition: usize,
    },
    /// A worker went away before reporting its partition.
    WorkerLost {
        /// Index of the first partition that never reported.
        partition: usize,
    },
    /// The task could not be handed to a worker (its thread has exited).
    WorkerUnavailable {
        /// Index of the unreachable worker.
        worker: usize,
    },
    /// The result was already taken from the pending query.
    AlreadyCollected {
        /// Generation of the query.
        generation: u64,
    },
    /// More points were requested than the store holds.
    PointCountOutOfRange {
        /// Requested point count.
        requested: usize,
        /// Points available in the store.
        available: usize,
    },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerPanicked { partition } => {
                write!(f, "scan of partition {partition} panicked")
            }
            Self::WorkerLost { partition } => {
                write!(f, "partition {partition} never reported a result")
            }
            Self::WorkerUnavailable { worker } => {
                write!(f, "worker {worker} is no longer running")
            }
            Self::AlreadyCollected { generation } => {
                write!(f, "result of query {generation} was already taken")
            }
            Self::PointCountOutOfRange {
                requested,
                available,
            } => write!(
                f,
                "requested {requested} points but the store holds \
                 {available}"
            ),
        }
    }
}

impl std::error::Error for SelectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_error_converts_and_keeps_source() {
        let err: CloudpickError =
            SelectionError::WorkerPanicked { partition: 2 }.into();
        assert_eq!(
            err.to_string(),
            "selection error: scan of partition 2 panicked"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn options_parse_has_no_source() {
        let err = CloudpickError::OptionsParse("bad".into());
        assert!(std::error::Error::source(&err).is_none());
    }
}
