use thiserror::Error;

/// Failures surfaced to the user as a notice. None of them leave the stored data half written.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("A period is already in progress. End the current period first")]
    AlreadyActive,

    #[error("There is no active period")]
    NoActivePeriod,

    #[error("No cycle at index {index}, history has {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0}")]
    InvalidMoment(String),

    #[error("Failed to import data: {0}")]
    MalformedImport(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
