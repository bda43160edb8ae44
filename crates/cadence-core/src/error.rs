//! Error types for `cadence-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("habit name must not be empty")]
  EmptyHabitName,

  #[error("mood score must be between 1 and 10, got {0}")]
  InvalidMoodScore(i64),

  #[error("unknown periodicity: {0:?}")]
  UnknownPeriodicity(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
