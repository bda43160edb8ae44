//! Completions: append-only check-offs of a habit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// How the user felt when checking a habit off, on a 1–10 scale.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct MoodScore(u8);

impl MoodScore {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 10;

  pub fn get(self) -> u8 { self.0 }
}

impl TryFrom<i64> for MoodScore {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
      Ok(Self(value as u8))
    } else {
      Err(Error::InvalidMoodScore(value))
    }
  }
}

impl From<MoodScore> for i64 {
  fn from(score: MoodScore) -> Self { i64::from(score.0) }
}

/// A single recorded completion. Never edited; removed only when its habit
/// is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
  pub completion_id: Uuid,
  pub habit_id:      Uuid,
  /// Naive local wall-clock time of the check-off.
  pub timestamp:     NaiveDateTime,
  pub note:          Option<String>,
  pub mood_score:    Option<MoodScore>,
}

/// Input to [`crate::store::HabitStore::record_completion`].
#[derive(Debug, Clone)]
pub struct NewCompletion {
  pub habit_id:   Uuid,
  /// Defaults to the local "now" when absent.
  pub timestamp:  Option<NaiveDateTime>,
  pub note:       Option<String>,
  pub mood_score: Option<MoodScore>,
}

impl NewCompletion {
  /// A plain check-off at the current time with no note or mood.
  pub fn new(habit_id: Uuid) -> Self {
    Self { habit_id, timestamp: None, note: None, mood_score: None }
  }

  /// A check-off at an explicit time.
  pub fn at(habit_id: Uuid, timestamp: NaiveDateTime) -> Self {
    Self { timestamp: Some(timestamp), ..Self::new(habit_id) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mood_score_bounds() {
    assert_eq!(MoodScore::try_from(1_i64).unwrap().get(), 1);
    assert_eq!(MoodScore::try_from(10_i64).unwrap().get(), 10);
    assert!(matches!(
      MoodScore::try_from(0_i64),
      Err(Error::InvalidMoodScore(0))
    ));
    assert!(matches!(
      MoodScore::try_from(11_i64),
      Err(Error::InvalidMoodScore(11))
    ));
  }
}
