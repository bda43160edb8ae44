//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! User creation times are stored as RFC 3339 UTC strings. Habit creation
//! times and completion timestamps are naive local date-times written as
//! `YYYY-MM-DD HH:MM:SS[.fff]`. UUIDs are stored as hyphenated lowercase
//! strings.

use cadence_core::{
  completion::{Completion, MoodScore},
  habit::{Habit, Periodicity, User},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDateTime ────────────────────────────────────────────────────────────

const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Accepted on read, in order. `%.f` also matches an absent fraction.
const NAIVE_READ_FORMATS: [&str; 4] = [
  NAIVE_FORMAT,
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%dT%H:%M",
];

pub fn encode_naive_dt(dt: NaiveDateTime) -> String {
  dt.format(NAIVE_FORMAT).to_string()
}

/// Parse a stored local timestamp.
///
/// Besides the format we write, this accepts a `T` separator, minute
/// precision, RFC 3339 strings with an offset (keeping the wall-clock time as
/// written) and bare dates (taken as midnight).
pub fn decode_naive_dt(s: &str) -> Result<NaiveDateTime> {
  let s = s.trim();

  if let Some(dt) = NAIVE_READ_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
  {
    return Ok(dt);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.naive_local());
  }
  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return Ok(date.and_time(NaiveTime::MIN));
  }

  Err(Error::DateParse(format!("unrecognised timestamp: {s:?}")))
}

// ─── Periodicity ──────────────────────────────────────────────────────────────

pub fn encode_periodicity(p: Periodicity) -> &'static str { p.into() }

pub fn decode_periodicity(s: &str) -> Result<Periodicity> {
  Ok(Periodicity::parse(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub username:   String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id:    String,
  pub user_id:     String,
  pub name:        String,
  pub periodicity: String,
  pub created_at:  String,
  pub is_active:   bool,
}

impl RawHabit {
  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      habit_id:    decode_uuid(&self.habit_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      name:        self.name,
      periodicity: decode_periodicity(&self.periodicity)?,
      created_at:  decode_naive_dt(&self.created_at)?,
      is_active:   self.is_active,
    })
  }
}

/// Raw values read directly from a `completions` row.
pub struct RawCompletion {
  pub completion_id: String,
  pub habit_id:      String,
  pub timestamp:     Option<String>,
  pub note:          Option<String>,
  pub mood_score:    Option<i64>,
}

impl RawCompletion {
  /// Decoded separately so callers can log the raw value of a bad timestamp.
  pub fn decode_timestamp(&self) -> Result<NaiveDateTime> {
    match self.timestamp.as_deref() {
      Some(s) => decode_naive_dt(s),
      None => Err(Error::DateParse("missing timestamp".into())),
    }
  }

  /// Fails only on a malformed id. An out-of-range mood is dropped with a
  /// warning; it never affects streaks.
  pub fn into_completion(self, timestamp: NaiveDateTime) -> Result<Completion> {
    let completion_id = decode_uuid(&self.completion_id)?;
    let mood_score = self.mood_score.and_then(|raw| {
      MoodScore::try_from(raw)
        .inspect_err(|e| warn!(%completion_id, error = %e, "dropping stored mood score"))
        .ok()
    });

    Ok(Completion {
      completion_id,
      habit_id: decode_uuid(&self.habit_id)?,
      timestamp,
      note: self.note,
      mood_score,
    })
  }
}
