//! Habits and their owners.
//!
//! A habit is permanently tagged [`Periodicity::Daily`] or
//! [`Periodicity::Weekly`] when it is created. That tag is the only switch
//! between the daily and weekly streak rules; there is no custom interval.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Periodicity ─────────────────────────────────────────────────────────────

/// The required completion cadence of a habit.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Periodicity {
  #[default]
  Daily,
  Weekly,
}

impl Periodicity {
  /// Plural unit name used when reporting a streak length.
  pub fn unit(self) -> &'static str {
    match self {
      Self::Daily => "days",
      Self::Weekly => "weeks",
    }
  }

  /// Parse the stored discriminant, mapping failures onto the crate error.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse()
      .map_err(|_| Error::UnknownPeriodicity(s.to_owned()))
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// The owner of a set of habits. Every per-user operation takes the
/// `user_id` explicitly; there is no ambient "logged-in" user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub created_at: DateTime<Utc>,
}

// ─── Habit ───────────────────────────────────────────────────────────────────

/// A tracked habit. Also serves as the habit summary returned by periodicity
/// filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
  pub habit_id:    Uuid,
  pub user_id:     Uuid,
  pub name:        String,
  pub periodicity: Periodicity,
  /// Local wall-clock time the habit was created.
  pub created_at:  NaiveDateTime,
  /// Deactivated habits keep their history but drop out of reports.
  pub is_active:   bool,
}

/// Input to [`crate::store::HabitStore::add_habit`].
#[derive(Debug, Clone)]
pub struct NewHabit {
  pub user_id:     Uuid,
  pub name:        String,
  pub periodicity: Periodicity,
}

impl NewHabit {
  /// Build a new habit, trimming the name and rejecting blank ones.
  pub fn new(
    user_id: Uuid,
    name: impl Into<String>,
    periodicity: Periodicity,
  ) -> Result<Self> {
    let name = name.into().trim().to_owned();
    if name.is_empty() {
      return Err(Error::EmptyHabitName);
    }
    Ok(Self { user_id, name, periodicity })
  }
}

/// Starter habits offered to new users.
pub const PREDEFINED_HABITS: [(&str, Periodicity); 5] = [
  ("Drink eight glasses of water daily", Periodicity::Daily),
  ("Spend 30 minutes exercising daily", Periodicity::Daily),
  ("30 Minutes of meditation daily", Periodicity::Daily),
  ("Clean the house once weekly", Periodicity::Weekly),
  ("Call relatives once a week", Periodicity::Weekly),
];
