//! The `HabitStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `cadence-store-sqlite`).
//! The streak engine and the CLI depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  completion::{Completion, NewCompletion},
  habit::{Habit, NewHabit, Periodicity, User},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`HabitStore::list_habits`].
#[derive(Debug, Clone)]
pub struct HabitQuery {
  pub user_id:          Uuid,
  /// Restrict to one periodicity.
  pub periodicity:      Option<Periodicity>,
  /// Include deactivated habits.
  pub include_inactive: bool,
}

impl HabitQuery {
  /// Active habits of every periodicity owned by `user_id`.
  pub fn active(user_id: Uuid) -> Self {
    Self { user_id, periodicity: None, include_inactive: false }
  }

  pub fn with_periodicity(mut self, periodicity: Periodicity) -> Self {
    self.periodicity = Some(periodicity);
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a habit store backend.
///
/// Completions are append-only: they are never edited, and only disappear
/// when their habit is deleted.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user. Returns an error if the username is taken.
  fn add_user(
    &self,
    username: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look a user up by username.
  fn find_user<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Habits ────────────────────────────────────────────────────────────

  /// Persist a new habit. `created_at` is set by the store.
  fn add_habit(
    &self,
    input: NewHabit,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + '_;

  /// Retrieve a habit by UUID, active or not. Returns `None` if not found.
  fn get_habit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// List habits in creation order.
  fn list_habits<'a>(
    &'a self,
    query: &'a HabitQuery,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + 'a;

  /// Hide a habit from reports while keeping its history.
  fn deactivate_habit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a habit and every completion recorded against it.
  fn delete_habit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Completions ───────────────────────────────────────────────────────

  /// Record a check-off. Fails if the habit does not exist or is not owned
  /// by `user_id`.
  fn record_completion(
    &self,
    user_id: Uuid,
    input: NewCompletion,
  ) -> impl Future<Output = Result<Completion, Self::Error>> + Send + '_;

  /// All completions of a habit, ascending by timestamp, as one consistent
  /// snapshot. Rows whose timestamp or id cannot be parsed are skipped with a
  /// warning rather than failing the whole read; an out-of-range mood score
  /// is dropped.
  fn list_completions(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Completion>, Self::Error>> + Send + '_;

  /// The periodicity of a habit, falling back to [`Periodicity::Daily`] when
  /// the habit does not exist.
  fn get_periodicity(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Periodicity, Self::Error>> + Send + '_;
}
