//! [`StreakEngine`]: streak reporting over any [`HabitStore`].
//!
//! The engine loads a habit's periodicity and completions once per call,
//! fully materialised, then hands them to the pure functions in
//! [`crate::streak`]. It keeps no state besides the store handle, so calls
//! for different habits are independent.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
  bucket::BucketSet,
  habit::{Habit, Periodicity},
  store::{HabitQuery, HabitStore},
  streak::{self, BestHabit},
};

/// Per-habit report row.
#[derive(Debug, Clone, Serialize)]
pub struct HabitStats {
  pub habit:            Habit,
  /// Raw number of check-offs, including repeats within one period.
  pub completion_count: usize,
  pub current_streak:   u32,
  pub longest_streak:   u32,
  /// Percentage of periods since creation with at least one check-off.
  pub success_rate:     f64,
}

pub struct StreakEngine<S> {
  store: S,
}

impl<S: HabitStore> StreakEngine<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  async fn load_buckets(
    &self,
    habit_id: Uuid,
    periodicity: Periodicity,
  ) -> Result<(BucketSet, usize), S::Error> {
    let completions = self.store.list_completions(habit_id).await?;
    let count = completions.len();
    let buckets = BucketSet::from_timestamps(
      periodicity,
      completions.into_iter().map(|c| c.timestamp),
    );
    Ok((buckets, count))
  }

  async fn buckets(&self, habit_id: Uuid) -> Result<BucketSet, S::Error> {
    let periodicity = self.store.get_periodicity(habit_id).await?;
    Ok(self.load_buckets(habit_id, periodicity).await?.0)
  }

  /// Consecutive periods, ending with the one containing `today`, in which
  /// the habit was completed.
  pub async fn current_streak(
    &self,
    habit_id: Uuid,
    today: NaiveDate,
  ) -> Result<u32, S::Error> {
    let buckets = self.buckets(habit_id).await?;
    let streak = streak::current_streak(&buckets, today);
    debug!(%habit_id, %today, streak, "computed current streak");
    Ok(streak)
  }

  /// The longest run of consecutive completed periods in the habit's history.
  pub async fn longest_streak(&self, habit_id: Uuid) -> Result<u32, S::Error> {
    let buckets = self.buckets(habit_id).await?;
    let streak = streak::longest_streak(&buckets);
    debug!(%habit_id, streak, "computed longest streak");
    Ok(streak)
  }

  /// A user's active habits with the given periodicity, in creation order.
  pub async fn habits_by_periodicity(
    &self,
    user_id: Uuid,
    periodicity: Periodicity,
  ) -> Result<Vec<Habit>, S::Error> {
    let query = HabitQuery::active(user_id).with_periodicity(periodicity);
    self.store.list_habits(&query).await
  }

  /// The active habit with the longest streak. Daily habits are considered
  /// before weekly ones, so on a tie the earlier daily habit wins.
  pub async fn best_habit_overall(
    &self,
    user_id: Uuid,
  ) -> Result<BestHabit, S::Error> {
    let mut habits = self
      .habits_by_periodicity(user_id, Periodicity::Daily)
      .await?;
    habits.extend(
      self
        .habits_by_periodicity(user_id, Periodicity::Weekly)
        .await?,
    );

    let mut streaks = Vec::with_capacity(habits.len());
    for habit in habits {
      let (buckets, _) =
        self.load_buckets(habit.habit_id, habit.periodicity).await?;
      streaks.push((habit.name, streak::longest_streak(&buckets)));
    }

    let best = streak::best_habit(streaks);
    debug!(%user_id, name = ?best.name, streak = best.streak, "best habit");
    Ok(best)
  }

  /// Full statistics for an already-loaded habit.
  pub async fn habit_stats(
    &self,
    habit: Habit,
    today: NaiveDate,
  ) -> Result<HabitStats, S::Error> {
    let (buckets, completion_count) =
      self.load_buckets(habit.habit_id, habit.periodicity).await?;

    Ok(HabitStats {
      completion_count,
      current_streak: streak::current_streak(&buckets, today),
      longest_streak: streak::longest_streak(&buckets),
      success_rate: streak::success_rate(
        &buckets,
        habit.created_at.date(),
        today,
      ),
      habit,
    })
  }

  /// Statistics for every active habit of a user, optionally filtered by
  /// periodicity.
  pub async fn user_stats(
    &self,
    user_id: Uuid,
    periodicity: Option<Periodicity>,
    today: NaiveDate,
  ) -> Result<Vec<HabitStats>, S::Error> {
    let query = HabitQuery { periodicity, ..HabitQuery::active(user_id) };
    let habits = self.store.list_habits(&query).await?;

    let mut stats = Vec::with_capacity(habits.len());
    for habit in habits {
      stats.push(self.habit_stats(habit, today).await?);
    }
    Ok(stats)
  }
}
