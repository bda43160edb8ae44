//! Streak calculation over a [`BucketSet`].
//!
//! Everything in this module is pure: the same bucket set and reference date
//! always give the same answer, and nothing is cached between calls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bucket::{Bucket, BucketSet};

/// Consecutive occupied buckets ending at the bucket containing `today`.
///
/// Walks backwards one period at a time from today's bucket and stops at the
/// first gap. An empty current period yields 0 regardless of history.
pub fn current_streak(buckets: &BucketSet, today: NaiveDate) -> u32 {
  if buckets.is_empty() {
    return 0;
  }

  let mut streak = 0;
  let mut cursor = Some(Bucket::of(buckets.periodicity(), today));
  while let Some(bucket) = cursor.filter(|b| buckets.contains(b)) {
    streak += 1;
    cursor = bucket.prev();
  }
  streak
}

/// The longest run of consecutive occupied buckets anywhere in the history.
pub fn longest_streak(buckets: &BucketSet) -> u32 {
  let mut iter = buckets.iter();
  let Some(mut prev) = iter.next() else {
    return 0;
  };

  let mut run = 1;
  let mut best = 1;
  for curr in iter {
    if prev.is_followed_by(curr) {
      run += 1;
      best = best.max(run);
    } else {
      run = 1;
    }
    prev = curr;
  }
  best
}

/// Share of periods, from the one the habit was created in through today's,
/// that contain at least one completion. A percentage rounded to one decimal.
///
/// Completions outside that window (backfilled before creation, or dated in
/// the future) are not counted.
pub fn success_rate(
  buckets: &BucketSet,
  created_on: NaiveDate,
  today: NaiveDate,
) -> f64 {
  let periodicity = buckets.periodicity();
  let first = Bucket::of(periodicity, created_on);
  let last = Bucket::of(periodicity, today);

  let periods = first
    .periods_until(last)
    .map_or(1, |n| n.max(0) + 1);
  let hit = buckets.count_between(first, last);

  let rate = hit as f64 / periods as f64 * 100.0;
  (rate * 10.0).round() / 10.0
}

// ─── Cross-habit reduction ───────────────────────────────────────────────────

/// The habit with the longest streak among a user's habits.
///
/// `name` is `None` both when there are no habits and when every streak is
/// zero; callers that need to tell those apart must look at the habit list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestHabit {
  pub name:   Option<String>,
  pub streak: u32,
}

/// Pick the habit with the greatest streak. Ties go to the earliest entry.
///
/// Daily and weekly streaks are compared as plain integers even though their
/// units differ.
pub fn best_habit<I, N>(streaks: I) -> BestHabit
where
  I: IntoIterator<Item = (N, u32)>,
  N: Into<String>,
{
  streaks
    .into_iter()
    .fold(BestHabit::default(), |best, (name, streak)| {
      if streak > best.streak {
        BestHabit { name: Some(name.into()), streak }
      } else {
        best
      }
    })
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, NaiveDateTime};

  use super::*;
  use crate::habit::Periodicity;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn noon(d: NaiveDate) -> NaiveDateTime { d.and_hms_opt(12, 0, 0).unwrap() }

  fn daily(dates: &[NaiveDate]) -> BucketSet {
    BucketSet::from_timestamps(Periodicity::Daily, dates.iter().copied().map(noon))
  }

  fn weekly(dates: &[NaiveDate]) -> BucketSet {
    BucketSet::from_timestamps(Periodicity::Weekly, dates.iter().copied().map(noon))
  }

  fn run(start: NaiveDate, days: i64) -> Vec<NaiveDate> {
    (0..days).map(|i| start + Duration::days(i)).collect()
  }

  // ─── Empty input ─────────────────────────────────────────────────────────

  #[test]
  fn empty_history_is_zero() {
    let set = BucketSet::new(Periodicity::Daily);
    assert_eq!(current_streak(&set, date(2024, 1, 1)), 0);
    assert_eq!(longest_streak(&set), 0);

    let set = BucketSet::new(Periodicity::Weekly);
    assert_eq!(current_streak(&set, date(2024, 1, 1)), 0);
    assert_eq!(longest_streak(&set), 0);
  }

  // ─── Daily ───────────────────────────────────────────────────────────────

  #[test]
  fn daily_run_with_trailing_gap() {
    let set = daily(&run(date(2024, 1, 1), 5));
    assert_eq!(longest_streak(&set), 5);
    assert_eq!(current_streak(&set, date(2024, 1, 10)), 0);
  }

  #[test]
  fn daily_current_streak_includes_today() {
    let set = daily(&run(date(2024, 1, 1), 5));
    assert_eq!(current_streak(&set, date(2024, 1, 5)), 5);
    assert_eq!(current_streak(&set, date(2024, 1, 3)), 3);
  }

  #[test]
  fn daily_streak_ending_yesterday_reports_zero() {
    let set = daily(&run(date(2024, 1, 1), 5));
    assert_eq!(current_streak(&set, date(2024, 1, 6)), 0);
  }

  #[test]
  fn daily_longest_picks_the_best_run() {
    let mut dates = run(date(2024, 1, 1), 3);
    dates.extend(run(date(2024, 1, 10), 6));
    dates.extend(run(date(2024, 2, 1), 2));
    let set = daily(&dates);
    assert_eq!(longest_streak(&set), 6);
    assert_eq!(current_streak(&set, date(2024, 2, 2)), 2);
  }

  #[test]
  fn daily_run_across_leap_day_and_year_end() {
    let set = daily(&run(date(2024, 2, 27), 4));
    assert_eq!(longest_streak(&set), 4);

    let set = daily(&run(date(2023, 12, 30), 4));
    assert_eq!(longest_streak(&set), 4);
    assert_eq!(current_streak(&set, date(2024, 1, 2)), 4);
  }

  #[test]
  fn multiple_completions_per_day_count_once() {
    let ts = [
      date(2024, 5, 1).and_hms_opt(7, 0, 0).unwrap(),
      date(2024, 5, 1).and_hms_opt(19, 30, 0).unwrap(),
      date(2024, 5, 2).and_hms_opt(8, 0, 0).unwrap(),
    ];
    let set = BucketSet::from_timestamps(Periodicity::Daily, ts);
    assert_eq!(longest_streak(&set), 2);
    assert_eq!(current_streak(&set, date(2024, 5, 2)), 2);
  }

  #[test]
  fn single_completion() {
    let set = daily(&[date(2024, 6, 1)]);
    assert_eq!(longest_streak(&set), 1);
    assert_eq!(current_streak(&set, date(2024, 6, 1)), 1);
  }

  // ─── Weekly ──────────────────────────────────────────────────────────────

  #[test]
  fn weekly_rollover_after_week_52() {
    // 2023-12-27 is in 2023-W52, 2024-01-03 in 2024-W01.
    let set = weekly(&[date(2023, 12, 27), date(2024, 1, 3)]);
    assert_eq!(longest_streak(&set), 2);
    assert_eq!(current_streak(&set, date(2024, 1, 7)), 2);
  }

  #[test]
  fn weekly_rollover_after_week_53() {
    // 2020 has 53 ISO weeks: W52, W53, then 2021-W01.
    let set = weekly(&[date(2020, 12, 23), date(2020, 12, 30), date(2021, 1, 6)]);
    assert_eq!(longest_streak(&set), 3);
    assert_eq!(current_streak(&set, date(2021, 1, 10)), 3);
  }

  #[test]
  fn weekly_week_52_is_not_adjacent_to_week_1_in_53_week_year() {
    // 2020-W52 and 2021-W01 are separated by 2020-W53.
    let set = weekly(&[date(2020, 12, 23), date(2021, 1, 6)]);
    assert_eq!(longest_streak(&set), 1);
  }

  #[test]
  fn weekly_buckets_follow_iso_year() {
    // Monday 2024-12-30 is 2025-W01, directly after 2024-W52.
    let set = weekly(&[date(2024, 12, 23), date(2024, 12, 30), date(2025, 1, 8)]);
    assert_eq!(longest_streak(&set), 3);
    assert_eq!(current_streak(&set, date(2025, 1, 12)), 3);
  }

  #[test]
  fn weekly_gap_breaks_current_streak() {
    let set = weekly(&[date(2024, 3, 4), date(2024, 3, 11)]);
    assert_eq!(current_streak(&set, date(2024, 3, 17)), 2);
    assert_eq!(current_streak(&set, date(2024, 3, 18)), 0);
  }

  #[test]
  fn weekly_multiple_completions_in_one_week_count_once() {
    let set = weekly(&run(date(2024, 3, 4), 7));
    assert_eq!(longest_streak(&set), 1);
  }

  // ─── Properties ──────────────────────────────────────────────────────────

  #[test]
  fn longest_is_idempotent() {
    let set = daily(&run(date(2024, 1, 1), 9));
    assert_eq!(longest_streak(&set), longest_streak(&set));
  }

  #[test]
  fn filling_a_bucket_never_decreases_longest() {
    let mut dates = run(date(2024, 1, 1), 3);
    dates.extend(run(date(2024, 1, 5), 3));
    let before = longest_streak(&daily(&dates));

    dates.push(date(2024, 1, 4));
    let after = longest_streak(&daily(&dates));
    assert!(after >= before);
    assert_eq!(after, 7);
  }

  #[test]
  fn current_never_exceeds_longest() {
    let mut dates = run(date(2024, 1, 1), 4);
    dates.extend(run(date(2024, 1, 8), 2));
    let set = daily(&dates);
    let longest = longest_streak(&set);
    for today in run(date(2023, 12, 25), 30) {
      assert!(current_streak(&set, today) <= longest);
    }
  }

  // ─── Success rate ────────────────────────────────────────────────────────

  #[test]
  fn success_rate_counts_occupied_periods_since_creation() {
    let set = daily(&[date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 4)]);
    assert_eq!(success_rate(&set, date(2024, 1, 1), date(2024, 1, 4)), 75.0);
    assert_eq!(success_rate(&set, date(2024, 1, 1), date(2024, 1, 6)), 50.0);
  }

  #[test]
  fn success_rate_weekly_and_rounding() {
    let set = weekly(&[date(2024, 1, 1), date(2024, 1, 15)]);
    // Three ISO weeks from creation through today, two occupied.
    assert_eq!(success_rate(&set, date(2024, 1, 2), date(2024, 1, 17)), 66.7);
  }

  #[test]
  fn success_rate_created_today_without_completions() {
    let set = BucketSet::new(Periodicity::Daily);
    assert_eq!(success_rate(&set, date(2024, 1, 1), date(2024, 1, 1)), 0.0);
  }

  // ─── Best habit ──────────────────────────────────────────────────────────

  #[test]
  fn best_habit_prefers_first_on_tie() {
    let best = best_habit([("A", 5), ("B", 5), ("C", 3)]);
    assert_eq!(best, BestHabit { name: Some("A".into()), streak: 5 });
  }

  #[test]
  fn best_habit_picks_maximum() {
    let best = best_habit([("A", 2), ("B", 7), ("C", 3)]);
    assert_eq!(best.name.as_deref(), Some("B"));
    assert_eq!(best.streak, 7);
  }

  #[test]
  fn best_habit_without_data() {
    assert_eq!(best_habit(Vec::<(String, u32)>::new()), BestHabit::default());
    assert_eq!(
      best_habit([("A", 0), ("B", 0)]),
      BestHabit { name: None, streak: 0 }
    );
  }
}
