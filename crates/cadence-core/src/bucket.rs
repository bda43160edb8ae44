//! Calendar bucketing.
//!
//! A bucket is the calendar unit a completion is counted in: a calendar date
//! for daily habits, an ISO 8601 week for weekly habits. Several completions
//! landing in the same bucket count as one occurrence.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::habit::Periodicity;

// ─── ISO week ────────────────────────────────────────────────────────────────

/// An ISO 8601 `(iso_year, week)` pair.
///
/// Field order matters: the derived `Ord` compares by year, then week.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WeekKey {
  pub year: i32,
  pub week: u32,
}

/// The number of the last ISO week of `year` (52 or 53).
///
/// December 28th always falls in the last ISO week of its year.
pub fn last_iso_week(year: i32) -> u32 {
  NaiveDate::from_ymd_opt(year, 12, 28)
    .map(|d| d.iso_week().week())
    .unwrap_or(52)
}

impl WeekKey {
  pub fn of(date: NaiveDate) -> Self {
    let iso = date.iso_week();
    Self { year: iso.year(), week: iso.week() }
  }

  /// The following ISO week, rolling over into week 1 after the true last
  /// week of the year.
  pub fn next(self) -> Self {
    if self.week >= last_iso_week(self.year) {
      Self { year: self.year + 1, week: 1 }
    } else {
      Self { week: self.week + 1, ..self }
    }
  }

  /// The preceding ISO week.
  pub fn prev(self) -> Self {
    if self.week <= 1 {
      let year = self.year - 1;
      Self { year, week: last_iso_week(year) }
    } else {
      Self { week: self.week - 1, ..self }
    }
  }

  /// Monday of this week, if representable.
  pub fn monday(self) -> Option<NaiveDate> {
    NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
  }
}

// ─── Bucket ──────────────────────────────────────────────────────────────────

/// A periodicity-specific calendar key.
///
/// A single [`BucketSet`] only ever holds one variant, so the cross-variant
/// ordering is never observed.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Bucket {
  Day(NaiveDate),
  Week(WeekKey),
}

impl Bucket {
  /// The bucket containing `date` under `periodicity`.
  pub fn of(periodicity: Periodicity, date: NaiveDate) -> Self {
    match periodicity {
      Periodicity::Daily => Self::Day(date),
      Periodicity::Weekly => Self::Week(WeekKey::of(date)),
    }
  }

  /// The immediately following period. `None` only at the edge of chrono's
  /// representable range.
  pub fn next(self) -> Option<Self> {
    match self {
      Self::Day(d) => d.succ_opt().map(Self::Day),
      Self::Week(w) => Some(Self::Week(w.next())),
    }
  }

  /// The immediately preceding period.
  pub fn prev(self) -> Option<Self> {
    match self {
      Self::Day(d) => d.pred_opt().map(Self::Day),
      Self::Week(w) => Some(Self::Week(w.prev())),
    }
  }

  /// Whether `other` is the period directly after this one.
  pub fn is_followed_by(self, other: Self) -> bool {
    self.next() == Some(other)
  }

  /// Whole periods from `self` to `later`; negative when `later` comes first.
  /// `None` when the two buckets are of different periodicities.
  pub fn periods_until(self, later: Self) -> Option<i64> {
    match (self, later) {
      (Self::Day(a), Self::Day(b)) => Some(b.signed_duration_since(a).num_days()),
      (Self::Week(a), Self::Week(b)) => {
        let (a, b) = (a.monday()?, b.monday()?);
        Some(b.signed_duration_since(a).num_days() / 7)
      }
      _ => None,
    }
  }
}

// ─── BucketSet ───────────────────────────────────────────────────────────────

/// The distinct buckets occupied by a habit's completions, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSet {
  periodicity: Periodicity,
  buckets:     BTreeSet<Bucket>,
}

impl BucketSet {
  pub fn new(periodicity: Periodicity) -> Self {
    Self { periodicity, buckets: BTreeSet::new() }
  }

  /// Bucket every timestamp, discarding time of day and collapsing repeats.
  pub fn from_timestamps<I>(periodicity: Periodicity, timestamps: I) -> Self
  where
    I: IntoIterator<Item = NaiveDateTime>,
  {
    let mut set = Self::new(periodicity);
    set.extend(timestamps);
    set
  }

  pub fn insert(&mut self, timestamp: NaiveDateTime) -> bool {
    self
      .buckets
      .insert(Bucket::of(self.periodicity, timestamp.date()))
  }

  pub fn periodicity(&self) -> Periodicity { self.periodicity }

  pub fn contains(&self, bucket: &Bucket) -> bool {
    self.buckets.contains(bucket)
  }

  pub fn len(&self) -> usize { self.buckets.len() }

  pub fn is_empty(&self) -> bool { self.buckets.is_empty() }

  /// Occupied buckets in ascending order.
  pub fn iter(&self) -> impl Iterator<Item = Bucket> + '_ {
    self.buckets.iter().copied()
  }

  /// Number of occupied buckets within `from..=to`.
  pub fn count_between(&self, from: Bucket, to: Bucket) -> usize {
    if from > to {
      return 0;
    }
    self.buckets.range(from..=to).count()
  }
}

impl Extend<NaiveDateTime> for BucketSet {
  fn extend<T: IntoIterator<Item = NaiveDateTime>>(&mut self, iter: T) {
    for ts in iter {
      self.insert(ts);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
  }

  #[test]
  fn last_iso_week_knows_53_week_years() {
    assert_eq!(last_iso_week(2015), 53);
    assert_eq!(last_iso_week(2020), 53);
    assert_eq!(last_iso_week(2026), 53);
    assert_eq!(last_iso_week(2021), 52);
    assert_eq!(last_iso_week(2023), 52);
  }

  #[test]
  fn week_key_uses_iso_year_not_calendar_year() {
    // Monday 2024-12-30 belongs to ISO week 1 of 2025.
    assert_eq!(WeekKey::of(date(2024, 12, 30)), WeekKey { year: 2025, week: 1 });
    // Friday 2021-01-01 still belongs to 2020-W53.
    assert_eq!(WeekKey::of(date(2021, 1, 1)), WeekKey { year: 2020, week: 53 });
  }

  #[test]
  fn week_rollover_respects_week_53() {
    let w52 = WeekKey { year: 2020, week: 52 };
    let w53 = WeekKey { year: 2020, week: 53 };
    let next_year = WeekKey { year: 2021, week: 1 };

    assert_eq!(w52.next(), w53);
    assert_eq!(w53.next(), next_year);
    assert_eq!(next_year.prev(), w53);

    let w52_2023 = WeekKey { year: 2023, week: 52 };
    assert_eq!(w52_2023.next(), WeekKey { year: 2024, week: 1 });
    assert_eq!(WeekKey { year: 2024, week: 1 }.prev(), w52_2023);
  }

  #[test]
  fn week_monday() {
    assert_eq!(
      WeekKey { year: 2025, week: 1 }.monday(),
      Some(date(2024, 12, 30))
    );
  }

  #[test]
  fn same_day_completions_collapse() {
    let set = BucketSet::from_timestamps(
      Periodicity::Daily,
      [at(2024, 3, 1, 8), at(2024, 3, 1, 21), at(2024, 3, 2, 7)],
    );
    assert_eq!(set.len(), 2);
    assert!(set.contains(&Bucket::Day(date(2024, 3, 1))));
  }

  #[test]
  fn same_week_completions_collapse() {
    // Monday and Sunday of the same ISO week.
    let set = BucketSet::from_timestamps(
      Periodicity::Weekly,
      [at(2024, 3, 4, 8), at(2024, 3, 10, 22)],
    );
    assert_eq!(set.len(), 1);
  }

  #[test]
  fn day_adjacency() {
    let a = Bucket::Day(date(2024, 2, 28));
    assert!(a.is_followed_by(Bucket::Day(date(2024, 2, 29))));
    assert!(!a.is_followed_by(Bucket::Day(date(2024, 3, 1))));
  }

  #[test]
  fn periods_until_spans_year_boundaries() {
    let from = Bucket::Week(WeekKey { year: 2020, week: 52 });
    let to = Bucket::Week(WeekKey { year: 2021, week: 2 });
    assert_eq!(from.periods_until(to), Some(3));
    assert_eq!(to.periods_until(from), Some(-3));

    let d = Bucket::Day(date(2024, 2, 27));
    assert_eq!(d.periods_until(Bucket::Day(date(2024, 3, 1))), Some(3));
    assert_eq!(d.periods_until(from), None);
  }

  #[test]
  fn count_between_is_inclusive() {
    let set = BucketSet::from_timestamps(
      Periodicity::Daily,
      [at(2024, 1, 1, 9), at(2024, 1, 3, 9), at(2024, 1, 9, 9)],
    );
    let day = |d| Bucket::Day(date(2024, 1, d));
    assert_eq!(set.count_between(day(1), day(3)), 2);
    assert_eq!(set.count_between(day(2), day(9)), 2);
    assert_eq!(set.count_between(day(5), day(2)), 0);
  }
}
