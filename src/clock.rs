//! Clock abstraction so date-dependent selection is testable without time
//! travel. Everything downstream works with calendar dates, never wall-clock
//! durations: "today" means calendar-day truncation in local time.

use chrono::{Datelike, Duration, Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
  /// Current calendar date (local, truncated to the day).
  fn today(&self) -> NaiveDate;
  /// Milliseconds since the Unix epoch, for history timestamps.
  fn timestamp_ms(&self) -> i64;
}

/// Stable per-day key used for the day-scoped storage records.
pub fn date_key(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

/// 0-based day count since Jan 1 of the date's year.
pub fn day_of_year0(date: NaiveDate) -> u32 {
  date.ordinal0()
}

pub fn yesterday(date: NaiveDate) -> NaiveDate {
  date - Duration::days(1)
}

pub struct SystemClock;

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate {
    Local::now().date_naive()
  }

  fn timestamp_ms(&self) -> i64 {
    Utc::now().timestamp_millis()
  }
}

/// Settable clock for tests; advancing it simulates day rollovers.
#[cfg(test)]
pub struct FixedClock(std::sync::Mutex<NaiveDate>);

#[cfg(test)]
impl FixedClock {
  pub fn at(year: i32, month: u32, day: u32) -> Self {
    let d = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
    Self(std::sync::Mutex::new(d))
  }

  pub fn set(&self, year: i32, month: u32, day: u32) {
    let d = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
    *self.0.lock().expect("clock lock") = d;
  }

  pub fn advance_days(&self, days: i64) {
    let mut guard = self.0.lock().expect("clock lock");
    *guard = *guard + Duration::days(days);
  }
}

#[cfg(test)]
impl Clock for FixedClock {
  fn today(&self) -> NaiveDate {
    *self.0.lock().expect("clock lock")
  }

  fn timestamp_ms(&self) -> i64 {
    self
      .today()
      .and_hms_opt(12, 0, 0)
      .expect("valid time")
      .and_utc()
      .timestamp_millis()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn day_of_year_is_zero_based() {
    let jan1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    assert_eq!(day_of_year0(jan1), 0);
    let feb10 = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
    assert_eq!(day_of_year0(feb10), 40);
  }

  #[test]
  fn yesterday_crosses_month_boundaries() {
    let mar1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    assert_eq!(date_key(yesterday(mar1)), "2025-02-28");
  }

  #[test]
  fn fixed_clock_advances() {
    let clock = FixedClock::at(2025, 6, 9);
    assert_eq!(date_key(clock.today()), "2025-06-09");
    clock.advance_days(1);
    assert_eq!(date_key(clock.today()), "2025-06-10");
  }
}
