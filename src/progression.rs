//! Progression arithmetic: points, level-ups, streaks, and the per-category
//! preference aggregation over the rating log.
//!
//! Everything here is pure and deterministic; callers own the persistence.

use std::collections::HashMap;

use crate::domain::{FactCategory, UserRating, UserStats};

/// Points for a solved puzzle: `floor(max(0, base - 5*attempts) * multiplier)`
/// where the multiplier is 0.5 in practice mode and 1 otherwise.
pub fn points_awarded(base_points: u32, attempts: u32, practice: bool) -> u32 {
  let bonus = base_points.saturating_sub(attempts.saturating_mul(5));
  let multiplier = if practice { 0.5 } else { 1.0 };
  (bonus as f64 * multiplier).floor() as u32
}

/// Cost of the next level-up at the current level.
pub fn level_up_cost(level: u32) -> u32 {
  level.saturating_mul(100)
}

pub fn can_level_up(stats: &UserStats) -> bool {
  stats.points >= level_up_cost(stats.level)
}

/// Consume the threshold (computed at the pre-increment level) and advance.
/// Returns false without touching stats when the user can't afford it.
pub fn apply_level_up(stats: &mut UserStats) -> bool {
  let cost = level_up_cost(stats.level);
  if stats.points < cost {
    return false;
  }
  stats.points -= cost;
  stats.level += 1;
  true
}

/// Streak value after a completed day. The caller only invokes this once per
/// calendar-day transition (last play date != today); within that contract:
/// played yesterday continues the streak, anything else restarts at 1.
pub fn next_streak(previous: u32, last_play_date: Option<&str>, yesterday_key: &str) -> u32 {
  match last_play_date {
    Some(d) if d == yesterday_key => previous + 1,
    _ => 1,
  }
}

/// Reduce the rating log to a per-category arithmetic mean.
/// Categories never rated are absent from the map, not zero.
pub fn aggregate_preferences(ratings: &[UserRating]) -> HashMap<FactCategory, f64> {
  let mut sums: HashMap<FactCategory, (f64, u32)> = HashMap::new();
  for r in ratings {
    let entry = sums.entry(r.category).or_insert((0.0, 0));
    entry.0 += r.rating as f64;
    entry.1 += 1;
  }
  sums
    .into_iter()
    .map(|(category, (sum, count))| (category, sum / count as f64))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rating(category: FactCategory, rating: u32) -> UserRating {
    UserRating { fact_id: "f".into(), rating, category, timestamp: 0 }
  }

  #[test]
  fn points_match_the_reference_examples() {
    assert_eq!(points_awarded(50, 2, false), 40);
    assert_eq!(points_awarded(50, 2, true), 20);
    assert_eq!(points_awarded(45, 0, false), 45);
    // Odd bonus halves downward in practice mode.
    assert_eq!(points_awarded(45, 0, true), 22);
  }

  #[test]
  fn points_never_go_negative() {
    assert_eq!(points_awarded(15, 10, false), 0);
    assert_eq!(points_awarded(15, 10, true), 0);
  }

  #[test]
  fn level_up_consumes_the_pre_increment_threshold() {
    let mut stats = UserStats { level: 3, points: 350, ..UserStats::default() };
    assert!(can_level_up(&stats));
    assert!(apply_level_up(&mut stats));
    assert_eq!(stats.level, 4);
    assert_eq!(stats.points, 50);
  }

  #[test]
  fn level_up_refused_below_threshold_without_mutation() {
    let mut stats = UserStats { level: 2, points: 199, ..UserStats::default() };
    assert!(!apply_level_up(&mut stats));
    assert_eq!(stats.level, 2);
    assert_eq!(stats.points, 199);
  }

  #[test]
  fn streak_continues_only_from_yesterday() {
    assert_eq!(next_streak(4, Some("2025-06-08"), "2025-06-08"), 5);
    assert_eq!(next_streak(4, Some("2025-06-06"), "2025-06-08"), 1);
    assert_eq!(next_streak(0, None, "2025-06-08"), 1);
  }

  #[test]
  fn preferences_average_per_category() {
    let log = vec![
      rating(FactCategory::Science, 5),
      rating(FactCategory::Science, 3),
      rating(FactCategory::Nature, 2),
    ];
    let prefs = aggregate_preferences(&log);
    assert_eq!(prefs.get(&FactCategory::Science), Some(&4.0));
    assert_eq!(prefs.get(&FactCategory::Nature), Some(&2.0));
    assert_eq!(prefs.get(&FactCategory::History), None);
  }

  #[test]
  fn empty_log_yields_empty_map() {
    assert!(aggregate_preferences(&[]).is_empty());
  }
}
