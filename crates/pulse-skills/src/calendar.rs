//! Focus calendar builder: a fixed 52-week grid from sparse daily samples.
//!
//! Derived fresh on every render, never persisted. All date arithmetic is
//! plain [`NaiveDate`] math in local wall-clock terms, so adding days can
//! never be skewed by a DST boundary.

use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashMap;

/// Number of week columns in the grid, ending on the current week.
pub const GRID_WEEKS: usize = 52;

/// Intensity bucket for one day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBucket {
    /// 0 minutes.
    Empty,
    /// 1–10 minutes.
    Low,
    /// 11–60 minutes.
    Medium,
    /// More than an hour.
    High,
}

fn minutes_bucket(minutes: u32) -> ColorBucket {
    match minutes {
        0 => ColorBucket::Empty,
        1..=10 => ColorBucket::Low,
        11..=60 => ColorBucket::Medium,
        _ => ColorBucket::High,
    }
}

/// One day in the grid. Future days render at a distinct faint color
/// regardless of their (necessarily absent) minute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub minutes: u32,
    pub bucket: ColorBucket,
    pub is_future: bool,
}

/// The materialized 52×7 grid plus whole-history statistics.
#[derive(Debug, Clone)]
pub struct FocusCalendarGrid {
    /// Exactly [`GRID_WEEKS`] columns of 7 days, Monday first.
    pub weeks: Vec<Vec<DayCell>>,
    pub total_minutes: u64,
    pub active_days: usize,
    pub longest_streak: usize,
}

/// Builds the grid for `today`. The first column starts 51 weeks before the
/// Monday on/before today, so the final week always contains today.
pub fn build_grid(history: &HashMap<NaiveDate, u32>, today: NaiveDate) -> FocusCalendarGrid {
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let start = monday - Days::new((GRID_WEEKS as u64 - 1) * 7);

    let weeks: Vec<Vec<DayCell>> = (0..GRID_WEEKS)
        .map(|week| {
            (0..7u64)
                .map(|day| {
                    let date = start + Days::new(week as u64 * 7 + day);
                    let minutes = history.get(&date).copied().unwrap_or(0);
                    DayCell {
                        date,
                        minutes,
                        bucket: minutes_bucket(minutes),
                        is_future: date > today,
                    }
                })
                .collect()
        })
        .collect();

    let total_minutes = history.values().map(|&m| u64::from(m)).sum();
    let active_days = history.values().filter(|&&m| m > 0).count();

    FocusCalendarGrid {
        weeks,
        total_minutes,
        active_days,
        longest_streak: longest_streak(history),
    }
}

/// Convenience wrapper anchored to the local wall clock.
pub fn build_grid_now(history: &HashMap<NaiveDate, u32>) -> FocusCalendarGrid {
    build_grid(history, chrono::Local::now().date_naive())
}

/// Longest run of consecutive calendar dates with >0 minutes. Dates are
/// sorted chronologically first; any gap breaks the run.
fn longest_streak(history: &HashMap<NaiveDate, u32>) -> usize {
    let mut dates: Vec<NaiveDate> = history
        .iter()
        .filter(|(_, &m)| m > 0)
        .map(|(&d, _)| d)
        .collect();
    dates.sort_unstable();

    let mut longest = 0usize;
    let mut run = 0usize;
    let mut prev: Option<NaiveDate> = None;
    for date in dates {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn grid_is_always_52_by_7() {
        let grid = build_grid(&HashMap::new(), date("2026-08-07"));
        assert_eq!(grid.weeks.len(), 52);
        assert!(grid.weeks.iter().all(|w| w.len() == 7));
        let cells: usize = grid.weeks.iter().map(Vec::len).sum();
        assert_eq!(cells, 364);
    }

    #[test]
    fn final_week_contains_today_and_starts_on_monday() {
        let today = date("2026-08-07"); // a Friday
        let grid = build_grid(&HashMap::new(), today);
        assert_eq!(grid.weeks[0][0].date.weekday(), Weekday::Mon);
        let last_week = grid.weeks.last().unwrap();
        assert!(last_week.iter().any(|c| c.date == today));
        // Friday: the trailing weekend cells are future, nothing else.
        let future: Vec<_> = grid
            .weeks
            .iter()
            .flatten()
            .filter(|c| c.is_future)
            .collect();
        assert_eq!(future.len(), 2);
        assert!(future.iter().all(|c| c.date > today));
    }

    #[test]
    fn sunday_today_is_the_last_cell() {
        let today = date("2026-08-09"); // a Sunday
        let grid = build_grid(&HashMap::new(), today);
        let last = grid.weeks.last().unwrap().last().unwrap();
        assert_eq!(last.date, today);
        assert!(!last.is_future);
        assert!(grid.weeks.iter().flatten().all(|c| !c.is_future));
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(minutes_bucket(0), ColorBucket::Empty);
        assert_eq!(minutes_bucket(1), ColorBucket::Low);
        assert_eq!(minutes_bucket(10), ColorBucket::Low);
        assert_eq!(minutes_bucket(11), ColorBucket::Medium);
        assert_eq!(minutes_bucket(60), ColorBucket::Medium);
        assert_eq!(minutes_bucket(61), ColorBucket::High);
    }

    #[test]
    fn grid_cells_pick_up_history_minutes() {
        let today = date("2026-08-07");
        let mut history = HashMap::new();
        history.insert(date("2026-08-06"), 45);
        let grid = build_grid(&history, today);
        let cell = grid
            .weeks
            .iter()
            .flatten()
            .find(|c| c.date == date("2026-08-06"))
            .unwrap();
        assert_eq!(cell.minutes, 45);
        assert_eq!(cell.bucket, ColorBucket::Medium);
    }

    #[test]
    fn a_gap_breaks_the_streak() {
        let mut history = HashMap::new();
        history.insert(date("2024-01-01"), 10);
        history.insert(date("2024-01-02"), 5);
        history.insert(date("2024-01-04"), 20);
        let grid = build_grid(&history, date("2024-02-01"));
        assert_eq!(grid.longest_streak, 2);
        assert_eq!(grid.active_days, 3);
        assert_eq!(grid.total_minutes, 35);
    }

    #[test]
    fn zero_minute_entries_never_extend_a_streak() {
        let mut history = HashMap::new();
        history.insert(date("2024-01-01"), 10);
        history.insert(date("2024-01-02"), 0);
        history.insert(date("2024-01-03"), 10);
        let grid = build_grid(&history, date("2024-02-01"));
        assert_eq!(grid.longest_streak, 1);
        assert_eq!(grid.active_days, 2);
    }
}
