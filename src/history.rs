//! Training history - streaks, monthly calendar and frequency

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::db::CompletedWorkout;

/// Finished workouts, newest first (as the database returns them)
pub struct WorkoutHistory {
    workouts: Vec<CompletedWorkout>,
}

impl WorkoutHistory {
    pub fn new(workouts: Vec<CompletedWorkout>) -> Self {
        Self { workouts }
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    fn training_days(&self) -> BTreeSet<NaiveDate> {
        self.workouts
            .iter()
            .map(|w| w.date.with_timezone(&Local).date_naive())
            .collect()
    }

    /// Consecutive training days ending today.
    /// A streak is still alive if the last workout was yesterday.
    pub fn streak(&self, today: NaiveDate) -> u32 {
        let days = self.training_days();

        let mut day = if days.contains(&today) {
            today
        } else {
            today - Duration::days(1)
        };

        let mut streak = 0;
        while days.contains(&day) {
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }

    /// Days of the month with at least one workout (calendar marks)
    pub fn workout_days(&self, year: i32, month: u32) -> Vec<u32> {
        self.training_days()
            .into_iter()
            .filter(|d| d.year() == year && d.month() == month)
            .map(|d| d.day())
            .collect()
    }

    pub fn workouts_in_month(&self, year: i32, month: u32) -> usize {
        self.workouts
            .iter()
            .map(|w| w.date.with_timezone(&Local).date_naive())
            .filter(|d| d.year() == year && d.month() == month)
            .count()
    }

    /// Sessions per week over the whole history
    pub fn weekly_frequency(&self) -> f64 {
        if self.workouts.len() < 2 {
            return 0.0;
        }

        let first = self.workouts.iter().map(|w| w.date.date_naive()).min();
        let last = self.workouts.iter().map(|w| w.date.date_naive()).max();
        let days = match (first, last) {
            (Some(first), Some(last)) => (last - first).num_days() as f64,
            _ => return 0.0,
        };

        if days == 0.0 {
            return self.workouts.len() as f64;
        }

        (self.workouts.len() as f64 / days) * 7.0
    }

    pub fn recent(&self, limit: usize) -> &[CompletedWorkout] {
        &self.workouts[..limit.min(self.workouts.len())]
    }

    pub fn total_elapsed_secs(&self) -> i64 {
        self.workouts.iter().filter_map(|w| w.elapsed_secs).sum()
    }
}

/// Month grid starting on Sunday, padded with None to whole weeks
pub fn calendar_grid(year: i32, month: u32) -> Vec<Option<u32>> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let days_in_month = next_month
        .map(|n| (n - first).num_days() as u32)
        .unwrap_or(31);

    let start_pad = first.weekday().num_days_from_sunday() as usize;
    let mut grid: Vec<Option<u32>> = vec![None; start_pad];
    grid.extend((1..=days_in_month).map(Some));

    let rest = grid.len().div_ceil(7) * 7 - grid.len();
    grid.extend(std::iter::repeat_n(None, rest));
    grid
}
