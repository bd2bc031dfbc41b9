//! Month grid for a single habit.
//!
//! Every day of the requested month is reported either as `Disabled` (it lies
//! before the habit's start date) or with its stored completion state.

use crate::errors::TrackerError;
use crate::models::{DayStatus, Habit, HabitId};
use crate::stats::local_today;
use crate::storage::HabitStore;
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    /// Before the start date; not togglable.
    Disabled,
    Status(DayStatus),
}

impl CalendarCell {
    pub fn as_str(self) -> &'static str {
        match self {
            CalendarCell::Disabled => "disabled",
            CalendarCell::Status(status) => status.as_str(),
        }
    }
}

impl Serialize for CalendarCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub state: CalendarCell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub habit_id: HabitId,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    /// Weekday of day 1, Monday = 0.
    pub first_weekday: u32,
    pub days: Vec<CalendarDay>,
    pub prev_month: MonthRef,
    pub next_month: MonthRef,
    /// Day number of today when this is the current month.
    pub today: Option<u32>,
}

pub fn calendar_view(
    store: &impl HabitStore,
    habit: &Habit,
    year: i32,
    month: u32,
) -> Result<CalendarView, TrackerError> {
    calendar_view_at(store, habit, year, month, local_today())
}

pub fn calendar_view_at(
    store: &impl HabitStore,
    habit: &Habit,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<CalendarView, TrackerError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(TrackerError::InvalidMonth {
        year: i64::from(year),
        month: i64::from(month),
    })?;
    let dates: Vec<NaiveDate> = (1..=31)
        .map_while(|day| NaiveDate::from_ymd_opt(year, month, day))
        .collect();
    let last = dates.last().copied().unwrap_or(first);

    let stored: HashMap<NaiveDate, DayStatus> = store
        .statuses_between(habit.user_id, habit.id, Some(first), Some(last))
        .into_iter()
        .map(|row| (row.date, row.done))
        .collect();

    let days = dates
        .iter()
        .map(|date| {
            let state = if *date < habit.start_date {
                CalendarCell::Disabled
            } else {
                CalendarCell::Status(stored.get(date).copied().unwrap_or_default())
            };
            CalendarDay { day: date.day(), state }
        })
        .collect();

    let shown = MonthRef::of(first);
    let today_marker = (MonthRef::of(today) == shown).then(|| today.day());

    Ok(CalendarView {
        habit_id: habit.id,
        year,
        month,
        month_name: first.format("%B").to_string(),
        first_weekday: first.weekday().num_days_from_monday(),
        days,
        prev_month: shown.prev(),
        next_month: shown.next(),
        today: today_marker,
    })
}
