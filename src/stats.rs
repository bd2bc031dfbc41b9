use crate::models::{Habit, HabitStats};
use crate::storage::HabitStore;
use chrono::{Duration, Local, NaiveDate};

/// Length of the trailing score window, today included.
pub const SCORE_WINDOW_DAYS: i64 = 30;

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn habit_stats(store: &impl HabitStore, habit: &Habit) -> HabitStats {
    habit_stats_at(store, habit, local_today())
}

pub fn habit_stats_at(store: &impl HabitStore, habit: &Habit, today: NaiveDate) -> HabitStats {
    HabitStats {
        current_streak: current_streak_at(store, habit, today),
        best_streak: best_streak(store, habit),
        score: score_at(store, habit, today),
    }
}

pub fn score(store: &impl HabitStore, habit: &Habit) -> u8 {
    score_at(store, habit, local_today())
}

/// Percentage of completed days in the last [`SCORE_WINDOW_DAYS`] days,
/// clipped to the start date. Halves round to even.
pub fn score_at(store: &impl HabitStore, habit: &Habit, today: NaiveDate) -> u8 {
    if habit.start_date > today {
        return 0;
    }

    let window_start = (today - Duration::days(SCORE_WINDOW_DAYS - 1)).max(habit.start_date);
    let window_len = (today - window_start).num_days() + 1;
    if window_len <= 0 {
        return 0;
    }

    let completed = completed_dates(store, habit, Some(window_start), Some(today)).len();
    let percent = (completed as f64 / window_len as f64 * 100.0).round_ties_even();
    percent.clamp(0.0, 100.0) as u8
}

pub fn current_streak(store: &impl HabitStore, habit: &Habit) -> u32 {
    current_streak_at(store, habit, local_today())
}

/// Run of completed days ending today, or yesterday if today is not marked
/// yet. Days before the start date never count.
pub fn current_streak_at(store: &impl HabitStore, habit: &Habit, today: NaiveDate) -> u32 {
    if today < habit.start_date {
        return 0;
    }

    let done = completed_dates(store, habit, Some(habit.start_date), Some(today));
    let Some(&latest) = done.last() else {
        return 0;
    };
    if latest != today && latest != today - Duration::days(1) {
        return 0;
    }

    let mut expected = latest;
    let mut streak = 0;
    for date in done.into_iter().rev() {
        if date != expected {
            break;
        }
        streak += 1;
        expected = expected - Duration::days(1);
    }
    streak
}

/// Longest run of consecutive completed days since the start date.
pub fn best_streak(store: &impl HabitStore, habit: &Habit) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in completed_dates(store, habit, Some(habit.start_date), None) {
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(date);
    }
    best
}

/// Ascending dates marked done within the inclusive bounds.
fn completed_dates(
    store: &impl HabitStore,
    habit: &Habit,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<NaiveDate> {
    store
        .statuses_between(habit.user_id, habit.id, from, to)
        .into_iter()
        .filter(|row| row.done.is_done())
        .map(|row| row.date)
        .collect()
}
