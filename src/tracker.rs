//! Operations behind the HTTP handlers.
//!
//! Everything here takes plain identifiers and a [`HabitStore`]; ownership is
//! enforced by resolving habits through `(user_id, habit_id)` only. Each
//! operation validates its whole input before it touches the store.

use crate::errors::TrackerError;
use crate::models::{
    DayStatus, Habit, HabitDraft, HabitId, HabitInput, HabitPatch, RegisterRequest, User, UserId,
};
use crate::storage::HabitStore;
use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 100;
const MAX_HABIT_NAME_LEN: usize = 200;

/// Requested change for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    MarkDone,
    MarkNotDone,
    Clear,
}

impl ToggleAction {
    /// State of the day after the action is applied.
    pub fn resulting_status(self) -> DayStatus {
        match self {
            ToggleAction::MarkDone => DayStatus::Done,
            ToggleAction::MarkNotDone => DayStatus::NotDone,
            ToggleAction::Clear => DayStatus::Unmarked,
        }
    }
}

impl FromStr for ToggleAction {
    type Err = TrackerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "done" => Ok(ToggleAction::MarkDone),
            "not-done" => Ok(ToggleAction::MarkNotDone),
            "none" | "clear" => Ok(ToggleAction::Clear),
            other => Err(TrackerError::UnknownAction(other.to_string())),
        }
    }
}

// Users

pub fn register_user(
    store: &mut impl HabitStore,
    request: RegisterRequest,
    now: DateTime<Utc>,
) -> Result<User, TrackerError> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_string();

    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(TrackerError::Validation(format!(
            "username must be 1 to {MAX_USERNAME_LEN} characters"
        )));
    }
    if username.contains('@') {
        return Err(TrackerError::Validation("username must not contain '@'".into()));
    }
    if !is_plausible_email(&email) || email.chars().count() > MAX_EMAIL_LEN {
        return Err(TrackerError::Validation(format!(
            "email must look like name@domain and be at most {MAX_EMAIL_LEN} characters"
        )));
    }
    if store.find_user_by_username(&username).is_some() {
        return Err(TrackerError::Conflict("username is already taken".into()));
    }
    if store.find_user_by_email(&email).is_some() {
        return Err(TrackerError::Conflict("email is already registered".into()));
    }

    Ok(store.insert_user(username, email, now))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

// Habits

pub fn load_habit(
    store: &impl HabitStore,
    user_id: UserId,
    habit_id: HabitId,
) -> Result<Habit, TrackerError> {
    store.find_habit(user_id, habit_id).ok_or(TrackerError::HabitNotFound)
}

pub fn create_habit(
    store: &mut impl HabitStore,
    user_id: UserId,
    input: HabitInput,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Habit, TrackerError> {
    let draft = HabitDraft {
        name: validate_name(&input.name)?,
        description: normalize_description(input.description),
        color: input.color,
        frequency: input.frequency,
        duration_days: validate_duration(input.duration_days)?,
        is_unlimited: input.is_unlimited,
        start_date: input.start_date.unwrap_or(today),
    };
    Ok(store.insert_habit(user_id, draft, now))
}

pub fn update_habit(
    store: &mut impl HabitStore,
    user_id: UserId,
    habit_id: HabitId,
    patch: HabitPatch,
    now: DateTime<Utc>,
) -> Result<Habit, TrackerError> {
    let mut habit = load_habit(&*store, user_id, habit_id)?;

    if let Some(name) = patch.name {
        habit.name = validate_name(&name)?;
    }
    if let Some(description) = patch.description {
        habit.description = normalize_description(Some(description));
    }
    if let Some(color) = patch.color {
        habit.color = color;
    }
    if let Some(frequency) = patch.frequency {
        habit.frequency = frequency;
    }
    if patch.duration_days.is_some() {
        habit.duration_days = validate_duration(patch.duration_days)?;
    }
    if let Some(is_unlimited) = patch.is_unlimited {
        habit.is_unlimited = is_unlimited;
    }
    if let Some(start_date) = patch.start_date {
        habit.start_date = start_date;
    }
    habit.updated_at = now;

    if !store.save_habit(&habit) {
        return Err(TrackerError::HabitNotFound);
    }
    Ok(habit)
}

pub fn delete_habit(
    store: &mut impl HabitStore,
    user_id: UserId,
    habit_id: HabitId,
) -> Result<Habit, TrackerError> {
    store.delete_habit(user_id, habit_id).ok_or(TrackerError::HabitNotFound)
}

fn validate_name(name: &str) -> Result<String, TrackerError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_HABIT_NAME_LEN {
        return Err(TrackerError::Validation(format!(
            "name must be 1 to {MAX_HABIT_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn validate_duration(duration_days: Option<u32>) -> Result<Option<u32>, TrackerError> {
    match duration_days {
        Some(0) => Err(TrackerError::Validation("duration_days must be positive".into())),
        other => Ok(other),
    }
}

// Day statuses

/// Builds the calendar date of a toggle request.
pub fn parse_day(year: i64, month: i64, day: i64) -> Result<NaiveDate, TrackerError> {
    let invalid = || TrackerError::InvalidDate { year, month, day };
    let y = i32::try_from(year).map_err(|_| invalid())?;
    let m = u32::try_from(month).map_err(|_| invalid())?;
    let d = u32::try_from(day).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)
}

/// Applies one toggle to an owned habit and returns the new state of the day.
///
/// Clearing deletes the row, so "no row" is the stored form of an unmarked
/// day.
pub fn apply_toggle(
    store: &mut impl HabitStore,
    habit: &Habit,
    date: NaiveDate,
    action: ToggleAction,
) -> Result<DayStatus, TrackerError> {
    if date < habit.start_date {
        return Err(TrackerError::DateBeforeStart {
            date,
            start_date: habit.start_date,
        });
    }

    match action {
        ToggleAction::MarkDone | ToggleAction::MarkNotDone => {
            store.upsert_status(habit.user_id, habit.id, date, action.resulting_status());
        }
        ToggleAction::Clear => {
            store.delete_status(habit.user_id, habit.id, date);
        }
    }
    Ok(action.resulting_status())
}

/// Resolves the habit, the date and the action, then applies the toggle.
/// Nothing is written unless all three are valid.
pub fn toggle_day(
    store: &mut impl HabitStore,
    user_id: UserId,
    habit_id: HabitId,
    (year, month, day): (i64, i64, i64),
    action: &str,
) -> Result<(Habit, DayStatus), TrackerError> {
    let habit = load_habit(&*store, user_id, habit_id)?;
    let date = parse_day(year, month, day)?;
    let action = action.parse::<ToggleAction>()?;
    let status = apply_toggle(store, &habit, date, action)?;
    Ok((habit, status))
}

/// Makes sure every habit has a status row for `today`, leaving existing
/// rows alone. Returns how many placeholder rows were created.
pub fn ensure_daily_statuses(store: &mut impl HabitStore, today: NaiveDate) -> usize {
    store
        .all_habits()
        .into_iter()
        .filter(|habit| store.insert_status_if_absent(habit.user_id, habit.id, today))
        .count()
}
