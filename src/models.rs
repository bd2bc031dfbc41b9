use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type HabitId = u64;

/// Completion state of one habit on one day.
///
/// `Unmarked` is what a missing status row means. The daily job may also
/// store it explicitly; readers never distinguish the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayStatus {
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "not-done")]
    NotDone,
    #[default]
    #[serde(rename = "none")]
    Unmarked,
}

impl DayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Done => "done",
            DayStatus::NotDone => "not-done",
            DayStatus::Unmarked => "none",
        }
    }

    pub fn is_done(self) -> bool {
        self == DayStatus::Done
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    #[default]
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Brown,
    Gray,
    Black,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Purple => "purple",
            Color::Pink => "pink",
            Color::Brown => "brown",
            Color::Gray => "gray",
            Color::Black => "black",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Nominal period of the habit in days.
    pub fn days(self) -> u32 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub color: Color,
    pub frequency: Frequency,
    pub duration_days: Option<u32>,
    pub is_unlimited: bool,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stored row of the (user, habit, date) status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HabitStatus {
    pub user_id: UserId,
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub done: DayStatus,
}

/// Validated habit fields, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub description: Option<String>,
    pub color: Color,
    pub frequency: Frequency,
    pub duration_days: Option<u32>,
    pub is_unlimited: bool,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HabitStats {
    pub current_streak: u32,
    pub best_streak: u32,
    pub score: u8,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HabitInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub is_unlimited: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Partial update; absent fields are left untouched. An empty description
/// clears it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<Color>,
    pub frequency: Option<Frequency>,
    pub duration_days: Option<u32>,
    pub is_unlimited: Option<bool>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub day: i64,
    pub month: i64,
    pub year: i64,
    pub action: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub status: String,
    pub new_state: DayStatus,
    pub stats: HabitStats,
}

#[derive(Debug, Deserialize, Default)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    #[serde(flatten)]
    pub habit: Habit,
    pub stats: HabitStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_status_uses_calendar_state_names() {
        assert_eq!(serde_json::to_string(&DayStatus::NotDone).unwrap(), "\"not-done\"");
        assert_eq!(serde_json::to_string(&DayStatus::Unmarked).unwrap(), "\"none\"");
        let parsed: DayStatus = serde_json::from_str("\"done\"").unwrap();
        assert!(parsed.is_done());
    }

    #[test]
    fn habit_input_defaults() {
        let input: HabitInput = serde_json::from_str(r#"{"name": "Read"}"#).unwrap();
        assert_eq!(input.color, Color::Blue);
        assert_eq!(input.frequency.days(), 1);
        assert!(!input.is_unlimited);
        assert!(input.start_date.is_none());
    }
}
