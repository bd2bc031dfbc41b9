use crate::errors::AppError;
use crate::models::{DayStatus, Habit, HabitDraft, HabitId, HabitStatus, User, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Data-access interface the tracking core works against.
///
/// Every habit and status lookup is scoped by the owning user, so a caller can
/// never read or write another user's rows by guessing an id.
pub trait HabitStore {
    // Users

    fn insert_user(&mut self, username: String, email: String, joined: DateTime<Utc>) -> User;

    fn find_user(&self, user_id: UserId) -> Option<User>;

    /// Case-insensitive username lookup.
    fn find_user_by_username(&self, username: &str) -> Option<User>;

    /// Case-insensitive email lookup.
    fn find_user_by_email(&self, email: &str) -> Option<User>;

    // Habits

    fn insert_habit(&mut self, user_id: UserId, draft: HabitDraft, now: DateTime<Utc>) -> Habit;

    fn find_habit(&self, user_id: UserId, habit_id: HabitId) -> Option<Habit>;

    /// Habits of one user ordered by id.
    fn habits_for_user(&self, user_id: UserId) -> Vec<Habit>;

    fn all_habits(&self) -> Vec<Habit>;

    /// Replaces a stored habit; returns false if it no longer exists.
    fn save_habit(&mut self, habit: &Habit) -> bool;

    /// Removes the habit together with all of its status rows.
    fn delete_habit(&mut self, user_id: UserId, habit_id: HabitId) -> Option<Habit>;

    // Statuses

    /// Status rows of one habit with `from <= date <= to`, ascending by date.
    /// `None` leaves that side unbounded.
    fn statuses_between(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<HabitStatus>;

    fn upsert_status(&mut self, user_id: UserId, habit_id: HabitId, date: NaiveDate, done: DayStatus);

    fn delete_status(&mut self, user_id: UserId, habit_id: HabitId, date: NaiveDate) -> bool;

    /// Creates an unmarked row unless one exists; returns whether it created one.
    fn insert_status_if_absent(&mut self, user_id: UserId, habit_id: HabitId, date: NaiveDate) -> bool;

    fn status_on(&self, user_id: UserId, habit_id: HabitId, date: NaiveDate) -> DayStatus {
        self.statuses_between(user_id, habit_id, Some(date), Some(date))
            .first()
            .map(|row| row.done)
            .unwrap_or_default()
    }
}

type StatusTable = BTreeMap<UserId, BTreeMap<HabitId, BTreeMap<NaiveDate, DayStatus>>>;

/// The whole persisted document. Status rows are keyed by
/// (user, habit, date), which makes that triple unique by construction.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    #[serde(default)]
    last_user_id: UserId,
    #[serde(default)]
    last_habit_id: HabitId,
    #[serde(default)]
    users: BTreeMap<UserId, User>,
    #[serde(default)]
    habits: BTreeMap<HabitId, Habit>,
    #[serde(default)]
    statuses: StatusTable,
}

impl HabitStore for StoreData {
    fn insert_user(&mut self, username: String, email: String, joined: DateTime<Utc>) -> User {
        self.last_user_id += 1;
        let user = User {
            id: self.last_user_id,
            username,
            email,
            date_joined: joined,
        };
        self.users.insert(user.id, user.clone());
        user
    }

    fn find_user(&self, user_id: UserId) -> Option<User> {
        self.users.get(&user_id).cloned()
    }

    fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .values()
            .find(|user| same_ignoring_case(&user.username, username))
            .cloned()
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .values()
            .find(|user| same_ignoring_case(&user.email, email))
            .cloned()
    }

    fn insert_habit(&mut self, user_id: UserId, draft: HabitDraft, now: DateTime<Utc>) -> Habit {
        self.last_habit_id += 1;
        let habit = Habit {
            id: self.last_habit_id,
            user_id,
            name: draft.name,
            description: draft.description,
            color: draft.color,
            frequency: draft.frequency,
            duration_days: draft.duration_days,
            is_unlimited: draft.is_unlimited,
            start_date: draft.start_date,
            created_at: now,
            updated_at: now,
        };
        self.habits.insert(habit.id, habit.clone());
        habit
    }

    fn find_habit(&self, user_id: UserId, habit_id: HabitId) -> Option<Habit> {
        self.habits
            .get(&habit_id)
            .filter(|habit| habit.user_id == user_id)
            .cloned()
    }

    fn habits_for_user(&self, user_id: UserId) -> Vec<Habit> {
        self.habits
            .values()
            .filter(|habit| habit.user_id == user_id)
            .cloned()
            .collect()
    }

    fn all_habits(&self) -> Vec<Habit> {
        self.habits.values().cloned().collect()
    }

    fn save_habit(&mut self, habit: &Habit) -> bool {
        match self.habits.get_mut(&habit.id) {
            Some(stored) if stored.user_id == habit.user_id => {
                *stored = habit.clone();
                true
            }
            _ => false,
        }
    }

    fn delete_habit(&mut self, user_id: UserId, habit_id: HabitId) -> Option<Habit> {
        self.find_habit(user_id, habit_id)?;
        let removed = self.habits.remove(&habit_id)?;
        if let Some(per_user) = self.statuses.get_mut(&user_id) {
            per_user.remove(&habit_id);
            if per_user.is_empty() {
                self.statuses.remove(&user_id);
            }
        }
        Some(removed)
    }

    fn statuses_between(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<HabitStatus> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Vec::new();
            }
        }
        let Some(days) = self
            .statuses
            .get(&user_id)
            .and_then(|per_user| per_user.get(&habit_id))
        else {
            return Vec::new();
        };

        let lower = from.map_or(Bound::Unbounded, Bound::Included);
        let upper = to.map_or(Bound::Unbounded, Bound::Included);
        days.range((lower, upper))
            .map(|(date, done)| HabitStatus {
                user_id,
                habit_id,
                date: *date,
                done: *done,
            })
            .collect()
    }

    fn upsert_status(&mut self, user_id: UserId, habit_id: HabitId, date: NaiveDate, done: DayStatus) {
        self.statuses
            .entry(user_id)
            .or_default()
            .entry(habit_id)
            .or_default()
            .insert(date, done);
    }

    fn delete_status(&mut self, user_id: UserId, habit_id: HabitId, date: NaiveDate) -> bool {
        let Some(days) = self
            .statuses
            .get_mut(&user_id)
            .and_then(|per_user| per_user.get_mut(&habit_id))
        else {
            return false;
        };
        days.remove(&date).is_some()
    }

    fn insert_status_if_absent(&mut self, user_id: UserId, habit_id: HabitId, date: NaiveDate) -> bool {
        let days = self.statuses.entry(user_id).or_default().entry(habit_id).or_default();
        if days.contains_key(&date) {
            return false;
        }
        days.insert(date, DayStatus::Unmarked);
        true
    }
}

fn same_ignoring_case(stored: &str, wanted: &str) -> bool {
    stored.to_lowercase() == wanted.to_lowercase()
}

pub async fn load_data(path: &Path) -> StoreData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse store file {}: {err}", path.display());
                StoreData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
        Err(err) => {
            error!("failed to read store file {}: {err}", path.display());
            StoreData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Color, Frequency};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn draft(name: &str) -> HabitDraft {
        HabitDraft {
            name: name.to_string(),
            description: None,
            color: Color::Green,
            frequency: Frequency::Daily,
            duration_days: None,
            is_unlimited: true,
            start_date: day(1),
        }
    }

    fn temp_store_path(tag: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("habit_store_{tag}_{}_{nanos}.json", std::process::id()))
    }

    #[test]
    fn habits_are_scoped_to_their_owner() {
        let mut data = StoreData::default();
        let alice = data.insert_user("alice".into(), "alice@example.com".into(), Utc::now());
        let bob = data.insert_user("bob".into(), "bob@example.com".into(), Utc::now());
        let habit = data.insert_habit(alice.id, draft("Run"), Utc::now());

        assert!(data.find_habit(alice.id, habit.id).is_some());
        assert!(data.find_habit(bob.id, habit.id).is_none());
        assert!(data.delete_habit(bob.id, habit.id).is_none());
        assert!(data.habits_for_user(bob.id).is_empty());
    }

    #[test]
    fn upsert_keeps_one_row_per_day() {
        let mut data = StoreData::default();
        data.upsert_status(1, 7, day(4), DayStatus::Done);
        data.upsert_status(1, 7, day(4), DayStatus::NotDone);

        let rows = data.statuses_between(1, 7, None, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].done, DayStatus::NotDone);
        assert_eq!(data.status_on(2, 7, day(4)), DayStatus::Unmarked);
    }

    #[test]
    fn range_query_is_inclusive_and_ordered() {
        let mut data = StoreData::default();
        for d in [9, 3, 5, 7] {
            data.upsert_status(1, 1, day(d), DayStatus::Done);
        }

        let dates: Vec<_> = data
            .statuses_between(1, 1, Some(day(3)), Some(day(7)))
            .into_iter()
            .map(|row| row.date)
            .collect();
        assert_eq!(dates, vec![day(3), day(5), day(7)]);
        assert!(data.statuses_between(1, 1, Some(day(8)), Some(day(2))).is_empty());
    }

    #[test]
    fn deleting_a_habit_cascades_to_statuses() {
        let mut data = StoreData::default();
        let user = data.insert_user("carol".into(), "carol@example.com".into(), Utc::now());
        let habit = data.insert_habit(user.id, draft("Stretch"), Utc::now());
        data.upsert_status(user.id, habit.id, day(2), DayStatus::Done);

        assert!(data.delete_habit(user.id, habit.id).is_some());
        assert!(data.statuses_between(user.id, habit.id, None, None).is_empty());
    }

    #[test]
    fn user_lookup_ignores_case() {
        let mut data = StoreData::default();
        data.insert_user("Dana".into(), "Dana@Example.com".into(), Utc::now());
        assert!(data.find_user_by_username("dana").is_some());
        assert!(data.find_user_by_email("dana@example.COM").is_some());
    }

    #[test]
    fn user_lookup_folds_non_ascii_case() {
        let mut data = StoreData::default();
        data.insert_user("Émile".into(), "ÉMILE@Exemple.fr".into(), Utc::now());
        assert!(data.find_user_by_username("émile").is_some());
        assert!(data.find_user_by_email("émile@exemple.fr").is_some());
        assert!(data.find_user_by_username("emile").is_none());
    }

    #[tokio::test]
    async fn persisted_store_reloads() {
        let path = temp_store_path("reload");
        let mut data = StoreData::default();
        let user = data.insert_user("erin".into(), "erin@example.com".into(), Utc::now());
        let habit = data.insert_habit(user.id, draft("Journal"), Utc::now());
        data.upsert_status(user.id, habit.id, day(10), DayStatus::Done);
        persist_data(&path, &data).await.unwrap();

        let loaded = load_data(&path).await;
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.find_habit(user.id, habit.id), Some(habit.clone()));
        assert_eq!(loaded.status_on(user.id, habit.id, day(10)), DayStatus::Done);

        let mut reloaded = loaded;
        let next = reloaded.insert_habit(user.id, draft("Walk"), Utc::now());
        assert_eq!(next.id, habit.id + 1);
    }

    #[tokio::test]
    async fn corrupt_store_starts_empty() {
        let path = temp_store_path("corrupt");
        std::fs::write(&path, b"{ not json").unwrap();
        let loaded = load_data(&path).await;
        let _ = std::fs::remove_file(&path);
        assert!(loaded.all_habits().is_empty());
    }
}
