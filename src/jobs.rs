use crate::errors::AppError;
use crate::state::AppState;
use crate::stats::local_today;
use crate::tracker::ensure_daily_statuses;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Duration;
use tracing::{error, info};

/// Creates today's placeholder rows once, then again shortly after every
/// local midnight. Never returns.
pub async fn run_daily_statuses(state: AppState) {
    loop {
        create_today_statuses(&state).await;
        let wait = until_next_midnight(Local::now().naive_local());
        info!("next daily status run in {}s", wait.as_secs());
        tokio::time::sleep(wait).await;
    }
}

pub async fn create_today_statuses(state: &AppState) {
    let today = local_today();
    match create_statuses_on(state, today).await {
        Ok(created) => info!("created {created} placeholder statuses for {today}"),
        Err(err) => error!("failed to persist placeholder statuses: {}", err.message),
    }
}

/// Ensures every habit has a row for `date` and saves the result.
pub async fn create_statuses_on(state: &AppState, date: NaiveDate) -> Result<usize, AppError> {
    state
        .update(|data| Ok::<_, AppError>(ensure_daily_statuses(&mut *data, date)))
        .await
}

/// Time left until one second past the next local midnight.
pub fn until_next_midnight(now: NaiveDateTime) -> Duration {
    let next = now
        .date()
        .succ_opt()
        .map(|day| day.and_time(NaiveTime::MIN))
        .unwrap_or(now);
    let secs = (next - now).num_seconds().max(0) as u64;
    Duration::from_secs(secs + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayStatus, HabitInput};
    use crate::storage::{HabitStore, StoreData, load_data};
    use crate::tracker;
    use chrono::Utc;

    #[test]
    fn waits_until_just_after_midnight() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        assert_eq!(until_next_midnight(now), Duration::from_secs(3601));

        let midnight = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(until_next_midnight(midnight), Duration::from_secs(86_401));
    }

    #[tokio::test]
    async fn placeholder_rows_reach_the_store_file() {
        let path = std::env::temp_dir().join(format!("habit_jobs_{}.json", std::process::id()));
        let day = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        let mut data = StoreData::default();
        let user = data.insert_user("nia".into(), "nia@example.com".into(), Utc::now());
        let input = HabitInput {
            name: "Floss".into(),
            start_date: Some(day),
            ..Default::default()
        };
        let habit = tracker::create_habit(&mut data, user.id, input, day, Utc::now()).unwrap();
        let state = AppState::new(path.clone(), data);

        assert_eq!(create_statuses_on(&state, day).await.unwrap(), 1);
        assert_eq!(create_statuses_on(&state, day).await.unwrap(), 0);

        let saved = load_data(&path).await;
        let _ = std::fs::remove_file(&path);
        let rows = saved.statuses_between(user.id, habit.id, Some(day), Some(day));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].done, DayStatus::Unmarked);
    }
}
