use crate::auth::CurrentUser;
use crate::calendar::{CalendarView, calendar_view};
use crate::errors::{AppError, TrackerError};
use crate::models::{
    CalendarQuery, HabitId, HabitInput, HabitPatch, HabitResponse, HabitStats, RegisterRequest,
    ToggleRequest, ToggleResponse, User,
};
use crate::state::AppState;
use crate::stats::{habit_stats, local_today};
use crate::storage::HabitStore;
use crate::tracker;
use crate::ui::{render_habit_page, render_habit_list, render_login_hint};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Html,
};
use chrono::{Datelike, Utc};
use serde_json::{Value, json};
use tracing::info;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn index(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
) -> Html<String> {
    let Some(CurrentUser(user)) = user else {
        return Html(render_login_hint());
    };
    let data = state.store.lock().await;
    let habits: Vec<HabitResponse> = data
        .habits_for_user(user.id)
        .into_iter()
        .map(|habit| {
            let stats = habit_stats(&*data, &habit);
            HabitResponse { habit, stats }
        })
        .collect();
    Html(render_habit_list(&user, &habits))
}

pub async fn habit_page(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(habit_id): Path<HabitId>,
    Query(query): Query<CalendarQuery>,
) -> Result<Html<String>, AppError> {
    let Some(CurrentUser(user)) = user else {
        return Ok(Html(render_login_hint()));
    };
    let data = state.store.lock().await;
    let habit = tracker::load_habit(&*data, user.id, habit_id)?;
    let (year, month) = requested_month(&query);
    let view = calendar_view(&*data, &habit, year, month)?;
    let stats = habit_stats(&*data, &habit);
    Ok(Html(render_habit_page(&habit, &stats, &view)))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(payload) = payload?;
    let user = state
        .update(|data| tracker::register_user(&mut *data, payload, Utc::now()))
        .await?;

    info!(user_id = user.id, "registered user {}", user.username);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_habits(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<HabitResponse>>, AppError> {
    let data = state.store.lock().await;
    let habits = data
        .habits_for_user(user.id)
        .into_iter()
        .map(|habit| {
            let stats = habit_stats(&*data, &habit);
            HabitResponse { habit, stats }
        })
        .collect();
    Ok(Json(habits))
}

pub async fn create_habit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<HabitInput>, JsonRejection>,
) -> Result<(StatusCode, Json<HabitResponse>), AppError> {
    let Json(payload) = payload?;
    let created = state
        .update(|data| {
            let habit = tracker::create_habit(&mut *data, user.id, payload, local_today(), Utc::now())?;
            let stats = habit_stats(&*data, &habit);
            Ok::<_, TrackerError>(HabitResponse { habit, stats })
        })
        .await?;

    info!(user_id = user.id, habit_id = created.habit.id, "created habit '{}'", created.habit.name);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_habit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(habit_id): Path<HabitId>,
) -> Result<Json<HabitResponse>, AppError> {
    let data = state.store.lock().await;
    let habit = tracker::load_habit(&*data, user.id, habit_id)?;
    let stats = habit_stats(&*data, &habit);
    Ok(Json(HabitResponse { habit, stats }))
}

pub async fn update_habit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(habit_id): Path<HabitId>,
    payload: Result<Json<HabitPatch>, JsonRejection>,
) -> Result<Json<HabitResponse>, AppError> {
    let Json(payload) = payload?;
    let updated = state
        .update(|data| {
            let habit = tracker::update_habit(&mut *data, user.id, habit_id, payload, Utc::now())?;
            let stats = habit_stats(&*data, &habit);
            Ok::<_, TrackerError>(HabitResponse { habit, stats })
        })
        .await?;

    info!(user_id = user.id, habit_id, "updated habit '{}'", updated.habit.name);
    Ok(Json(updated))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(habit_id): Path<HabitId>,
) -> Result<StatusCode, AppError> {
    let habit = state
        .update(|data| tracker::delete_habit(&mut *data, user.id, habit_id))
        .await?;

    info!(user_id = user.id, habit_id, "deleted habit '{}'", habit.name);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(habit_id): Path<HabitId>,
) -> Result<Json<HabitStats>, AppError> {
    let data = state.store.lock().await;
    let habit = tracker::load_habit(&*data, user.id, habit_id)?;
    Ok(Json(habit_stats(&*data, &habit)))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(habit_id): Path<HabitId>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarView>, AppError> {
    let data = state.store.lock().await;
    let habit = tracker::load_habit(&*data, user.id, habit_id)?;
    let (year, month) = requested_month(&query);
    Ok(Json(calendar_view(&*data, &habit, year, month)?))
}

pub async fn toggle_day(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(habit_id): Path<HabitId>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, AppError> {
    let Json(payload) = payload?;
    let (new_state, stats) = state
        .update(|data| {
            let (habit, new_state) = tracker::toggle_day(
                &mut *data,
                user.id,
                habit_id,
                (payload.year, payload.month, payload.day),
                &payload.action,
            )?;
            Ok::<_, TrackerError>((new_state, habit_stats(&*data, &habit)))
        })
        .await?;

    info!(
        user_id = user.id,
        habit_id,
        "set {}-{:02}-{:02} to {}",
        payload.year,
        payload.month,
        payload.day,
        new_state.as_str()
    );
    Ok(Json(ToggleResponse {
        status: "success".to_string(),
        new_state,
        stats,
    }))
}

fn requested_month(query: &CalendarQuery) -> (i32, u32) {
    let today = local_today();
    (
        query.year.unwrap_or(today.year()),
        query.month.unwrap_or(today.month()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayStatus;
    use crate::storage::StoreData;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    #[tokio::test]
    async fn failed_save_does_not_keep_the_toggle() {
        let mut data = StoreData::default();
        let user = data.insert_user("lee".into(), "lee@example.com".into(), Utc::now());
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let input = HabitInput {
            name: "Swim".into(),
            start_date: Some(start),
            ..Default::default()
        };
        let habit = tracker::create_habit(&mut data, user.id, input, start, Utc::now()).unwrap();
        let state = AppState::new(PathBuf::from("/habit_tracker_missing_dir/store.json"), data);

        let request = ToggleRequest {
            day: 5,
            month: 1,
            year: 2026,
            action: "done".into(),
        };
        let err = toggle_day(
            State(state.clone()),
            CurrentUser(user.clone()),
            Path(habit.id),
            Ok(Json(request)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let data = state.store.lock().await;
        assert_eq!(data.status_on(user.id, habit.id, day), DayStatus::Unmarked);
    }

    #[tokio::test]
    async fn failed_save_does_not_keep_a_new_habit() {
        let mut data = StoreData::default();
        let user = data.insert_user("max".into(), "max@example.com".into(), Utc::now());
        let state = AppState::new(PathBuf::from("/habit_tracker_missing_dir/store.json"), data);

        let input = HabitInput {
            name: "Cycle".into(),
            ..Default::default()
        };
        let err = create_habit(State(state.clone()), CurrentUser(user.clone()), Ok(Json(input)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.store.lock().await.habits_for_user(user.id).is_empty());
    }
}
