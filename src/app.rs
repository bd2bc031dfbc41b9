use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habits/:id", get(handlers::habit_page))
        .route("/api/health", get(handlers::health))
        .route("/api/users", post(handlers::register))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            get(handlers::get_habit)
                .put(handlers::update_habit)
                .delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/stats", get(handlers::get_stats))
        .route(
            "/api/habits/:id/calendar",
            get(handlers::get_calendar).post(handlers::toggle_day),
        )
        .with_state(state)
}
