use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};
use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the tracking core. All of them are detected before any state
/// is mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("invalid date: year {year}, month {month}, day {day}")]
    InvalidDate { year: i64, month: i64, day: i64 },

    #[error("invalid month: year {year}, month {month}")]
    InvalidMonth { year: i64, month: i64 },

    #[error("unknown action '{0}', expected 'done', 'not-done' or 'none'")]
    UnknownAction(String),

    #[error("{date} is before the habit start date {start_date}")]
    DateBeforeStart { date: NaiveDate, start_date: NaiveDate },

    /// The habit does not exist or belongs to someone else.
    #[error("habit not found")]
    HabitNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        let status = match err {
            TrackerError::HabitNotFound => StatusCode::NOT_FOUND,
            TrackerError::Conflict(_) => StatusCode::CONFLICT,
            TrackerError::InvalidDate { .. }
            | TrackerError::InvalidMonth { .. }
            | TrackerError::UnknownAction(_)
            | TrackerError::DateBeforeStart { .. }
            | TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

/// Malformed request bodies keep axum's status code but use the JSON error
/// shape, so the page script can always read `message`.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "status": "error", "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_errors_map_to_http_status() {
        let not_found: AppError = TrackerError::HabitNotFound.into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let invalid: AppError = TrackerError::InvalidDate { year: 2025, month: 4, day: 31 }.into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert!(invalid.message.contains("day 31"));

        let conflict: AppError = TrackerError::Conflict("username taken".into()).into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn json_rejections_use_the_error_shape() {
        use axum::body::{Body, to_bytes};
        use axum::extract::FromRequest;
        use axum::http::{Request, header};
        use axum::response::IntoResponse;

        #[derive(Debug, serde::Deserialize)]
        struct Day {
            #[allow(dead_code)]
            day: i64,
        }

        let request = Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"day":"31"}"#))
            .unwrap();
        let rejection = Json::<Day>::from_request(request, &()).await.unwrap_err();
        let err = AppError::from(rejection);
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);

        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("day"));
    }
}
