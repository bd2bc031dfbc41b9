//! Request identity.
//!
//! Credentials are checked upstream. This service does not issue sessions of
//! its own: an authenticating proxy sets the `X-User-Id` header and strips any
//! client-supplied copy of it. Cookies are never consulted.

use crate::errors::AppError;
use crate::models::{User, UserId};
use crate::state::AppState;
use crate::storage::HabitStore;
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};

pub const USER_HEADER: &str = "x-user-id";

/// The user a request acts for. Rejects with 401 when absent or unknown.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_headers(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("login required"))?;
        let data = state.store.lock().await;
        data.find_user(user_id)
            .map(CurrentUser)
            .ok_or_else(|| AppError::unauthorized("unknown user"))
    }
}

pub fn user_id_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
