use crate::errors::AppError;
use crate::storage::{StoreData, persist_data};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared handle to the in-memory store and the file it is persisted to.
#[derive(Clone)]
pub struct AppState {
    pub store_path: PathBuf,
    pub store: Arc<Mutex<StoreData>>,
}

impl AppState {
    pub fn new(store_path: PathBuf, data: StoreData) -> Self {
        Self {
            store_path,
            store: Arc::new(Mutex::new(data)),
        }
    }

    /// Writes the store back to disk.
    pub async fn persist(&self, data: &StoreData) -> Result<(), AppError> {
        persist_data(&self.store_path, data).await
    }

    /// Runs `change` against a copy of the store and publishes the copy only
    /// once it is on disk. A failed change or a failed write leaves the shared
    /// store untouched. The lock is held throughout, so writes land in the
    /// same order as the mutations.
    pub async fn update<T, E>(
        &self,
        change: impl FnOnce(&mut StoreData) -> Result<T, E>,
    ) -> Result<T, AppError>
    where
        AppError: From<E>,
    {
        let mut data = self.store.lock().await;
        let mut next = data.clone();
        let value = change(&mut next)?;
        self.persist(&next).await?;
        *data = next;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TrackerError;
    use crate::storage::HabitStore;
    use axum::http::StatusCode;
    use chrono::Utc;

    #[tokio::test]
    async fn failed_write_keeps_previous_store() {
        let state = AppState::new(
            PathBuf::from("/habit_tracker_missing_dir/store.json"),
            StoreData::default(),
        );
        let err = state
            .update(|data| {
                data.insert_user("jo".into(), "jo@example.com".into(), Utc::now());
                Ok::<_, TrackerError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.store.lock().await.find_user_by_username("jo").is_none());
    }

    #[tokio::test]
    async fn failed_change_is_not_persisted() {
        let path = std::env::temp_dir().join(format!("habit_state_{}.json", std::process::id()));
        let state = AppState::new(path.clone(), StoreData::default());
        let err = state
            .update(|data| {
                data.insert_user("kim".into(), "kim@example.com".into(), Utc::now());
                Err::<(), _>(TrackerError::Validation("rejected".into()))
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(state.store.lock().await.find_user_by_username("kim").is_none());
        assert!(!path.exists());
    }
}
