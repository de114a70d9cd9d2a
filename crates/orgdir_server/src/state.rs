use crate::error::ApiError;
use orgdir_core::db::open_db_read_only;
use orgdir_core::{DirectoryResult, DirectoryService, SqliteDirectoryRepository};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared application state passed to all route handlers.
///
/// Holds no connection: every request opens its own read-only store handle
/// inside [`AppState::query`].
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, api_key: impl Into<String>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
            api_key: Arc::from(api_key.into()),
        }
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Runs one directory query on a blocking thread with a request-scoped
    /// store handle.
    ///
    /// The connection lives only inside the blocking closure and is dropped
    /// on every exit path, including errors and panics.
    pub async fn query<T, F>(&self, run: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&DirectoryService<SqliteDirectoryRepository<'_>>) -> DirectoryResult<T>
            + Send
            + 'static,
    {
        let db_path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || {
            let conn = open_db_read_only(db_path.as_path())?;
            let service = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn)?);
            run(&service).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("query task failed: {err}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_stores_path_and_key() {
        let state = AppState::new("/tmp/orgs.db", "secret");
        assert_eq!(state.db_path(), Path::new("/tmp/orgs.db"));
        assert_eq!(state.api_key(), "secret");
    }

    #[tokio::test]
    async fn query_on_missing_database_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("absent.db"), "secret");

        let err = state
            .query(|service| service.by_name(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Store(_)));
    }
}
