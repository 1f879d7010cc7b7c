//! SQLite submission store
//!
//! One table, one connection. Writes are serialized by the connection mutex;
//! every call runs on the blocking pool.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use formkit_core::{FormData, RepositoryError, Submission, SubmissionRepository};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS form_submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    form_data TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

/// Handle to the submission database; clones share the connection
#[derive(Clone)]
pub struct SqliteSubmissionRepository {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteSubmissionRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(storage)?;
        info!(path = %path.display(), "submission database opened");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::init(Connection::open_in_memory().map_err(storage)?)
    }

    fn init(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(SCHEMA).map_err(storage)?;
        Ok(Self { conn: Arc::new(Mutex::new(Some(conn))) })
    }

    /// Close the connection; later calls fail with a storage error
    pub fn close(&self) -> Result<(), RepositoryError> {
        let Some(conn) = self.conn.lock().take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, e)| storage(e))?;
        info!("submission database closed");
        Ok(())
    }

    async fn run<T, F>(&self, op: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, RepositoryError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            let conn = guard
                .as_ref()
                .ok_or_else(|| RepositoryError::Storage("database is closed".into()))?;
            op(conn)
        })
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?
    }
}

#[async_trait]
impl SubmissionRepository for SqliteSubmissionRepository {
    async fn create(&self, form_data: FormData) -> Result<i64, RepositoryError> {
        let json = encode(&form_data)?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let id = self
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO form_submissions (form_data, created_at) VALUES (?1, ?2)",
                    params![json, created_at],
                )
                .map_err(storage)?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        info!(submission_id = id, "submission stored");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Submission>, RepositoryError> {
        let rows = self
            .run(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, form_data, created_at FROM form_submissions
                         ORDER BY created_at DESC, id DESC",
                    )
                    .map_err(storage)?;
                let rows = stmt
                    .query_map([], read_row)
                    .map_err(storage)?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(storage)?;
                Ok(rows)
            })
            .await?;
        debug!(count = rows.len(), "submissions listed");
        rows.into_iter().map(decode).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Submission>, RepositoryError> {
        let row = self
            .run(move |conn| {
                conn.query_row(
                    "SELECT id, form_data, created_at FROM form_submissions WHERE id = ?1",
                    params![id],
                    read_row,
                )
                .optional()
                .map_err(storage)
            })
            .await?;
        row.map(decode).transpose()
    }

    async fn update(&self, id: i64, form_data: FormData) -> Result<(), RepositoryError> {
        let json = encode(&form_data)?;
        let changed = self
            .run(move |conn| {
                conn.execute(
                    "UPDATE form_submissions SET form_data = ?1 WHERE id = ?2",
                    params![json, id],
                )
                .map_err(storage)
            })
            .await?;
        if changed == 0 {
            warn!(submission_id = id, "update of unknown submission");
            return Err(RepositoryError::NotFound(id));
        }
        info!(submission_id = id, "submission updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let changed = self
            .run(move |conn| {
                conn.execute("DELETE FROM form_submissions WHERE id = ?1", params![id])
                    .map_err(storage)
            })
            .await?;
        if changed == 0 {
            warn!(submission_id = id, "delete of unknown submission");
            return Err(RepositoryError::NotFound(id));
        }
        info!(submission_id = id, "submission deleted");
        Ok(())
    }
}

type Row = (i64, String, String);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn storage(e: rusqlite::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn encode(form_data: &FormData) -> Result<String, RepositoryError> {
    serde_json::to_string(form_data).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn decode((id, form_data, created_at): Row) -> Result<Submission, RepositoryError> {
    let form_data: FormData = serde_json::from_str(&form_data)
        .map_err(|e| RepositoryError::Serialization(format!("submission {}: {}", id, e)))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| RepositoryError::Serialization(format!("submission {}: {}", id, e)))?
        .with_timezone(&Utc);
    Ok(Submission { id, form_data, created_at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(name: &str) -> FormData {
        let mut data = FormData::new();
        data.insert("Name".into(), json!(name));
        data
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let store = SqliteSubmissionRepository::open_in_memory().unwrap();
        let id = store.create(data("Alice")).await.unwrap();
        assert_eq!(id, 1);

        let saved = store.get(id).await.unwrap().unwrap();
        assert_eq!(saved.form_data["Name"], json!("Alice"));

        store.update(id, data("Bob")).await.unwrap();
        let updated = store.get(id).await.unwrap().unwrap();
        assert_eq!(updated.form_data["Name"], json!("Bob"));
        assert_eq!(updated.created_at, saved.created_at);

        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let store = SqliteSubmissionRepository::open_in_memory().unwrap();
        assert_eq!(store.update(5, data("x")).await, Err(RepositoryError::NotFound(5)));
        assert_eq!(store.delete(5).await, Err(RepositoryError::NotFound(5)));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = SqliteSubmissionRepository::open_in_memory().unwrap();
        for name in ["a", "b", "c"] {
            store.create(data(name)).await.unwrap();
        }
        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_reopen_keeps_rows_and_close_blocks_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.db");

        let store = SqliteSubmissionRepository::open(&path).unwrap();
        store.create(data("kept")).await.unwrap();
        store.close().unwrap();
        assert!(matches!(store.list().await, Err(RepositoryError::Storage(_))));

        let reopened = SqliteSubmissionRepository::open(&path).unwrap();
        assert_eq!(reopened.list().await.unwrap().len(), 1);
    }
}
