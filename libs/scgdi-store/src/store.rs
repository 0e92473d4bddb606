//! History store over a SQLite connection pool

use crate::error::Result;
use crate::schema::{EVENT_HISTORY_TABLE, VAR_HISTORY_TABLE};
use serde::Serialize;
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqlitePool};

/// One var_history row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VarRecord {
    pub id: i64,
    pub ts: String,
    pub path: String,
    pub value: Option<f64>,
    pub extra: Option<String>,
}

/// One event_history row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub ts: String,
    pub source: String,
    pub message: String,
    pub severity: i64,
    pub category: Option<String>,
}

/// Append-only persistence for variable samples and events
#[derive(Debug, Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    /// Open (creating if needed) the history database at `path`
    pub async fn connect(path: &str) -> Result<Self> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path)).await?;
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Open an existing database read-only, without touching the schema
    /// (inspection tools)
    pub async fn open_readonly(path: &str) -> Result<Self> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=ro", path)).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests)
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create both history tables if they do not exist
    pub async fn init(&self) -> Result<()> {
        sqlx::query(VAR_HISTORY_TABLE).execute(&self.pool).await?;
        sqlx::query(EVENT_HISTORY_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Append one variable sample. `extra` is an optional JSON
    /// side-channel serialized as text; defaults to `{}`.
    pub async fn add_var(
        &self,
        ts: &str,
        path: &str,
        value: f64,
        extra: Option<&Value>,
    ) -> Result<()> {
        let extra_json = match extra {
            Some(v) => serde_json::to_string(v)?,
            None => "{}".to_string(),
        };
        sqlx::query("INSERT INTO var_history (ts, path, value, extra) VALUES (?, ?, ?, ?)")
            .bind(ts)
            .bind(path)
            .bind(value)
            .bind(extra_json)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Append one event row
    pub async fn add_event(
        &self,
        ts: &str,
        source: &str,
        message: &str,
        severity: u16,
        category: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO event_history (ts, source, message, severity, category) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(ts)
        .bind(source)
        .bind(message)
        .bind(severity as i64)
        .bind(category)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Latest variable samples, newest first
    pub async fn recent_vars(&self, limit: i64, since: Option<&str>) -> Result<Vec<VarRecord>> {
        let rows = match since {
            Some(since) => {
                sqlx::query_as::<_, VarRecord>(
                    "SELECT id, ts, path, value, extra FROM var_history \
                     WHERE ts >= ? ORDER BY ts DESC LIMIT ?",
                )
                .bind(since)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, VarRecord>(
                    "SELECT id, ts, path, value, extra FROM var_history \
                     ORDER BY ts DESC LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Latest events, newest first
    pub async fn recent_events(&self, limit: i64, since: Option<&str>) -> Result<Vec<EventRecord>> {
        let rows = match since {
            Some(since) => {
                sqlx::query_as::<_, EventRecord>(
                    "SELECT id, ts, source, message, severity, category FROM event_history \
                     WHERE ts >= ? ORDER BY ts DESC LIMIT ?",
                )
                .bind(since)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EventRecord>(
                    "SELECT id, ts, source, message, severity, category FROM event_history \
                     ORDER BY ts DESC LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// History read for one variable, matched by path suffix so a bare
    /// browse name finds its domain-qualified rows. Ascending by ts.
    pub async fn var_history_for(
        &self,
        path_suffix: &str,
        start: Option<&str>,
        end: Option<&str>,
        limit: i64,
    ) -> Result<Vec<VarRecord>> {
        let rows = sqlx::query_as::<_, VarRecord>(
            "SELECT id, ts, path, value, extra FROM var_history \
             WHERE path LIKE ? \
               AND (? IS NULL OR ts >= ?) \
               AND (? IS NULL OR ts <= ?) \
             ORDER BY ts ASC LIMIT ?",
        )
        .bind(format!("%{}", path_suffix))
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Total row counts: (var_history, event_history)
    pub async fn counts(&self) -> Result<(i64, i64)> {
        let vars: i64 = sqlx::query_scalar("SELECT count(*) FROM var_history")
            .fetch_one(&self.pool)
            .await?;
        let events: i64 = sqlx::query_scalar("SELECT count(*) FROM event_history")
            .fetch_one(&self.pool)
            .await?;
        Ok((vars, events))
    }

    /// Event counts grouped by severity, ascending
    pub async fn counts_by_severity(&self) -> Result<Vec<(i64, i64)>> {
        let rows = sqlx::query(
            "SELECT severity, count(*) FROM event_history GROUP BY severity ORDER BY severity",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row: SqliteRow| (row.get::<i64, _>(0), row.get::<i64, _>(1)))
            .collect())
    }

    /// Which of the two history tables exist: (var_history, event_history)
    pub async fn has_tables(&self) -> Result<(bool, bool)> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
                .fetch_all(&self.pool)
                .await?;
        Ok((
            names.iter().any(|n| n == "var_history"),
            names.iter().any(|n| n == "event_history"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn temp_store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test_history.sqlite");
        let store = HistoryStore::connect(db_path.to_str().unwrap()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn var_round_trip_with_extra_json() {
        let (_dir, store) = temp_store().await;
        store
            .add_var(
                "2025-08-14T00:00:01Z",
                "Motor50CV.Electrical.VoltageA",
                221.5,
                Some(&json!({"quality": "good"})),
            )
            .await
            .unwrap();
        store
            .add_var("2025-08-14T00:00:02Z", "Motor50CV.Vibration.Axial", 0.11, None)
            .await
            .unwrap();

        let rows = store.recent_vars(10, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        // newest first
        assert_eq!(rows[0].path, "Motor50CV.Vibration.Axial");
        assert_eq!(rows[0].extra.as_deref(), Some("{}"));
        assert_eq!(rows[1].value, Some(221.5));
        assert_eq!(rows[1].extra.as_deref(), Some(r#"{"quality":"good"}"#));
    }

    #[tokio::test]
    async fn replay_appends_independent_rows() {
        let (_dir, store) = temp_store().await;
        for _ in 0..2 {
            store
                .add_var("2025-08-14T00:00:01Z", "Motor50CV.Environment.Humidity", 55.0, None)
                .await
                .unwrap();
        }
        let (vars, events) = store.counts().await.unwrap();
        assert_eq!(vars, 2);
        assert_eq!(events, 0);
    }

    #[tokio::test]
    async fn events_filter_by_since_and_group_by_severity() {
        let (_dir, store) = temp_store().await;
        store
            .add_event("2025-08-14T00:00:01Z", "ns=2;Electrical", "Overvoltage detected", 700, "Electrical")
            .await
            .unwrap();
        store
            .add_event("2025-08-14T00:00:05Z", "ns=2;Motor50CV", "heartbeat", 100, "status")
            .await
            .unwrap();
        store
            .add_event("2025-08-14T00:00:09Z", "ns=2;Electrical", "Overcurrent detected", 700, "Electrical")
            .await
            .unwrap();

        let recent = store
            .recent_events(10, Some("2025-08-14T00:00:05Z"))
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "Overcurrent detected");

        let by_sev = store.counts_by_severity().await.unwrap();
        assert_eq!(by_sev, vec![(100, 1), (700, 2)]);
    }

    #[tokio::test]
    async fn history_read_matches_path_suffix_ascending() {
        let (_dir, store) = temp_store().await;
        for (ts, value) in [("2025-08-14T00:00:01Z", 219.0), ("2025-08-14T00:00:02Z", 223.0)] {
            store
                .add_var(ts, "Motor50CV.Electrical.VoltageA", value, None)
                .await
                .unwrap();
        }
        store
            .add_var("2025-08-14T00:00:03Z", "Motor50CV.Electrical.VoltageB", 220.0, None)
            .await
            .unwrap();

        let rows = store
            .var_history_for("VoltageA", None, None, 100)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, Some(219.0));
        assert_eq!(rows[1].value, Some(223.0));

        let bounded = store
            .var_history_for("VoltageA", Some("2025-08-14T00:00:02Z"), None, 100)
            .await
            .unwrap();
        assert_eq!(bounded.len(), 1);
    }

    #[tokio::test]
    async fn table_presence_reports_both() {
        let (_dir, store) = temp_store().await;
        assert_eq!(store.has_tables().await.unwrap(), (true, true));
    }

    #[tokio::test]
    async fn readonly_open_sees_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ro_history.sqlite");
        let path = db_path.to_str().unwrap();

        let writer = HistoryStore::connect(path).await.unwrap();
        writer
            .add_var("2025-08-14T00:00:01Z", "Motor50CV.Environment.Temperature", 34.0, None)
            .await
            .unwrap();

        let reader = HistoryStore::open_readonly(path).await.unwrap();
        assert_eq!(reader.has_tables().await.unwrap(), (true, true));
        assert_eq!(reader.recent_vars(10, None).await.unwrap().len(), 1);
    }
}
