//! SQLite-backed store for completed search sessions.
//!
//! The store is the persistence collaborator of the search core: it assigns
//! an opaque identifier to each saved [`SessionRecord`], serves the search
//! history newest-first, and answers aggregate statistics queries. The
//! engine works identically with or without it.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqlResult};
use thiserror::Error;
use tracing::{debug, info};

use crate::session::SessionRecord;

/// Store-assigned identifier of a saved session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub i64);

/// One history entry, without the graph matrix.
///
/// `clique_vertices` is empty for failed searches; fetch the full record via
/// [`SessionStore::session_by_id`] to get the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Store-assigned identifier.
    pub id: SessionId,
    /// When the search finished.
    pub timestamp: DateTime<Utc>,
    /// Number of vertices of the searched graph.
    pub vertex_count: usize,
    /// The requested clique size.
    pub target_k: usize,
    /// Whether a clique was found.
    pub found: bool,
    /// The found clique, empty when the search failed.
    pub clique_vertices: Vec<usize>,
    /// Total search-tree nodes visited.
    pub total_steps: u64,
    /// Wall-clock duration of the search, in seconds.
    pub execution_time_seconds: f64,
}

/// Aggregate statistics over every stored session.
///
/// All fields are zero on an empty store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStatistics {
    /// Number of stored sessions.
    pub total_searches: u64,
    /// Number of sessions that found a clique.
    pub successful_searches: u64,
    /// `successful_searches / total_searches`, or 0 on an empty store.
    pub success_rate: f64,
    /// Mean step count.
    pub avg_steps: f64,
    /// Mean execution time in seconds.
    pub avg_time_seconds: f64,
    /// Largest step count.
    pub max_steps: u64,
    /// Largest execution time in seconds.
    pub max_time_seconds: f64,
}

/// Errors that can occur with the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A matrix or clique column could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// SQLite-backed session store.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Opens or creates a store at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates an in-memory store (for testing).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS search_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                graph_vertices INTEGER NOT NULL,
                target_k INTEGER NOT NULL,
                found_clique INTEGER NOT NULL,
                clique_vertices TEXT,
                steps INTEGER NOT NULL,
                execution_time REAL NOT NULL,
                graph_matrix TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_timestamp
                ON search_sessions(timestamp);
            ",
        )?;

        info!("session store schema initialized");
        Ok(())
    }

    /// Saves one session record, returning the store-assigned id.
    ///
    /// # Errors
    /// Returns an error on SQLite or JSON-encoding failure.
    pub fn save_session(&self, record: &SessionRecord) -> Result<SessionId, StoreError> {
        let matrix_json = serde_json::to_string(&record.graph_matrix)?;
        let clique_json = record
            .clique_vertices
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "
            INSERT INTO search_sessions
            (timestamp, graph_vertices, target_k, found_clique, clique_vertices, steps, execution_time, graph_matrix)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                record.timestamp.to_rfc3339(),
                record.vertex_count as i64,
                record.target_k as i64,
                record.found,
                clique_json,
                record.total_steps as i64,
                record.execution_time_seconds,
                matrix_json,
            ],
        )?;

        let id = SessionId(self.conn.last_insert_rowid());
        debug!(
            "stored session {:?}: n={} k={} found={}",
            id, record.vertex_count, record.target_k, record.found
        );
        Ok(id)
    }

    /// Lists every stored session, newest first, without matrices.
    ///
    /// # Errors
    /// Returns an error on SQLite failure or a corrupt stored row.
    pub fn all_sessions(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, timestamp, graph_vertices, target_k, found_clique, clique_vertices, steps, execution_time
            FROM search_sessions
            ORDER BY timestamp DESC, id DESC
            ",
        )?;

        let summaries = stmt
            .query_map([], Self::row_to_summary)?
            .collect::<SqlResult<Vec<_>>>()?;

        debug!("loaded {} session summaries", summaries.len());
        Ok(summaries)
    }

    /// Fetches one full session record, including the matrix.
    ///
    /// Returns `Ok(None)` when no session has the given id.
    ///
    /// # Errors
    /// Returns an error on SQLite failure or a corrupt stored row.
    pub fn session_by_id(&self, id: SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let result = self.conn.query_row(
            "
            SELECT timestamp, graph_vertices, target_k, found_clique, clique_vertices, steps, execution_time, graph_matrix
            FROM search_sessions
            WHERE id = ?1
            ",
            [id.0],
            Self::row_to_record,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    /// Computes aggregate statistics over every stored session.
    ///
    /// # Errors
    /// Returns an error on SQLite failure.
    pub fn statistics(&self) -> Result<StoreStatistics, StoreError> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM search_sessions", [], |row| row.get(0))?;

        let successful: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM search_sessions WHERE found_clique = 1",
            [],
            |row| row.get(0),
        )?;

        let (avg_steps, avg_time): (Option<f64>, Option<f64>) = self.conn.query_row(
            "SELECT AVG(steps), AVG(execution_time) FROM search_sessions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (max_steps, max_time): (Option<i64>, Option<f64>) = self.conn.query_row(
            "SELECT MAX(steps), MAX(execution_time) FROM search_sessions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStatistics {
            total_searches: total as u64,
            successful_searches: successful as u64,
            success_rate: if total > 0 {
                successful as f64 / total as f64
            } else {
                0.0
            },
            avg_steps: avg_steps.unwrap_or(0.0),
            avg_time_seconds: avg_time.unwrap_or(0.0),
            max_steps: max_steps.unwrap_or(0) as u64,
            max_time_seconds: max_time.unwrap_or(0.0),
        })
    }

    /// Deletes every stored session, returning how many were removed.
    ///
    /// # Errors
    /// Returns an error on SQLite failure.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        let deleted = self.conn.execute("DELETE FROM search_sessions", [])?;
        if deleted > 0 {
            info!("cleared {} stored sessions", deleted);
        }
        Ok(deleted)
    }

    fn row_to_summary(row: &rusqlite::Row) -> SqlResult<SessionSummary> {
        let id: i64 = row.get(0)?;
        let timestamp: String = row.get(1)?;
        let vertex_count: i64 = row.get(2)?;
        let target_k: i64 = row.get(3)?;
        let found: bool = row.get(4)?;
        let clique_json: Option<String> = row.get(5)?;
        let steps: i64 = row.get(6)?;
        let execution_time: f64 = row.get(7)?;

        Ok(SessionSummary {
            id: SessionId(id),
            timestamp: parse_timestamp(&timestamp)?,
            vertex_count: vertex_count as usize,
            target_k: target_k as usize,
            found,
            clique_vertices: clique_json
                .map(|json| decode_json(&json))
                .transpose()?
                .unwrap_or_default(),
            total_steps: steps as u64,
            execution_time_seconds: execution_time,
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> SqlResult<SessionRecord> {
        let timestamp: String = row.get(0)?;
        let vertex_count: i64 = row.get(1)?;
        let target_k: i64 = row.get(2)?;
        let found: bool = row.get(3)?;
        let clique_json: Option<String> = row.get(4)?;
        let steps: i64 = row.get(5)?;
        let execution_time: f64 = row.get(6)?;
        let matrix_json: String = row.get(7)?;

        Ok(SessionRecord {
            timestamp: parse_timestamp(&timestamp)?,
            vertex_count: vertex_count as usize,
            target_k: target_k as usize,
            found,
            clique_vertices: clique_json.map(|json| decode_json(&json)).transpose()?,
            total_steps: steps as u64,
            execution_time_seconds: execution_time,
            graph_matrix: decode_json(&matrix_json)?,
        })
    }
}

/// Decodes a stored RFC 3339 timestamp, surfacing corruption as a SQLite
/// conversion failure.
fn parse_timestamp(text: &str) -> SqlResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// Decodes a stored JSON column, surfacing corruption as a SQLite
/// conversion failure.
fn decode_json<T: serde::de::DeserializeOwned>(json: &str) -> SqlResult<T> {
    serde_json::from_str(json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(
        timestamp: DateTime<Utc>,
        found: bool,
        steps: u64,
        time_seconds: f64,
    ) -> SessionRecord {
        SessionRecord {
            timestamp,
            vertex_count: 3,
            target_k: 3,
            found,
            clique_vertices: found.then(|| vec![0, 1, 2]),
            total_steps: steps,
            execution_time_seconds: time_seconds,
            graph_matrix: vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]],
        }
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn fresh_store_is_empty() {
        let store = SessionStore::in_memory().unwrap();
        assert!(store.all_sessions().unwrap().is_empty());
        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_searches, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.avg_steps, 0.0);
        assert_eq!(stats.max_steps, 0);
    }

    #[test]
    fn save_assigns_increasing_ids() {
        let store = SessionStore::in_memory().unwrap();
        let a = store.save_session(&record_at(ts(1), true, 4, 0.5)).unwrap();
        let b = store.save_session(&record_at(ts(2), false, 6, 1.0)).unwrap();
        assert!(a.0 > 0);
        assert!(b.0 > a.0);
    }

    #[test]
    fn session_round_trips_through_the_store() {
        let store = SessionStore::in_memory().unwrap();
        let record = record_at(ts(9), true, 4, 0.25);
        let id = store.save_session(&record).unwrap();

        let loaded = store.session_by_id(id).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn failed_search_round_trips_null_clique() {
        let store = SessionStore::in_memory().unwrap();
        let record = record_at(ts(9), false, 6, 0.25);
        let id = store.save_session(&record).unwrap();

        let loaded = store.session_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.clique_vertices, None);

        let summaries = store.all_sessions().unwrap();
        assert!(summaries[0].clique_vertices.is_empty());
    }

    #[test]
    fn missing_id_yields_none() {
        let store = SessionStore::in_memory().unwrap();
        assert!(store.session_by_id(SessionId(42)).unwrap().is_none());
    }

    #[test]
    fn sessions_are_listed_newest_first() {
        let store = SessionStore::in_memory().unwrap();
        let mid = store.save_session(&record_at(ts(12), true, 4, 0.5)).unwrap();
        let old = store.save_session(&record_at(ts(8), false, 6, 0.5)).unwrap();
        let new = store.save_session(&record_at(ts(18), true, 4, 0.5)).unwrap();

        let ids: Vec<SessionId> = store
            .all_sessions()
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![new, mid, old]);
    }

    #[test]
    fn summaries_carry_search_fields() {
        let store = SessionStore::in_memory().unwrap();
        store.save_session(&record_at(ts(7), true, 4, 0.125)).unwrap();

        let summaries = store.all_sessions().unwrap();
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.timestamp, ts(7));
        assert_eq!(s.vertex_count, 3);
        assert_eq!(s.target_k, 3);
        assert!(s.found);
        assert_eq!(s.clique_vertices, vec![0, 1, 2]);
        assert_eq!(s.total_steps, 4);
        assert_eq!(s.execution_time_seconds, 0.125);
    }

    #[test]
    fn statistics_aggregate_over_all_sessions() {
        let store = SessionStore::in_memory().unwrap();
        store.save_session(&record_at(ts(1), true, 4, 0.5)).unwrap();
        store.save_session(&record_at(ts(2), false, 6, 1.5)).unwrap();

        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_searches, 2);
        assert_eq!(stats.successful_searches, 1);
        assert_eq!(stats.success_rate, 0.5);
        assert_eq!(stats.avg_steps, 5.0);
        assert_eq!(stats.avg_time_seconds, 1.0);
        assert_eq!(stats.max_steps, 6);
        assert_eq!(stats.max_time_seconds, 1.5);
    }

    #[test]
    fn clear_all_removes_everything() {
        let store = SessionStore::in_memory().unwrap();
        store.save_session(&record_at(ts(1), true, 4, 0.5)).unwrap();
        store.save_session(&record_at(ts(2), false, 6, 0.5)).unwrap();

        assert_eq!(store.clear_all().unwrap(), 2);
        assert!(store.all_sessions().unwrap().is_empty());
        assert_eq!(store.statistics().unwrap().total_searches, 0);

        // Clearing an empty store is a no-op.
        assert_eq!(store.clear_all().unwrap(), 0);
    }
}
