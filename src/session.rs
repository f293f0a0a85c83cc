//! Packaging one completed search into a persistable session record.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::graph::Graph;
use crate::search::{search, SearchResult};
use crate::sink::ProgressSink;

// ============================================================================
// Session record
// ============================================================================

/// The persisted summary of one completed search.
///
/// Built once per search by the caller, immutable thereafter. The store
/// assigns its own identifier on save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// When the search finished.
    pub timestamp: DateTime<Utc>,
    /// Number of vertices of the searched graph.
    pub vertex_count: usize,
    /// The requested clique size.
    pub target_k: usize,
    /// Whether a clique was found.
    pub found: bool,
    /// The found clique, `None` when the search failed.
    pub clique_vertices: Option<Vec<usize>>,
    /// Total search-tree nodes visited.
    pub total_steps: u64,
    /// Wall-clock duration of the engine call, in seconds.
    pub execution_time_seconds: f64,
    /// Snapshot of the searched adjacency matrix.
    pub graph_matrix: Vec<Vec<u8>>,
}

impl SessionRecord {
    /// Packages a finished search into a record, stamping the current time.
    pub fn capture(graph: &Graph, k: usize, result: &SearchResult, elapsed: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            vertex_count: graph.vertex_count(),
            target_k: k,
            found: result.found,
            clique_vertices: result.found.then(|| result.clique.clone()),
            total_steps: result.total_steps,
            execution_time_seconds: elapsed.as_secs_f64(),
            graph_matrix: graph.rows().to_vec(),
        }
    }
}

// ============================================================================
// Target validation
// ============================================================================

/// The requested clique size was rejected before searching.
///
/// Only `k = 0` is rejected: the engine would report a trivial empty clique,
/// which no caller of the recorded flow wants. `k` larger than the vertex
/// count stays a legal query that returns `found=false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidTarget {
    /// The rejected clique size.
    pub k: usize,
}

impl fmt::Display for InvalidTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid target clique size {}: k must be at least 1", self.k)
    }
}

impl std::error::Error for InvalidTarget {}

// ============================================================================
// Recorded search
// ============================================================================

/// Runs one fresh search with wall-clock timing and builds the session
/// record for the persistence collaborator.
///
/// The engine call itself is untouched: a fresh candidate set and step
/// counter, `start_index = 0`, and the supplied sink.
///
/// # Errors
/// Returns [`InvalidTarget`] when `k = 0`.
pub fn run_recorded_search<S: ProgressSink>(
    graph: &Graph,
    k: usize,
    sink: &mut S,
) -> Result<(SearchResult, SessionRecord), InvalidTarget> {
    if k == 0 {
        return Err(InvalidTarget { k });
    }

    let mut candidate = Vec::new();
    let mut steps = 0u64;
    let started = Instant::now();
    let result = search(graph, k, &mut candidate, 0, &mut steps, sink);
    let elapsed = started.elapsed();

    let record = SessionRecord::capture(graph, k, &result, elapsed);
    info!(
        found = result.found,
        steps = result.total_steps,
        elapsed_ms = elapsed.as_millis() as u64,
        "search finished"
    );
    Ok((result, record))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NoopSink;

    fn triangle() -> Graph {
        Graph::from_edges(3, &[(0, 1), (0, 2), (1, 2)])
    }

    #[test]
    fn successful_search_is_captured_fully() {
        let g = triangle();
        let (result, record) = run_recorded_search(&g, 3, &mut NoopSink).unwrap();
        assert!(result.found);
        assert!(record.found);
        assert_eq!(record.vertex_count, 3);
        assert_eq!(record.target_k, 3);
        assert_eq!(record.clique_vertices, Some(vec![0, 1, 2]));
        assert_eq!(record.total_steps, result.total_steps);
        assert!(record.execution_time_seconds >= 0.0);
        assert_eq!(record.graph_matrix, g.rows().to_vec());
    }

    #[test]
    fn failed_search_has_no_clique_vertices() {
        let g = Graph::from_edges(3, &[(0, 1), (1, 2)]);
        let (result, record) = run_recorded_search(&g, 3, &mut NoopSink).unwrap();
        assert!(!result.found);
        assert!(!record.found);
        assert_eq!(record.clique_vertices, None);
        assert_eq!(record.total_steps, 6);
    }

    #[test]
    fn k_zero_is_rejected_before_searching() {
        let err = run_recorded_search(&triangle(), 0, &mut NoopSink).unwrap_err();
        assert_eq!(err, InvalidTarget { k: 0 });
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn k_beyond_vertex_count_is_a_legal_failed_query() {
        let (result, record) = run_recorded_search(&triangle(), 5, &mut NoopSink).unwrap();
        assert!(!result.found);
        assert_eq!(record.target_k, 5);
    }

    #[test]
    fn record_serializes_to_json_and_back() {
        let g = triangle();
        let (_, record) = run_recorded_search(&g, 2, &mut NoopSink).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn timestamp_is_recent() {
        let before = Utc::now();
        let (_, record) = run_recorded_search(&triangle(), 2, &mut NoopSink).unwrap();
        let after = Utc::now();
        assert!(record.timestamp >= before);
        assert!(record.timestamp <= after);
    }
}
