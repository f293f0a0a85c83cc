//! # k-Clique Backtracking Search
//!
//! An exhaustive backtracking engine that searches an undirected graph for a
//! set of k mutually adjacent vertices, with a persistent log of every
//! search it runs.
//!
//! This crate provides:
//! - A dense adjacency-matrix graph model with strict validation.
//! - The recursive search engine with candidate pruning, a deterministic
//!   visitation order, per-node step accounting, and first-found
//!   termination.
//! - A progress-event sink interface for observing the search as it
//!   unfolds (no-op, textual narration, recording).
//! - A session layer that times a search, packages it into a record, and a
//!   SQLite store that persists records and answers history and statistics
//!   queries.
//!
//! ## Quick Start
//!
//! ```
//! use kclique::graph::Graph;
//! use kclique::search::find_clique;
//!
//! let triangle = Graph::from_edges(3, &[(0, 1), (0, 2), (1, 2)]);
//! let result = find_clique(&triangle, 3);
//! assert!(result.found);
//! assert_eq!(result.clique, vec![0, 1, 2]);
//! assert_eq!(result.total_steps, 4);
//! ```
//!
//! ## Watching a Search
//!
//! ```
//! use kclique::graph::Graph;
//! use kclique::search::search;
//! use kclique::sink::RecordingSink;
//!
//! let graph = Graph::from_edges(3, &[(0, 1), (1, 2)]);
//! let mut sink = RecordingSink::new();
//! let mut candidate = Vec::new();
//! let mut steps = 0;
//! let result = search(&graph, 3, &mut candidate, 0, &mut steps, &mut sink);
//! assert!(!result.found);
//! assert_eq!(sink.visits() as u64, result.total_steps);
//! ```
//!
//! ## Recording and Persisting a Session
//!
//! ```
//! use kclique::graph::Graph;
//! use kclique::session::run_recorded_search;
//! use kclique::sink::NoopSink;
//! use kclique::store::SessionStore;
//!
//! let graph = Graph::complete(4);
//! let (result, record) = run_recorded_search(&graph, 3, &mut NoopSink)?;
//! assert!(result.found);
//!
//! let store = SessionStore::in_memory()?;
//! let id = store.save_session(&record)?;
//! assert_eq!(store.session_by_id(id)?.unwrap(), record);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: Adjacency-matrix graphs, validation, parsing, and the
//!   clique predicate.
//! - [`search`]: The backtracking engine.
//! - [`sink`]: Progress events and observer sinks.
//! - [`session`]: Timing and session-record building.
//! - [`store`]: SQLite persistence for session records.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::needless_range_loop)] // Often clearer for matrix indexing

pub mod graph;
pub mod search;
pub mod session;
pub mod sink;
pub mod store;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::graph::{parse_graph, Graph, GraphError};
    pub use crate::search::{find_clique, search, SearchResult};
    pub use crate::session::{run_recorded_search, InvalidTarget, SessionRecord};
    pub use crate::sink::{
        EventKind, NoopSink, ProgressSink, RecordedEvent, RecordingSink, SearchEvent, TextSink,
    };
    pub use crate::store::{SessionId, SessionStore, StoreStatistics};
}
