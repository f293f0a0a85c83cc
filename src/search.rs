//! Exhaustive backtracking search for a k-clique.
//!
//! The engine enumerates candidate vertex sets depth-first, in ascending
//! vertex order, extending only "to the right" of the last chosen vertex, so
//! every k-combination is visited at most once and the visitation order is
//! deterministic and reproducible. A candidate vertex is pruned unless it is
//! adjacent to every vertex already in the set. The search stops at the
//! first valid k-clique found in that order; it makes no attempt to find all
//! cliques or a maximum clique.

use crate::graph::Graph;
use crate::sink::{EventKind, NoopSink, ProgressSink, SearchEvent};

// ============================================================================
// Result
// ============================================================================

/// The outcome of one search invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Whether a k-clique was found.
    pub found: bool,
    /// Value of the shared step counter when the call returned: the total
    /// number of search-tree nodes visited (plus whatever the counter held
    /// on entry).
    pub total_steps: u64,
    /// The found clique in strictly increasing vertex order; empty when
    /// `found` is `false`.
    pub clique: Vec<usize>,
}

// ============================================================================
// Engine
// ============================================================================

/// Recursive backtracking search for a clique of exactly `k` vertices.
///
/// One call visits the node described by `candidate` and, unless the set is
/// already of size `k`, tries every extension vertex `i` in
/// `start_index..n` in ascending order, keeping only vertices adjacent to
/// the whole current set. The first success propagates up immediately.
///
/// Contract:
/// - `steps` is incremented exactly once per call, on entry, before
///   anything else; the counter is shared across the whole call tree and
///   may start nonzero when resuming or chaining searches.
/// - `candidate` is mutated in place (push on extend, pop on backtrack) and
///   is restored to its entry state on any `found=false` return. On success
///   it is left holding the clique, which is also copied into the result.
/// - `sink` observes the search (see [`crate::sink`]) but cannot influence
///   it; the result is identical under any sink.
///
/// Preconditions, not checked here (caller obligations):
/// `graph` is a valid symmetric zero-diagonal matrix, `candidate` is
/// strictly increasing and clique-valid, and `start_index` is greater than
/// every vertex in `candidate`. The function is total over well-formed
/// inputs and raises no errors.
///
/// Edge behavior: `k = 0` succeeds immediately with an empty clique
/// (callers that consider k = 0 invalid must reject it beforehand, as
/// [`crate::session::run_recorded_search`] does); an empty graph with
/// `k >= 1`, or `k` larger than the vertex count, exhausts the space and
/// returns `found=false`.
pub fn search<S: ProgressSink>(
    graph: &Graph,
    k: usize,
    candidate: &mut Vec<usize>,
    start_index: usize,
    steps: &mut u64,
    sink: &mut S,
) -> SearchResult {
    *steps += 1;
    sink.on_event(&SearchEvent {
        step: *steps,
        candidate,
        kind: EventKind::Visit { start_index },
    });

    if candidate.len() == k {
        if graph.is_clique(candidate) {
            sink.on_event(&SearchEvent {
                step: *steps,
                candidate,
                kind: EventKind::Found,
            });
            return SearchResult {
                found: true,
                total_steps: *steps,
                clique: candidate.clone(),
            };
        }
        // Reachable only when the initial set was already invalid; the
        // pruning below never extends past a non-adjacent pair.
        sink.on_event(&SearchEvent {
            step: *steps,
            candidate,
            kind: EventKind::Reject,
        });
        return SearchResult {
            found: false,
            total_steps: *steps,
            clique: Vec::new(),
        };
    }

    for i in start_index..graph.vertex_count() {
        let eligible = candidate.iter().all(|&v| graph.has_edge(i, v));
        if !eligible {
            continue;
        }

        sink.on_event(&SearchEvent {
            step: *steps,
            candidate,
            kind: EventKind::Extend { vertex: i },
        });
        candidate.push(i);

        let result = search(graph, k, candidate, i + 1, steps, sink);
        if result.found {
            return result;
        }

        sink.on_event(&SearchEvent {
            step: *steps,
            candidate,
            kind: EventKind::Backtrack { vertex: i },
        });
        candidate.pop();
    }

    SearchResult {
        found: false,
        total_steps: *steps,
        clique: Vec::new(),
    }
}

/// Runs a fresh top-level search: empty initial set, start index 0, a new
/// step counter, and no observer.
pub fn find_clique(graph: &Graph, k: usize) -> SearchResult {
    let mut candidate = Vec::new();
    let mut steps = 0u64;
    search(graph, k, &mut candidate, 0, &mut steps, &mut NoopSink)
}

// ============================================================================
// Tests
// ============================================================================
