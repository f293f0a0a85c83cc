//! Progress events emitted by the search engine and the sinks that observe
//! them.
//!
//! Sinks are strict observers: the engine produces the same
//! [`SearchResult`](crate::search::SearchResult) whichever sink is attached,
//! and [`NoopSink`] is a valid default. Sinks run synchronously on the
//! caller's thread, so a slow sink directly slows down the search.

use std::io::Write;

// ============================================================================
// Events
// ============================================================================

/// What happened at one point of the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// A recursive frame was entered; the step counter was just incremented.
    Visit {
        /// Lowest vertex index eligible for the next extension.
        start_index: usize,
    },
    /// `vertex` is about to be appended to the candidate set.
    Extend {
        /// The vertex being tried.
        vertex: usize,
    },
    /// The candidate set reached size k and is a valid clique.
    Found,
    /// The candidate set reached size k but is not a clique; the branch is
    /// abandoned.
    Reject,
    /// `vertex` is being retracted from the candidate set.
    Backtrack {
        /// The vertex being retracted.
        vertex: usize,
    },
}

/// One progress event, borrowing the engine's live candidate set.
///
/// `step` is the value of the shared step counter at the moment the event is
/// emitted. For [`EventKind::Found`] the candidate set is the completed
/// clique.
#[derive(Clone, Copy, Debug)]
pub struct SearchEvent<'a> {
    /// Shared step-counter value when the event fired.
    pub step: u64,
    /// The current candidate set (strictly increasing vertex indices).
    pub candidate: &'a [usize],
    /// The event variant.
    pub kind: EventKind,
}

/// An owned snapshot of a [`SearchEvent`], as kept by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Shared step-counter value when the event fired.
    pub step: u64,
    /// Copy of the candidate set at that moment.
    pub candidate: Vec<usize>,
    /// The event variant.
    pub kind: EventKind,
}

impl From<&SearchEvent<'_>> for RecordedEvent {
    fn from(event: &SearchEvent<'_>) -> Self {
        Self {
            step: event.step,
            candidate: event.candidate.to_vec(),
            kind: event.kind,
        }
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// An observer of search progress.
///
/// Implementations must not influence the search: the engine ignores any
/// state a sink keeps and never consults it for control flow.
pub trait ProgressSink {
    /// Called synchronously for every event the engine emits.
    fn on_event(&mut self, event: &SearchEvent<'_>);
}

/// A sink that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    #[inline]
    fn on_event(&mut self, _event: &SearchEvent<'_>) {}
}

/// A sink that narrates the search, one line per event, to a writer.
///
/// Write errors are swallowed; narration is best-effort and must never abort
/// a search.
#[derive(Debug)]
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    /// Creates a sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressSink for TextSink<W> {
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        let SearchEvent { step, candidate, kind } = *event;
        let _ = match kind {
            EventKind::Visit { start_index } => writeln!(
                self.out,
                "step {step}: candidate set {candidate:?}, start index {start_index}"
            ),
            EventKind::Extend { vertex } => {
                writeln!(self.out, "  adding vertex {vertex} to {candidate:?}")
            }
            EventKind::Found => {
                writeln!(self.out, "FOUND CLIQUE: {candidate:?} ({step} steps)")
            }
            EventKind::Reject => {
                writeln!(self.out, "  {candidate:?} is not a clique")
            }
            EventKind::Backtrack { vertex } => {
                writeln!(self.out, "  backtrack: removing vertex {vertex} from {candidate:?}")
            }
        };
    }
}

/// A sink that records every event, for tests and custom inspection.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    /// All events seen so far, in emission order.
    pub events: Vec<RecordedEvent>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frame-entry events seen; equals the steps the engine took
    /// while this sink was attached.
    pub fn visits(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Visit { .. }))
            .count()
    }
}

impl ProgressSink for RecordingSink {
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        self.events.push(RecordedEvent::from(event));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(candidate: &[usize]) -> SearchEvent<'_> {
        SearchEvent {
            step: 7,
            candidate,
            kind: EventKind::Extend { vertex: 3 },
        }
    }

    #[test]
    fn recording_sink_snapshots_candidate() {
        let mut sink = RecordingSink::new();
        let mut candidate = vec![0, 2];
        sink.on_event(&sample_event(&candidate));
        // Mutating the live set must not affect the recorded snapshot.
        candidate.push(3);
        assert_eq!(sink.events.len(), 1);
        assert_eq!(sink.events[0].candidate, vec![0, 2]);
        assert_eq!(sink.events[0].step, 7);
        assert_eq!(sink.events[0].kind, EventKind::Extend { vertex: 3 });
    }

    #[test]
    fn recording_sink_counts_visits() {
        let mut sink = RecordingSink::new();
        let set: Vec<usize> = vec![];
        for step in 1..=3 {
            sink.on_event(&SearchEvent {
                step,
                candidate: &set,
                kind: EventKind::Visit { start_index: 0 },
            });
        }
        sink.on_event(&SearchEvent {
            step: 3,
            candidate: &set,
            kind: EventKind::Found,
        });
        assert_eq!(sink.visits(), 3);
    }

    #[test]
    fn text_sink_narrates_one_line_per_event() {
        let mut sink = TextSink::new(Vec::new());
        let set = [0usize, 1];
        sink.on_event(&SearchEvent {
            step: 1,
            candidate: &set,
            kind: EventKind::Visit { start_index: 2 },
        });
        sink.on_event(&SearchEvent {
            step: 1,
            candidate: &set,
            kind: EventKind::Found,
        });
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("step 1"));
        assert!(lines[0].contains("[0, 1]"));
        assert!(lines[1].contains("FOUND CLIQUE"));
    }

    #[test]
    fn noop_sink_accepts_events() {
        let mut sink = NoopSink;
        sink.on_event(&sample_event(&[]));
    }
}
