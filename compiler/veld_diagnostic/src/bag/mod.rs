//! Diagnostic bags and the compilation-wide sink.
//!
//! A [`DiagnosticBag`] is thread-confined: each computation appends into its
//! own bag. A [`DiagnosticSink`] is the shared end of the funnel: winning
//! computations commit their bag in one bulk merge; losing computations drop
//! theirs whole. Losing diagnostics are never merged or deduplicated after
//! the fact — they simply never reach the sink.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::Diagnostic;

/// Append-only diagnostic collection, confined to one computation.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether the bag holds no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of collected error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Move every diagnostic into another bag.
    pub fn drain_into(&mut self, other: &mut DiagnosticBag) {
        other.diagnostics.append(&mut self.diagnostics);
    }

    /// Consume the bag, yielding its diagnostics.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Iterate without consuming.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

/// Shared, thread-safe diagnostic sink for a compilation.
///
/// `commit` is the only write path; it merges a whole bag atomically so
/// interleaved commits from different symbols never split a batch.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    commits: AtomicUsize,
}

impl DiagnosticSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a winning computation's bag in one bulk merge.
    pub fn commit(&self, bag: DiagnosticBag) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        if bag.is_empty() {
            return;
        }
        self.diagnostics.lock().extend(bag.into_vec());
    }

    /// Total diagnostics committed so far.
    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    /// Whether nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    /// Number of committed error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics.lock().iter().filter(|d| d.is_error()).count()
    }

    /// How many bags have been committed (including empty ones).
    ///
    /// Memoization tests use this to assert that exactly one winner
    /// published its batch.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::Relaxed)
    }

    /// Snapshot of all committed diagnostics.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }
}
