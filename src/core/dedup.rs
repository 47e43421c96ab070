// logsift - core/dedup.rs
//
// Scope-keyed dedup registry and the session-order log.
//
// Both dedup scopes live in one map keyed by `Scope`, with `Scope::Global`
// as the reserved sentinel alongside per-session entries. Sets are
// insert-only; test-and-insert is a single operation, and the scan is
// single-threaded, so no further synchronisation is needed.

use std::collections::{HashMap, HashSet};

/// Dedup scope: the run-wide set, or one execution session's set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Spans the entire run, independent of session.
    Global,
    /// One execution session, identified by its id string.
    Session(String),
}

/// Insert-once identity sets, one per scope, auto-created on first use.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: HashMap<Scope, HashSet<String>>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test-and-insert: true exactly when `identity` has not been seen in
    /// `scope` before. Every later call with an equal pair returns false.
    pub fn first_occurrence(&mut self, scope: Scope, identity: &str) -> bool {
        self.seen
            .entry(scope)
            .or_default()
            .insert(identity.to_string())
    }

    /// Number of distinct identities recorded in `scope`.
    pub fn identity_count(&self, scope: &Scope) -> usize {
        self.seen.get(scope).map_or(0, HashSet::len)
    }
}

/// Insertion-ordered unique session-id log, emitted as the global output's
/// trailer after the main scan completes.
#[derive(Debug, Default)]
pub struct SessionLog {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; true when this is its first appearance. First-seen
    /// order is preserved, duplicates are dropped.
    pub fn record(&mut self, id: &str) -> bool {
        if self.seen.insert(id.to_string()) {
            self.order.push(id.to_string());
            true
        } else {
            false
        }
    }

    /// The recorded ids in first-seen order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
