use std::collections::{BTreeSet, HashSet};

use crate::graph::edge::EdgeId;
use crate::graph::node::ObjectKey;
use crate::resolver::{Resolution, ResolutionSink};

/// The driver's resolution callback: remembers satisfied requirements, the
/// visible strong set and whether the target was reached.
#[derive(Debug, Default)]
pub struct StrongReferenceTracker {
    marked: HashSet<EdgeId>,
    strong_keys: BTreeSet<ObjectKey>,
    found_target: bool,
}

impl StrongReferenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_marked_strong(&self, edge_id: EdgeId) -> bool {
        self.marked.contains(&edge_id)
    }

    pub fn found_target(&self) -> bool {
        self.found_target
    }

    pub fn strong_keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.strong_keys.iter().copied()
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }
}

impl ResolutionSink for StrongReferenceTracker {
    fn on_resolved(&mut self, resolution: &Resolution) {
        self.marked.insert(resolution.edge_id);
        if resolution.publish {
            self.strong_keys.insert(resolution.child);
        }
        if resolution.child == ObjectKey::TARGET && !self.found_target {
            tracing::debug!(edge = %resolution.edge_id, "target reached");
            self.found_target = true;
        }
    }
}
