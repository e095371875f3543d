use crate::error::ReachError;

use super::edge::{ChildToParentEdge, CollectionTupleEdge, ParentToChildEdge};
use super::node::{GraphNode, ObjectKey};

/// The outcome of one analysis: the provenance graph plus the verdict.
///
/// Produced once by the driver and immutable afterwards.
#[derive(Debug)]
pub struct ReachabilityGraph {
    nodes: Vec<GraphNode>,
    parent_to_child_edges: Vec<ParentToChildEdge>,
    child_to_parent_edges: Vec<ChildToParentEdge>,
    collection_tuple_edges: Vec<CollectionTupleEdge>,
    strong_keys: Vec<ObjectKey>,
    found_target: bool,
    succeeded: bool,
    error: Option<ReachError>,
}

impl ReachabilityGraph {
    pub(crate) fn completed(
        nodes: Vec<GraphNode>,
        parent_to_child_edges: Vec<ParentToChildEdge>,
        child_to_parent_edges: Vec<ChildToParentEdge>,
        collection_tuple_edges: Vec<CollectionTupleEdge>,
        strong_keys: Vec<ObjectKey>,
        found_target: bool,
    ) -> Self {
        Self {
            nodes,
            parent_to_child_edges,
            child_to_parent_edges,
            collection_tuple_edges,
            strong_keys,
            found_target,
            succeeded: true,
            error: None,
        }
    }

    /// A run aborted by an internal error. Carries no topology.
    pub(crate) fn failed(error: ReachError) -> Self {
        Self {
            nodes: Vec::new(),
            parent_to_child_edges: Vec::new(),
            child_to_parent_edges: Vec::new(),
            collection_tuple_edges: Vec::new(),
            strong_keys: Vec::new(),
            found_target: false,
            succeeded: false,
            error: Some(error),
        }
    }

    /// Nodes in the provenance graph, sorted by key.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, key: ObjectKey) -> Option<&GraphNode> {
        self.nodes
            .binary_search_by_key(&key, |n| n.key)
            .ok()
            .map(|i| &self.nodes[i])
    }

    /// Structural edges, sorted by edge id.
    pub fn parent_to_child_edges(&self) -> &[ParentToChildEdge] {
        &self.parent_to_child_edges
    }

    /// Resolution requirements, sorted by edge id.
    pub fn child_to_parent_edges(&self) -> &[ChildToParentEdge] {
        &self.child_to_parent_edges
    }

    pub fn collection_tuple_edges(&self) -> &[CollectionTupleEdge] {
        &self.collection_tuple_edges
    }

    /// Every key reported strong during the run, ascending. Excluded keys never appear.
    pub fn strong_keys(&self) -> &[ObjectKey] {
        &self.strong_keys
    }

    pub fn found_target(&self) -> bool {
        self.found_target
    }

    /// False only when the run was aborted by an error; see [`Self::error`].
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn error(&self) -> Option<&ReachError> {
        self.error.as_ref()
    }
}
