use std::collections::BTreeMap;

use crate::graph::result::ReachabilityGraph;

/// Aggregate counts over one result.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub strong_edges: usize,
    pub weak_edges: usize,
    pub marked_strong: usize,
    pub tuple_count: usize,
    /// Edge count per kind tag, sorted by tag.
    pub edges_by_kind: BTreeMap<&'static str, usize>,
}

/// Compute statistics for a `ReachabilityGraph`.
pub fn graph_stats(graph: &ReachabilityGraph) -> GraphStats {
    let mut edges_by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut strong_edges = 0usize;
    for edge in graph.parent_to_child_edges() {
        *edges_by_kind.entry(edge.kind.name()).or_insert(0) += 1;
        if edge.is_strong_owning {
            strong_edges += 1;
        }
    }
    let edge_count = graph.parent_to_child_edges().len();

    GraphStats {
        node_count: graph.nodes().len(),
        edge_count,
        strong_edges,
        weak_edges: edge_count - strong_edges,
        marked_strong: graph
            .child_to_parent_edges()
            .iter()
            .filter(|r| r.is_marked_strong)
            .count(),
        tuple_count: graph.collection_tuple_edges().len(),
        edges_by_kind,
    }
}
