use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::graph::edge::{ChildToParentEdge, CollectionTupleEdge, EdgeId};
use crate::graph::node::{GraphNode, ObjectKey};
use crate::graph::result::ReachabilityGraph;
use crate::graph::store::EdgeStore;

use super::tracker::StrongReferenceTracker;

/// Cut the discovered graph down to the proof that the target is held.
///
/// Walks backward from the target over satisfied requirements, keeping each
/// requirement's structural edge, its parent and every joint owner. A kept
/// tuple node keeps all of its member edges. Without a proof only the
/// held-roots node remains.
pub(crate) fn select(
    nodes: &[GraphNode],
    store: &EdgeStore,
    tracker: &StrongReferenceTracker,
) -> ReachabilityGraph {
    let mut kept_nodes: BTreeSet<ObjectKey> = BTreeSet::new();
    let mut kept_edges: BTreeSet<EdgeId> = BTreeSet::new();
    let mut kept_tuples: Vec<&CollectionTupleEdge> = Vec::new();

    if nodes.len() > ObjectKey::HELD_ROOTS.index() {
        kept_nodes.insert(ObjectKey::HELD_ROOTS);
    }

    if tracker.found_target() {
        // Satisfied requirements grouped by the child they resolve.
        let mut satisfied: HashMap<ObjectKey, Vec<&ChildToParentEdge>> = HashMap::new();
        for requirement in store.child_to_parent_edges() {
            if tracker.is_marked_strong(requirement.edge_id) {
                satisfied
                    .entry(requirement.child_key)
                    .or_default()
                    .push(requirement);
            }
        }
        let tuples: HashMap<ObjectKey, &CollectionTupleEdge> = store
            .collection_tuple_edges()
            .iter()
            .map(|t| (t.tuple_key, t))
            .collect();

        let mut queue: VecDeque<ObjectKey> = VecDeque::from([ObjectKey::TARGET]);
        let mut visited: HashSet<ObjectKey> = HashSet::from([ObjectKey::TARGET]);
        kept_nodes.insert(ObjectKey::TARGET);

        while let Some(current) = queue.pop_front() {
            for requirement in satisfied.get(&current).into_iter().flatten() {
                kept_edges.insert(requirement.edge_id);
                let parent = store.edge(requirement.edge_id).map(|e| e.parent_key);
                for key in parent.into_iter().chain(requirement.joint_owner_keys.iter().copied()) {
                    kept_nodes.insert(key);
                    if visited.insert(key) {
                        queue.push_back(key);
                    }
                }
            }

            // Member nodes are shown but not explained.
            if let Some(&tuple) = tuples.get(&current) {
                kept_tuples.push(tuple);
                for member in &tuple.members {
                    kept_edges.insert(member.edge_id);
                    kept_nodes.insert(member.key);
                }
            }
        }
    }

    let graph_nodes: Vec<GraphNode> = kept_nodes
        .iter()
        .filter_map(|key| nodes.get(key.index()).cloned())
        .collect();

    let mut parent_to_child: Vec<_> = store
        .parent_to_child_edges()
        .iter()
        .filter(|e| kept_edges.contains(&e.edge_id))
        .cloned()
        .collect();
    parent_to_child.sort_by_key(|e| e.edge_id);

    let mut child_to_parent: Vec<ChildToParentEdge> = store
        .child_to_parent_edges()
        .iter()
        .filter(|e| kept_edges.contains(&e.edge_id))
        .map(|e| ChildToParentEdge {
            is_marked_strong: tracker.is_marked_strong(e.edge_id),
            ..e.clone()
        })
        .collect();
    child_to_parent.sort_by_key(|e| e.edge_id);

    let mut tuples: Vec<CollectionTupleEdge> = kept_tuples.into_iter().cloned().collect();
    tuples.sort_by_key(|t| t.tuple_key);

    ReachabilityGraph::completed(
        graph_nodes,
        parent_to_child,
        child_to_parent,
        tuples,
        tracker.strong_keys().collect(),
        tracker.found_target(),
    )
}
