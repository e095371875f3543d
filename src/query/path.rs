use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;

use crate::graph::edge::EdgeId;
use crate::graph::node::ObjectKey;
use crate::graph::result::ReachabilityGraph;

/// Build a petgraph view of the edges whose requirement was satisfied.
///
/// Node weights are object keys, edge weights edge ids. Returns the graph and
/// the key → index map.
pub fn strong_subgraph(
    graph: &ReachabilityGraph,
) -> (
    StableGraph<ObjectKey, EdgeId>,
    HashMap<ObjectKey, NodeIndex>,
) {
    let mut view: StableGraph<ObjectKey, EdgeId> = StableGraph::new();
    let mut index: HashMap<ObjectKey, NodeIndex> = HashMap::new();
    for node in graph.nodes() {
        index.insert(node.key, view.add_node(node.key));
    }

    let marked: HashSet<EdgeId> = graph
        .child_to_parent_edges()
        .iter()
        .filter(|r| r.is_marked_strong)
        .map(|r| r.edge_id)
        .collect();

    for edge in graph.parent_to_child_edges() {
        if !marked.contains(&edge.edge_id) {
            continue;
        }
        if let (Some(&from), Some(&to)) = (index.get(&edge.parent_key), index.get(&edge.child_key)) {
            view.add_edge(from, to, edge.edge_id);
        }
    }
    (view, index)
}

/// Shortest chain of keys from the held roots to the target over satisfied
/// edges, both ends included. `None` when the target was not found.
///
/// Joint owners are not part of the chain; the full proof is the graph itself.
pub fn strong_chain(graph: &ReachabilityGraph) -> Option<Vec<ObjectKey>> {
    if !graph.found_target() {
        return None;
    }
    let (view, index) = strong_subgraph(graph);
    let start = *index.get(&ObjectKey::HELD_ROOTS)?;
    let goal = *index.get(&ObjectKey::TARGET)?;

    // BFS with a predecessor map; lowest edge id wins ties.
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
    let mut predecessor: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        let mut outgoing: Vec<_> = view
            .edges_directed(current, Direction::Outgoing)
            .map(|e| (*e.weight(), e.target()))
            .collect();
        outgoing.sort_by_key(|(edge_id, _)| *edge_id);
        for (_, next) in outgoing {
            if visited.insert(next) {
                predecessor.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    let mut chain = vec![view[goal]];
    let mut cursor = goal;
    while cursor != start {
        cursor = *predecessor.get(&cursor)?;
        chain.push(view[cursor]);
    }
    chain.reverse();
    Some(chain)
}
