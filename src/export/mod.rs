pub mod model;

use std::collections::HashMap;

use crate::graph::edge::{ChildToParentEdge, EdgeId};
use crate::graph::result::ReachabilityGraph;

use model::{DocumentEdge, DocumentNode, EdgeMetadata, GraphDocument};

/// Convert a result into its document form.
///
/// Nodes keep the graph's key order; edges keep edge-id order. Two runs over
/// the same heap produce equal documents.
pub fn to_document(graph: &ReachabilityGraph) -> GraphDocument {
    let requirements: HashMap<EdgeId, &ChildToParentEdge> = graph
        .child_to_parent_edges()
        .iter()
        .map(|r| (r.edge_id, r))
        .collect();

    let nodes = graph
        .nodes()
        .iter()
        .map(|n| DocumentNode {
            key: n.key.0,
            built_in_kind: n.built_in_kind.clone(),
            derived_kind: n.derived_kind.clone(),
        })
        .collect();

    let edges = graph
        .parent_to_child_edges()
        .iter()
        .map(|e| {
            let requirement = requirements.get(&e.edge_id);
            DocumentEdge {
                from: e.parent_key.0,
                to: e.child_key.0,
                label: e.kind.label(),
                edge_kind: e.kind.name().to_string(),
                metadata: EdgeMetadata {
                    edge_id: e.edge_id.0,
                    is_strong_reference: e.is_strong_owning,
                    joint_owner_keys: requirement
                        .map(|r| r.joint_owner_keys.iter().map(|k| k.0).collect())
                        .unwrap_or_default(),
                    is_marked_strong: requirement.is_some_and(|r| r.is_marked_strong),
                },
            }
        })
        .collect();

    GraphDocument {
        found_target: graph.found_target(),
        succeeded: graph.succeeded(),
        error: graph.error().map(|e| format!("{}: {}", e.code(), e)),
        nodes,
        edges,
        strong_keys: graph.strong_keys().iter().map(|k| k.0).collect(),
    }
}

/// Render a result as pretty-printed JSON.
pub fn render_json(graph: &ReachabilityGraph) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&to_document(graph))?)
}

/// JSON schema of [`GraphDocument`], for consumers validating stored snapshots.
pub fn document_schema() -> schemars::Schema {
    schemars::schema_for!(GraphDocument)
}
