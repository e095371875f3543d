use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A plain directed-graph rendering of a [`ReachabilityGraph`](crate::ReachabilityGraph),
/// suitable for snapshot comparison in any language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub found_target: bool,
    pub succeeded: bool,
    /// `CODE: message` when the run was aborted.
    pub error: Option<String>,
    pub nodes: Vec<DocumentNode>,
    pub edges: Vec<DocumentEdge>,
    /// Keys reported strongly held during the run.
    pub strong_keys: Vec<u32>,
}

/// One node, keyed by its object key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub key: u32,
    pub built_in_kind: String,
    pub derived_kind: String,
}

/// One parent→child edge with its resolution metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEdge {
    pub from: u32,
    pub to: u32,
    /// Display label (property name, index, slot, tuple member…).
    pub label: String,
    /// Edge kind tag, e.g. `PropertyName`.
    pub edge_kind: String,
    pub metadata: EdgeMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMetadata {
    pub edge_id: u32,
    pub is_strong_reference: bool,
    pub joint_owner_keys: Vec<u32>,
    pub is_marked_strong: bool,
}
