use std::fmt;

use super::node::ObjectKey;

/// Identifies one parent→child edge and its matching resolution requirement.
///
/// Allocated from a counter independent of [`ObjectKey`], in edge-creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Which part of an intermediate tuple node an edge points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TupleMember {
    /// Collection (or registry) → the tuple node itself.
    Tuple,
    Key,
    Value,
    Element,
    /// The object a finalization registration watches.
    Watched,
    /// The payload handed to the cleanup callback.
    HeldValue,
    UnregisterToken,
}

impl TupleMember {
    pub fn label(self) -> &'static str {
        match self {
            TupleMember::Tuple => "tuple",
            TupleMember::Key => "key",
            TupleMember::Value => "value",
            TupleMember::Element => "element",
            TupleMember::Watched => "watched",
            TupleMember::HeldValue => "heldValue",
            TupleMember::UnregisterToken => "unregisterToken",
        }
    }
}

/// Whether a private-field edge points at the private name or the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldPart {
    Key,
    Value,
}

/// The kind of a directed parent→child edge, with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EdgeKind {
    /// Parent → element at `index`.
    ArrayIndex { index: u32 },
    /// Parent → value of a string-named property.
    PropertyName { name: String },
    /// Parent → value of a symbol-keyed property. `key` is the symbol's node,
    /// so distinct symbols sharing a description stay distinct edges.
    PropertySymbol { description: String, key: ObjectKey },
    /// Parent → the symbol used as one of its property keys.
    SymbolAsKey { description: String },
    /// Parent → value held in a hidden slot.
    InternalSlot { slot: String },
    /// Closure → value captured from an enclosing scope.
    ScopeValue { name: String },
    /// Keyed collection → entry tuple, or entry tuple → key.
    CollectionKeyTuple { member: TupleMember },
    /// Entry tuple → value.
    CollectionValueTuple { member: TupleMember },
    /// Set → element tuple, or element tuple → element.
    SetElement { member: TupleMember },
    /// Parent → private name or private field value. `name_key` is the node of
    /// the private name declaring the field.
    PrivateField {
        name: String,
        part: FieldPart,
        name_key: ObjectKey,
    },
    /// Weak handle → the object it observes.
    WeakHandleTarget,
    /// Finalization registry → registration tuple, or tuple → one of its parts.
    FinalizationTuple { member: TupleMember },
}

impl EdgeKind {
    /// The tag name of this kind, independent of payload.
    pub fn name(&self) -> &'static str {
        match self {
            EdgeKind::ArrayIndex { .. } => "ArrayIndex",
            EdgeKind::PropertyName { .. } => "PropertyName",
            EdgeKind::PropertySymbol { .. } => "PropertySymbol",
            EdgeKind::SymbolAsKey { .. } => "SymbolAsKey",
            EdgeKind::InternalSlot { .. } => "InternalSlot",
            EdgeKind::ScopeValue { .. } => "ScopeValue",
            EdgeKind::CollectionKeyTuple { .. } => "CollectionKeyTuple",
            EdgeKind::CollectionValueTuple { .. } => "CollectionValueTuple",
            EdgeKind::SetElement { .. } => "SetElement",
            EdgeKind::PrivateField { .. } => "PrivateField",
            EdgeKind::WeakHandleTarget => "WeakHandleTarget",
            EdgeKind::FinalizationTuple { .. } => "FinalizationTuple",
        }
    }

    /// Human-readable edge label for exported documents.
    pub fn label(&self) -> String {
        match self {
            EdgeKind::ArrayIndex { index } => index.to_string(),
            EdgeKind::PropertyName { name } | EdgeKind::ScopeValue { name } => name.clone(),
            EdgeKind::PropertySymbol { description, .. } => format!("Symbol({description})"),
            EdgeKind::SymbolAsKey { description } => format!("Symbol({description}) key"),
            EdgeKind::InternalSlot { slot } => format!("[[{slot}]]"),
            EdgeKind::PrivateField { name, part, .. } => match part {
                FieldPart::Key => format!("#{name} key"),
                FieldPart::Value => format!("#{name}"),
            },
            EdgeKind::WeakHandleTarget => "[[WeakRefTarget]]".to_string(),
            EdgeKind::CollectionKeyTuple { member }
            | EdgeKind::CollectionValueTuple { member }
            | EdgeKind::SetElement { member }
            | EdgeKind::FinalizationTuple { member } => member.label().to_string(),
        }
    }
}

/// A structural edge: `parent` holds a reference to `child`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentToChildEdge {
    pub edge_id: EdgeId,
    pub parent_key: ObjectKey,
    pub child_key: ObjectKey,
    pub kind: EdgeKind,
    /// Strength as reported by introspection (metadata in all-references mode).
    pub is_strong_owning: bool,
}

/// A resolution requirement: `child_key` becomes resolved through this edge
/// once every key in `joint_owner_keys` is resolved.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildToParentEdge {
    pub child_key: ObjectKey,
    pub joint_owner_keys: Vec<ObjectKey>,
    pub edge_id: EdgeId,
    pub is_marked_strong: bool,
}

/// The family a tuple node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TupleKind {
    KeyValue,
    SetElement,
    Finalization,
}

/// One member edge leaving a tuple node.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TupleMemberEdge {
    pub member: TupleMember,
    pub key: ObjectKey,
    pub edge_id: EdgeId,
    pub is_strong: bool,
}

/// Records an intermediate tuple node routing a collection entry or a
/// finalization registration to its parts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionTupleEdge {
    pub tuple_key: ObjectKey,
    pub collection_key: ObjectKey,
    pub kind: TupleKind,
    /// Member edges actually added, in creation order.
    pub members: Vec<TupleMemberEdge>,
}
