use std::collections::{HashMap, HashSet};

use crate::error::ReachError;
use crate::resolver::{JointOwnershipResolver, ResolutionSink};

use super::edge::{ChildToParentEdge, CollectionTupleEdge, EdgeId, EdgeKind, ParentToChildEdge};
use super::node::ObjectKey;

/// Structural edges, resolution requirements and tuple records for one analysis.
///
/// Requirements are forwarded to the owned [`JointOwnershipResolver`] as they
/// arrive. All `add_*` calls and [`EdgeStore::define_key`] fail once the store
/// is sealed; resolving keys is allowed at any time.
#[derive(Debug, Default)]
pub struct EdgeStore {
    sealed: bool,
    parent_to_child: Vec<ParentToChildEdge>,
    child_to_parent: Vec<ChildToParentEdge>,
    collection_tuples: Vec<CollectionTupleEdge>,
    /// Edge id → position in `parent_to_child`.
    edge_index: HashMap<EdgeId, usize>,
    triples: HashSet<(ObjectKey, ObjectKey, EdgeId)>,
    signatures: HashSet<(ObjectKey, ObjectKey, EdgeKind)>,
    tuple_keys: HashSet<ObjectKey>,
    resolver: JointOwnershipResolver,
}

impl EdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `key` known to the store and its resolver.
    pub fn define_key(&mut self, key: ObjectKey) -> Result<(), ReachError> {
        self.check_open("define a key")?;
        self.resolver.define_key(key);
        Ok(())
    }

    /// Record a structural edge.
    pub fn add_parent_to_child_edge(&mut self, edge: ParentToChildEdge) -> Result<(), ReachError> {
        self.check_open("add a parent-to-child edge")?;
        self.require_key(edge.parent_key, "edge parent")?;
        self.require_key(edge.child_key, "edge child")?;

        if !self
            .triples
            .insert((edge.parent_key, edge.child_key, edge.edge_id))
        {
            return Err(ReachError::DuplicateDefinition(format!(
                "edge {} from {} to {}",
                edge.edge_id, edge.parent_key, edge.child_key
            )));
        }
        if self.edge_index.contains_key(&edge.edge_id) {
            return Err(ReachError::DuplicateDefinition(format!(
                "edge id {} reused",
                edge.edge_id
            )));
        }
        if !self
            .signatures
            .insert((edge.parent_key, edge.child_key, edge.kind.clone()))
        {
            return Err(ReachError::DuplicateDefinition(format!(
                "{} reference '{}' from {} to {} reported twice",
                edge.kind.name(),
                edge.kind.label(),
                edge.parent_key,
                edge.child_key
            )));
        }

        tracing::trace!(
            edge = %edge.edge_id,
            parent = %edge.parent_key,
            child = %edge.child_key,
            kind = edge.kind.name(),
            strong = edge.is_strong_owning,
            "parent-to-child edge"
        );
        self.edge_index
            .insert(edge.edge_id, self.parent_to_child.len());
        self.parent_to_child.push(edge);
        Ok(())
    }

    /// Record a resolution requirement and hand it to the resolver.
    ///
    /// The structural edge with the same id must already be present.
    pub fn add_child_to_parent_edge(
        &mut self,
        edge: ChildToParentEdge,
        sink: &mut impl ResolutionSink,
    ) -> Result<(), ReachError> {
        self.check_open("add a child-to-parent edge")?;
        let Some(&position) = self.edge_index.get(&edge.edge_id) else {
            return Err(ReachError::MissingPrerequisite(format!(
                "no parent-to-child edge {} for requirement of {}",
                edge.edge_id, edge.child_key
            )));
        };
        if self.parent_to_child[position].child_key != edge.child_key {
            return Err(ReachError::MissingPrerequisite(format!(
                "edge {} does not lead to {}",
                edge.edge_id, edge.child_key
            )));
        }

        self.resolver
            .define_child_edge(edge.child_key, &edge.joint_owner_keys, edge.edge_id, sink)?;
        self.child_to_parent.push(edge);
        Ok(())
    }

    /// Record a tuple node and the member edges leaving it.
    pub fn add_collection_tuple_edge(&mut self, tuple: CollectionTupleEdge) -> Result<(), ReachError> {
        self.check_open("add a collection tuple edge")?;
        self.require_key(tuple.tuple_key, "tuple")?;
        self.require_key(tuple.collection_key, "tuple collection")?;
        for member in &tuple.members {
            match self.edge_index.get(&member.edge_id) {
                Some(&position)
                    if self.parent_to_child[position].parent_key == tuple.tuple_key => {}
                _ => {
                    return Err(ReachError::MissingPrerequisite(format!(
                        "tuple {} has no member edge {}",
                        tuple.tuple_key, member.edge_id
                    )));
                }
            }
        }
        if !self.tuple_keys.insert(tuple.tuple_key) {
            return Err(ReachError::DuplicateDefinition(format!(
                "tuple {} recorded twice",
                tuple.tuple_key
            )));
        }
        self.collection_tuples.push(tuple);
        Ok(())
    }

    /// Resolve `key` and cascade through the pending requirements.
    pub fn resolve_key(
        &mut self,
        key: ObjectKey,
        sink: &mut impl ResolutionSink,
    ) -> Result<(), ReachError> {
        self.resolver.resolve_key(key, sink)
    }

    pub fn exclude_from_strong_set(&mut self, key: ObjectKey) {
        self.resolver.exclude_from_strong_set(key);
    }

    pub fn resolver(&self) -> &JointOwnershipResolver {
        &self.resolver
    }

    pub fn parent_to_child_edges(&self) -> &[ParentToChildEdge] {
        &self.parent_to_child
    }

    pub fn child_to_parent_edges(&self) -> &[ChildToParentEdge] {
        &self.child_to_parent
    }

    pub fn collection_tuple_edges(&self) -> &[CollectionTupleEdge] {
        &self.collection_tuples
    }

    pub fn edge(&self, edge_id: EdgeId) -> Option<&ParentToChildEdge> {
        self.edge_index
            .get(&edge_id)
            .map(|&position| &self.parent_to_child[position])
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn check_open(&self, operation: &'static str) -> Result<(), ReachError> {
        if self.sealed {
            Err(ReachError::PhaseViolation { operation })
        } else {
            Ok(())
        }
    }

    fn require_key(&self, key: ObjectKey, role: &str) -> Result<(), ReachError> {
        if self.resolver.is_defined(key) {
            Ok(())
        } else {
            Err(ReachError::MissingPrerequisite(format!(
                "{role} {key} was never defined"
            )))
        }
    }
}
