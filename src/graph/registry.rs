use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::ReachError;

use super::edge::EdgeId;
use super::node::{GraphNode, ObjectKey, ObjectKinds};

/// Built-in kind reported for the held-roots container.
pub const HELD_ROOTS_BUILT_IN: &str = "Array";
/// Derived kind reported for the held-roots container.
pub const HELD_ROOTS_DERIVED: &str = "HeldValues";

/// Assigns stable [`ObjectKey`]s to unique heap entities and hands out [`EdgeId`]s.
///
/// `I` is the identity of a heap entity (object, symbol, private name) as the
/// introspection layer sees it. Synthetic nodes (the held-roots container,
/// tuple nodes) have no identity and can never be looked up.
#[derive(Debug)]
pub struct GraphNodeRegistry<I> {
    sealed: bool,
    nodes: Vec<GraphNode>,
    identities: Vec<Option<I>>,
    /// Identity → key, for O(1) idempotent registration.
    key_index: HashMap<I, ObjectKey>,
    next_edge: u32,
}

impl<I: Clone + Eq + Hash + Debug> GraphNodeRegistry<I> {
    pub fn new() -> Self {
        Self {
            sealed: false,
            nodes: Vec::new(),
            identities: Vec::new(),
            key_index: HashMap::new(),
            next_edge: 0,
        }
    }

    /// Assign key 0 to the target. Must be the first registration.
    pub fn define_target(&mut self, identity: I, kinds: ObjectKinds) -> Result<ObjectKey, ReachError> {
        self.check_open("define the target")?;
        if !self.nodes.is_empty() {
            return Err(ReachError::DuplicateDefinition(
                "the target key is already assigned".to_string(),
            ));
        }
        self.push(Some(identity), kinds)
    }

    /// Assign key 1 to the held-roots container. Must directly follow the target.
    pub fn define_held_roots(&mut self) -> Result<ObjectKey, ReachError> {
        self.check_open("define the held roots")?;
        match self.nodes.len() {
            0 => Err(ReachError::MissingPrerequisite(
                "the target must be defined before the held roots".to_string(),
            )),
            1 => self.push(
                None,
                ObjectKinds::new(HELD_ROOTS_BUILT_IN, HELD_ROOTS_DERIVED),
            ),
            _ => Err(ReachError::DuplicateDefinition(
                "the held-roots key is already assigned".to_string(),
            )),
        }
    }

    /// Register a heap entity, or return its existing key.
    pub fn define_node(&mut self, identity: I, kinds: ObjectKinds) -> Result<ObjectKey, ReachError> {
        self.check_open("define a node")?;
        self.check_reserved()?;
        if let Some(&existing) = self.key_index.get(&identity) {
            return Ok(existing);
        }
        self.push(Some(identity), kinds)
    }

    /// Register an identity-less intermediate node (e.g. a collection tuple).
    pub fn define_synthetic(&mut self, kinds: ObjectKinds) -> Result<ObjectKey, ReachError> {
        self.check_open("define a synthetic node")?;
        self.check_reserved()?;
        self.push(None, kinds)
    }

    pub fn lookup_key(&self, identity: &I) -> Option<ObjectKey> {
        self.key_index.get(identity).copied()
    }

    /// The heap identity behind `key`, if it has one.
    pub fn identity(&self, key: ObjectKey) -> Option<&I> {
        self.identities.get(key.index()).and_then(Option::as_ref)
    }

    pub fn node(&self, key: ObjectKey) -> Option<&GraphNode> {
        self.nodes.get(key.index())
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        key.index() < self.nodes.len()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn next_edge_id(&mut self) -> Result<EdgeId, ReachError> {
        let id = EdgeId(self.next_edge);
        self.next_edge = self.next_edge.checked_add(1).ok_or_else(|| {
            ReachError::CapacityExceeded("edge ids exhausted".to_string())
        })?;
        Ok(id)
    }

    /// Reject every further registration.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn push(&mut self, identity: Option<I>, kinds: ObjectKinds) -> Result<ObjectKey, ReachError> {
        let count = self.nodes.len();
        let raw = u32::try_from(count).map_err(|_| {
            ReachError::CapacityExceeded(format!("{count} nodes do not fit an object key"))
        })?;
        let key = ObjectKey(raw);
        if let Some(ref id) = identity {
            self.key_index.insert(id.clone(), key);
        }
        self.nodes.push(GraphNode::new(key, kinds));
        self.identities.push(identity);
        tracing::trace!(%key, "node defined");
        Ok(key)
    }

    fn check_open(&self, operation: &'static str) -> Result<(), ReachError> {
        if self.sealed {
            Err(ReachError::PhaseViolation { operation })
        } else {
            Ok(())
        }
    }

    fn check_reserved(&self) -> Result<(), ReachError> {
        if self.nodes.len() < 2 {
            Err(ReachError::MissingPrerequisite(
                "the target and held-roots keys must be assigned first".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl<I: Clone + Eq + Hash + Debug> Default for GraphNodeRegistry<I> {
    fn default() -> Self {
        Self::new()
    }
}
