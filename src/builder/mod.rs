//! Top-down graph construction.
//!
//! [`TopDownGraphBuilder`] starts from the held roots, asks the
//! [`HeapIntrospector`] for each newly discovered object's references,
//! registers nodes and edges, then resolves the held-roots key and emits the
//! provenance graph. States only move forward:
//! `Building → Resolving → Done`.

pub mod introspect;
mod provenance;
pub mod tracker;

use std::collections::{HashSet, VecDeque};

use crate::config::ReachConfig;
use crate::error::ReachError;
use crate::graph::edge::{
    ChildToParentEdge, CollectionTupleEdge, EdgeId, EdgeKind, FieldPart, ParentToChildEdge,
    TupleKind, TupleMember, TupleMemberEdge,
};
use crate::graph::node::{ObjectKey, ObjectKinds};
use crate::graph::registry::GraphNodeRegistry;
use crate::graph::result::ReachabilityGraph;
use crate::graph::store::EdgeStore;

use introspect::{HeapIntrospector, OutgoingReference, ReferenceForm};
use tracker::StrongReferenceTracker;

/// Built-in kind of every synthetic tuple node.
pub const TUPLE_BUILT_IN: &str = "Tuple";

/// Lifecycle of one builder. Never moves backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Building,
    Resolving,
    Done,
}

/// Drives one reachability analysis over a heap.
///
/// Owns all per-analysis state, so independent builders never share counters.
pub struct TopDownGraphBuilder<'h, H: HeapIntrospector> {
    heap: &'h H,
    config: ReachConfig,
    state: BuilderState,
    registry: GraphNodeRegistry<H::Handle>,
    store: EdgeStore,
    tracker: StrongReferenceTracker,
    worklist: VecDeque<ObjectKey>,
    /// Keys already pushed onto the worklist; each object is expanded once.
    queued: HashSet<ObjectKey>,
}

impl<'h, H: HeapIntrospector> TopDownGraphBuilder<'h, H> {
    pub fn new(heap: &'h H, config: ReachConfig) -> Self {
        Self {
            heap,
            config,
            state: BuilderState::Building,
            registry: GraphNodeRegistry::new(),
            store: EdgeStore::new(),
            tracker: StrongReferenceTracker::new(),
            worklist: VecDeque::new(),
            queued: HashSet::new(),
        }
    }

    /// Run a whole analysis. Errors are reported in the returned graph
    /// (`succeeded = false`), never as a panic or `Err`.
    pub fn run(mut self, target: &H::Handle, held_values: &[H::Handle]) -> ReachabilityGraph {
        let outcome = self
            .discover(target, held_values)
            .and_then(|()| self.resolve())
            .and_then(|()| self.finish());
        match outcome {
            Ok(graph) => graph,
            Err(err) => {
                tracing::warn!(code = err.code(), %err, "reachability analysis aborted");
                ReachabilityGraph::failed(err)
            }
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn config(&self) -> &ReachConfig {
        &self.config
    }

    pub fn registry(&self) -> &GraphNodeRegistry<H::Handle> {
        &self.registry
    }

    pub fn store(&self) -> &EdgeStore {
        &self.store
    }

    /// Building phase: register the target and held roots, then expand every
    /// discovered object until the worklist is empty.
    pub fn discover(
        &mut self,
        target: &H::Handle,
        held_values: &[H::Handle],
    ) -> Result<(), ReachError> {
        if self.state != BuilderState::Building {
            return Err(ReachError::PhaseViolation {
                operation: "discover objects",
            });
        }

        let target_kinds = self.heap.classify(target)?;
        let target_key = self.registry.define_target(target.clone(), target_kinds)?;
        self.store.define_key(target_key)?;
        if self.heap.exclude_from_strong_set(target) {
            self.store.exclude_from_strong_set(target_key);
        }

        let roots = self.registry.define_held_roots()?;
        self.store.define_key(roots)?;

        for (index, held) in held_values.iter().enumerate() {
            let index = u32::try_from(index).map_err(|_| {
                ReachError::CapacityExceeded(format!("held value {index} has no array index"))
            })?;
            let child = self.define_child(held)?;
            self.add_edge(
                roots,
                child,
                EdgeKind::ArrayIndex { index },
                self.config.strong_references_only,
                &[roots],
            )?;
        }

        while let Some(key) = self.worklist.pop_front() {
            self.expand(key)?;
        }

        tracing::debug!(
            nodes = self.registry.len(),
            edges = self.store.parent_to_child_edges().len(),
            "discovery complete"
        );
        Ok(())
    }

    /// Resolving phase: seal the graph and resolve the held-roots key.
    pub fn resolve(&mut self) -> Result<(), ReachError> {
        if self.state != BuilderState::Building {
            return Err(ReachError::PhaseViolation {
                operation: "start resolution",
            });
        }
        if !self.registry.contains(ObjectKey::HELD_ROOTS) {
            return Err(ReachError::MissingPrerequisite(
                "objects must be discovered before resolution".to_string(),
            ));
        }
        self.state = BuilderState::Resolving;
        self.registry.seal();
        self.store.seal();

        self.store
            .resolve_key(ObjectKey::HELD_ROOTS, &mut self.tracker)?;
        tracing::debug!(
            resolved = self.store.resolver().resolved_keys().len(),
            marked = self.tracker.marked_count(),
            "resolution complete"
        );
        Ok(())
    }

    /// Done: emit the minimal provenance graph.
    pub fn finish(&mut self) -> Result<ReachabilityGraph, ReachError> {
        if self.state != BuilderState::Resolving {
            return Err(ReachError::PhaseViolation {
                operation: "emit the graph",
            });
        }
        self.state = BuilderState::Done;

        let graph = provenance::select(self.registry.nodes(), &self.store, &self.tracker);
        tracing::info!(
            discovered = self.registry.len(),
            kept = graph.nodes().len(),
            found_target = graph.found_target(),
            "reachability analysis complete"
        );
        Ok(graph)
    }

    fn expand(&mut self, key: ObjectKey) -> Result<(), ReachError> {
        let Some(handle) = self.registry.identity(key).cloned() else {
            return Ok(());
        };
        let references = self.heap.references(&handle)?;
        tracing::trace!(%key, count = references.len(), "expanding");
        for reference in references {
            self.add_reference(key, reference)?;
        }
        Ok(())
    }

    fn add_reference(
        &mut self,
        parent: ObjectKey,
        reference: OutgoingReference<H::Handle>,
    ) -> Result<(), ReachError> {
        let is_strong = reference.holds_strongly();
        if self.config.strong_references_only && !is_strong {
            tracing::trace!(%parent, "weak reference dropped");
            return Ok(());
        }

        match reference.form {
            ReferenceForm::Index { index, value } => {
                self.add_simple(parent, &value, EdgeKind::ArrayIndex { index }, is_strong)
            }
            ReferenceForm::Property { name, value } => {
                self.add_simple(parent, &value, EdgeKind::PropertyName { name }, is_strong)
            }
            ReferenceForm::InternalSlot { slot, value } => {
                self.add_simple(parent, &value, EdgeKind::InternalSlot { slot }, is_strong)
            }
            ReferenceForm::Scope { name, value } => {
                self.add_simple(parent, &value, EdgeKind::ScopeValue { name }, is_strong)
            }
            ReferenceForm::WeakTarget { target } => {
                self.add_simple(parent, &target, EdgeKind::WeakHandleTarget, false)
            }
            ReferenceForm::SymbolKeyed {
                key,
                description,
                value,
            } => {
                let key_node = self.define_child(&key)?;
                self.add_edge(
                    parent,
                    key_node,
                    EdgeKind::SymbolAsKey {
                        description: description.clone(),
                    },
                    is_strong,
                    &[parent],
                )?;
                let child = self.define_child(&value)?;
                self.add_edge(
                    parent,
                    child,
                    EdgeKind::PropertySymbol {
                        description,
                        key: key_node,
                    },
                    is_strong,
                    &[parent, key_node],
                )?;
                Ok(())
            }
            ReferenceForm::PrivateField {
                name_key,
                name,
                value,
            } => {
                let name_node = self.define_child(&name_key)?;
                self.add_edge(
                    parent,
                    name_node,
                    EdgeKind::PrivateField {
                        name: name.clone(),
                        part: FieldPart::Key,
                        name_key: name_node,
                    },
                    is_strong,
                    &[parent],
                )?;
                let child = self.define_child(&value)?;
                self.add_edge(
                    parent,
                    child,
                    EdgeKind::PrivateField {
                        name,
                        part: FieldPart::Value,
                        name_key: name_node,
                    },
                    is_strong,
                    &[parent, name_node],
                )?;
                Ok(())
            }
            ReferenceForm::MapEntry {
                key,
                value,
                strong_key,
                keys_held_weakly,
            } => self.add_map_entry(parent, &key, &value, strong_key, keys_held_weakly, is_strong),
            ReferenceForm::SetEntry {
                element,
                held_weakly,
            } => self.add_set_entry(parent, &element, held_weakly, is_strong),
            ReferenceForm::Finalization {
                watched,
                held_value,
                unregister_token,
            } => self.add_finalization(
                parent,
                &watched,
                &held_value,
                unregister_token.as_ref(),
                is_strong,
            ),
        }
    }

    /// Collection → tuple → {key, value}. The value depends on the tuple only;
    /// the tuple depends on the key too when keys are held weakly.
    fn add_map_entry(
        &mut self,
        parent: ObjectKey,
        key: &H::Handle,
        value: &H::Handle,
        strong_key: bool,
        keys_held_weakly: bool,
        is_strong: bool,
    ) -> Result<(), ReachError> {
        let key_edge = strong_key || !self.config.strong_references_only;
        let key_node = if key_edge || keys_held_weakly {
            Some(self.define_child(key)?)
        } else {
            None
        };

        let tuple = self.define_tuple("MapEntry")?;
        let owners = match key_node {
            Some(k) if keys_held_weakly => vec![parent, k],
            _ => vec![parent],
        };
        self.add_edge(
            parent,
            tuple,
            EdgeKind::CollectionKeyTuple {
                member: TupleMember::Tuple,
            },
            is_strong,
            &owners,
        )?;

        let mut members = Vec::new();
        if let (true, Some(k)) = (key_edge, key_node) {
            self.add_member(
                tuple,
                k,
                EdgeKind::CollectionKeyTuple {
                    member: TupleMember::Key,
                },
                TupleMember::Key,
                strong_key,
                &mut members,
            )?;
        }
        let value_node = self.define_child(value)?;
        self.add_member(
            tuple,
            value_node,
            EdgeKind::CollectionValueTuple {
                member: TupleMember::Value,
            },
            TupleMember::Value,
            true,
            &mut members,
        )?;

        self.store.add_collection_tuple_edge(CollectionTupleEdge {
            tuple_key: tuple,
            collection_key: parent,
            kind: TupleKind::KeyValue,
            members,
        })
    }

    fn add_set_entry(
        &mut self,
        parent: ObjectKey,
        element: &H::Handle,
        held_weakly: bool,
        is_strong: bool,
    ) -> Result<(), ReachError> {
        let element_node = self.define_child(element)?;
        let tuple = self.define_tuple("SetElement")?;
        let owners = if held_weakly {
            vec![parent, element_node]
        } else {
            vec![parent]
        };
        self.add_edge(
            parent,
            tuple,
            EdgeKind::SetElement {
                member: TupleMember::Tuple,
            },
            is_strong,
            &owners,
        )?;

        let mut members = Vec::new();
        if !held_weakly || !self.config.strong_references_only {
            self.add_member(
                tuple,
                element_node,
                EdgeKind::SetElement {
                    member: TupleMember::Element,
                },
                TupleMember::Element,
                !held_weakly,
                &mut members,
            )?;
        }

        self.store.add_collection_tuple_edge(CollectionTupleEdge {
            tuple_key: tuple,
            collection_key: parent,
            kind: TupleKind::SetElement,
            members,
        })
    }

    /// Registry → tuple, alive only while both the registry and the watched
    /// object are. The tuple holds the payload strongly, the rest weakly.
    fn add_finalization(
        &mut self,
        parent: ObjectKey,
        watched: &H::Handle,
        held_value: &H::Handle,
        unregister_token: Option<&H::Handle>,
        is_strong: bool,
    ) -> Result<(), ReachError> {
        let include_weak = !self.config.strong_references_only;
        let watched_node = self.define_child(watched)?;
        let tuple = self.define_tuple("FinalizationRegistration")?;
        self.add_edge(
            parent,
            tuple,
            EdgeKind::FinalizationTuple {
                member: TupleMember::Tuple,
            },
            is_strong,
            &[parent, watched_node],
        )?;

        let mut members = Vec::new();
        if include_weak {
            self.add_member(
                tuple,
                watched_node,
                EdgeKind::FinalizationTuple {
                    member: TupleMember::Watched,
                },
                TupleMember::Watched,
                false,
                &mut members,
            )?;
        }
        let held_node = self.define_child(held_value)?;
        self.add_member(
            tuple,
            held_node,
            EdgeKind::FinalizationTuple {
                member: TupleMember::HeldValue,
            },
            TupleMember::HeldValue,
            true,
            &mut members,
        )?;
        if let (true, Some(token)) = (include_weak, unregister_token) {
            let token_node = self.define_child(token)?;
            self.add_member(
                tuple,
                token_node,
                EdgeKind::FinalizationTuple {
                    member: TupleMember::UnregisterToken,
                },
                TupleMember::UnregisterToken,
                false,
                &mut members,
            )?;
        }

        self.store.add_collection_tuple_edge(CollectionTupleEdge {
            tuple_key: tuple,
            collection_key: parent,
            kind: TupleKind::Finalization,
            members,
        })
    }

    fn add_simple(
        &mut self,
        parent: ObjectKey,
        value: &H::Handle,
        kind: EdgeKind,
        is_strong: bool,
    ) -> Result<(), ReachError> {
        let child = self.define_child(value)?;
        self.add_edge(parent, child, kind, is_strong, &[parent])?;
        Ok(())
    }

    fn add_member(
        &mut self,
        tuple: ObjectKey,
        child: ObjectKey,
        kind: EdgeKind,
        member: TupleMember,
        is_strong: bool,
        members: &mut Vec<TupleMemberEdge>,
    ) -> Result<(), ReachError> {
        let edge_id = self.add_edge(tuple, child, kind, is_strong, &[tuple])?;
        members.push(TupleMemberEdge {
            member,
            key: child,
            edge_id,
            is_strong,
        });
        Ok(())
    }

    /// Register the structural edge and its resolution requirement under one id.
    fn add_edge(
        &mut self,
        parent: ObjectKey,
        child: ObjectKey,
        kind: EdgeKind,
        is_strong: bool,
        joint_owners: &[ObjectKey],
    ) -> Result<EdgeId, ReachError> {
        let edge_id = self.registry.next_edge_id()?;
        self.store.add_parent_to_child_edge(ParentToChildEdge {
            edge_id,
            parent_key: parent,
            child_key: child,
            kind,
            is_strong_owning: is_strong,
        })?;
        self.store.add_child_to_parent_edge(
            ChildToParentEdge {
                child_key: child,
                joint_owner_keys: joint_owners.to_vec(),
                edge_id,
                is_marked_strong: false,
            },
            &mut self.tracker,
        )?;
        Ok(edge_id)
    }

    /// Key for `handle`, registering and queueing it on first sight.
    fn define_child(&mut self, handle: &H::Handle) -> Result<ObjectKey, ReachError> {
        let key = match self.registry.lookup_key(handle) {
            Some(existing) => existing,
            None => {
                let kinds = self.heap.classify(handle)?;
                let key = self.registry.define_node(handle.clone(), kinds)?;
                self.store.define_key(key)?;
                if self.heap.exclude_from_strong_set(handle) {
                    self.store.exclude_from_strong_set(key);
                }
                key
            }
        };
        if self.queued.insert(key) {
            self.worklist.push_back(key);
        }
        Ok(key)
    }

    fn define_tuple(&mut self, derived: &str) -> Result<ObjectKey, ReachError> {
        let key = self
            .registry
            .define_synthetic(ObjectKinds::new(TUPLE_BUILT_IN, derived))?;
        self.store.define_key(key)?;
        Ok(key)
    }
}
