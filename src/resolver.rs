//! Joint-ownership resolution.
//!
//! A monotone fixpoint over object keys. A key moves from unresolved to
//! resolved exactly once. A child becomes resolved through a requirement once
//! every joint owner of that requirement is resolved; resolving it may in turn
//! satisfy requirements waiting on it. Cycles need no visited tracking beyond
//! the resolved set.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::ReachError;
use crate::graph::edge::EdgeId;
use crate::graph::node::ObjectKey;

/// A satisfied requirement, handed to the [`ResolutionSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub child: ObjectKey,
    pub edge_id: EdgeId,
    /// False when `child` was excluded from the externally visible strong set.
    pub publish: bool,
}

/// Receives every satisfied requirement, in resolution order.
pub trait ResolutionSink {
    fn on_resolved(&mut self, resolution: &Resolution);
}

impl<F: FnMut(&Resolution)> ResolutionSink for F {
    fn on_resolved(&mut self, resolution: &Resolution) {
        self(resolution)
    }
}

#[derive(Debug)]
struct Requirement {
    child: ObjectKey,
    edge_id: EdgeId,
    /// Joint owners not yet resolved.
    outstanding: usize,
}

/// Tracks resolved keys and pending requirements for one analysis.
#[derive(Debug, Default)]
pub struct JointOwnershipResolver {
    defined: HashSet<ObjectKey>,
    resolved: HashSet<ObjectKey>,
    resolution_order: Vec<ObjectKey>,
    requirements: Vec<Requirement>,
    requirement_ids: HashSet<EdgeId>,
    /// Requirement indices keyed by each unresolved joint owner.
    waiting_on: HashMap<ObjectKey, Vec<usize>>,
    excluded: HashSet<ObjectKey>,
}

impl JointOwnershipResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register bookkeeping for `key`. Idempotent.
    pub fn define_key(&mut self, key: ObjectKey) {
        self.defined.insert(key);
    }

    pub fn is_defined(&self, key: ObjectKey) -> bool {
        self.defined.contains(&key)
    }

    pub fn is_resolved(&self, key: ObjectKey) -> bool {
        self.resolved.contains(&key)
    }

    /// Keys in the order they were resolved.
    pub fn resolved_keys(&self) -> &[ObjectKey] {
        &self.resolution_order
    }

    /// Resolving `key` still cascades to its dependents, but its own
    /// resolutions are reported with `publish = false`.
    pub fn exclude_from_strong_set(&mut self, key: ObjectKey) {
        self.excluded.insert(key);
    }

    pub fn is_excluded(&self, key: ObjectKey) -> bool {
        self.excluded.contains(&key)
    }

    /// Register a requirement: `child` resolves through `edge_id` once all of
    /// `joint_owners` are resolved.
    ///
    /// Fires immediately when every owner is already resolved, including the
    /// vacuous case of no owners at all.
    pub fn define_child_edge(
        &mut self,
        child: ObjectKey,
        joint_owners: &[ObjectKey],
        edge_id: EdgeId,
        sink: &mut impl ResolutionSink,
    ) -> Result<(), ReachError> {
        self.require_defined(child, "requirement child")?;
        for &owner in joint_owners {
            self.require_defined(owner, "joint owner")?;
        }
        if !self.requirement_ids.insert(edge_id) {
            return Err(ReachError::DuplicateDefinition(format!(
                "requirement {edge_id} for child {child}"
            )));
        }

        let mut owners: Vec<ObjectKey> = joint_owners.to_vec();
        owners.sort();
        owners.dedup();
        let pending: Vec<ObjectKey> = owners
            .into_iter()
            .filter(|owner| !self.resolved.contains(owner))
            .collect();

        let index = self.requirements.len();
        self.requirements.push(Requirement {
            child,
            edge_id,
            outstanding: pending.len(),
        });

        if pending.is_empty() {
            tracing::trace!(%child, %edge_id, "requirement satisfied at definition");
            let mut queue = VecDeque::new();
            self.fire(index, sink, &mut queue);
            self.cascade(queue, sink);
        } else {
            for owner in pending {
                self.waiting_on.entry(owner).or_default().push(index);
            }
        }
        Ok(())
    }

    /// Mark `key` resolved and cascade to every requirement it completes.
    /// No-op when `key` is already resolved.
    pub fn resolve_key(
        &mut self,
        key: ObjectKey,
        sink: &mut impl ResolutionSink,
    ) -> Result<(), ReachError> {
        self.require_defined(key, "resolved key")?;
        if self.resolved.contains(&key) {
            return Ok(());
        }
        self.cascade(VecDeque::from([key]), sink);
        Ok(())
    }

    fn cascade(&mut self, mut queue: VecDeque<ObjectKey>, sink: &mut impl ResolutionSink) {
        while let Some(key) = queue.pop_front() {
            if !self.resolved.insert(key) {
                continue;
            }
            self.resolution_order.push(key);
            tracing::trace!(%key, "resolved");

            let Some(waiting) = self.waiting_on.remove(&key) else {
                continue;
            };
            for index in waiting {
                let requirement = &mut self.requirements[index];
                requirement.outstanding -= 1;
                if requirement.outstanding == 0 {
                    self.fire(index, sink, &mut queue);
                }
            }
        }
    }

    fn fire(
        &mut self,
        index: usize,
        sink: &mut impl ResolutionSink,
        queue: &mut VecDeque<ObjectKey>,
    ) {
        let requirement = &self.requirements[index];
        let resolution = Resolution {
            child: requirement.child,
            edge_id: requirement.edge_id,
            publish: !self.excluded.contains(&requirement.child),
        };
        sink.on_resolved(&resolution);
        if !self.resolved.contains(&resolution.child) {
            queue.push_back(resolution.child);
        }
    }

    fn require_defined(&self, key: ObjectKey, role: &str) -> Result<(), ReachError> {
        if self.defined.contains(&key) {
            Ok(())
        } else {
            Err(ReachError::MissingPrerequisite(format!(
                "{role} {key} was never defined"
            )))
        }
    }
}
