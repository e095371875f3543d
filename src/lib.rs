//! Reference-graph reachability.
//!
//! Given a heap described by a [`HeapIntrospector`], decide whether a target
//! object is transitively held by a set of root objects, honouring references
//! that need several owners alive at once, and produce the minimal provenance
//! graph proving the answer.

pub mod builder;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod query;
pub mod resolver;

pub use builder::introspect::{HeapIntrospector, OutgoingReference, ReferenceForm};
pub use builder::{BuilderState, TopDownGraphBuilder};
pub use config::ReachConfig;
pub use error::ReachError;
pub use graph::{EdgeKind, GraphNode, ObjectKey, ObjectKinds, ReachabilityGraph};
pub use resolver::{JointOwnershipResolver, Resolution, ResolutionSink};
