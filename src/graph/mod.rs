pub mod edge;
pub mod node;
pub mod registry;
pub mod result;
pub mod store;

pub use edge::{
    ChildToParentEdge, CollectionTupleEdge, EdgeId, EdgeKind, FieldPart, ParentToChildEdge,
    TupleKind, TupleMember, TupleMemberEdge,
};
pub use node::{GraphNode, ObjectKey, ObjectKinds};
pub use registry::GraphNodeRegistry;
pub use result::ReachabilityGraph;
pub use store::EdgeStore;
