//! Failure taxonomy for one analysis run.
//!
//! None of these are recoverable locally. They propagate to
//! [`TopDownGraphBuilder::run`](crate::builder::TopDownGraphBuilder::run), which
//! reports `succeeded = false` with the error attached. An unreachable target
//! is not an error.

/// Errors that abort a reachability analysis.
#[derive(Debug, thiserror::Error)]
pub enum ReachError {
    /// A build-phase mutation was attempted after resolution started.
    #[error("cannot {operation} after resolution has started")]
    PhaseViolation { operation: &'static str },

    /// The same node, edge or requirement was registered twice.
    #[error("duplicate definition: {0}")]
    DuplicateDefinition(String),

    /// An operation ran before something it depends on was registered.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// More nodes, edges or held values than a 32-bit key can address.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// The heap introspection collaborator failed.
    #[error("heap introspection failed: {0}")]
    Introspection(#[from] anyhow::Error),
}

impl ReachError {
    /// Stable machine-readable code for this error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PhaseViolation { .. } => "PHASE_VIOLATION",
            Self::DuplicateDefinition(_) => "DUPLICATE_DEFINITION",
            Self::MissingPrerequisite(_) => "MISSING_PREREQUISITE",
            Self::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            Self::Introspection(_) => "INTROSPECTION_FAILED",
        }
    }
}
