use std::fmt;

/// Identifies one distinct heap entity by identity, not value.
///
/// Keys are assigned in first-registration order and never reused within one
/// graph instance. Key 0 is always the target, key 1 the held-roots container.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ObjectKey(pub u32);

impl ObjectKey {
    /// The object whose reachability is under test.
    pub const TARGET: ObjectKey = ObjectKey(0);
    /// The synthetic container holding every root.
    pub const HELD_ROOTS: ObjectKey = ObjectKey(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Classification tags reported by heap introspection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectKinds {
    /// The built-in class of the entity (e.g. "Object", "WeakRef", "Map").
    pub built_in: String,
    /// The most derived user-visible class (e.g. a user class name).
    pub derived: String,
}

impl ObjectKinds {
    pub fn new(built_in: impl Into<String>, derived: impl Into<String>) -> Self {
        Self {
            built_in: built_in.into(),
            derived: derived.into(),
        }
    }
}

/// A node in the reachability graph. Classification metadata only.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub key: ObjectKey,
    pub built_in_kind: String,
    pub derived_kind: String,
}

impl GraphNode {
    pub fn new(key: ObjectKey, kinds: ObjectKinds) -> Self {
        Self {
            key,
            built_in_kind: kinds.built_in,
            derived_kind: kinds.derived,
        }
    }
}
