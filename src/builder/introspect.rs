use std::fmt::Debug;
use std::hash::Hash;

use crate::graph::node::ObjectKinds;

/// The capability that observes live heap state.
///
/// The engine never looks at objects itself: it asks this collaborator to
/// classify an entity and to enumerate its outgoing references. Calls are
/// synchronous and happen during the build phase only.
pub trait HeapIntrospector {
    /// Identity of a heap entity (object, symbol, private name). Two handles
    /// compare equal iff they denote the same entity.
    type Handle: Clone + Eq + Hash + Debug;

    /// Built-in and derived type tags of `handle`.
    fn classify(&self, handle: &Self::Handle) -> anyhow::Result<ObjectKinds>;

    /// Every outgoing reference of `handle`, in a stable order.
    fn references(
        &self,
        handle: &Self::Handle,
    ) -> anyhow::Result<Vec<OutgoingReference<Self::Handle>>>;

    /// Entities that propagate strength but must never be reported as strongly
    /// held themselves, such as a transient shadow of the real target.
    fn exclude_from_strong_set(&self, handle: &Self::Handle) -> bool {
        let _ = handle;
        false
    }
}

/// One outgoing reference as reported by introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReference<H> {
    pub form: ReferenceForm<H>,
    /// Strength of the edge leaving the parent. For tuple forms this is the
    /// parent→tuple edge. Ignored for [`ReferenceForm::WeakTarget`].
    pub is_strong: bool,
}

impl<H> OutgoingReference<H> {
    pub fn strong(form: ReferenceForm<H>) -> Self {
        Self {
            form,
            is_strong: true,
        }
    }

    pub fn weak(form: ReferenceForm<H>) -> Self {
        Self {
            form,
            is_strong: false,
        }
    }

    /// Effective strength of the edge leaving the parent.
    pub fn holds_strongly(&self) -> bool {
        self.is_strong && !matches!(self.form, ReferenceForm::WeakTarget { .. })
    }
}

/// The syntactic form of a reference, which decides its edge kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceForm<H> {
    /// An indexed element.
    Index { index: u32, value: H },
    /// A string-named property.
    Property { name: String, value: H },
    /// A symbol-keyed property. The value is jointly owned by the parent and the key.
    SymbolKeyed {
        key: H,
        description: String,
        value: H,
    },
    /// A hidden slot of a built-in object.
    InternalSlot { slot: String, value: H },
    /// A binding captured from an enclosing scope.
    Scope { name: String, value: H },
    /// A private field. The value is jointly owned by the parent and the private name.
    PrivateField { name_key: H, name: String, value: H },
    /// A keyed-collection entry.
    MapEntry {
        key: H,
        value: H,
        /// Whether the entry references its key strongly.
        strong_key: bool,
        /// Whether the entry only lives while its key does (weak-keyed maps).
        keys_held_weakly: bool,
    },
    /// A set element.
    SetEntry { element: H, held_weakly: bool },
    /// The object observed by a weak handle. Always non-owning.
    WeakTarget { target: H },
    /// A finalization registration.
    Finalization {
        watched: H,
        held_value: H,
        unregister_token: Option<H>,
    },
}
