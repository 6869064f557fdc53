//! Component descriptors: what the registry keeps about one registered provider.

use std::fmt;
use std::sync::Arc;

use resource_wiring_sdk::{
    CapabilityKind, CollectionRouter, ItemRouter, NestedCollectionRouter, ProviderId,
    Representable, TypeRef,
};

use crate::composite_key::CompositeKey;

/// Registry index: capability kind plus composite key.
///
/// Kinds are part of the key so a collection router and a representable for
/// the same model never displace each other.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryKey {
    pub kind: CapabilityKind,
    pub key: CompositeKey,
}

impl RegistryKey {
    #[must_use]
    pub fn new(kind: CapabilityKind, key: CompositeKey) -> Self {
        Self { kind, key }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// Types of the resource enclosing a nested collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentBinding {
    pub model: TypeRef,
    pub identifier: TypeRef,
}

/// Resolved types and provider instance, per capability kind.
#[derive(Clone)]
pub enum Binding {
    CollectionRouter {
        model: TypeRef,
        identifier: TypeRef,
        router: Arc<dyn CollectionRouter>,
    },
    ItemRouter {
        model: TypeRef,
        identifier: TypeRef,
        router: Arc<dyn ItemRouter>,
    },
    NestedCollectionRouter {
        model: TypeRef,
        parent: ParentBinding,
        router: Arc<dyn NestedCollectionRouter>,
    },
    Representable {
        model: TypeRef,
        identifier: TypeRef,
        representable: Arc<dyn Representable>,
    },
}

impl Binding {
    #[must_use]
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Binding::CollectionRouter { .. } => CapabilityKind::CollectionRouter,
            Binding::ItemRouter { .. } => CapabilityKind::ItemRouter,
            Binding::NestedCollectionRouter { .. } => CapabilityKind::NestedCollectionRouter,
            Binding::Representable { .. } => CapabilityKind::Representable,
        }
    }
}

/// One registered provider under one capability.
///
/// The provider instance is shared with the host runtime; the registry drops
/// its reference when the provider disappears.
#[derive(Clone)]
pub struct ComponentDescriptor {
    provider_id: ProviderId,
    provider_name: &'static str,
    binding: Binding,
    sequence: u64,
}

impl ComponentDescriptor {
    #[must_use]
    pub fn new(provider_id: ProviderId, provider_name: &'static str, binding: Binding) -> Self {
        Self {
            provider_id,
            provider_name,
            binding,
            sequence: 0,
        }
    }

    pub(crate) fn committed(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub fn provider_id(&self) -> ProviderId {
        self.provider_id
    }

    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }

    #[must_use]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    #[must_use]
    pub fn kind(&self) -> CapabilityKind {
        self.binding.kind()
    }

    /// Registry commit order; higher means registered later.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn model_type(&self) -> &TypeRef {
        match &self.binding {
            Binding::CollectionRouter { model, .. }
            | Binding::ItemRouter { model, .. }
            | Binding::NestedCollectionRouter { model, .. }
            | Binding::Representable { model, .. } => model,
        }
    }

    /// Identifier type of the model itself (absent for nested routers).
    #[must_use]
    pub fn identifier_type(&self) -> Option<&TypeRef> {
        match &self.binding {
            Binding::CollectionRouter { identifier, .. }
            | Binding::ItemRouter { identifier, .. }
            | Binding::Representable { identifier, .. } => Some(identifier),
            Binding::NestedCollectionRouter { .. } => None,
        }
    }

    #[must_use]
    pub fn parent_model_type(&self) -> Option<&TypeRef> {
        self.parent().map(|p| &p.model)
    }

    #[must_use]
    pub fn parent_identifier_type(&self) -> Option<&TypeRef> {
        self.parent().map(|p| &p.identifier)
    }

    /// Friendly name, for representables only.
    #[must_use]
    pub fn representable_name(&self) -> Option<&str> {
        match &self.binding {
            Binding::Representable { representable, .. } => Some(representable.name()),
            Binding::CollectionRouter { .. }
            | Binding::ItemRouter { .. }
            | Binding::NestedCollectionRouter { .. } => None,
        }
    }

    fn parent(&self) -> Option<&ParentBinding> {
        match &self.binding {
            Binding::NestedCollectionRouter { parent, .. } => Some(parent),
            Binding::CollectionRouter { .. }
            | Binding::ItemRouter { .. }
            | Binding::Representable { .. } => None,
        }
    }

    #[must_use]
    pub fn composite_key(&self) -> CompositeKey {
        CompositeKey::for_types(self.model_type(), self.parent_model_type())
    }

    #[must_use]
    pub fn registry_key(&self) -> RegistryKey {
        RegistryKey::new(self.kind(), self.composite_key())
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("provider_id", &self.provider_id)
            .field("provider_name", &self.provider_name)
            .field("kind", &self.kind())
            .field("model_type", self.model_type())
            .field("parent_model_type", &self.parent_model_type())
            .field("parent_identifier_type", &self.parent_identifier_type())
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
