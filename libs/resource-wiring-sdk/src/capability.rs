//! Capability traits implemented by resource providers.
//!
//! Every provider declares the concrete types it serves through
//! [`type_arguments`](CollectionRouter::type_arguments). The registry reads
//! the positions listed by [`CapabilityKind::slots`] and lets lifecycle
//! metadata override any of them.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::routes::{RouteTable, RoutesBuilder};
use crate::types::{TypeArguments, property_keys};

/// Role a provider plays in the routing table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    CollectionRouter,
    ItemRouter,
    NestedCollectionRouter,
    Representable,
}

/// A type parameter position and the property key that may override it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeSlot {
    pub index: usize,
    pub property: &'static str,
}

impl TypeSlot {
    pub const MODEL: TypeSlot = TypeSlot {
        index: 0,
        property: property_keys::MODEL_TYPE,
    };
    pub const IDENTIFIER: TypeSlot = TypeSlot {
        index: 1,
        property: property_keys::IDENTIFIER_TYPE,
    };
    pub const PARENT_MODEL: TypeSlot = TypeSlot {
        index: 1,
        property: property_keys::PARENT_MODEL_TYPE,
    };
    pub const PARENT_IDENTIFIER: TypeSlot = TypeSlot {
        index: 2,
        property: property_keys::PARENT_IDENTIFIER_TYPE,
    };
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 4] = [
        CapabilityKind::CollectionRouter,
        CapabilityKind::ItemRouter,
        CapabilityKind::NestedCollectionRouter,
        CapabilityKind::Representable,
    ];

    /// Type positions the registry must resolve for this capability.
    #[must_use]
    pub fn slots(self) -> &'static [TypeSlot] {
        match self {
            CapabilityKind::NestedCollectionRouter => &[
                TypeSlot::MODEL,
                TypeSlot::PARENT_MODEL,
                TypeSlot::PARENT_IDENTIFIER,
            ],
            CapabilityKind::CollectionRouter
            | CapabilityKind::ItemRouter
            | CapabilityKind::Representable => &[TypeSlot::MODEL, TypeSlot::IDENTIFIER],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityKind::CollectionRouter => "collection_router",
            CapabilityKind::ItemRouter => "item_router",
            CapabilityKind::NestedCollectionRouter => "nested_collection_router",
            CapabilityKind::Representable => "representable",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes for a top-level collection. Type arguments: `[Model, Identifier]`.
pub trait CollectionRouter: Send + Sync + 'static {
    fn type_arguments(&self) -> TypeArguments;

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable;

    fn provider_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Routes for a single item. Type arguments: `[Model, Identifier]`.
pub trait ItemRouter: Send + Sync + 'static {
    fn type_arguments(&self) -> TypeArguments;

    fn item_routes(&self, builder: RoutesBuilder) -> RouteTable;

    fn provider_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Routes for a collection reachable only under a parent item.
///
/// Type arguments: `[Model, ParentModel, ParentIdentifier]`. Providers that
/// cannot name the parent types statically leave those positions unbound and
/// supply `parent_model_type` / `parent_identifier_type` as properties.
pub trait NestedCollectionRouter: Send + Sync + 'static {
    fn type_arguments(&self) -> TypeArguments;

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable;

    fn provider_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Declares the friendly name of a model. Type arguments: `[Model, Identifier]`.
pub trait Representable: Send + Sync + 'static {
    fn type_arguments(&self) -> TypeArguments;

    fn name(&self) -> &str;

    fn provider_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// One provider acting as collection router, item router and representable
/// for the same model. Type arguments: `[Model, Identifier]`.
pub trait CollectionResource: Send + Sync + 'static {
    fn type_arguments(&self) -> TypeArguments;

    fn name(&self) -> &str;

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable;

    fn item_routes(&self, builder: RoutesBuilder) -> RouteTable;

    fn provider_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A live provider instance, tagged by the role it was published under.
#[derive(Clone)]
pub enum Provider {
    CollectionRouter(Arc<dyn CollectionRouter>),
    ItemRouter(Arc<dyn ItemRouter>),
    NestedCollectionRouter(Arc<dyn NestedCollectionRouter>),
    Representable(Arc<dyn Representable>),
    CollectionResource(Arc<dyn CollectionResource>),
}

impl Provider {
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        match self {
            Provider::CollectionRouter(p) => p.provider_name(),
            Provider::ItemRouter(p) => p.provider_name(),
            Provider::NestedCollectionRouter(p) => p.provider_name(),
            Provider::Representable(p) => p.provider_name(),
            Provider::CollectionResource(p) => p.provider_name(),
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Provider::CollectionRouter(_) => "CollectionRouter",
            Provider::ItemRouter(_) => "ItemRouter",
            Provider::NestedCollectionRouter(_) => "NestedCollectionRouter",
            Provider::Representable(_) => "Representable",
            Provider::CollectionResource(_) => "CollectionResource",
        };
        f.debug_tuple(variant).field(&self.provider_name()).finish()
    }
}

/// Identity of one published provider instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(Uuid);

impl ProviderId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What the host runtime hands to the registry on lifecycle events.
///
/// Each handle gets a fresh [`ProviderId`]; clones share it, so the same
/// handle can be passed to `appeared` and later to `disappeared`.
#[derive(Clone, Debug)]
pub struct ProviderHandle {
    id: ProviderId,
    provider: Provider,
}

impl ProviderHandle {
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self {
            id: ProviderId::new(),
            provider,
        }
    }

    #[must_use]
    pub fn collection_router(router: Arc<dyn CollectionRouter>) -> Self {
        Self::new(Provider::CollectionRouter(router))
    }

    #[must_use]
    pub fn item_router(router: Arc<dyn ItemRouter>) -> Self {
        Self::new(Provider::ItemRouter(router))
    }

    #[must_use]
    pub fn nested_collection_router(router: Arc<dyn NestedCollectionRouter>) -> Self {
        Self::new(Provider::NestedCollectionRouter(router))
    }

    #[must_use]
    pub fn representable(representable: Arc<dyn Representable>) -> Self {
        Self::new(Provider::Representable(representable))
    }

    #[must_use]
    pub fn collection_resource(resource: Arc<dyn CollectionResource>) -> Self {
        Self::new(Provider::CollectionResource(resource))
    }

    #[must_use]
    pub fn id(&self) -> ProviderId {
        self.id
    }

    #[must_use]
    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}
