//! Resource Wiring SDK
//!
//! This crate provides the public contracts shared by resource providers and
//! the `resource-wiring` registry:
//!
//! - [`TypeRef`], [`TypeArguments`], [`Properties`] - type bindings and lifecycle metadata
//! - [`CollectionRouter`], [`ItemRouter`], [`NestedCollectionRouter`], [`Representable`],
//!   [`CollectionResource`] - capability traits implemented by providers
//! - [`RoutesBuilder`], [`RouteTable`], [`Operation`] - route tables built by providers
//! - [`NameManager`], [`IdentifierClassManager`], [`ProviderManager`] - collaborator contracts
//! - [`WiringError`] - error types
//!
//! ## Usage
//!
//! A nested provider declares the types it serves and builds its routes from
//! a pre-populated builder:
//!
//! ```ignore
//! use resource_wiring_sdk::{NestedCollectionRouter, RouteTable, RoutesBuilder, TypeArguments};
//!
//! struct CommentsRouter;
//!
//! impl NestedCollectionRouter for CommentsRouter {
//!     fn type_arguments(&self) -> TypeArguments {
//!         TypeArguments::new().bind::<Comment>().bind::<BlogPost>().bind::<i64>()
//!     }
//!
//!     fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable {
//!         builder.add_getter(|inv| list_comments(inv)).build()
//!     }
//! }
//! ```

pub mod capability;
pub mod collaborators;
pub mod error;
pub mod routes;
pub mod types;

// Re-export main types at crate root
pub use capability::{
    CapabilityKind, CollectionResource, CollectionRouter, ItemRouter, NestedCollectionRouter,
    Provider, ProviderHandle, ProviderId, Representable, TypeSlot,
};
pub use collaborators::{IdentifierClassManager, NameManager, ProviderManager};
pub use error::WiringError;
pub use routes::{
    Handler, Invocation, Operation, ParentContext, ProvideFn, Provided, RouteTable, RoutesBuilder,
};
pub use types::{PropertyValue, Properties, TypeArgument, TypeArguments, TypeRef, property_keys};
