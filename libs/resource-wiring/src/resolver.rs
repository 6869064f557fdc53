//! Route resolution on top of the dynamic registry.
//!
//! Resolution never caches route tables: each call looks the provider up
//! again and invokes its route callback exactly once, so a replaced provider
//! is picked up by the next call.

use std::sync::Arc;

use http::request::Parts;
use resource_wiring_sdk::{
    CapabilityKind, IdentifierClassManager, NameManager, Operation, ParentContext, ProvideFn,
    ProviderManager, RouteTable, RoutesBuilder, TypeRef, WiringError,
};
use tracing::debug;

use crate::composite_key::CompositeKey;
use crate::descriptor::{Binding, ComponentDescriptor};
use crate::registry::DynamicRegistry;

/// Answers "which routes does resource X expose (under parent Y)".
#[derive(Clone)]
pub struct RouteResolver {
    registry: Arc<DynamicRegistry>,
    names: Arc<dyn NameManager>,
    identifiers: Arc<dyn IdentifierClassManager>,
    providers: Arc<dyn ProviderManager>,
}

impl RouteResolver {
    #[must_use]
    pub fn new(
        registry: Arc<DynamicRegistry>,
        names: Arc<dyn NameManager>,
        identifiers: Arc<dyn IdentifierClassManager>,
        providers: Arc<dyn ProviderManager>,
    ) -> Self {
        Self {
            registry,
            names,
            identifiers,
            providers,
        }
    }

    /// Resolver that takes friendly names from the registry's own representables.
    #[must_use]
    pub fn from_registry(
        registry: Arc<DynamicRegistry>,
        providers: Arc<dyn ProviderManager>,
    ) -> Self {
        let names: Arc<dyn NameManager> = registry.clone();
        let identifiers: Arc<dyn IdentifierClassManager> = registry.clone();
        Self::new(registry, names, identifiers, providers)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<DynamicRegistry> {
        &self.registry
    }

    /// Routes of the collection `nested_name` under the resource `name`.
    ///
    /// Returns `Ok(None)` when either name is unknown or no nested router is
    /// registered for the pair.
    ///
    /// # Errors
    /// Returns `WiringError::MissingRequiredName` if the registered router's
    /// model or parent type has no friendly name.
    pub fn nested_collection_routes(
        &self,
        name: &str,
        nested_name: &str,
    ) -> Result<Option<RouteTable>, WiringError> {
        let (Some(parent), Some(model)) = (
            self.names.type_for_name(name),
            self.names.type_for_name(nested_name),
        ) else {
            debug!(name, nested_name, "Unknown resource name");
            return Ok(None);
        };

        let key = CompositeKey::for_types(&model, Some(&parent));
        self.registry
            .lookup(CapabilityKind::NestedCollectionRouter, &key)
            .map_or(Ok(None), |descriptor| self.build_nested(&descriptor))
    }

    /// Operations the nested router for `model` under `parent_type_name` exposes.
    ///
    /// Empty when no such router is registered.
    ///
    /// # Errors
    /// Same as [`RouteResolver::nested_collection_routes`].
    pub fn operations_for(
        &self,
        model: &TypeRef,
        parent_type_name: &str,
    ) -> Result<Vec<Operation>, WiringError> {
        let key = CompositeKey::build(model.name(), Some(parent_type_name));
        let Some(descriptor) = self
            .registry
            .lookup(CapabilityKind::NestedCollectionRouter, &key)
        else {
            return Ok(Vec::new());
        };

        Ok(self
            .build_nested(&descriptor)?
            .map(RouteTable::into_operations)
            .unwrap_or_default())
    }

    /// Routes of the top-level collection `name`.
    ///
    /// # Errors
    /// Returns `WiringError::MissingRequiredName` if the router's model type
    /// has no friendly name.
    pub fn collection_routes(&self, name: &str) -> Result<Option<RouteTable>, WiringError> {
        let Some(descriptor) = self.top_level(CapabilityKind::CollectionRouter, name) else {
            return Ok(None);
        };
        let Binding::CollectionRouter {
            model,
            identifier,
            router,
        } = descriptor.binding()
        else {
            return Ok(None);
        };

        let builder = RoutesBuilder::collection(
            model.clone(),
            self.require_name(model)?,
            self.identifier_for(name, identifier),
            self.provide_fn(),
        );
        Ok(Some(router.collection_routes(builder)))
    }

    /// Routes of a single item of the resource `name`.
    ///
    /// # Errors
    /// Returns `WiringError::MissingRequiredName` if the router's model type
    /// has no friendly name.
    pub fn item_routes(&self, name: &str) -> Result<Option<RouteTable>, WiringError> {
        let Some(descriptor) = self.top_level(CapabilityKind::ItemRouter, name) else {
            return Ok(None);
        };
        let Binding::ItemRouter {
            model,
            identifier,
            router,
        } = descriptor.binding()
        else {
            return Ok(None);
        };

        let builder = RoutesBuilder::item(
            model.clone(),
            self.require_name(model)?,
            self.identifier_for(name, identifier),
            self.provide_fn(),
        );
        Ok(Some(router.item_routes(builder)))
    }

    fn top_level(&self, kind: CapabilityKind, name: &str) -> Option<Arc<ComponentDescriptor>> {
        let Some(model) = self.names.type_for_name(name) else {
            debug!(name, "Unknown resource name");
            return None;
        };
        self.registry.lookup(kind, &CompositeKey::for_types(&model, None))
    }

    fn identifier_for(&self, name: &str, declared: &TypeRef) -> TypeRef {
        self.identifiers
            .identifier_type_for_name(name)
            .unwrap_or_else(|| declared.clone())
    }

    fn build_nested(
        &self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Option<RouteTable>, WiringError> {
        let Binding::NestedCollectionRouter {
            model,
            parent,
            router,
        } = descriptor.binding()
        else {
            return Ok(None);
        };

        let builder = RoutesBuilder::nested(
            model.clone(),
            self.require_name(model)?,
            ParentContext {
                name: self.require_name(&parent.model)?,
                identifier_type: parent.identifier.clone(),
            },
            self.provide_fn(),
        );
        Ok(Some(router.collection_routes(builder)))
    }

    fn require_name(&self, type_ref: &TypeRef) -> Result<String, WiringError> {
        self.names
            .name_for_type(type_ref.name())
            .ok_or_else(|| WiringError::MissingRequiredName {
                type_name: type_ref.name().to_owned(),
            })
    }

    fn provide_fn(&self) -> ProvideFn {
        let providers = Arc::clone(&self.providers);
        Arc::new(move |request: &Parts, type_ref: &TypeRef| providers.provide(type_ref, request))
    }
}
