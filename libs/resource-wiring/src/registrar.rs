//! Turns a published provider into the descriptors the registry commits.
//!
//! Plain capability providers yield one descriptor. A [`CollectionResource`]
//! yields three (collection router, item router, representable) sharing the
//! resource's provider id, so one disappearance removes all of them.

use std::sync::Arc;

use resource_wiring_sdk::{
    CapabilityKind, CollectionResource, CollectionRouter, ItemRouter, NestedCollectionRouter,
    Properties, Provider, ProviderHandle, Representable, RouteTable, RoutesBuilder,
    TypeArguments, TypeSlot, WiringError, property_keys,
};

use crate::composite_key::SEPARATOR;
use crate::descriptor::{Binding, ComponentDescriptor, ParentBinding};
use crate::type_params::TypeParameterResolver;

/// Resolve every descriptor a provider contributes.
///
/// Each entry is resolved independently; a failure in one does not prevent
/// the others.
pub fn describe(
    handle: &ProviderHandle,
    properties: &Properties,
) -> Vec<Result<ComponentDescriptor, WiringError>> {
    let described = match handle.provider() {
        Provider::CollectionRouter(router) => {
            vec![describe_collection_router(handle, router, properties)]
        }
        Provider::ItemRouter(router) => vec![describe_item_router(handle, router, properties)],
        Provider::NestedCollectionRouter(router) => {
            vec![describe_nested_router(handle, router, properties)]
        }
        Provider::Representable(representable) => {
            vec![describe_representable(handle, representable, properties)]
        }
        Provider::CollectionResource(resource) => fan_out(handle, resource, properties),
    };

    described
        .into_iter()
        .map(|result| result.and_then(reject_separator))
        .collect()
}

/// Refuse type names that would make the composite key ambiguous.
fn reject_separator(
    descriptor: ComponentDescriptor,
) -> Result<ComponentDescriptor, WiringError> {
    let key_types =
        std::iter::once(descriptor.model_type()).chain(descriptor.parent_model_type());
    for type_ref in key_types {
        if type_ref.name().contains(SEPARATOR) {
            return Err(WiringError::SeparatorInTypeName {
                provider: descriptor.provider_name(),
                type_name: type_ref.name().to_owned(),
                separator: SEPARATOR,
            });
        }
    }
    Ok(descriptor)
}

fn describe_collection_router(
    handle: &ProviderHandle,
    router: &Arc<dyn CollectionRouter>,
    properties: &Properties,
) -> Result<ComponentDescriptor, WiringError> {
    let declare = || router.type_arguments();
    let r = TypeParameterResolver::new(
        router.provider_name(),
        CapabilityKind::CollectionRouter,
        properties,
        &declare,
    );
    let binding = Binding::CollectionRouter {
        model: r.resolve(TypeSlot::MODEL)?,
        identifier: r.resolve(TypeSlot::IDENTIFIER)?,
        router: Arc::clone(router),
    };
    Ok(ComponentDescriptor::new(handle.id(), router.provider_name(), binding))
}

fn describe_item_router(
    handle: &ProviderHandle,
    router: &Arc<dyn ItemRouter>,
    properties: &Properties,
) -> Result<ComponentDescriptor, WiringError> {
    let declare = || router.type_arguments();
    let r = TypeParameterResolver::new(
        router.provider_name(),
        CapabilityKind::ItemRouter,
        properties,
        &declare,
    );
    let binding = Binding::ItemRouter {
        model: r.resolve(TypeSlot::MODEL)?,
        identifier: r.resolve(TypeSlot::IDENTIFIER)?,
        router: Arc::clone(router),
    };
    Ok(ComponentDescriptor::new(handle.id(), router.provider_name(), binding))
}

fn describe_nested_router(
    handle: &ProviderHandle,
    router: &Arc<dyn NestedCollectionRouter>,
    properties: &Properties,
) -> Result<ComponentDescriptor, WiringError> {
    let declare = || router.type_arguments();
    let r = TypeParameterResolver::new(
        router.provider_name(),
        CapabilityKind::NestedCollectionRouter,
        properties,
        &declare,
    );
    let binding = Binding::NestedCollectionRouter {
        model: r.resolve(TypeSlot::MODEL)?,
        parent: ParentBinding {
            model: r.resolve(TypeSlot::PARENT_MODEL)?,
            identifier: r.resolve(TypeSlot::PARENT_IDENTIFIER)?,
        },
        router: Arc::clone(router),
    };
    Ok(ComponentDescriptor::new(handle.id(), router.provider_name(), binding))
}

fn describe_representable(
    handle: &ProviderHandle,
    representable: &Arc<dyn Representable>,
    properties: &Properties,
) -> Result<ComponentDescriptor, WiringError> {
    let declare = || representable.type_arguments();
    let r = TypeParameterResolver::new(
        representable.provider_name(),
        CapabilityKind::Representable,
        properties,
        &declare,
    );
    let binding = Binding::Representable {
        model: r.resolve(TypeSlot::MODEL)?,
        identifier: r.resolve(TypeSlot::IDENTIFIER)?,
        representable: Arc::clone(representable),
    };
    Ok(ComponentDescriptor::new(
        handle.id(),
        representable.provider_name(),
        binding,
    ))
}

fn fan_out(
    handle: &ProviderHandle,
    resource: &Arc<dyn CollectionResource>,
    properties: &Properties,
) -> Vec<Result<ComponentDescriptor, WiringError>> {
    let identifier = {
        let declare = || resource.type_arguments();
        TypeParameterResolver::new(
            resource.provider_name(),
            CapabilityKind::CollectionRouter,
            properties,
            &declare,
        )
        .resolve(TypeSlot::IDENTIFIER)
    };

    let mut properties = properties.clone();
    if let Ok(identifier) = identifier {
        properties.insert(property_keys::IDENTIFIER_TYPE, identifier);
    } else {
        tracing::warn!(
            provider = resource.provider_name(),
            index = TypeSlot::IDENTIFIER.index,
            property = TypeSlot::IDENTIFIER.property,
            "Unable to get generic identifier type from collection resource"
        );
    }

    let collection: Arc<dyn CollectionRouter> =
        Arc::new(ResourceCollectionRouter(Arc::clone(resource)));
    let item: Arc<dyn ItemRouter> = Arc::new(ResourceItemRouter(Arc::clone(resource)));
    let representable: Arc<dyn Representable> =
        Arc::new(ResourceRepresentable(Arc::clone(resource)));

    vec![
        describe_collection_router(handle, &collection, &properties),
        describe_item_router(handle, &item, &properties),
        describe_representable(handle, &representable, &properties),
    ]
}

struct ResourceCollectionRouter(Arc<dyn CollectionResource>);

impl CollectionRouter for ResourceCollectionRouter {
    fn type_arguments(&self) -> TypeArguments {
        self.0.type_arguments()
    }

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable {
        self.0.collection_routes(builder)
    }

    fn provider_name(&self) -> &'static str {
        self.0.provider_name()
    }
}

struct ResourceItemRouter(Arc<dyn CollectionResource>);

impl ItemRouter for ResourceItemRouter {
    fn type_arguments(&self) -> TypeArguments {
        self.0.type_arguments()
    }

    fn item_routes(&self, builder: RoutesBuilder) -> RouteTable {
        self.0.item_routes(builder)
    }

    fn provider_name(&self) -> &'static str {
        self.0.provider_name()
    }
}

struct ResourceRepresentable(Arc<dyn CollectionResource>);

impl Representable for ResourceRepresentable {
    fn type_arguments(&self) -> TypeArguments {
        self.0.type_arguments()
    }

    fn name(&self) -> &str {
        self.0.name()
    }

    fn provider_name(&self) -> &'static str {
        self.0.provider_name()
    }
}
