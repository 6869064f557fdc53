//! Resolution of a provider's type parameters.
//!
//! Lifecycle properties win over declared type arguments: when a property is
//! present for a slot, the provider's declaration is never consulted. Some
//! providers cannot bind the parent's identifier type in their declaration, so
//! the property is the only way to express it.

use std::cell::OnceCell;

use resource_wiring_sdk::{
    CapabilityKind, Properties, TypeArguments, TypeRef, TypeSlot, WiringError,
};

/// Resolves type slots for one provider and one capability.
///
/// Declared arguments are fetched lazily, at most once, and only if some slot
/// has no property override.
pub struct TypeParameterResolver<'a> {
    provider: &'static str,
    capability: CapabilityKind,
    properties: &'a Properties,
    declare: &'a dyn Fn() -> TypeArguments,
    declared: OnceCell<TypeArguments>,
}

impl<'a> TypeParameterResolver<'a> {
    #[must_use]
    pub fn new(
        provider: &'static str,
        capability: CapabilityKind,
        properties: &'a Properties,
        declare: &'a dyn Fn() -> TypeArguments,
    ) -> Self {
        Self {
            provider,
            capability,
            properties,
            declare,
            declared: OnceCell::new(),
        }
    }

    /// Concrete type bound at `slot`.
    ///
    /// # Errors
    /// Returns `WiringError::UnresolvableGenericType` if no property overrides
    /// the slot and the provider left that position unbound.
    pub fn resolve(&self, slot: TypeSlot) -> Result<TypeRef, WiringError> {
        if let Some(overridden) = self.properties.get_type(slot.property) {
            return Ok(overridden);
        }

        self.declared
            .get_or_init(|| (self.declare)())
            .bound(slot.index)
            .cloned()
            .ok_or(WiringError::UnresolvableGenericType {
                provider: self.provider,
                capability: self.capability,
                index: slot.index,
                property: slot.property,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use resource_wiring_sdk::property_keys;
    use std::cell::Cell;

    struct Comment;
    struct BlogPost;
    struct Article;

    fn nested_args() -> TypeArguments {
        TypeArguments::new()
            .bind::<Comment>()
            .bind::<BlogPost>()
            .bind::<i64>()
    }

    #[test]
    fn declared_arguments_are_read_by_index() {
        let props = Properties::new();
        let declare = nested_args;
        let resolver = TypeParameterResolver::new(
            "CommentsRouter",
            CapabilityKind::NestedCollectionRouter,
            &props,
            &declare,
        );

        assert_eq!(resolver.resolve(TypeSlot::MODEL).unwrap(), TypeRef::of::<Comment>());
        assert_eq!(
            resolver.resolve(TypeSlot::PARENT_MODEL).unwrap(),
            TypeRef::of::<BlogPost>()
        );
        assert_eq!(
            resolver.resolve(TypeSlot::PARENT_IDENTIFIER).unwrap(),
            TypeRef::of::<i64>()
        );
    }

    #[test]
    fn property_override_skips_the_declaration() {
        let props = Properties::new()
            .with(property_keys::MODEL_TYPE, TypeRef::of::<Article>())
            .with(property_keys::IDENTIFIER_TYPE, "u64");
        let calls = Cell::new(0);
        let declare = || {
            calls.set(calls.get() + 1);
            TypeArguments::new().bind::<Comment>().bind::<i64>()
        };
        let resolver = TypeParameterResolver::new(
            "ArticlesRouter",
            CapabilityKind::CollectionRouter,
            &props,
            &declare,
        );

        assert_eq!(resolver.resolve(TypeSlot::MODEL).unwrap(), TypeRef::of::<Article>());
        assert_eq!(
            resolver.resolve(TypeSlot::IDENTIFIER).unwrap(),
            TypeRef::named("u64")
        );
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn declaration_is_fetched_at_most_once() {
        let props = Properties::new();
        let calls = Cell::new(0);
        let declare = || {
            calls.set(calls.get() + 1);
            nested_args()
        };
        let resolver = TypeParameterResolver::new(
            "CommentsRouter",
            CapabilityKind::NestedCollectionRouter,
            &props,
            &declare,
        );

        for slot in CapabilityKind::NestedCollectionRouter.slots() {
            resolver.resolve(*slot).unwrap();
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unbound_position_without_override_fails() {
        let props = Properties::new();
        let declare = || TypeArguments::new().bind::<Comment>().unbound("P").unbound("I");
        let resolver = TypeParameterResolver::new(
            "GenericRouter",
            CapabilityKind::NestedCollectionRouter,
            &props,
            &declare,
        );

        let err = resolver.resolve(TypeSlot::PARENT_MODEL).unwrap_err();
        assert_eq!(
            err,
            WiringError::UnresolvableGenericType {
                provider: "GenericRouter",
                capability: CapabilityKind::NestedCollectionRouter,
                index: 1,
                property: property_keys::PARENT_MODEL_TYPE,
            }
        );
        assert!(err.to_string().contains("parent_model_type"));
    }

    #[test]
    fn missing_position_is_treated_as_unbound() {
        let props = Properties::new();
        let declare = || TypeArguments::new().bind::<Comment>();
        let resolver = TypeParameterResolver::new(
            "ShortRouter",
            CapabilityKind::ItemRouter,
            &props,
            &declare,
        );

        assert!(matches!(
            resolver.resolve(TypeSlot::IDENTIFIER),
            Err(WiringError::UnresolvableGenericType { index: 1, .. })
        ));
    }
}
