//! Friendly names backed by the registry's representables.
//!
//! Name lookups go through the registry's name index; type lookups go through
//! the representable key of the model.

use resource_wiring_sdk::{CapabilityKind, IdentifierClassManager, NameManager, TypeRef};

use crate::composite_key::CompositeKey;
use crate::registry::DynamicRegistry;

impl NameManager for DynamicRegistry {
    fn name_for_type(&self, type_name: &str) -> Option<String> {
        self.lookup(
            CapabilityKind::Representable,
            &CompositeKey::build(type_name, None),
        )?
        .representable_name()
        .map(str::to_owned)
    }

    fn type_for_name(&self, name: &str) -> Option<TypeRef> {
        Some(self.representable_for_name(name)?.model_type().clone())
    }
}

impl IdentifierClassManager for DynamicRegistry {
    fn identifier_type_for_name(&self, name: &str) -> Option<TypeRef> {
        self.representable_for_name(name)?.identifier_type().cloned()
    }
}
