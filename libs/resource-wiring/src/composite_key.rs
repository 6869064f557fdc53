//! Composite keys indexing the registry.
//!
//! A key is the model type name alone, or `model-parent` for nested
//! relations. Model comes first because lookups always start from the nested
//! resource. Type names must not contain [`SEPARATOR`] for [`CompositeKey::split`]
//! to recover the parts. Named structs and enums satisfy this, but function
//! pointer types (`fn() -> i64`) and names supplied as text metadata may not;
//! the registrar refuses such names before building a key.

use std::fmt;

use resource_wiring_sdk::TypeRef;

pub const SEPARATOR: char = '-';

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(String);

impl CompositeKey {
    #[must_use]
    pub fn build(model_type_name: &str, parent_type_name: Option<&str>) -> Self {
        match parent_type_name {
            Some(parent) => CompositeKey(format!("{model_type_name}{SEPARATOR}{parent}")),
            None => CompositeKey(model_type_name.to_owned()),
        }
    }

    #[must_use]
    pub fn for_types(model: &TypeRef, parent: Option<&TypeRef>) -> Self {
        Self::build(model.name(), parent.map(TypeRef::name))
    }

    /// Model and optional parent type names this key was built from.
    #[must_use]
    pub fn split(&self) -> (&str, Option<&str>) {
        match self.0.split_once(SEPARATOR) {
            Some((model, parent)) => (model, Some(parent)),
            None => (&self.0, None),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
