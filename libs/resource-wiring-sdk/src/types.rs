//! Type references, declared type arguments, and lifecycle metadata.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Stable reference to a runtime type, keyed by its fully-qualified name.
///
/// Built from `type_name::<T>()` for declared bindings, or from an explicit
/// name when a type arrives through metadata. Equality and hashing are by name.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeRef(Arc::from(std::any::type_name::<T>()))
    }

    #[inline]
    #[must_use]
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        TypeRef(name.into())
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One position in a provider's declared type argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeArgument {
    /// A concrete type.
    Bound(TypeRef),
    /// The provider left this position generic (the variable name is kept for diagnostics).
    Unbound(&'static str),
}

/// Ordered type arguments a provider declares for the capability it implements.
///
/// ```
/// # use resource_wiring_sdk::{TypeArguments, TypeRef};
/// let args = TypeArguments::new().bind::<String>().unbound("I");
/// assert_eq!(args.bound(0), Some(&TypeRef::of::<String>()));
/// assert_eq!(args.bound(1), None);
/// assert_eq!(args.bound(2), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeArguments(Vec<TypeArgument>);

impl TypeArguments {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a concrete type argument.
    #[must_use]
    pub fn bind<T: ?Sized + 'static>(self) -> Self {
        self.bind_ref(TypeRef::of::<T>())
    }

    /// Append an already-built type reference.
    #[must_use]
    pub fn bind_ref(mut self, type_ref: TypeRef) -> Self {
        self.0.push(TypeArgument::Bound(type_ref));
        self
    }

    /// Append a position the provider leaves generic.
    #[must_use]
    pub fn unbound(mut self, variable: &'static str) -> Self {
        self.0.push(TypeArgument::Unbound(variable));
        self
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TypeArgument> {
        self.0.get(index)
    }

    /// Concrete type at `index`, if the position exists and is bound.
    #[must_use]
    pub fn bound(&self, index: usize) -> Option<&TypeRef> {
        match self.0.get(index) {
            Some(TypeArgument::Bound(t)) => Some(t),
            Some(TypeArgument::Unbound(_)) | None => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Well-known property keys that override declared type arguments.
pub mod property_keys {
    pub const MODEL_TYPE: &str = "model_type";
    pub const IDENTIFIER_TYPE: &str = "identifier_type";
    pub const PARENT_MODEL_TYPE: &str = "parent_model_type";
    pub const PARENT_IDENTIFIER_TYPE: &str = "parent_identifier_type";
}

/// Opaque value stored in lifecycle metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    Type(TypeRef),
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<TypeRef> for PropertyValue {
    fn from(value: TypeRef) -> Self {
        PropertyValue::Type(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Metadata delivered alongside an `appeared` lifecycle event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties(HashMap<String, PropertyValue>);

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    /// Type stored under `key`. Text values are read as type names.
    #[must_use]
    pub fn get_type(&self, key: &str) -> Option<TypeRef> {
        match self.0.get(key)? {
            PropertyValue::Type(t) => Some(t.clone()),
            PropertyValue::Text(name) => Some(TypeRef::named(name.as_str())),
            PropertyValue::Int(_) | PropertyValue::Bool(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
