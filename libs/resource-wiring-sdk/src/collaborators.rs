//! Contracts for the services the registry consults but does not own.

use http::request::Parts;

use crate::routes::Provided;
use crate::types::TypeRef;

/// Bidirectional mapping between friendly resource names and model types.
pub trait NameManager: Send + Sync {
    /// Friendly name registered for the model type with this fully-qualified name.
    fn name_for_type(&self, type_name: &str) -> Option<String>;

    /// Model type registered under a friendly name.
    fn type_for_name(&self, name: &str) -> Option<TypeRef>;
}

/// Resolves the identifier type of a resource known only by its friendly name.
pub trait IdentifierClassManager: Send + Sync {
    fn identifier_type_for_name(&self, name: &str) -> Option<TypeRef>;
}

/// Supplies request-scoped values by type.
pub trait ProviderManager: Send + Sync {
    fn provide(&self, type_ref: &TypeRef, request: &Parts) -> Option<Provided>;
}
