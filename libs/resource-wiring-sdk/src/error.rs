//! Error types for resource wiring.

use thiserror::Error;

use crate::capability::CapabilityKind;

/// Errors raised while registering providers or resolving their routes.
///
/// A lookup that finds nothing is not an error: resolvers return `Ok(None)`
/// (or an empty operation list) for that case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    /// A provider left a required type parameter generic and no property overrides it.
    ///
    /// Registration skips the provider; other providers are unaffected.
    #[error(
        "{provider} must bind a concrete type at parameter {index} of {capability} \
         (or supply the '{property}' property)"
    )]
    UnresolvableGenericType {
        provider: &'static str,
        capability: CapabilityKind,
        index: usize,
        property: &'static str,
    },

    /// A resolved type name contains the composite key separator, so its key
    /// could collide with a different (model, parent) pair.
    ///
    /// Registration skips the descriptor, like an unresolvable type.
    #[error("{provider} resolves type {type_name}, which contains the key separator '{separator}'")]
    SeparatorInTypeName {
        provider: &'static str,
        type_name: String,
        separator: char,
    },

    /// A resolved type has no friendly name, so the provider cannot be asked to build routes.
    #[error("no resource name is registered for type {type_name}")]
    MissingRequiredName { type_name: String },
}
