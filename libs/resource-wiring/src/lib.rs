//! Resource Wiring
//!
//! Tracks resource providers as they appear and disappear, indexes them by
//! the model (and parent model) types they serve, and resolves friendly
//! resource names to freshly built route tables.
//!
//! - [`DynamicRegistry`] - live index fed by lifecycle events; also the
//!   default `NameManager` / `IdentifierClassManager`
//! - [`ServiceTracker`] - async lifecycle feed applying events in order
//! - [`RouteResolver`] - `(name, nested_name)` to [`RouteTable`](resource_wiring_sdk::RouteTable)
//! - [`ProviderHub`] - request-scoped values handed to route handlers
//! - [`RegistryConfig`] - settings loaded through figment
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod composite_key;
pub mod config;
pub mod descriptor;
mod names;
pub mod provider_hub;
mod registrar;
pub mod registry;
pub mod resolver;
pub mod tracker;
pub mod type_params;

pub use composite_key::{CompositeKey, SEPARATOR};
pub use config::{ConfigError, RegistryConfig};
pub use descriptor::{Binding, ComponentDescriptor, ParentBinding, RegistryKey};
pub use provider_hub::ProviderHub;
pub use registry::DynamicRegistry;
pub use resolver::RouteResolver;
pub use tracker::{LifecycleEvent, ServiceTracker, TrackerError};
pub use type_params::TypeParameterResolver;
