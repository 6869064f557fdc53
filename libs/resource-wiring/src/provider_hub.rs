//! Request-scoped values for route handlers.
//!
//! Hosts register a factory per value type; handlers pull values through
//! `Invocation::provide::<T>()` without the registry knowing what they are.
//!
//! Implementation details:
//! - Key = `TypeRef::of::<T>()`, the fully-qualified type name.
//! - Value = factory returning `Arc<T>` erased to `Provided` (downcast on read).
//! - Re-registering a type replaces its factory; values already handed out stay valid.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use http::request::Parts;
use resource_wiring_sdk::{ProvideFn, Provided, ProviderManager, TypeRef};

type Factory = Arc<dyn Fn(&Parts) -> Option<Provided> + Send + Sync>;

/// Type-keyed factories of request-scoped values.
#[derive(Default)]
pub struct ProviderHub {
    factories: DashMap<TypeRef, Factory>,
}

impl ProviderHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory producing `T` from the request.
    pub fn register<T, F>(&self, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&Parts) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        let erased: Factory =
            Arc::new(move |request: &Parts| factory(request).map(|v| v as Provided));
        self.factories.insert(TypeRef::of::<T>(), erased);
    }

    /// Register one value handed to every request.
    pub fn register_shared<T>(&self, value: Arc<T>)
    where
        T: Any + Send + Sync,
    {
        self.register::<T, _>(move |_| Some(Arc::clone(&value)));
    }

    /// Remove the factory for `T`; returns whether one was registered.
    #[must_use]
    pub fn remove<T: Any>(&self) -> bool {
        self.factories.remove(&TypeRef::of::<T>()).is_some()
    }

    #[must_use]
    pub fn contains(&self, type_ref: &TypeRef) -> bool {
        self.factories.contains_key(type_ref)
    }

    /// Clear everything (useful in tests).
    pub fn clear(&self) {
        self.factories.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Wrap the hub as the provide callback handed to route builders.
    #[must_use]
    pub fn provide_fn(self: &Arc<Self>) -> ProvideFn {
        let hub = Arc::clone(self);
        Arc::new(move |request: &Parts, type_ref: &TypeRef| hub.provide(type_ref, request))
    }
}

impl ProviderManager for ProviderHub {
    fn provide(&self, type_ref: &TypeRef, request: &Parts) -> Option<Provided> {
        // Release the shard lock before running the factory.
        let factory = self.factories.get(type_ref).map(|f| Arc::clone(f.value()))?;
        factory(request)
    }
}

impl fmt::Debug for ProviderHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<TypeRef> = self.factories.iter().map(|e| e.key().clone()).collect();
        types.sort();
        f.debug_struct("ProviderHub").field("types", &types).finish()
    }
}
