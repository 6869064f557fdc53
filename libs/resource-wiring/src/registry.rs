//! Dynamic registry of live providers.
//!
//! Every registry key keeps the descriptors of all live providers that
//! resolved to it, ordered by commit sequence. The newest one is visible;
//! when it disappears, the newest remaining one becomes visible again.
//! Writes take the whole-map lock, so a reader never sees a half-applied
//! appearance or disappearance. Live representables are also indexed by
//! friendly name.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use resource_wiring_sdk::{CapabilityKind, Properties, ProviderHandle, ProviderId};
use tracing::{debug, warn};

use crate::composite_key::CompositeKey;
use crate::config::RegistryConfig;
use crate::descriptor::{ComponentDescriptor, RegistryKey};
use crate::registrar;

#[derive(Default)]
struct RegistryState {
    entries: HashMap<RegistryKey, Vec<Arc<ComponentDescriptor>>>,
    by_provider: HashMap<ProviderId, Vec<RegistryKey>>,
    /// Live representables per name, in commit order.
    names: HashMap<String, Vec<Arc<ComponentDescriptor>>>,
    next_sequence: u64,
}

impl RegistryState {
    fn is_visible(&self, descriptor: &Arc<ComponentDescriptor>) -> bool {
        self.entries
            .get(&descriptor.registry_key())
            .and_then(|stack| stack.last())
            .is_some_and(|winner| Arc::ptr_eq(winner, descriptor))
    }

    fn index_name(&mut self, descriptor: &Arc<ComponentDescriptor>) {
        if let Some(name) = descriptor.representable_name() {
            self.names
                .entry(name.to_owned())
                .or_default()
                .push(Arc::clone(descriptor));
        }
    }

    fn remove_provider(&mut self, id: ProviderId) -> usize {
        let Some(keys) = self.by_provider.remove(&id) else {
            return 0;
        };

        let mut removed = 0;
        for key in keys {
            if let Some(stack) = self.entries.get_mut(&key) {
                let before = stack.len();
                stack.retain(|d| d.provider_id() != id);
                removed += before - stack.len();
                if stack.is_empty() {
                    self.entries.remove(&key);
                }
            }
        }
        self.names.retain(|_, named| {
            named.retain(|d| d.provider_id() != id);
            !named.is_empty()
        });
        removed
    }
}

/// Index of the currently live, successfully resolved providers.
///
/// Construct one per host process and share it by `Arc`.
pub struct DynamicRegistry {
    state: RwLock<RegistryState>,
    config: RegistryConfig,
}

impl DynamicRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a provider that became available.
    ///
    /// Returns the keys the provider now occupies. Descriptors whose types
    /// cannot be resolved are logged and skipped; they never fail the caller.
    /// Re-registering the same handle replaces everything it registered before.
    pub fn on_appeared(
        &self,
        handle: &ProviderHandle,
        properties: &Properties,
    ) -> Vec<RegistryKey> {
        let mut resolved = Vec::new();
        for result in registrar::describe(handle, properties) {
            match result {
                Ok(descriptor) => resolved.push(descriptor),
                Err(e) => warn!(
                    provider = handle.provider().provider_name(),
                    provider_id = %handle.id(),
                    error = %e,
                    "Skipping provider descriptor"
                ),
            }
        }

        let mut state = self.state.write();
        let replaced = state.remove_provider(handle.id());
        if replaced > 0 {
            debug!(provider_id = %handle.id(), replaced, "Re-registering provider");
        }

        let mut keys = Vec::with_capacity(resolved.len());
        for descriptor in resolved {
            state.next_sequence += 1;
            let descriptor = Arc::new(descriptor.committed(state.next_sequence));
            let key = descriptor.registry_key();

            let stack = state.entries.entry(key.clone()).or_default();
            if self.config.warn_on_shadowing
                && let Some(shadowed) = stack.last()
            {
                warn!(
                    key = %key,
                    provider = descriptor.provider_name(),
                    shadowed = shadowed.provider_name(),
                    "Provider shadows an existing registration"
                );
            }
            stack.push(Arc::clone(&descriptor));
            state.index_name(&descriptor);
            debug!(key = %key, provider = descriptor.provider_name(), "Registered provider");
            keys.push(key);
        }

        if !keys.is_empty() {
            state.by_provider.insert(handle.id(), keys.clone());
        }
        keys
    }

    /// Remove everything a provider registered. No-op for unknown providers.
    pub fn on_disappeared(&self, handle: &ProviderHandle) {
        self.remove_provider(handle.id());
    }

    /// Remove everything registered under `id`; returns the number of descriptors removed.
    pub fn remove_provider(&self, id: ProviderId) -> usize {
        let removed = self.state.write().remove_provider(id);
        if removed > 0 {
            debug!(provider_id = %id, removed, "Unregistered provider");
        }
        removed
    }

    /// Visible descriptor for a key, if any provider currently occupies it.
    #[must_use]
    pub fn lookup(
        &self,
        kind: CapabilityKind,
        key: &CompositeKey,
    ) -> Option<Arc<ComponentDescriptor>> {
        let state = self.state.read();
        let descriptor = state
            .entries
            .get(&RegistryKey::new(kind, key.clone()))
            .and_then(|stack| stack.last())
            .cloned();
        if descriptor.is_none() {
            debug!(kind = %kind, key = %key, "No provider registered");
        }
        descriptor
    }

    /// Occupied keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<RegistryKey> {
        let mut keys: Vec<RegistryKey> = self.state.read().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Visible descriptors of one capability kind, in commit order.
    #[must_use]
    pub fn descriptors(&self, kind: CapabilityKind) -> Vec<Arc<ComponentDescriptor>> {
        let state = self.state.read();
        let mut winners: Vec<Arc<ComponentDescriptor>> = state
            .entries
            .iter()
            .filter(|(key, _)| key.kind == kind)
            .filter_map(|(_, stack)| stack.last().cloned())
            .collect();
        winners.sort_by_key(|d| d.sequence());
        winners
    }

    /// Newest visible representable answering to `name`.
    ///
    /// A representable shadowed on its own key does not answer.
    #[must_use]
    pub fn representable_for_name(&self, name: &str) -> Option<Arc<ComponentDescriptor>> {
        let state = self.state.read();
        state
            .names
            .get(name)?
            .iter()
            .rev()
            .find(|d| state.is_visible(d))
            .cloned()
    }

    #[must_use]
    pub fn contains_provider(&self, id: ProviderId) -> bool {
        self.state.read().by_provider.contains_key(&id)
    }

    /// Number of occupied keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Drop every registration (useful in tests).
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.by_provider.clear();
        state.names.clear();
    }
}

impl Default for DynamicRegistry {
    fn default() -> Self {
        Self::new()
    }
}
