//! The locator: providers, caches, and transparent weaving

use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use weft_engine::{Contract, Weaver};

use crate::error::LocatorError;

struct ProviderEntry {
    construct: Box<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>,
    target_type: &'static str,
}

/// Registry of interface providers with a singleton cache and a shared
/// weaver.
///
/// Created once at startup and shared; neither the provider table nor
/// the singleton cache is ever reset.
pub struct ServiceLocator {
    weaver: Weaver,
    providers: RwLock<FxHashMap<TypeId, Arc<ProviderEntry>>>,
    singletons: RwLock<FxHashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl ServiceLocator {
    /// Create an empty locator with its own weaver.
    pub fn new() -> Self {
        Self {
            weaver: Weaver::new(),
            providers: RwLock::new(FxHashMap::default()),
            singletons: RwLock::new(FxHashMap::default()),
        }
    }

    /// The weaver backing this locator.
    pub fn weaver(&self) -> &Weaver {
        &self.weaver
    }

    /// Register the provider for a contract.
    ///
    /// `target_type` names the concrete implementation for call contexts
    /// and diagnostics. Registering a contract twice replaces the
    /// provider; already-cached singletons are not rebuilt.
    pub fn register<C: Contract>(
        &self,
        target_type: &'static str,
        provider: impl Fn() -> C::Facade + Send + Sync + 'static,
    ) {
        let entry = Arc::new(ProviderEntry {
            construct: Box::new(move || Box::new(provider()) as Box<dyn Any + Send + Sync>),
            target_type,
        });
        self.providers.write().insert(TypeId::of::<C>(), entry);
        debug!(
            interface = std::any::type_name::<C>(),
            target = target_type,
            "provider registered",
        );
    }

    /// Resolve a fresh instance.
    ///
    /// Builds a new target from the provider and, for aspect-capable
    /// contracts, a new wrapper with fresh instance-scoped aspects.
    pub fn instance<C: Contract>(&self) -> Result<C::Facade, LocatorError> {
        let interface = std::any::type_name::<C>();
        let entry = self
            .providers
            .read()
            .get(&TypeId::of::<C>())
            .cloned()
            .ok_or(LocatorError::Unregistered { interface })?;

        let built = (entry.construct)();
        let facade = built
            .downcast::<C::Facade>()
            .map(|facade| *facade)
            .map_err(|_| LocatorError::ProviderType { interface })?;

        Ok(self.weaver.wrap_as::<C>(facade, entry.target_type)?)
    }

    /// Resolve the shared instance, building and weaving it on first use.
    ///
    /// The woven facade is cached, so every caller shares one wrapper
    /// instance and its instance-scoped aspects.
    pub fn singleton<C: Contract>(&self) -> Result<C::Facade, LocatorError>
    where
        C::Facade: Clone,
    {
        let key = TypeId::of::<C>();
        if let Some(cached) = self.singletons.read().get(&key) {
            if let Some(facade) = cached.downcast_ref::<C::Facade>() {
                return Ok(facade.clone());
            }
        }

        let built = self.instance::<C>()?;
        let mut singletons = self.singletons.write();
        if let Some(cached) = singletons.get(&key) {
            // Another thread resolved it first; keep that one.
            if let Some(facade) = cached.downcast_ref::<C::Facade>() {
                return Ok(facade.clone());
            }
        }
        singletons.insert(key, Box::new(built.clone()));
        debug!(interface = std::any::type_name::<C>(), "singleton cached");
        Ok(built)
    }
}

impl Default for ServiceLocator {
    fn default() -> Self {
        Self::new()
    }
}
