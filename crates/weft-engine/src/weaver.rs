//! The weaver: process-wide wrapper factory registry
//!
//! One `Weaver` serves a whole process: factories are synthesized on the
//! first wrap of each contract and reused for every wrap after that,
//! regardless of which concrete target sits behind the interface. The
//! registry only ever grows; there is no eviction.

use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use weft_sdk::WeaveError;

use crate::factory::WovenFactory;
use crate::interface::{InterfaceDecl, TargetHandle};
use crate::resolver;
use crate::woven::Woven;

/// A weavable interface contract.
///
/// Implemented once per interface by a marker type that ties together the
/// facade handle type, the declaration, and the hand-rolled proxy shim.
pub trait Contract: 'static {
    /// Trait-object handle the interface is consumed through, typically
    /// `Arc<dyn Trait>`.
    type Facade: Send + Sync + 'static;

    /// Interfaces without the marker resolve to their target unwrapped.
    const ASPECT_CAPABLE: bool = true;

    /// The interface's members and binding topology.
    fn declare() -> InterfaceDecl;

    /// Wrap a dispatcher in the typed proxy implementing the trait.
    fn facade(woven: Woven) -> Self::Facade;
}

/// Process-wide registry of synthesized wrapper factories.
///
/// Create one at startup and share it; the cache is never reset. Reads
/// take a shard read lock only; the first wrap of a contract briefly
/// holds its shard exclusively while the factory is synthesized, so at
/// most one factory is ever built per contract.
pub struct Weaver {
    factories: DashMap<TypeId, Arc<WovenFactory>>,
    built: AtomicUsize,
}

impl Weaver {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
            built: AtomicUsize::new(0),
        }
    }

    /// Wrap a target in a woven facade.
    ///
    /// Every call returns a new wrapper instance with fresh
    /// instance-scoped aspects, built from the cached factory. For
    /// contracts without the aspect-capable marker the target comes back
    /// untouched.
    pub fn wrap<C: Contract>(&self, target: C::Facade) -> Result<C::Facade, WeaveError> {
        self.wrap_as::<C>(target, std::any::type_name::<C::Facade>())
    }

    /// Like [`Weaver::wrap`], recording `target_type` as the concrete
    /// target's name in call contexts.
    pub fn wrap_as<C: Contract>(
        &self,
        target: C::Facade,
        target_type: &'static str,
    ) -> Result<C::Facade, WeaveError> {
        if !C::ASPECT_CAPABLE {
            return Ok(target);
        }
        let factory = self.factory_for::<C>()?;
        let handle: TargetHandle = Arc::new(target);
        let woven = Woven::new(factory, handle, target_type)?;
        Ok(C::facade(woven))
    }

    /// Number of factories synthesized over the registry's lifetime.
    ///
    /// Repeat wraps of the same contract do not move this counter.
    pub fn factories_built(&self) -> usize {
        self.built.load(Ordering::Relaxed)
    }

    fn factory_for<C: Contract>(&self) -> Result<Arc<WovenFactory>, WeaveError> {
        let key = TypeId::of::<C>();
        if let Some(factory) = self.factories.get(&key) {
            return Ok(factory.clone());
        }

        match self.factories.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let decl = C::declare();
                let set = resolver::resolve(&decl)?;
                if set.facade_type != TypeId::of::<C::Facade>() {
                    return Err(WeaveError::TargetMismatch {
                        interface: set.interface,
                        facade: std::any::type_name::<C::Facade>(),
                    });
                }
                let factory = Arc::new(WovenFactory::synthesize(set)?);
                self.built.fetch_add(1, Ordering::Relaxed);
                Ok(entry.insert(factory).value().clone())
            }
        }
    }
}

impl Default for Weaver {
    fn default() -> Self {
        Self::new()
    }
}
