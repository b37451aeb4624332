//! Wrapper factory synthesis
//!
//! A [`WovenFactory`] is the compiled dispatch plan for one interface:
//! per method, the target invoker, the resolved bindings with their
//! aspect slots, and index lists per interception point. Binding names
//! and lifetimes are resolved here, once; dispatch at call time is an
//! index walk with no lookups.

use rustc_hash::FxHashMap;

use weft_sdk::{
    AspectFactory, AspectHandle, AspectKind, AspectLifetime, InterceptPoint, WeaveError,
};

use crate::interface::MethodInvoker;
use crate::resolver::MemberBindingSet;

/// Where a binding finds its aspect instance during a call.
#[derive(Clone, Copy, Debug)]
pub(crate) enum AspectSlot {
    /// Index into the call-local instances built in step two
    PerCall(usize),
    /// Index into the wrapper's shared instance slots
    PerInstance(usize),
}

/// One binding of a compiled method plan.
pub(crate) struct PlannedBinding {
    pub(crate) kind: AspectKind,
    pub(crate) replaces_outcome: bool,
    pub(crate) slot: AspectSlot,
}

/// Compiled dispatch plan for one method.
pub struct MethodPlan {
    pub(crate) owner: &'static str,
    pub(crate) member_name: String,
    pub(crate) param_names: Vec<&'static str>,
    pub(crate) has_return: bool,
    pub(crate) invoker: MethodInvoker,
    pub(crate) bindings: Vec<PlannedBinding>,
    pub(crate) prolog: Vec<usize>,
    pub(crate) epilog: Vec<usize>,
    pub(crate) exception: Vec<usize>,
    pub(crate) intercept: Option<usize>,
    pub(crate) per_call_slots: Vec<AspectFactory>,
}

impl MethodPlan {
    /// True when any binding applies; unbound methods skip the weaving
    /// protocol entirely.
    pub fn is_bound(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Fully qualified member name.
    pub fn member_name(&self) -> &str {
        &self.member_name
    }
}

/// The reusable wrapper factory for one interface.
pub struct WovenFactory {
    interface: &'static str,
    facade_type: std::any::TypeId,
    facade_type_name: &'static str,
    methods: Vec<MethodPlan>,
    by_name: FxHashMap<String, usize>,
    instance_slots: Vec<AspectFactory>,
}

impl WovenFactory {
    /// Compile a resolved member set into a dispatch plan.
    ///
    /// Fails when a method carries more than one Intercept binding.
    pub fn synthesize(set: MemberBindingSet) -> Result<Self, WeaveError> {
        let mut instance_slots = set.instance_slots;
        let mut instance_index: FxHashMap<AspectKind, usize> = instance_slots
            .iter()
            .enumerate()
            .map(|(index, factory)| (factory.kind(), index))
            .collect();

        let mut methods = Vec::with_capacity(set.methods.len());
        let mut by_name = FxHashMap::default();

        for method in set.methods {
            let member_name = format!("{}.{}", method.owner, method.name);

            let mut bindings = Vec::with_capacity(method.bindings.len());
            let mut prolog = Vec::new();
            let mut epilog = Vec::new();
            let mut exception = Vec::new();
            let mut intercept = None;
            let mut per_call_slots: Vec<AspectFactory> = Vec::new();
            let mut per_call_index: FxHashMap<AspectKind, usize> = FxHashMap::default();

            for binding in &method.bindings {
                let kind = binding.kind();
                let slot = match binding.lifetime() {
                    AspectLifetime::PerCall => {
                        let index = match per_call_index.get(&kind) {
                            Some(&index) => index,
                            None => {
                                per_call_slots.push(binding.factory().clone());
                                per_call_index.insert(kind, per_call_slots.len() - 1);
                                per_call_slots.len() - 1
                            }
                        };
                        AspectSlot::PerCall(index)
                    }
                    AspectLifetime::PerInstance => {
                        let index = match instance_index.get(&kind) {
                            Some(&index) => index,
                            None => {
                                instance_slots.push(binding.factory().clone());
                                instance_index.insert(kind, instance_slots.len() - 1);
                                instance_slots.len() - 1
                            }
                        };
                        AspectSlot::PerInstance(index)
                    }
                };

                let index = bindings.len();
                let points = binding.points();
                if points.contains(InterceptPoint::Prolog) {
                    prolog.push(index);
                }
                if points.contains(InterceptPoint::Epilog) {
                    epilog.push(index);
                }
                if points.contains(InterceptPoint::Exception) {
                    exception.push(index);
                }
                if points.contains(InterceptPoint::Intercept) {
                    if intercept.is_some() {
                        return Err(WeaveError::MultipleInterceptors {
                            method: member_name,
                        });
                    }
                    intercept = Some(index);
                }

                bindings.push(PlannedBinding {
                    kind,
                    replaces_outcome: binding.replaces_outcome(),
                    slot,
                });
            }

            let index = methods.len();
            if by_name.insert(method.name.clone(), index).is_some() {
                return Err(WeaveError::DuplicateMember {
                    interface: set.interface,
                    member: method.name,
                });
            }
            methods.push(MethodPlan {
                owner: method.owner,
                member_name,
                param_names: method.param_names,
                has_return: method.has_return,
                invoker: method.invoker,
                bindings,
                prolog,
                epilog,
                exception,
                intercept,
                per_call_slots,
            });
        }

        Ok(Self {
            interface: set.interface,
            facade_type: set.facade_type,
            facade_type_name: set.facade_type_name,
            methods,
            by_name,
            instance_slots,
        })
    }

    /// Interface this factory builds wrappers for.
    pub fn interface(&self) -> &'static str {
        self.interface
    }

    /// TypeId of the declared facade type.
    pub(crate) fn facade_type(&self) -> std::any::TypeId {
        self.facade_type
    }

    /// Name of the declared facade type.
    pub(crate) fn facade_type_name(&self) -> &'static str {
        self.facade_type_name
    }

    /// Number of methods in the dispatch plan.
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Number of instance-scoped aspect slots each wrapper carries.
    pub fn instance_slot_count(&self) -> usize {
        self.instance_slots.len()
    }

    /// Look a method plan up by dispatch name.
    pub(crate) fn plan(&self, method: &str) -> Option<&MethodPlan> {
        self.by_name.get(method).map(|&index| &self.methods[index])
    }

    /// Construct fresh instance-scoped aspects for one new wrapper.
    pub(crate) fn instantiate_instance_aspects(&self) -> Box<[AspectHandle]> {
        self.instance_slots
            .iter()
            .map(AspectFactory::instantiate)
            .collect()
    }
}
