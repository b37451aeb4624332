//! Binding resolution: from declaration tree to per-method binding lists
//!
//! Flattens an interface's own and inherited members into the ordered
//! method set a wrapper has to implement, hands accessor methods the
//! bindings of the property or event that owns them, and computes the
//! interface-wide layout of instance-scoped aspect slots.

use rustc_hash::FxHashSet;

use weft_sdk::{AspectFactory, AspectKind, AspectLifetime, WeaveError};

use crate::binding::AspectBinding;
use crate::interface::{InterfaceDecl, MemberDecl, MethodInvoker};

/// One method of the flattened interface, with its effective bindings.
pub struct ResolvedMethod {
    /// Name of the interface declaring the member.
    pub owner: &'static str,
    /// Dispatch name. Accessors get `get_`/`set_`/`subscribe_`/
    /// `unsubscribe_` prefixes on the owning member's name.
    pub name: String,
    /// Ordered formal parameter names.
    pub param_names: Vec<&'static str>,
    /// False for methods without a return value.
    pub has_return: bool,
    /// The real target call.
    pub invoker: MethodInvoker,
    /// Effective bindings, declaration order.
    pub bindings: Vec<AspectBinding>,
}

/// Resolver output: the flattened method set plus the instance slot
/// layout shared by every wrapper of the interface.
pub struct MemberBindingSet {
    /// Interface name (the declaration root).
    pub interface: &'static str,
    /// TypeId of the declared facade type.
    pub facade_type: std::any::TypeId,
    /// Name of the declared facade type.
    pub facade_type_name: &'static str,
    /// Flattened methods: own members first, then inherited.
    pub methods: Vec<ResolvedMethod>,
    /// Deduplicated PerInstance aspect constructors, first occurrence
    /// wins. One wrapper slot each.
    pub instance_slots: Vec<AspectFactory>,
}

/// Resolve a declaration into its member binding set.
pub fn resolve(decl: &InterfaceDecl) -> Result<MemberBindingSet, WeaveError> {
    let mut methods = Vec::new();
    let mut names = FxHashSet::default();
    let mut visited = FxHashSet::default();
    flatten(decl, decl, &mut methods, &mut names, &mut visited)?;

    let mut instance_slots: Vec<AspectFactory> = Vec::new();
    let mut slot_kinds: FxHashSet<AspectKind> = FxHashSet::default();
    for method in &methods {
        for binding in &method.bindings {
            if binding.lifetime() == AspectLifetime::PerInstance
                && slot_kinds.insert(binding.kind())
            {
                instance_slots.push(binding.factory().clone());
            }
        }
    }

    Ok(MemberBindingSet {
        interface: decl.name,
        facade_type: decl.facade_type,
        facade_type_name: decl.facade_type_name,
        methods,
        instance_slots,
    })
}

fn flatten(
    root: &InterfaceDecl,
    decl: &InterfaceDecl,
    methods: &mut Vec<ResolvedMethod>,
    names: &mut FxHashSet<String>,
    visited: &mut FxHashSet<&'static str>,
) -> Result<(), WeaveError> {
    // A diamond reaches the same interface twice; fold it.
    if !visited.insert(decl.name) {
        return Ok(());
    }
    if decl.facade_type != root.facade_type {
        return Err(WeaveError::FacadeMismatch {
            interface: root.name,
            parent: decl.name,
        });
    }

    for member in &decl.members {
        match member {
            MemberDecl::Method(method) => {
                push_method(
                    methods,
                    names,
                    root,
                    ResolvedMethod {
                        owner: decl.name,
                        name: method.name.to_string(),
                        param_names: method.param_names.clone(),
                        has_return: method.has_return,
                        invoker: method.invoker.clone(),
                        bindings: method.bindings.clone(),
                    },
                )?;
            }
            MemberDecl::Property(property) => {
                push_method(
                    methods,
                    names,
                    root,
                    ResolvedMethod {
                        owner: decl.name,
                        name: format!("get_{}", property.name),
                        param_names: Vec::new(),
                        has_return: true,
                        invoker: property.getter.clone(),
                        bindings: property.bindings.clone(),
                    },
                )?;
                if let Some(setter) = &property.setter {
                    push_method(
                        methods,
                        names,
                        root,
                        ResolvedMethod {
                            owner: decl.name,
                            name: format!("set_{}", property.name),
                            param_names: vec!["value"],
                            has_return: false,
                            invoker: setter.clone(),
                            bindings: property.bindings.clone(),
                        },
                    )?;
                }
            }
            MemberDecl::Event(event) => {
                push_method(
                    methods,
                    names,
                    root,
                    ResolvedMethod {
                        owner: decl.name,
                        name: format!("subscribe_{}", event.name),
                        param_names: vec!["listener"],
                        has_return: false,
                        invoker: event.subscribe.clone(),
                        bindings: event.bindings.clone(),
                    },
                )?;
                if let Some(unsubscribe) = &event.unsubscribe {
                    push_method(
                        methods,
                        names,
                        root,
                        ResolvedMethod {
                            owner: decl.name,
                            name: format!("unsubscribe_{}", event.name),
                            param_names: vec!["listener"],
                            has_return: false,
                            invoker: unsubscribe.clone(),
                            bindings: event.bindings.clone(),
                        },
                    )?;
                }
            }
        }
    }

    for parent in &decl.extends {
        flatten(root, parent, methods, names, visited)?;
    }
    Ok(())
}

fn push_method(
    methods: &mut Vec<ResolvedMethod>,
    names: &mut FxHashSet<String>,
    root: &InterfaceDecl,
    method: ResolvedMethod,
) -> Result<(), WeaveError> {
    if !names.insert(method.name.clone()) {
        return Err(WeaveError::DuplicateMember {
            interface: root.name,
            member: method.name,
        });
    }
    methods.push(method);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{EventDecl, MethodDecl, PropertyDecl};
    use std::sync::Arc;
    use weft_sdk::{Aspect, CallContext, CallValue, InterceptPoint};

    #[derive(Default)]
    struct Tracer;

    impl Aspect for Tracer {
        fn invoke(&self, _ctx: &mut CallContext, _point: InterceptPoint) {}
    }

    #[derive(Default)]
    struct Auditor;

    impl Aspect for Auditor {
        fn invoke(&self, _ctx: &mut CallContext, _point: InterceptPoint) {}
    }

    fn noop_method(name: &'static str) -> MethodDecl {
        MethodDecl::new(name, &[], |_, _| Ok(CallValue::void())).void()
    }

    fn decl<F: Send + Sync + 'static>(name: &'static str) -> InterfaceDecl {
        InterfaceDecl::new::<F>(name)
    }

    #[test]
    fn test_accessors_inherit_property_bindings() {
        let iface = decl::<Arc<()>>("Profile").property(
            PropertyDecl::new("handle", |_, _| Ok(CallValue::void()))
                .with_setter(|_, _| Ok(CallValue::void()))
                .bind(AspectBinding::prolog::<Tracer>(AspectLifetime::PerCall)),
        );

        let set = resolve(&iface).unwrap();
        let names: Vec<_> = set.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["get_handle", "set_handle"]);

        for method in &set.methods {
            assert_eq!(method.bindings.len(), 1);
            assert_eq!(method.bindings[0].kind(), AspectKind::of::<Tracer>());
        }
        assert!(set.methods[0].has_return);
        assert!(!set.methods[1].has_return);
        assert_eq!(set.methods[1].param_names, vec!["value"]);
    }

    #[test]
    fn test_event_accessors_inherit_event_bindings() {
        let iface = decl::<Arc<()>>("Feed").event(
            EventDecl::new("updated", |_, _| Ok(CallValue::void()))
                .with_unsubscribe(|_, _| Ok(CallValue::void()))
                .bind(AspectBinding::epilog::<Auditor>(AspectLifetime::PerCall)),
        );

        let set = resolve(&iface).unwrap();
        let names: Vec<_> = set.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["subscribe_updated", "unsubscribe_updated"]);
        assert!(set.methods.iter().all(|m| m.bindings.len() == 1));
    }

    #[test]
    fn test_inherited_members_follow_own_members() {
        let parent = decl::<Arc<()>>("Base").method(noop_method("ping"));
        let iface = decl::<Arc<()>>("Derived")
            .method(noop_method("run"))
            .extends(parent);

        let set = resolve(&iface).unwrap();
        let members: Vec<_> = set
            .methods
            .iter()
            .map(|m| (m.owner, m.name.as_str()))
            .collect();
        assert_eq!(members, vec![("Derived", "run"), ("Base", "ping")]);
    }

    #[test]
    fn test_diamond_is_folded_once() {
        let shared = || decl::<Arc<()>>("Shared").method(noop_method("tick"));
        let left = decl::<Arc<()>>("Left").extends(shared());
        let right = decl::<Arc<()>>("Right").extends(shared());
        let iface = decl::<Arc<()>>("Top").extends(left).extends(right);

        let set = resolve(&iface).unwrap();
        assert_eq!(set.methods.len(), 1);
        assert_eq!(set.methods[0].owner, "Shared");
    }

    #[test]
    fn test_duplicate_member_is_rejected() {
        let parent = decl::<Arc<()>>("Base").method(noop_method("run"));
        let iface = decl::<Arc<()>>("Derived")
            .method(noop_method("run"))
            .extends(parent);

        let err = resolve(&iface).err().unwrap();
        assert_eq!(
            err,
            WeaveError::DuplicateMember {
                interface: "Derived",
                member: "run".into(),
            },
        );
    }

    #[test]
    fn test_parent_with_foreign_facade_is_rejected() {
        let parent = decl::<Arc<String>>("Base").method(noop_method("ping"));
        let iface = decl::<Arc<()>>("Derived").extends(parent);

        let err = resolve(&iface).err().unwrap();
        assert_eq!(
            err,
            WeaveError::FacadeMismatch {
                interface: "Derived",
                parent: "Base",
            },
        );
    }

    #[test]
    fn test_instance_slots_deduplicate_across_the_interface() {
        let iface = decl::<Arc<()>>("Jobs")
            .method(
                noop_method("submit")
                    .bind(AspectBinding::prolog::<Tracer>(AspectLifetime::PerInstance))
                    .bind(AspectBinding::epilog::<Auditor>(AspectLifetime::PerInstance)),
            )
            .method(
                noop_method("cancel")
                    .bind(AspectBinding::prolog::<Tracer>(AspectLifetime::PerInstance))
                    .bind(AspectBinding::prolog::<Auditor>(AspectLifetime::PerCall)),
            );

        let set = resolve(&iface).unwrap();
        let kinds: Vec<_> = set.instance_slots.iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, vec![AspectKind::of::<Tracer>(), AspectKind::of::<Auditor>()]);
    }
}
