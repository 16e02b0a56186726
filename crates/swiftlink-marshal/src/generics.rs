//! Generic-declaration gathering for generated trampolines.
//!
//! Walks a type spec and records one emitted generic declaration per
//! reachable generic-parameter occurrence. Two prunings keep the emitted
//! `where`-style constraints minimal: a constraint whose bound names an
//! already-recorded declaration is dropped at emission, and constraints a
//! substitution into a constrained entity slot already implies are removed
//! in a final pass over the whole collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use swiftlink_decl::{Constraint, EntityRegistry, FunctionDeclaration};
use swiftlink_typespec::{NamedSpec, TypeSpec, TypeSpecKind};

use crate::error::{MarshalError, Result};

/// An inheritance constraint on an emitted generic declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarshalGenericConstraint {
    /// The constrained generic parameter's source name.
    pub subject: String,
    /// The class or protocol the parameter must inherit from.
    pub bound: TypeSpec,
}

/// One generic declaration to emit on a generated trampoline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarshalGenericDeclaration {
    pub name: String,
    pub constraints: Vec<MarshalGenericConstraint>,
}

/// Ordered, name-unique collection of emitted generic declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericDeclarationCollection {
    declarations: Vec<MarshalGenericDeclaration>,
}

impl GenericDeclarationCollection {
    pub fn new() -> Self {
        GenericDeclarationCollection::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations
            .iter()
            .any(|declaration| declaration.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarshalGenericDeclaration> {
        self.declarations.iter()
    }

    pub fn get(&self, name: &str) -> Option<&MarshalGenericDeclaration> {
        self.declarations
            .iter()
            .find(|declaration| declaration.name == name)
    }

    fn push(&mut self, declaration: MarshalGenericDeclaration) {
        if !self.contains(&declaration.name) {
            self.declarations.push(declaration);
        }
    }
}

/// Record the generic declarations a trampoline over `spec` must carry.
pub fn gather_generics(
    declaration: &FunctionDeclaration,
    registry: &EntityRegistry,
    spec: &TypeSpec,
    out: &mut GenericDeclarationCollection,
) -> Result<()> {
    let mut redundant: BTreeMap<String, Vec<TypeSpec>> = BTreeMap::new();
    collect(declaration, registry, spec, out, &mut redundant)?;
    // A parameter substituted into a constrained entity slot already
    // satisfies that slot's bounds; drop matching constraints it emitted.
    for emitted in out.declarations.iter_mut() {
        if let Some(forbidden) = redundant.get(&emitted.name) {
            emitted.constraints.retain(|candidate| {
                !forbidden
                    .iter()
                    .any(|bound| bounds_agree(&candidate.bound, bound))
            });
        }
    }
    Ok(())
}

fn collect(
    declaration: &FunctionDeclaration,
    registry: &EntityRegistry,
    spec: &TypeSpec,
    out: &mut GenericDeclarationCollection,
    redundant: &mut BTreeMap<String, Vec<TypeSpec>>,
) -> Result<()> {
    match &spec.kind {
        TypeSpecKind::Named(named) => {
            let context = &declaration.generics;
            if let Some((depth, index)) = context.depth_and_index(&named.name) {
                if !out.contains(&named.name) {
                    let mut constraints = Vec::new();
                    // Constraints from enclosing-type scopes belong to the
                    // enclosing type's own emission, not this declaration's.
                    if depth >= context.max_depth() {
                        if let Some(source) = context.declaration_at(depth, index) {
                            append_constraints(
                                declaration,
                                &named.name,
                                &source.constraints,
                                &mut constraints,
                            )?;
                        }
                    }
                    prune_redundant(out, &mut constraints);
                    out.push(MarshalGenericDeclaration {
                        name: named.name.clone(),
                        constraints,
                    });
                }
            } else if !named.generic_params.is_empty() {
                record_substitutions(declaration, registry, named, redundant)?;
            }
            for argument in named.generic_params.iter() {
                collect(declaration, registry, argument, out, redundant)?;
            }
            if let Some(inner) = &named.inner {
                collect(declaration, registry, inner, out, redundant)?;
            }
        }
        TypeSpecKind::Tuple(tuple) => {
            for element in &tuple.elements {
                collect(declaration, registry, element, out, redundant)?;
            }
        }
        TypeSpecKind::Closure(closure) => {
            collect(declaration, registry, &closure.arguments, out, redundant)?;
            collect(declaration, registry, &closure.return_type, out, redundant)?;
        }
        TypeSpecKind::ProtocolList(list) => {
            for protocol in &list.protocols {
                collect(declaration, registry, protocol, out, redundant)?;
            }
        }
    }
    Ok(())
}

/// A generic parameter substituted into a constrained entity slot already
/// satisfies the slot's bounds; mark them redundant for that parameter.
fn record_substitutions(
    declaration: &FunctionDeclaration,
    registry: &EntityRegistry,
    named: &NamedSpec,
    redundant: &mut BTreeMap<String, Vec<TypeSpec>>,
) -> Result<()> {
    let entity = match registry.entity_for_name(&named.name) {
        Some(entity) => entity,
        None => return Ok(()),
    };
    for (slot, argument) in entity.generics.iter().zip(named.generic_params.iter()) {
        let argument_named = match argument.as_named() {
            Some(argument_named) => argument_named,
            None => continue,
        };
        if declaration
            .generics
            .depth_and_index(&argument_named.name)
            .is_none()
        {
            continue;
        }
        for constraint in &slot.constraints {
            match constraint {
                Constraint::Inheritance { inherits, .. } => redundant
                    .entry(argument_named.name.clone())
                    .or_default()
                    .push(inherits.clone()),
                Constraint::Equality { .. } => {
                    return Err(MarshalError::UnsupportedEqualityConstraint {
                        declaration: declaration.fully_qualified_name(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Bounds agree when equal or when their names agree module-stripped.
fn bounds_agree(candidate: &TypeSpec, forbidden: &TypeSpec) -> bool {
    if candidate == forbidden {
        return true;
    }
    match (candidate.as_named(), forbidden.as_named()) {
        (Some(candidate), Some(forbidden)) => {
            candidate.name_without_module() == forbidden.name_without_module()
        }
        _ => false,
    }
}

fn append_constraints(
    declaration: &FunctionDeclaration,
    subject: &str,
    source: &[Constraint],
    constraints: &mut Vec<MarshalGenericConstraint>,
) -> Result<()> {
    for constraint in source {
        match constraint {
            Constraint::Inheritance { inherits, .. } => {
                let candidate = MarshalGenericConstraint {
                    subject: subject.to_string(),
                    bound: inherits.clone(),
                };
                if !constraints
                    .iter()
                    .any(|existing| existing.bound == candidate.bound)
                {
                    constraints.push(candidate);
                }
            }
            Constraint::Equality { .. } => {
                return Err(MarshalError::UnsupportedEqualityConstraint {
                    declaration: declaration.fully_qualified_name(),
                });
            }
        }
    }
    Ok(())
}

/// Drop constraints the recorded declarations already structurally imply:
/// a candidate whose bound names an already-recorded generic declaration.
fn prune_redundant(
    out: &GenericDeclarationCollection,
    constraints: &mut Vec<MarshalGenericConstraint>,
) {
    constraints.retain(|candidate| {
        let bound_named = match candidate.bound.as_named() {
            Some(named) => named,
            None => return true,
        };
        !out.contains(&bound_named.name) && !out.contains(bound_named.name_without_module())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftlink_decl::{Entity, EntityKind, GenericContext, GenericDeclaration};
    use swiftlink_typespec::parse_type_spec;

    fn declaration_with(scopes: Vec<Vec<GenericDeclaration>>) -> FunctionDeclaration {
        let mut declaration = FunctionDeclaration::top_level(
            "Mod",
            "f",
            Vec::new(),
            parse_type_spec("()").unwrap(),
        );
        declaration.generics = GenericContext::from_scopes(scopes);
        declaration
    }

    #[test]
    fn direct_generic_parameter_carries_its_constraints() {
        let printable = parse_type_spec("Mod.Printable").unwrap();
        let declaration = declaration_with(vec![vec![GenericDeclaration::with_inheritance(
            "T",
            printable.clone(),
        )]]);
        let registry = EntityRegistry::new();
        let mut out = GenericDeclarationCollection::new();
        gather_generics(
            &declaration,
            &registry,
            &parse_type_spec("T").unwrap(),
            &mut out,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        let emitted = out.get("T").unwrap();
        assert_eq!(emitted.constraints.len(), 1);
        assert_eq!(emitted.constraints[0].bound, printable);
    }

    #[test]
    fn enclosing_scope_parameters_emit_without_constraints() {
        let printable = parse_type_spec("Mod.Printable").unwrap();
        let declaration = declaration_with(vec![
            vec![GenericDeclaration::with_inheritance("T", printable)],
            vec![GenericDeclaration::new("U")],
        ]);
        let registry = EntityRegistry::new();
        let mut out = GenericDeclarationCollection::new();
        gather_generics(
            &declaration,
            &registry,
            &parse_type_spec("(T, U)").unwrap(),
            &mut out,
        )
        .unwrap();
        // T lives at depth 0 while the declaration's own list is depth 1.
        assert!(out.get("T").unwrap().constraints.is_empty());
        assert_eq!(out.get("U").unwrap().constraints.len(), 0);
    }

    #[test]
    fn substitution_into_a_constrained_slot_emits_no_constraint() {
        let printable = parse_type_spec("Mod.Printable").unwrap();
        let mut registry = EntityRegistry::new();
        registry.register(
            "Mod.Box",
            Entity::with_generics(
                EntityKind::Struct,
                vec![GenericDeclaration::with_inheritance("E", printable)],
            ),
        );
        let declaration = declaration_with(vec![vec![GenericDeclaration::new("T")]]);
        let mut out = GenericDeclarationCollection::new();
        gather_generics(
            &declaration,
            &registry,
            &parse_type_spec("Mod.Box<T>").unwrap(),
            &mut out,
        )
        .unwrap();
        assert!(out.get("T").unwrap().constraints.is_empty());
    }

    #[test]
    fn slot_constraints_suppress_matching_declared_constraints() {
        let printable = parse_type_spec("Mod.Printable").unwrap();
        let mut registry = EntityRegistry::new();
        registry.register(
            "Mod.Box",
            Entity::with_generics(
                EntityKind::Struct,
                vec![GenericDeclaration::with_inheritance("E", printable.clone())],
            ),
        );
        let declaration =
            declaration_with(vec![vec![GenericDeclaration::with_inheritance("T", printable)]]);
        let mut out = GenericDeclarationCollection::new();
        gather_generics(
            &declaration,
            &registry,
            &parse_type_spec("(T, Mod.Box<T>)").unwrap(),
            &mut out,
        )
        .unwrap();
        // T's own `T : Printable` is implied by filling Box's slot.
        assert!(out.get("T").unwrap().constraints.is_empty());
    }

    #[test]
    fn constraint_naming_a_recorded_declaration_is_pruned() {
        let bound_on_t = parse_type_spec("T").unwrap();
        let declaration = declaration_with(vec![vec![
            GenericDeclaration::new("T"),
            GenericDeclaration::with_inheritance("U", bound_on_t),
        ]]);
        let registry = EntityRegistry::new();
        let mut out = GenericDeclarationCollection::new();
        gather_generics(
            &declaration,
            &registry,
            &parse_type_spec("(T, U)").unwrap(),
            &mut out,
        )
        .unwrap();
        // U's `U : T` constraint is implied by T's own declaration.
        assert!(out.get("U").unwrap().constraints.is_empty());
    }

    #[test]
    fn repeated_occurrences_never_duplicate() {
        let declaration = declaration_with(vec![vec![GenericDeclaration::new("T")]]);
        let registry = EntityRegistry::new();
        let mut out = GenericDeclarationCollection::new();
        gather_generics(
            &declaration,
            &registry,
            &parse_type_spec("(T, Swift.Array<T>, T)").unwrap(),
            &mut out,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn equality_constraints_fail_fast() {
        let mut generic = GenericDeclaration::new("T");
        generic.constraints.push(Constraint::Equality {
            first: "T".to_string(),
            second: "U".to_string(),
        });
        let declaration = declaration_with(vec![vec![generic]]);
        let registry = EntityRegistry::new();
        let mut out = GenericDeclarationCollection::new();
        let err = gather_generics(
            &declaration,
            &registry,
            &parse_type_spec("T").unwrap(),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MarshalError::UnsupportedEqualityConstraint { .. }
        ));
    }
}
