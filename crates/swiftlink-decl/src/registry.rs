//! Registry of known foreign entities (classes, structs, enums, protocols).
//!
//! Backs two decisions: whether an `inout` parameter's type resolves to
//! anything at all, and whether a resolved type is a value aggregate that
//! marshals by value. Entries also carry the entity's own generic
//! parameter declarations so constraint origins can be recovered during
//! generic gathering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use swiftlink_typespec::{TypeSpec, TypeSpecKind};

use crate::generics::GenericDeclaration;

/// Kind of a registered foreign entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Struct,
    Enum,
    Protocol,
}

/// One registered foreign type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    /// The entity's own generic parameter declarations, in order.
    #[serde(default)]
    pub generics: Vec<GenericDeclaration>,
}

impl Entity {
    pub fn new(kind: EntityKind) -> Self {
        Entity {
            kind,
            generics: Vec::new(),
        }
    }

    pub fn with_generics(kind: EntityKind, generics: Vec<GenericDeclaration>) -> Self {
        Entity { kind, generics }
    }

    pub fn is_struct_or_enum(&self) -> bool {
        matches!(self.kind, EntityKind::Struct | EntityKind::Enum)
    }
}

/// Known entities keyed by fully-qualified name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: BTreeMap<String, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        EntityRegistry::default()
    }

    pub fn register(&mut self, name: impl Into<String>, entity: Entity) {
        self.entities.insert(name.into(), entity);
    }

    pub fn register_kind(&mut self, name: impl Into<String>, kind: EntityKind) {
        self.register(name, Entity::new(kind));
    }

    pub fn entity_for_name(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Resolve a named type spec to its registered entity.
    pub fn entity_for_spec(&self, spec: &TypeSpec) -> Option<&Entity> {
        match &spec.kind {
            TypeSpecKind::Named(named) => self.entity_for_name(&named.name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiftlink_typespec::parse_type_spec;

    #[test]
    fn lookup_by_spec() {
        let mut registry = EntityRegistry::new();
        registry.register_kind("Mod.Point", EntityKind::Struct);
        registry.register_kind("Mod.Widget", EntityKind::Class);

        let point = parse_type_spec("Mod.Point").unwrap();
        let entity = registry.entity_for_spec(&point).unwrap();
        assert!(entity.is_struct_or_enum());

        let widget = parse_type_spec("Mod.Widget").unwrap();
        assert!(!registry.entity_for_spec(&widget).unwrap().is_struct_or_enum());

        let missing = parse_type_spec("Mod.Missing").unwrap();
        assert!(registry.entity_for_spec(&missing).is_none());
    }

    #[test]
    fn non_named_specs_never_resolve() {
        let registry = EntityRegistry::new();
        let tuple = parse_type_spec("(Swift.Int, Swift.Int)").unwrap();
        assert!(registry.entity_for_spec(&tuple).is_none());
    }
}
