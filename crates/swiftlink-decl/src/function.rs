//! Function, accessor, constructor, and destructor declaration records.

use serde::{Deserialize, Serialize};

use swiftlink_typespec::TypeSpec;

use crate::generics::GenericContext;
use crate::parameter::ParameterItem;
use crate::registry::EntityKind;

/// Name prefix carried by property getter declarations.
pub const PROPERTY_GETTER_PREFIX: &str = "get_";
/// Name prefix carried by property setter declarations.
pub const PROPERTY_SETTER_PREFIX: &str = "set_";
/// Name prefix carried by property materializer declarations.
pub const PROPERTY_MATERIALIZER_PREFIX: &str = "materialize_";

/// Which accessor of a property or subscript a declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    Getter,
    Setter,
    Materializer,
}

/// What kind of callable a declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionKind {
    Function,
    Property(AccessorKind),
    Subscript(AccessorKind),
    Constructor,
    Destructor,
}

/// The enclosing type of a member declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentEntity {
    /// Fully-qualified name, module included (`Mod.Outer.Inner`).
    pub name: String,
    pub kind: EntityKind,
}

impl ParentEntity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        ParentEntity {
            name: name.into(),
            kind,
        }
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, EntityKind::Struct | EntityKind::Enum)
    }
}

/// One declared function-like API entry.
///
/// `parameter_lists` holds one list per curry level; instance members of
/// some foreign ABIs carry an extra leading receiver list. The last list
/// is always the declared parameters proper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub module: String,
    pub name: String,
    pub kind: FunctionKind,
    pub is_static: bool,
    pub parent: Option<ParentEntity>,
    pub parameter_lists: Vec<Vec<ParameterItem>>,
    pub return_type: TypeSpec,
    pub generics: GenericContext,
}

impl FunctionDeclaration {
    /// A plain top-level function with a single parameter list.
    pub fn top_level(
        module: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<ParameterItem>,
        return_type: TypeSpec,
    ) -> Self {
        FunctionDeclaration {
            module: module.into(),
            name: name.into(),
            kind: FunctionKind::Function,
            is_static: false,
            parent: None,
            parameter_lists: vec![parameters],
            return_type,
            generics: GenericContext::empty(),
        }
    }

    pub fn is_property(&self) -> bool {
        matches!(
            self.kind,
            FunctionKind::Property(_) | FunctionKind::Subscript(_)
        )
    }

    pub fn is_subscript(&self) -> bool {
        matches!(self.kind, FunctionKind::Subscript(_))
    }

    pub fn is_getter(&self) -> bool {
        matches!(
            self.kind,
            FunctionKind::Property(AccessorKind::Getter)
                | FunctionKind::Subscript(AccessorKind::Getter)
        )
    }

    pub fn is_setter(&self) -> bool {
        matches!(
            self.kind,
            FunctionKind::Property(AccessorKind::Setter)
                | FunctionKind::Subscript(AccessorKind::Setter)
        )
    }

    pub fn is_materializer(&self) -> bool {
        matches!(
            self.kind,
            FunctionKind::Property(AccessorKind::Materializer)
                | FunctionKind::Subscript(AccessorKind::Materializer)
        )
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, FunctionKind::Constructor)
    }

    pub fn is_destructor(&self) -> bool {
        matches!(self.kind, FunctionKind::Destructor)
    }

    /// The name candidates are looked up under: accessor prefixes stripped.
    pub fn search_name(&self) -> &str {
        match self.kind {
            FunctionKind::Property(AccessorKind::Getter) => self
                .name
                .strip_prefix(PROPERTY_GETTER_PREFIX)
                .unwrap_or(&self.name),
            FunctionKind::Property(AccessorKind::Setter) => self
                .name
                .strip_prefix(PROPERTY_SETTER_PREFIX)
                .unwrap_or(&self.name),
            FunctionKind::Property(AccessorKind::Materializer) => self
                .name
                .strip_prefix(PROPERTY_MATERIALIZER_PREFIX)
                .unwrap_or(&self.name),
            _ => &self.name,
        }
    }

    /// The final (significant) parameter list.
    pub fn significant_parameters(&self) -> &[ParameterItem] {
        match self.parameter_lists.last() {
            Some(list) => list.as_slice(),
            None => &[],
        }
    }

    /// Whether the declaration carries an extra receiver curry level.
    pub fn is_curried(&self) -> bool {
        self.parameter_lists.len() > 1
    }

    /// `Module.Parent.name` or `Module.name` for diagnostics.
    pub fn fully_qualified_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}.{}", parent.name, self.name),
            None => format!("{}.{}", self.module, self.name),
        }
    }
}
