//! Generic-parameter declarations and the per-declaration coordinate context.
//!
//! A generic parameter is addressed by a `(depth, index)` coordinate:
//! depth is the nesting level of the generic-parameter list that declared
//! it (enclosing types outermost), index is its position within that
//! level. The [`GenericContext`] is built once per declaration and handed
//! to every mapping/matching call instead of being recomputed by tree
//! walks at each site.

use serde::{Deserialize, Serialize};

use swiftlink_typespec::{TypeSpec, TypeSpecKind};

/// A constraint attached to a generic parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// `T : SomeClassOrProtocol`
    Inheritance { name: String, inherits: TypeSpec },
    /// `T == U`. Unsupported downstream; must fail fast, never be dropped.
    Equality { first: String, second: String },
}

impl Constraint {
    pub fn is_inheritance(&self) -> bool {
        matches!(self, Constraint::Inheritance { .. })
    }
}

/// One declared generic parameter with its constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericDeclaration {
    pub name: String,
    pub constraints: Vec<Constraint>,
}

impl GenericDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        GenericDeclaration {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    pub fn with_inheritance(name: impl Into<String>, inherits: TypeSpec) -> Self {
        let name = name.into();
        GenericDeclaration {
            name: name.clone(),
            constraints: vec![Constraint::Inheritance {
                name,
                inherits,
            }],
        }
    }
}

/// The generic-coordinate table of one declaration.
///
/// Scopes are ordered outermost first; the last scope is the declaration's
/// own generic-parameter list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericContext {
    scopes: Vec<Vec<GenericDeclaration>>,
}

impl GenericContext {
    pub fn empty() -> Self {
        GenericContext::default()
    }

    pub fn from_scopes(scopes: Vec<Vec<GenericDeclaration>>) -> Self {
        GenericContext { scopes }
    }

    /// Append one nesting level of generic declarations.
    pub fn push_scope(&mut self, declarations: Vec<GenericDeclaration>) {
        self.scopes.push(declarations);
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.iter().all(|scope| scope.is_empty())
    }

    /// The depth of the declaration's own generic-parameter list.
    pub fn max_depth(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }

    /// Coordinate of a generic parameter, searched outermost first.
    pub fn depth_and_index(&self, name: &str) -> Option<(usize, usize)> {
        for (depth, scope) in self.scopes.iter().enumerate() {
            for (index, declaration) in scope.iter().enumerate() {
                if declaration.name == name {
                    return Some((depth, index));
                }
            }
        }
        None
    }

    pub fn declaration_at(&self, depth: usize, index: usize) -> Option<&GenericDeclaration> {
        self.scopes.get(depth).and_then(|scope| scope.get(index))
    }

    /// Whether the spec is itself one of the declared generic parameters.
    pub fn is_generic_parameter(&self, spec: &TypeSpec) -> bool {
        match &spec.kind {
            TypeSpecKind::Named(named) => self.depth_and_index(&named.name).is_some(),
            _ => false,
        }
    }

    /// Whether the spec mentions any declared generic parameter anywhere.
    pub fn references_generic(&self, spec: &TypeSpec) -> bool {
        match &spec.kind {
            TypeSpecKind::Named(named) => {
                self.depth_and_index(&named.name).is_some()
                    || named
                        .generic_params
                        .iter()
                        .any(|param| self.references_generic(param))
                    || named
                        .inner
                        .as_deref()
                        .is_some_and(|inner| self.references_generic(inner))
            }
            TypeSpecKind::Tuple(tuple) => tuple
                .elements
                .iter()
                .any(|element| self.references_generic(element)),
            TypeSpecKind::Closure(closure) => {
                self.references_generic(&closure.arguments)
                    || self.references_generic(&closure.return_type)
            }
            TypeSpecKind::ProtocolList(list) => list
                .protocols
                .iter()
                .any(|protocol| self.references_generic(protocol)),
        }
    }
}
