//! The structured type-spec data model.
//!
//! A [`TypeSpec`] is the parsed representation of one Swift type signature
//! string. The variant payload lives in [`TypeSpecKind`]; the marker fields
//! shared by every variant (`is_inout`, `type_label`, `attributes`) live on
//! the struct itself so they can be enriched after parsing.
//!
//! Optionals are not a dedicated variant: postfix `?` and `!` wrap the
//! preceding type in a synthetic single-argument bound generic named
//! [`OPTIONAL`] or [`IMPLICITLY_UNWRAPPED_OPTIONAL`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Qualified name of the synthetic optional wrapper.
pub const OPTIONAL: &str = "Swift.Optional";

/// Qualified name of the synthetic implicitly-unwrapped optional wrapper.
pub const IMPLICITLY_UNWRAPPED_OPTIONAL: &str = "Swift.ImplicitlyUnwrappedOptional";

/// Built-in scalar value types that marshal by value.
pub const BUILT_IN_VALUE_TYPES: &[&str] = &[
    "Swift.Bool",
    "Swift.Double",
    "Swift.Float",
    "Swift.Int",
    "Swift.UInt",
];

/// An `@name` or `@name[params]` attribute attached to a type spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpecAttribute {
    pub name: String,
    pub parameters: Vec<String>,
}

impl TypeSpecAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        TypeSpecAttribute {
            name: name.into(),
            parameters: Vec::new(),
        }
    }
}

/// A parsed type specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub kind: TypeSpecKind,
    /// Pass-by-mutable-reference marker (`inout` prefix).
    #[serde(default)]
    pub is_inout: bool,
    /// External parameter label, distinct from the type name.
    #[serde(default)]
    pub type_label: Option<String>,
    /// Ordered `@...` attributes.
    #[serde(default)]
    pub attributes: Vec<TypeSpecAttribute>,
}

/// The variant payload of a [`TypeSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSpecKind {
    Named(NamedSpec),
    Tuple(TupleSpec),
    Closure(ClosureSpec),
    ProtocolList(ProtocolListSpec),
}

/// A (possibly module-qualified, possibly bound-generic) named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSpec {
    /// Qualified name; the first dotted segment is the module.
    pub name: String,
    /// Generic arguments supplied at this occurrence.
    #[serde(default)]
    pub generic_params: Vec<TypeSpec>,
    /// Dotted inner-type chain (`Outer<T>.Inner`). Always a named spec.
    #[serde(default)]
    pub inner: Option<Box<TypeSpec>>,
}

impl NamedSpec {
    /// The module prefix, when the name is qualified.
    pub fn module(&self) -> Option<&str> {
        self.name.split_once('.').map(|(module, _)| module)
    }

    pub fn has_module(&self) -> bool {
        self.module().is_some()
    }

    /// The name with its module prefix stripped.
    pub fn name_without_module(&self) -> &str {
        match self.name.split_once('.') {
            Some((_, rest)) => rest,
            None => &self.name,
        }
    }
}

/// An ordered tuple of element types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleSpec {
    pub elements: Vec<TypeSpec>,
}

/// A function type. The argument may itself be a tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureSpec {
    pub arguments: Box<TypeSpec>,
    pub return_type: Box<TypeSpec>,
    pub throws: bool,
}

/// A protocol composition (`A & B`); every entry is a named spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolListSpec {
    pub protocols: Vec<TypeSpec>,
}

impl TypeSpec {
    fn from_kind(kind: TypeSpecKind) -> Self {
        TypeSpec {
            kind,
            is_inout: false,
            type_label: None,
            attributes: Vec::new(),
        }
    }

    /// A plain named type with no generic arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeSpec::from_kind(TypeSpecKind::Named(NamedSpec {
            name: name.into(),
            generic_params: Vec::new(),
            inner: None,
        }))
    }

    /// A named type with generic arguments.
    pub fn named_with(name: impl Into<String>, generic_params: Vec<TypeSpec>) -> Self {
        TypeSpec::from_kind(TypeSpecKind::Named(NamedSpec {
            name: name.into(),
            generic_params,
            inner: None,
        }))
    }

    pub fn tuple(elements: Vec<TypeSpec>) -> Self {
        TypeSpec::from_kind(TypeSpecKind::Tuple(TupleSpec { elements }))
    }

    /// The empty tuple `()`.
    pub fn empty_tuple() -> Self {
        TypeSpec::tuple(Vec::new())
    }

    pub fn closure(arguments: TypeSpec, return_type: TypeSpec, throws: bool) -> Self {
        TypeSpec::from_kind(TypeSpecKind::Closure(ClosureSpec {
            arguments: Box::new(arguments),
            return_type: Box::new(return_type),
            throws,
        }))
    }

    pub fn protocol_list(protocols: Vec<TypeSpec>) -> Self {
        TypeSpec::from_kind(TypeSpecKind::ProtocolList(ProtocolListSpec { protocols }))
    }

    /// Wrap a type in `Swift.Optional`.
    pub fn optional_of(inner: TypeSpec) -> Self {
        TypeSpec::named_with(OPTIONAL, vec![inner])
    }

    /// Wrap a type in `Swift.ImplicitlyUnwrappedOptional`.
    pub fn implicitly_unwrapped_optional_of(inner: TypeSpec) -> Self {
        TypeSpec::named_with(IMPLICITLY_UNWRAPPED_OPTIONAL, vec![inner])
    }

    /// Short lowercase name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeSpecKind::Named(_) => "named type",
            TypeSpecKind::Tuple(_) => "tuple",
            TypeSpecKind::Closure(_) => "closure",
            TypeSpecKind::ProtocolList(_) => "protocol list",
        }
    }

    pub fn as_named(&self) -> Option<&NamedSpec> {
        match &self.kind {
            TypeSpecKind::Named(named) => Some(named),
            _ => None,
        }
    }

    pub fn is_empty_tuple(&self) -> bool {
        matches!(&self.kind, TypeSpecKind::Tuple(tuple) if tuple.elements.is_empty())
    }

    /// Whether this is the named `Void` type.
    pub fn is_void(&self) -> bool {
        matches!(&self.kind, TypeSpecKind::Named(named)
            if named.name == "Void" || named.name == "Swift.Void")
    }

    /// Whether this occurrence carries generic arguments.
    pub fn contains_generic_parameters(&self) -> bool {
        matches!(&self.kind, TypeSpecKind::Named(named) if !named.generic_params.is_empty())
    }

    /// Whether this is one of the built-in scalar value types.
    pub fn is_built_in_value_type(&self) -> bool {
        match &self.kind {
            TypeSpecKind::Named(named) => {
                named.generic_params.is_empty()
                    && BUILT_IN_VALUE_TYPES.contains(&named.name.as_str())
            }
            _ => false,
        }
    }

    /// Whether an `escaping` attribute is attached.
    pub fn is_escaping(&self) -> bool {
        self.has_attribute("escaping")
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attr in &self.attributes {
            write!(f, "@{}", attr.name)?;
            if !attr.parameters.is_empty() {
                write!(f, "[{}]", attr.parameters.join(", "))?;
            }
            write!(f, " ")?;
        }
        if self.is_inout {
            write!(f, "inout ")?;
        }
        if let Some(label) = &self.type_label {
            write!(f, "{label}: ")?;
        }
        match &self.kind {
            TypeSpecKind::Named(named) => {
                write!(f, "{}", named.name)?;
                if !named.generic_params.is_empty() {
                    write!(f, "<")?;
                    for (i, param) in named.generic_params.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{param}")?;
                    }
                    write!(f, ">")?;
                }
                if let Some(inner) = &named.inner {
                    write!(f, ".{inner}")?;
                }
                Ok(())
            }
            TypeSpecKind::Tuple(tuple) => {
                write!(f, "(")?;
                for (i, element) in tuple.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            TypeSpecKind::Closure(closure) => {
                if closure.throws {
                    write!(f, "{} throws -> {}", closure.arguments, closure.return_type)
                } else {
                    write!(f, "{} -> {}", closure.arguments, closure.return_type)
                }
            }
            TypeSpecKind::ProtocolList(list) => {
                for (i, protocol) in list.protocols.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{protocol}")?;
                }
                Ok(())
            }
        }
    }
}
