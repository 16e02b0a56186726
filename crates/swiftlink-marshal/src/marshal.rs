//! Marshal-type trees and supporting records.
//!
//! A [`MarshalType`] is the target-language type shape a trampoline is
//! generated from. The `Display` impl is the canonical textual form used
//! for snapshot-style assertions; it is stable and round-trip friendly
//! but is not re-parsed anywhere.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label used for unlabeled closure arguments in the out-pointer shapes.
pub const PLACEHOLDER_LABEL: &str = "_";

/// Pointer type wrapped around forced-reference parameters that mutate.
pub const UNSAFE_MUTABLE_POINTER: &str = "UnsafeMutablePointer";

/// Pointer type wrapped around forced-reference parameters that do not.
pub const UNSAFE_POINTER: &str = "UnsafePointer";

/// Erased pointer type used by simplified mapping.
pub const UNSAFE_RAW_POINTER: &str = "UnsafeRawPointer";

/// Context-capture pointer appended to call-site trampoline shapes.
pub const OPAQUE_POINTER: &str = "OpaquePointer";

/// One target-language type shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarshalType {
    /// A plain named type, module prefix already stripped.
    Simple { name: String },
    /// A named type applied to generic arguments.
    BoundGeneric {
        name: String,
        bound: Vec<MarshalType>,
    },
    /// A generic parameter addressed by coordinate.
    GenericReference { depth: usize, index: usize },
    /// A dotted inner-type chain (`Outer<T>.Inner`).
    Compound {
        outer: Box<MarshalType>,
        inner: Box<MarshalType>,
    },
    /// An ordered tuple of optionally labeled elements.
    Tuple { elements: Vec<MarshalElement> },
    /// A function type, possibly marked escaping.
    Function {
        parameters: Vec<MarshalElement>,
        return_type: Box<MarshalType>,
        is_escaping: bool,
    },
    /// A protocol composition (`A & B`).
    ProtocolComposition { protocols: Vec<MarshalType> },
    /// A variadic element type (`T...`), overrides only.
    Variadic { element: Box<MarshalType> },
}

impl MarshalType {
    pub fn simple(name: impl Into<String>) -> Self {
        MarshalType::Simple { name: name.into() }
    }

    pub fn bound_generic(name: impl Into<String>, bound: Vec<MarshalType>) -> Self {
        MarshalType::BoundGeneric {
            name: name.into(),
            bound,
        }
    }

    /// The empty tuple, used as the unit return of trampoline shapes.
    pub fn unit() -> Self {
        MarshalType::Tuple {
            elements: Vec::new(),
        }
    }

    /// Wrap a type in a single-argument mutable pointer.
    pub fn mutable_pointer_to(pointee: MarshalType) -> Self {
        MarshalType::bound_generic(UNSAFE_MUTABLE_POINTER, vec![pointee])
    }

    /// Wrap a type in a single-argument immutable pointer.
    pub fn pointer_to(pointee: MarshalType) -> Self {
        MarshalType::bound_generic(UNSAFE_POINTER, vec![pointee])
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, MarshalType::Tuple { elements } if elements.is_empty())
    }

    /// The canonical name of a generic reference at a coordinate.
    pub fn generic_reference_name(depth: usize, index: usize) -> String {
        format!("T{depth}_{index}")
    }
}

impl fmt::Display for MarshalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalType::Simple { name } => write!(f, "{name}"),
            MarshalType::BoundGeneric { name, bound } => {
                write!(f, "{name}<")?;
                for (i, ty) in bound.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ">")
            }
            MarshalType::GenericReference { depth, index } => {
                write!(f, "{}", MarshalType::generic_reference_name(*depth, *index))
            }
            MarshalType::Compound { outer, inner } => write!(f, "{outer}.{inner}"),
            MarshalType::Tuple { elements } => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            MarshalType::Function {
                parameters,
                return_type,
                is_escaping,
            } => {
                if *is_escaping {
                    write!(f, "@escaping ")?;
                }
                write!(f, "(")?;
                for (i, parameter) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{parameter}")?;
                }
                write!(f, ") -> {return_type}")
            }
            MarshalType::ProtocolComposition { protocols } => {
                for (i, protocol) in protocols.iter().enumerate() {
                    if i > 0 {
                        write!(f, " & ")?;
                    }
                    write!(f, "{protocol}")?;
                }
                Ok(())
            }
            MarshalType::Variadic { element } => write!(f, "{element}..."),
        }
    }
}

/// An optionally labeled element of a tuple or function type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarshalElement {
    pub label: Option<String>,
    pub ty: MarshalType,
}

impl MarshalElement {
    pub fn unlabeled(ty: MarshalType) -> Self {
        MarshalElement { label: None, ty }
    }

    pub fn labeled(label: impl Into<String>, ty: MarshalType) -> Self {
        MarshalElement {
            label: Some(label.into()),
            ty,
        }
    }
}

impl fmt::Display for MarshalElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{label}: ")?;
        }
        write!(f, "{}", self.ty)
    }
}

/// How a mapped parameter crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterPassing {
    Value,
    InOut,
}

/// One mapped parameter of a generated trampoline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarshalParameter {
    /// Call-site label; `None` means positional.
    pub public_name: Option<String>,
    /// Binding name, synthesized for anonymous parameters.
    pub private_name: String,
    pub ty: MarshalType,
    pub passing: ParameterPassing,
}

impl MarshalParameter {
    pub fn is_inout(&self) -> bool {
        self.passing == ParameterPassing::InOut
    }
}

impl fmt::Display for MarshalParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.public_name {
            Some(public) if *public != self.private_name => {
                write!(f, "{public} {}", self.private_name)?
            }
            Some(public) => write!(f, "{public}")?,
            None => write!(f, "_ {}", self.private_name)?,
        }
        write!(f, ": ")?;
        if self.is_inout() {
            write!(f, "inout ")?;
        }
        write!(f, "{}", self.ty)
    }
}

/// Caller-owned accumulator of modules referenced by mapped types.
///
/// Insertions are idempotent; iteration order is the sorted module name
/// order, so snapshot assertions are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleReferences {
    modules: BTreeSet<String>,
}

impl ModuleReferences {
    pub fn new() -> Self {
        ModuleReferences::default()
    }

    pub fn add(&mut self, module: impl Into<String>) {
        self.modules.insert(module.into());
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_bound_generic_and_compound() {
        let array = MarshalType::bound_generic("Array", vec![MarshalType::simple("Int")]);
        assert_eq!(array.to_string(), "Array<Int>");

        let compound = MarshalType::Compound {
            outer: Box::new(MarshalType::bound_generic(
                "Outer",
                vec![MarshalType::simple("Int")],
            )),
            inner: Box::new(MarshalType::simple("Inner")),
        };
        assert_eq!(compound.to_string(), "Outer<Int>.Inner");
    }

    #[test]
    fn display_function_shapes() {
        let plain = MarshalType::Function {
            parameters: vec![
                MarshalElement::labeled(PLACEHOLDER_LABEL, MarshalType::simple("Int")),
                MarshalElement::labeled("flag", MarshalType::simple("Bool")),
            ],
            return_type: Box::new(MarshalType::simple("String")),
            is_escaping: false,
        };
        assert_eq!(plain.to_string(), "(_: Int, flag: Bool) -> String");

        let escaping = MarshalType::Function {
            parameters: Vec::new(),
            return_type: Box::new(MarshalType::unit()),
            is_escaping: true,
        };
        assert_eq!(escaping.to_string(), "@escaping () -> ()");
    }

    #[test]
    fn display_generic_reference_uses_coordinates() {
        let reference = MarshalType::GenericReference { depth: 1, index: 2 };
        assert_eq!(reference.to_string(), "T1_2");
    }

    #[test]
    fn display_variadic_and_composition() {
        let variadic = MarshalType::Variadic {
            element: Box::new(MarshalType::simple("Int")),
        };
        assert_eq!(variadic.to_string(), "Int...");

        let composition = MarshalType::ProtocolComposition {
            protocols: vec![
                MarshalType::simple("Printable"),
                MarshalType::simple("Serializable"),
            ],
        };
        assert_eq!(composition.to_string(), "Printable & Serializable");
    }

    #[test]
    fn module_references_are_idempotent_and_sorted() {
        let mut modules = ModuleReferences::new();
        modules.add("Swift");
        modules.add("Foundation");
        modules.add("Swift");
        assert_eq!(modules.len(), 2);
        let collected: Vec<&str> = modules.iter().collect();
        assert_eq!(collected, vec!["Foundation", "Swift"]);
    }

    #[test]
    fn parameter_display_covers_label_forms() {
        let positional = MarshalParameter {
            public_name: None,
            private_name: "value".to_string(),
            ty: MarshalType::simple("Int"),
            passing: ParameterPassing::Value,
        };
        assert_eq!(positional.to_string(), "_ value: Int");

        let inout = MarshalParameter {
            public_name: Some("count".to_string()),
            private_name: "count".to_string(),
            ty: MarshalType::simple("Int"),
            passing: ParameterPassing::InOut,
        };
        assert_eq!(inout.to_string(), "count: inout Int");
    }

    #[test]
    fn serializes_to_json_and_back() {
        let ty = MarshalType::Function {
            parameters: vec![MarshalElement::unlabeled(MarshalType::simple("Int"))],
            return_type: Box::new(MarshalType::unit()),
            is_escaping: true,
        };
        let json = serde_json::to_string(&ty).unwrap();
        let back: MarshalType = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, back);
    }
}
