//! The low-level signature vocabulary.
//!
//! These records describe function signatures recovered from a compiled
//! binary's symbol information, independent of the declared source-level
//! API. They are read-only inputs to the matcher; a symbol-table loader
//! populates them.

use serde::{Deserialize, Serialize};

use swiftlink_decl::AccessorKind;

/// Built-in scalar value types as they appear in recovered signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuiltinScalar {
    Bool,
    Double,
    Float,
    Int,
    UInt,
}

impl BuiltinScalar {
    /// The qualified source-level name the scalar corresponds to.
    pub fn swift_name(&self) -> &'static str {
        match self {
            BuiltinScalar::Bool => "Swift.Bool",
            BuiltinScalar::Double => "Swift.Double",
            BuiltinScalar::Float => "Swift.Float",
            BuiltinScalar::Int => "Swift.Int",
            BuiltinScalar::UInt => "Swift.UInt",
        }
    }
}

/// One recovered type with its positional markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowLevelType {
    pub kind: LowLevelKind,
    /// Parameter label, when the symbol information preserves one.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub is_variadic: bool,
    /// Passed by reference (the recovered side of `inout`).
    #[serde(default)]
    pub is_reference: bool,
}

/// The runtime-type vocabulary of recovered signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LowLevelKind {
    Scalar(BuiltinScalar),
    /// A nominal class, struct, or enum, fully qualified.
    Class { name: String },
    /// The metatype of a nominal type.
    MetaClass { class_name: String },
    /// A nominal type applied to generic arguments.
    BoundGeneric {
        name: String,
        bound: Vec<LowLevelType>,
    },
    Tuple { elements: Vec<LowLevelType> },
    /// A protocol composition; a single entry is a bare protocol reference.
    ProtocolList { protocols: Vec<String> },
    /// A generic parameter by coordinate.
    GenericReference { depth: usize, index: usize },
    Function {
        parameters: Vec<LowLevelType>,
        return_type: Box<LowLevelType>,
    },
}

impl LowLevelType {
    pub fn new(kind: LowLevelKind) -> Self {
        LowLevelType {
            kind,
            label: None,
            is_variadic: false,
            is_reference: false,
        }
    }

    pub fn scalar(scalar: BuiltinScalar) -> Self {
        LowLevelType::new(LowLevelKind::Scalar(scalar))
    }

    pub fn class(name: impl Into<String>) -> Self {
        LowLevelType::new(LowLevelKind::Class { name: name.into() })
    }

    pub fn tuple(elements: Vec<LowLevelType>) -> Self {
        LowLevelType::new(LowLevelKind::Tuple { elements })
    }

    pub fn empty_tuple() -> Self {
        LowLevelType::tuple(Vec::new())
    }

    pub fn generic_reference(depth: usize, index: usize) -> Self {
        LowLevelType::new(LowLevelKind::GenericReference { depth, index })
    }

    /// Builder-style label attachment.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.is_variadic = true;
        self
    }

    pub fn is_empty_tuple(&self) -> bool {
        matches!(&self.kind, LowLevelKind::Tuple { elements } if elements.is_empty())
    }
}

/// What kind of entry point a recovered signature is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureKind {
    Function,
    Constructor { allocating: bool },
    Destructor { deallocating: bool },
    Getter,
    Setter,
    Materializer,
    Subscript { accessor: AccessorKind },
}

impl SignatureKind {
    pub fn is_allocating_constructor(&self) -> bool {
        matches!(self, SignatureKind::Constructor { allocating: true })
    }

    pub fn is_deallocating_destructor(&self) -> bool {
        matches!(self, SignatureKind::Destructor { deallocating: true })
    }
}

/// One recovered signature.
///
/// `parameters` is the uncurried parameter clump: usually a tuple, a
/// single bare type for unary functions. `uncurried_parameter` is the
/// implicit receiver carried by curried instance members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowLevelSignature {
    pub parameters: LowLevelType,
    pub return_type: LowLevelType,
    #[serde(default)]
    pub uncurried_parameter: Option<LowLevelType>,
}

impl LowLevelSignature {
    pub fn new(parameters: LowLevelType, return_type: LowLevelType) -> Self {
        LowLevelSignature {
            parameters,
            return_type,
            uncurried_parameter: None,
        }
    }

    pub fn with_receiver(mut self, receiver: LowLevelType) -> Self {
        self.uncurried_parameter = Some(receiver);
        self
    }

    /// Number of parameter positions: tuple length, or 1 for a bare type.
    pub fn parameter_count(&self) -> usize {
        match &self.parameters.kind {
            LowLevelKind::Tuple { elements } => elements.len(),
            _ => 1,
        }
    }

    pub fn parameter_at(&self, index: usize) -> Option<&LowLevelType> {
        match &self.parameters.kind {
            LowLevelKind::Tuple { elements } => elements.get(index),
            _ if index == 0 => Some(&self.parameters),
            _ => None,
        }
    }
}

/// One recovered function symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TLFunction {
    pub name: String,
    pub module: String,
    pub kind: SignatureKind,
    pub is_top_level: bool,
    pub signature: LowLevelSignature,
}

impl TLFunction {
    pub fn top_level(
        module: impl Into<String>,
        name: impl Into<String>,
        signature: LowLevelSignature,
    ) -> Self {
        TLFunction {
            name: name.into(),
            module: module.into(),
            kind: SignatureKind::Function,
            is_top_level: true,
            signature,
        }
    }

    pub fn member(
        module: impl Into<String>,
        name: impl Into<String>,
        kind: SignatureKind,
        signature: LowLevelSignature,
    ) -> Self {
        TLFunction {
            name: name.into(),
            module: module.into(),
            kind,
            is_top_level: false,
            signature,
        }
    }
}
