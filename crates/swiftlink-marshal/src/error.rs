//! Mapping error taxonomy.
//!
//! Every variant names the fully-qualified declaration that failed so a
//! driver can skip that one declaration and keep processing the module.

use thiserror::Error;

/// Errors raised while projecting declarations onto marshal types.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// Throwing closures cannot cross the ABI boundary as a value.
    #[error("cannot marshal throwing closure `{closure}` in `{declaration}`")]
    ThrowingClosure { declaration: String, closure: String },

    /// An `inout` parameter whose type resolves to no known entity.
    #[error(
        "unknown type `{type_name}` for inout parameter `{parameter}` in `{declaration}`"
    )]
    UnknownParameterType {
        declaration: String,
        parameter: String,
        type_name: String,
    },

    /// Equality generic constraints are not supported.
    #[error("equality generic constraint is not supported in `{declaration}`")]
    UnsupportedEqualityConstraint { declaration: String },

    /// A variadic parameter in an override must be declared as an array.
    #[error("variadic parameter `{parameter}` in `{declaration}` is not an array type")]
    VariadicNotArray {
        declaration: String,
        parameter: String,
    },

    /// A type mentions a generic parameter the declaration never declared.
    #[error("generic parameter `{name}` in `{declaration}` has no coordinate")]
    UnresolvedGenericParameter { declaration: String, name: String },
}

pub type Result<T> = std::result::Result<T, MarshalError>;
