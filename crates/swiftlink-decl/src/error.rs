//! Declaration-model errors.

use thiserror::Error;

use swiftlink_typespec::TypeSpecError;

/// Convenience alias for results within the decl crate.
pub type Result<T> = std::result::Result<T, DeclError>;

/// Errors raised while building declaration records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclError {
    /// A parameter or return type-spec string failed to parse.
    #[error("unable to parse type name '{type_name}': {source}")]
    BadTypeName {
        type_name: String,
        #[source]
        source: TypeSpecError,
    },
}
