//! Marshal-type projection for the swiftlink binding generator.
//!
//! Turns parsed declarations into target-language type shapes an emitter
//! can render as ABI-correct trampolines, including the out-pointer
//! closure shapes and the generic declarations a trampoline must carry.
//!
//! ## Modules
//!
//! - [`marshal`] — the `MarshalType` tree, parameters, module accumulator
//! - [`mapper`] — `TypeMapper`: spec and parameter projection
//! - [`generics`] — generic-declaration gathering with redundancy pruning
//! - [`error`] — mapping error taxonomy

pub mod error;
pub mod generics;
pub mod mapper;
pub mod marshal;

// Re-export key types for convenience
pub use error::MarshalError;
pub use generics::{
    gather_generics, GenericDeclarationCollection, MarshalGenericConstraint,
    MarshalGenericDeclaration,
};
pub use mapper::TypeMapper;
pub use marshal::{
    MarshalElement, MarshalParameter, MarshalType, ModuleReferences, ParameterPassing,
    OPAQUE_POINTER, PLACEHOLDER_LABEL, UNSAFE_MUTABLE_POINTER, UNSAFE_POINTER,
    UNSAFE_RAW_POINTER,
};
