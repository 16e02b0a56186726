//! Declaration model for the swiftlink binding generator.
//!
//! Holds the source-level view of a foreign module's API: functions and
//! accessors with their parameter lists, the per-declaration generic
//! coordinate context, and the registry of known foreign entities. The
//! marshal mapper and the signature matcher both borrow these records
//! read-only.
//!
//! ## Modules
//!
//! - [`parameter`] — declared parameters
//! - [`function`] — function/accessor/constructor/destructor declarations
//! - [`generics`] — generic declarations, constraints, coordinate context
//! - [`registry`] — known foreign entities
//! - [`error`] — declaration-model errors

pub mod error;
pub mod function;
pub mod generics;
pub mod parameter;
pub mod registry;

// Re-export key types for convenience
pub use error::DeclError;
pub use function::{
    AccessorKind, FunctionDeclaration, FunctionKind, ParentEntity, PROPERTY_GETTER_PREFIX,
    PROPERTY_MATERIALIZER_PREFIX, PROPERTY_SETTER_PREFIX,
};
pub use generics::{Constraint, GenericContext, GenericDeclaration};
pub use parameter::ParameterItem;
pub use registry::{Entity, EntityKind, EntityRegistry};
