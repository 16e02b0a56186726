//! Type-specification front end for the swiftlink binding generator.
//!
//! Turns a textual Swift type signature into a structured [`TypeSpec`]
//! tree that the marshal mapper and the signature matcher both consume.
//!
//! ## Modules
//!
//! - [`token`] — tokenizer with one-token lookahead
//! - [`spec`] — the `TypeSpec` data model
//! - [`parse`] — recursive-descent parser
//! - [`error`] — lexing/parsing error taxonomy with stable codes

pub mod error;
pub mod parse;
pub mod spec;
pub mod token;

// Re-export key types for convenience
pub use error::TypeSpecError;
pub use parse::parse_type_spec;
pub use spec::{
    ClosureSpec, NamedSpec, ProtocolListSpec, TupleSpec, TypeSpec, TypeSpecAttribute,
    TypeSpecKind, BUILT_IN_VALUE_TYPES, IMPLICITLY_UNWRAPPED_OPTIONAL, OPTIONAL,
};
pub use token::{Token, Tokenizer};
