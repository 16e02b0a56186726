//! Declared-API to binary-signature reconciliation for the swiftlink
//! binding generator.
//!
//! Consumes declarations from `swiftlink-decl` and recovered low-level
//! signatures, and finds the exact entry point a generated call site must
//! invoke. "No match" is an expected outcome here, not an error; this
//! crate deliberately has no error type.
//!
//! ## Modules
//!
//! - [`lowlevel`] — the recovered-signature vocabulary
//! - [`inventory`] — per-module candidate pools
//! - [`matcher`] — narrowing and structural matching

pub mod inventory;
pub mod lowlevel;
pub mod matcher;

// Re-export key types for convenience
pub use inventory::{ClassContents, ModuleContents, PropertyContents};
pub use lowlevel::{
    BuiltinScalar, LowLevelKind, LowLevelSignature, LowLevelType, SignatureKind, TLFunction,
};
pub use matcher::{match_declaration, MatchOutcome};
