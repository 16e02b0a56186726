//! Type-spec lexing and parsing errors.

use thiserror::Error;

/// Convenience alias for results within the typespec crate.
pub type Result<T> = std::result::Result<T, TypeSpecError>;

/// Errors produced while lexing or parsing a type-spec string.
///
/// Each variant maps to a stable numeric code via [`TypeSpecError::code`]
/// so that tooling can key on codes instead of message text. A failure is
/// always fatal to the one type-spec string being parsed; there is no
/// recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeSpecError {
    /// A character outside every recognized lexical class.
    #[error("unrecognized character '{character}' in type specification")]
    UnrecognizedCharacter { character: char },

    /// A `-` that did not begin a `->` arrow.
    #[error("expected '>' after '-' in type specification")]
    IncompleteArrow,

    /// A token that fits no production at its position.
    #[error("unexpected token '{token}'")]
    UnexpectedToken { token: String },

    /// Input ended in the middle of a type.
    #[error("unexpected end of input while parsing a type")]
    UnexpectedEnd,

    /// Input ended inside a delimited list.
    #[error("unexpected end of input while parsing a {while_parsing}")]
    UnexpectedListEnd { while_parsing: &'static str },

    /// `throws` not followed by `->`.
    #[error("unexpected token '{token}' after 'throws' in a closure")]
    ThrowsWithoutArrow { token: String },

    /// A `.` inner-type chain rooted at a non-named type.
    #[error("in an inner type (type.type), the first element is a {kind} instead of a named type")]
    InnerTypeOnUnnamed { kind: &'static str },

    /// A `.` inner-type chain whose right side is not a named type.
    #[error("in an inner type (type.type), the second element is a {kind} instead of a named type")]
    InnerTypeNotNamed { kind: &'static str },

    /// `@` not followed by an attribute name.
    #[error("unexpected token '{token}', expected a name while parsing an attribute")]
    AttributeNameExpected { token: String },

    /// A non-name token inside attribute brackets.
    #[error("unexpected token '{token}' while parsing attribute parameters")]
    AttributeParameterUnexpected { token: String },

    /// Missing `]` after an array or dictionary.
    #[error("expected a right bracket after an array or dictionary, found '{token}'")]
    ExpectedRightBracket { token: String },

    /// A `&` protocol list rooted at a non-named type.
    #[error("a protocol composition must start with a named type, found a {kind}")]
    ProtocolListOnUnnamed { kind: &'static str },

    /// A non-name token after `&` in a protocol list.
    #[error("unexpected token '{token}' while parsing a protocol list")]
    ProtocolListUnexpectedToken { token: String },

    /// A `<` generic-argument list on a non-named type.
    #[error("generic arguments are only valid on a named type, found a {kind}")]
    GenericsOnUnnamed { kind: &'static str },

    /// Leftover tokens after a complete top-level type.
    #[error("trailing token '{token}' after a complete type")]
    TrailingTokens { token: String },
}

impl TypeSpecError {
    /// Stable numeric code for this error.
    pub fn code(&self) -> u32 {
        match self {
            TypeSpecError::UnrecognizedCharacter { .. } => 100,
            TypeSpecError::IncompleteArrow => 101,
            TypeSpecError::UnexpectedToken { .. } => 110,
            TypeSpecError::ThrowsWithoutArrow { .. } => 111,
            TypeSpecError::InnerTypeOnUnnamed { .. } => 112,
            TypeSpecError::InnerTypeNotNamed { .. } => 113,
            TypeSpecError::AttributeNameExpected { .. } => 115,
            TypeSpecError::AttributeParameterUnexpected { .. } => 116,
            TypeSpecError::UnexpectedListEnd { .. } => 118,
            TypeSpecError::UnexpectedEnd => 119,
            TypeSpecError::ExpectedRightBracket { .. } => 121,
            TypeSpecError::ProtocolListOnUnnamed { .. } => 122,
            TypeSpecError::ProtocolListUnexpectedToken { .. } => 123,
            TypeSpecError::GenericsOnUnnamed { .. } => 124,
            TypeSpecError::TrailingTokens { .. } => 125,
        }
    }
}
