//! Recursive-descent parser for type-spec strings.
//!
//! One recursive function over four zones, in fixed order: prefix
//! (attributes, `inout`, label), core (tuple, name, or bracketed
//! array/dictionary), suffix (`throws ->` / `->`, `<...>`, `.inner`,
//! `&...`), and postfix (`?` / `!`). Any token mismatch fails the whole
//! parse of that one string; there is no recovery.

use crate::error::{Result, TypeSpecError};
use crate::spec::{
    TypeSpec, TypeSpecAttribute, TypeSpecKind, IMPLICITLY_UNWRAPPED_OPTIONAL, OPTIONAL,
};
use crate::token::{Token, Tokenizer};

/// Renamed foreign module: specs written against the old name still parse.
const LEGACY_MODULE_PREFIX: &str = "ObjectiveC.";
const CURRENT_MODULE_PREFIX: &str = "Foundation.";

/// Parse one type-spec string into a [`TypeSpec`] tree.
///
/// The entire input must form a single type; trailing tokens are rejected.
pub fn parse_type_spec(text: &str) -> Result<TypeSpec> {
    let mut parser = TypeSpecParser::new(text);
    let spec = parser.parse()?;
    match parser.tokenizer.peek()? {
        Token::Done => Ok(spec),
        other => Err(TypeSpecError::TrailingTokens { token: other.text() }),
    }
}

struct TypeSpecParser<'a> {
    tokenizer: Tokenizer<'a>,
}

impl<'a> TypeSpecParser<'a> {
    fn new(text: &'a str) -> Self {
        TypeSpecParser {
            tokenizer: Tokenizer::new(text),
        }
    }

    fn parse(&mut self) -> Result<TypeSpec> {
        // Prefix
        let attributes = if matches!(self.tokenizer.peek()?, Token::At) {
            self.parse_attributes()?
        } else {
            Vec::new()
        };

        let mut is_inout = false;
        if matches!(self.tokenizer.peek()?, Token::TypeName(name) if name == "inout") {
            self.tokenizer.next_token()?;
            is_inout = true;
        }

        let mut type_label = None;
        if matches!(self.tokenizer.peek()?, Token::TypeLabel(_)) {
            if let Token::TypeLabel(label) = self.tokenizer.next_token()? {
                type_label = Some(label);
            }
        }

        // Core
        let mut spec = match self.tokenizer.next_token()? {
            Token::LeftParen => {
                let mut elements = Vec::new();
                self.consume_list(&mut elements, Token::RightParen, "tuple")?;
                // A single unlabeled element collapses to that element; its
                // label (if any) becomes the result's label.
                let collapsed = if elements.len() == 1 {
                    match elements.pop() {
                        Some(element) => element,
                        None => TypeSpec::tuple(elements),
                    }
                } else {
                    TypeSpec::tuple(elements)
                };
                if type_label.is_none() {
                    type_label = collapsed.type_label.clone();
                }
                collapsed
            }
            Token::TypeName(name) => TypeSpec::named(rewrite_legacy_module(&name)),
            Token::LeftBracket => self.parse_array()?,
            Token::Done => return Err(TypeSpecError::UnexpectedEnd),
            other => {
                return Err(TypeSpecError::UnexpectedToken { token: other.text() });
            }
        };

        // Look-ahead suffixes on the core type
        if matches!(self.tokenizer.peek()?, Token::TypeName(name) if name == "throws") {
            self.tokenizer.next_token()?;
            if !matches!(self.tokenizer.peek()?, Token::Arrow) {
                return Err(TypeSpecError::ThrowsWithoutArrow {
                    token: self.tokenizer.peek()?.text(),
                });
            }
            self.tokenizer.next_token()?;
            spec = self.parse_closure(spec, true)?;
        }

        if matches!(self.tokenizer.peek()?, Token::Arrow) {
            self.tokenizer.next_token()?;
            spec = self.parse_closure(spec, false)?;
        } else if matches!(self.tokenizer.peek()?, Token::LeftAngle) {
            self.tokenizer.next_token()?;
            spec = self.genericize(spec)?;
        }

        if matches!(self.tokenizer.peek()?, Token::Period) {
            self.tokenizer.next_token()?;
            if !matches!(spec.kind, TypeSpecKind::Named(_)) {
                return Err(TypeSpecError::InnerTypeOnUnnamed {
                    kind: spec.kind_name(),
                });
            }
            let inner = self.parse()?;
            if !matches!(inner.kind, TypeSpecKind::Named(_)) {
                return Err(TypeSpecError::InnerTypeNotNamed {
                    kind: inner.kind_name(),
                });
            }
            if let TypeSpecKind::Named(named) = &mut spec.kind {
                named.inner = Some(Box::new(inner));
            }
        }

        if matches!(self.tokenizer.peek()?, Token::Ampersand) {
            spec = self.parse_protocol_list(spec)?;
        }

        // Postfix: each `?`/`!` wraps once, left to right.
        loop {
            match self.tokenizer.peek()? {
                Token::QuestionMark => {
                    self.tokenizer.next_token()?;
                    spec = wrap_as_bound_generic(spec, OPTIONAL);
                }
                Token::ExclamationPoint => {
                    self.tokenizer.next_token()?;
                    spec = wrap_as_bound_generic(spec, IMPLICITLY_UNWRAPPED_OPTIONAL);
                }
                _ => break,
            }
        }

        // Finalization
        spec.is_inout = is_inout;
        spec.type_label = type_label;
        spec.attributes.extend(attributes);
        Ok(spec)
    }

    fn parse_attributes(&mut self) -> Result<Vec<TypeSpecAttribute>> {
        let mut attributes = Vec::new();
        loop {
            if !matches!(self.tokenizer.peek()?, Token::At) {
                return Ok(attributes);
            }
            self.tokenizer.next_token()?;
            let name = match self.tokenizer.next_token()? {
                Token::TypeName(name) => name,
                other => {
                    return Err(TypeSpecError::AttributeNameExpected { token: other.text() });
                }
            };
            let mut attribute = TypeSpecAttribute::new(name);
            if matches!(self.tokenizer.peek()?, Token::LeftBracket) {
                self.tokenizer.next_token()?;
                self.parse_attribute_parameters(&mut attribute.parameters)?;
            }
            attributes.push(attribute);
        }
    }

    fn parse_attribute_parameters(&mut self, parameters: &mut Vec<String>) -> Result<()> {
        loop {
            if matches!(self.tokenizer.peek()?, Token::RightBracket) {
                self.tokenizer.next_token()?;
                return Ok(());
            }
            match self.tokenizer.next_token()? {
                Token::TypeName(value) => parameters.push(value),
                other => {
                    return Err(TypeSpecError::AttributeParameterUnexpected {
                        token: other.text(),
                    });
                }
            }
            if matches!(self.tokenizer.peek()?, Token::Comma) {
                self.tokenizer.next_token()?;
            }
        }
    }

    fn consume_list(
        &mut self,
        elements: &mut Vec<TypeSpec>,
        terminator: Token,
        what: &'static str,
    ) -> Result<()> {
        loop {
            if *self.tokenizer.peek()? == terminator {
                self.tokenizer.next_token()?;
                return Ok(());
            }
            if matches!(self.tokenizer.peek()?, Token::Done) {
                return Err(TypeSpecError::UnexpectedListEnd {
                    while_parsing: what,
                });
            }
            elements.push(self.parse()?);
            if matches!(self.tokenizer.peek()?, Token::Comma) {
                self.tokenizer.next_token()?;
            }
        }
    }

    fn genericize(&mut self, mut spec: TypeSpec) -> Result<TypeSpec> {
        let TypeSpecKind::Named(named) = &mut spec.kind else {
            return Err(TypeSpecError::GenericsOnUnnamed {
                kind: spec.kind_name(),
            });
        };
        self.consume_list(&mut named.generic_params, Token::RightAngle, "generic parameter list")?;
        Ok(spec)
    }

    fn parse_closure(&mut self, arguments: TypeSpec, throws: bool) -> Result<TypeSpec> {
        let return_type = self.parse()?;
        Ok(TypeSpec::closure(arguments, return_type, throws))
    }

    fn parse_protocol_list(&mut self, first: TypeSpec) -> Result<TypeSpec> {
        if !matches!(first.kind, TypeSpecKind::Named(_)) {
            return Err(TypeSpecError::ProtocolListOnUnnamed {
                kind: first.kind_name(),
            });
        }
        let mut protocols = vec![first];
        while matches!(self.tokenizer.peek()?, Token::Ampersand) {
            self.tokenizer.next_token()?;
            match self.tokenizer.next_token()? {
                Token::TypeName(name) => {
                    protocols.push(TypeSpec::named(rewrite_legacy_module(&name)));
                }
                other => {
                    return Err(TypeSpecError::ProtocolListUnexpectedToken {
                        token: other.text(),
                    });
                }
            }
        }
        Ok(TypeSpec::protocol_list(protocols))
    }

    fn parse_array(&mut self) -> Result<TypeSpec> {
        let mut key = self.parse()?;
        if matches!(self.tokenizer.peek()?, Token::Colon) {
            self.tokenizer.next_token()?;
            let value = self.parse()?;
            self.expect_right_bracket()?;
            return Ok(dictionary_of(key, value));
        }
        self.expect_right_bracket()?;
        // An unspaced dictionary key (`[String:Int]`) lexes as a type label
        // on the sole element; reinterpret it as the key.
        if let Some(label) = key.type_label.take() {
            let key_spec = TypeSpec::named(rewrite_legacy_module(&label));
            return Ok(dictionary_of(key_spec, key));
        }
        Ok(array_of(key))
    }

    fn expect_right_bracket(&mut self) -> Result<()> {
        match self.tokenizer.next_token()? {
            Token::RightBracket => Ok(()),
            other => Err(TypeSpecError::ExpectedRightBracket { token: other.text() }),
        }
    }
}

fn wrap_as_bound_generic(spec: TypeSpec, name: &str) -> TypeSpec {
    TypeSpec::named_with(name, vec![spec])
}

fn array_of(element: TypeSpec) -> TypeSpec {
    TypeSpec::named_with("Swift.Array", vec![element])
}

fn dictionary_of(key: TypeSpec, value: TypeSpec) -> TypeSpec {
    TypeSpec::named_with("Swift.Dictionary", vec![key, value])
}

fn rewrite_legacy_module(name: &str) -> String {
    match name.strip_prefix(LEGACY_MODULE_PREFIX) {
        Some(rest) => format!("{CURRENT_MODULE_PREFIX}{rest}"),
        None => name.to_string(),
    }
}
