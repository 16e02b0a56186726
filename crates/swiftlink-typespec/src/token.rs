//! Tokenizer for Swift type-specification strings.
//!
//! Lexes a type-spec string into a flat token stream with one-token
//! lookahead. Identifiers are matched greedily and may be dotted
//! (`Swift.Int` is one token); an identifier immediately followed by `:`
//! lexes as a [`Token::TypeLabel`]. Whitespace is insignificant except as
//! a separator.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Result, TypeSpecError};

/// A single token lexed from a type-spec string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `@`, introducing an attribute.
    At,
    /// An identifier, possibly dotted (`Swift.Int`).
    TypeName(String),
    /// An identifier immediately followed by `:`, used as an external label.
    TypeLabel(String),
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftAngle,
    RightAngle,
    /// `->`
    Arrow,
    Period,
    Ampersand,
    QuestionMark,
    ExclamationPoint,
    Colon,
    Comma,
    /// End-of-input sentinel.
    Done,
}

impl Token {
    /// The textual form of the token, used in error messages.
    pub fn text(&self) -> String {
        match self {
            Token::At => "@".to_string(),
            Token::TypeName(name) => name.clone(),
            Token::TypeLabel(label) => format!("{label}:"),
            Token::LeftParen => "(".to_string(),
            Token::RightParen => ")".to_string(),
            Token::LeftBracket => "[".to_string(),
            Token::RightBracket => "]".to_string(),
            Token::LeftAngle => "<".to_string(),
            Token::RightAngle => ">".to_string(),
            Token::Arrow => "->".to_string(),
            Token::Period => ".".to_string(),
            Token::Ampersand => "&".to_string(),
            Token::QuestionMark => "?".to_string(),
            Token::ExclamationPoint => "!".to_string(),
            Token::Colon => ":".to_string(),
            Token::Comma => ",".to_string(),
            Token::Done => "end of input".to_string(),
        }
    }
}

/// Streaming tokenizer with one-token lookahead.
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    lookahead: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            chars: input.chars().peekable(),
            lookahead: None,
        }
    }

    /// Return the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.lex()?);
        }
        // The lookahead was just filled above, so the insert never runs.
        Ok(self.lookahead.get_or_insert(Token::Done))
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.lex(),
        }
    }

    fn lex(&mut self) -> Result<Token> {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
        let Some(&c) = self.chars.peek() else {
            return Ok(Token::Done);
        };
        if is_identifier_start(c) {
            return Ok(self.lex_identifier());
        }
        self.chars.next();
        match c {
            '@' => Ok(Token::At),
            '(' => Ok(Token::LeftParen),
            ')' => Ok(Token::RightParen),
            '[' => Ok(Token::LeftBracket),
            ']' => Ok(Token::RightBracket),
            '<' => Ok(Token::LeftAngle),
            '>' => Ok(Token::RightAngle),
            '.' => Ok(Token::Period),
            '&' => Ok(Token::Ampersand),
            '?' => Ok(Token::QuestionMark),
            '!' => Ok(Token::ExclamationPoint),
            ':' => Ok(Token::Colon),
            ',' => Ok(Token::Comma),
            '-' => {
                if matches!(self.chars.peek(), Some('>')) {
                    self.chars.next();
                    Ok(Token::Arrow)
                } else {
                    Err(TypeSpecError::IncompleteArrow)
                }
            }
            other => Err(TypeSpecError::UnrecognizedCharacter { character: other }),
        }
    }

    fn lex_identifier(&mut self) -> Token {
        let mut name = String::new();
        while matches!(self.chars.peek(), Some(&c) if is_identifier_continue(c)) {
            // The match guard just confirmed a character is present.
            if let Some(c) = self.chars.next() {
                name.push(c);
            }
        }
        // An identifier immediately followed by ':' is an external label.
        if matches!(self.chars.peek(), Some(':')) {
            self.chars.next();
            Token::TypeLabel(name)
        } else {
            Token::TypeName(name)
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tokens(input: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token().unwrap();
            if token == Token::Done {
                return tokens;
            }
            tokens.push(token);
        }
    }

    #[test]
    fn lex_dotted_name_as_one_token() {
        assert_eq!(
            all_tokens("Swift.Int"),
            vec![Token::TypeName("Swift.Int".to_string())]
        );
    }

    #[test]
    fn lex_label() {
        assert_eq!(
            all_tokens("a: Swift.Int"),
            vec![
                Token::TypeLabel("a".to_string()),
                Token::TypeName("Swift.Int".to_string())
            ]
        );
    }

    #[test]
    fn label_requires_adjacent_colon() {
        assert_eq!(
            all_tokens("a : Swift.Int"),
            vec![
                Token::TypeName("a".to_string()),
                Token::Colon,
                Token::TypeName("Swift.Int".to_string())
            ]
        );
    }

    #[test]
    fn lex_closure_tokens() {
        assert_eq!(
            all_tokens("(Swift.Int) -> Swift.Bool"),
            vec![
                Token::LeftParen,
                Token::TypeName("Swift.Int".to_string()),
                Token::RightParen,
                Token::Arrow,
                Token::TypeName("Swift.Bool".to_string())
            ]
        );
    }

    #[test]
    fn lex_period_after_generics() {
        assert_eq!(
            all_tokens("Foo<T>.Bar"),
            vec![
                Token::TypeName("Foo".to_string()),
                Token::LeftAngle,
                Token::TypeName("T".to_string()),
                Token::RightAngle,
                Token::Period,
                Token::TypeName("Bar".to_string())
            ]
        );
    }

    #[test]
    fn lex_postfix_and_attribute_tokens() {
        assert_eq!(
            all_tokens("@escaping T?!"),
            vec![
                Token::At,
                Token::TypeName("escaping".to_string()),
                Token::TypeName("T".to_string()),
                Token::QuestionMark,
                Token::ExclamationPoint
            ]
        );
    }

    #[test]
    fn peek_does_not_consume() {
        let mut tokenizer = Tokenizer::new("A B");
        assert_eq!(*tokenizer.peek().unwrap(), Token::TypeName("A".to_string()));
        assert_eq!(*tokenizer.peek().unwrap(), Token::TypeName("A".to_string()));
        assert_eq!(tokenizer.next_token().unwrap(), Token::TypeName("A".to_string()));
        assert_eq!(tokenizer.next_token().unwrap(), Token::TypeName("B".to_string()));
        assert_eq!(tokenizer.next_token().unwrap(), Token::Done);
    }

    #[test]
    fn bare_dash_is_a_lexical_error() {
        let mut tokenizer = Tokenizer::new("A - B");
        assert_eq!(tokenizer.next_token().unwrap(), Token::TypeName("A".to_string()));
        assert_eq!(tokenizer.next_token(), Err(TypeSpecError::IncompleteArrow));
    }

    #[test]
    fn unrecognized_character() {
        let mut tokenizer = Tokenizer::new("$");
        assert_eq!(
            tokenizer.next_token(),
            Err(TypeSpecError::UnrecognizedCharacter { character: '$' })
        );
    }
}
