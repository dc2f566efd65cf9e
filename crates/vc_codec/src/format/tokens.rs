//! A format that stores the encoder calls as a list of tokens.
//!
//! Useful to test codecs without a real format and to hand-write inputs,
//! including malformed ones.
//!
//! ```
//! use vc_codec::CodecCore;
//! use vc_codec::format::tokens::{Token, TokenDecoder, TokenEncoder};
//!
//! let core = CodecCore::new();
//! let mut out = TokenEncoder::new();
//! core.encode(&vec![Some(1_u8), None], &mut out).unwrap();
//!
//! assert_eq!(out.tokens(), &[
//!     Token::Array(2),
//!     Token::value(1_u8),
//!     Token::Null,
//!     Token::EndArray,
//! ]);
//!
//! let mut input = TokenDecoder::new(out.into_tokens());
//! assert_eq!(core.decode::<Vec<Option<u8>>>(&mut input).unwrap(), vec![Some(1), None]);
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::{self, Vec};
use core::iter::Peekable;

use super::{Capabilities, Decoder, Encoder, Primitive, PrimitiveKind};
use crate::{CodecError, Position};

// -----------------------------------------------------------------------------
// Token

/// One encoder call.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Null,
    Value(Primitive<'static>),
    /// Type tag of the next value.
    Tag(String),
    /// Start of an object with the given number of fields.
    Object(usize),
    Field(String),
    EndObject,
    /// Start of an array with the given number of elements.
    Array(usize),
    EndArray,
}

impl Token {
    #[inline]
    pub fn value(value: impl Into<Primitive<'static>>) -> Self {
        Token::Value(value.into())
    }

    #[inline]
    pub fn field(name: impl Into<String>) -> Self {
        Token::Field(name.into())
    }

    #[inline]
    pub fn tag(name: impl Into<String>) -> Self {
        Token::Tag(name.into())
    }

    fn describe(&self) -> String {
        match self {
            Token::Null => "null".into(),
            Token::Value(value) => format!("{} {value}", value.kind()),
            Token::Tag(name) => format!("type tag `{name}`"),
            Token::Object(_) => "object".into(),
            Token::Field(name) => format!("field `{name}`"),
            Token::EndObject => "end of object".into(),
            Token::Array(_) => "array".into(),
            Token::EndArray => "end of array".into(),
        }
    }
}

// -----------------------------------------------------------------------------
// TokenEncoder

/// Records encoder calls as [`Token`]s.
#[derive(Debug, Default)]
pub struct TokenEncoder {
    tokens: Vec<Token>,
    capabilities: Capabilities,
}

impl TokenEncoder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder that reports `capabilities`.
    #[inline]
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            tokens: Vec::new(),
            capabilities,
        }
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl Encoder for TokenEncoder {
    #[inline]
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn encode_primitive(&mut self, value: Primitive<'_>) -> Result<(), CodecError> {
        self.tokens.push(Token::Value(value.into_owned()));
        Ok(())
    }

    fn encode_null(&mut self) -> Result<(), CodecError> {
        self.tokens.push(Token::Null);
        Ok(())
    }

    fn encode_dynamic_type(&mut self, name: &str) -> Result<(), CodecError> {
        if !self.capabilities.dynamic_types {
            return Err(CodecError::Unsupported {
                ty: "type tag",
                reason: "this token stream does not carry type tags".into(),
            });
        }
        self.tokens.push(Token::tag(name));
        Ok(())
    }

    fn begin_object(&mut self, len: usize) -> Result<(), CodecError> {
        self.tokens.push(Token::Object(len));
        Ok(())
    }

    fn encode_field(&mut self, name: &str) -> Result<(), CodecError> {
        self.tokens.push(Token::field(name));
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), CodecError> {
        self.tokens.push(Token::EndObject);
        Ok(())
    }

    fn begin_array(&mut self, len: usize) -> Result<(), CodecError> {
        self.tokens.push(Token::Array(len));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), CodecError> {
        self.tokens.push(Token::EndArray);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// TokenDecoder

/// Replays [`Token`]s as decoder input.
#[derive(Debug)]
pub struct TokenDecoder {
    tokens: Peekable<vec::IntoIter<Token>>,
    index: usize,
    capabilities: Capabilities,
}

impl TokenDecoder {
    #[inline]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_capabilities(tokens, Capabilities::DEFAULT)
    }

    #[inline]
    pub fn with_capabilities(tokens: Vec<Token>, capabilities: Capabilities) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            index: 0,
            capabilities,
        }
    }

    /// Returns `true` once every token is consumed.
    #[inline]
    pub fn is_empty(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    fn eof(&self, expected: &str) -> CodecError {
        CodecError::malformed(expected, "end of input", self.position())
    }

    fn peek(&mut self, expected: &str) -> Result<&Token, CodecError> {
        let at = self.position();
        self.tokens
            .peek()
            .ok_or_else(|| CodecError::malformed(expected, "end of input", at))
    }

    fn next(&mut self, expected: &str) -> Result<Token, CodecError> {
        match self.tokens.next() {
            Some(token) => {
                self.index += 1;
                Ok(token)
            }
            None => Err(self.eof(expected)),
        }
    }

    fn unexpected(&self, expected: &str, found: &Token) -> CodecError {
        // `index` already points past the offending token.
        let at = Position::Token(self.index.saturating_sub(1));
        CodecError::malformed(expected, found.describe(), Some(at))
    }

    fn expect(&mut self, expected: &str, check: fn(&Token) -> bool) -> Result<Token, CodecError> {
        let token = self.next(expected)?;
        if check(&token) {
            Ok(token)
        } else {
            Err(self.unexpected(expected, &token))
        }
    }
}

impl Decoder for TokenDecoder {
    #[inline]
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<Primitive<'static>, CodecError> {
        match self.next(kind.name())? {
            Token::Value(value) if value.kind() == kind => Ok(value),
            Token::Value(value) if kind.is_integer() => {
                match value.as_i128().and_then(|v| Primitive::integer(kind, v)) {
                    Some(converted) => Ok(converted),
                    None => Err(self.unexpected(kind.name(), &Token::Value(value))),
                }
            }
            other => Err(self.unexpected(kind.name(), &other)),
        }
    }

    fn decode_null(&mut self) -> Result<bool, CodecError> {
        if matches!(self.peek("a value")?, Token::Null) {
            self.next("null")?;
            return Ok(true);
        }
        Ok(false)
    }

    fn decode_dynamic_type(&mut self) -> Result<Option<String>, CodecError> {
        if !self.capabilities.dynamic_types {
            return Ok(None);
        }
        if matches!(self.peek("a value")?, Token::Tag(_))
            && let Token::Tag(name) = self.next("type tag")?
        {
            return Ok(Some(name));
        }
        Ok(None)
    }

    fn begin_object(&mut self) -> Result<(), CodecError> {
        self.expect("object", |t| matches!(t, Token::Object(_)))?;
        Ok(())
    }

    fn next_field(&mut self) -> Result<Option<String>, CodecError> {
        match self.peek("field or end of object")? {
            Token::EndObject => Ok(None),
            Token::Field(_) => match self.next("field")? {
                Token::Field(name) => Ok(Some(name)),
                other => Err(self.unexpected("field", &other)),
            },
            _ => {
                let token = self.next("field or end of object")?;
                Err(self.unexpected("field or end of object", &token))
            }
        }
    }

    fn end_object(&mut self) -> Result<(), CodecError> {
        self.expect("end of object", |t| matches!(t, Token::EndObject))?;
        Ok(())
    }

    fn begin_array(&mut self) -> Result<Option<usize>, CodecError> {
        match self.expect("array", |t| matches!(t, Token::Array(_)))? {
            Token::Array(len) => Ok(Some(len)),
            _ => Ok(None),
        }
    }

    fn has_next_element(&mut self) -> Result<bool, CodecError> {
        Ok(!matches!(self.peek("element or end of array")?, Token::EndArray))
    }

    fn end_array(&mut self) -> Result<(), CodecError> {
        self.expect("end of array", |t| matches!(t, Token::EndArray))?;
        Ok(())
    }

    fn skip_value(&mut self) -> Result<(), CodecError> {
        let mut depth = 0_usize;
        loop {
            let token = self.next("a value")?;
            match token {
                Token::Tag(_) => continue,
                Token::Field(_) if depth > 0 => continue,
                Token::Object(_) | Token::Array(_) => depth += 1,
                Token::EndObject | Token::EndArray if depth > 0 => depth -= 1,
                Token::Null | Token::Value(_) => {}
                other => return Err(self.unexpected("a value", &other)),
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    #[inline]
    fn position(&self) -> Option<Position> {
        Some(Position::Token(self.index))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{Token, TokenDecoder};
    use crate::format::{Decoder, Primitive, PrimitiveKind};
    use crate::{CodecError, Position};

    #[test]
    fn skip_nested_values() {
        let mut input = TokenDecoder::new(vec![
            Token::tag("x"),
            Token::Object(1),
            Token::field("a"),
            Token::Array(2),
            Token::value(1),
            Token::Null,
            Token::EndArray,
            Token::EndObject,
            Token::value(true),
        ]);
        input.skip_value().unwrap();
        assert_eq!(
            input.decode_primitive(PrimitiveKind::Bool).unwrap(),
            Primitive::Bool(true)
        );
        assert!(input.is_empty());
    }

    #[test]
    fn integers_are_converted() {
        let mut input = TokenDecoder::new(vec![Token::value(7_i32), Token::value(-1_i32)]);
        assert_eq!(
            input.decode_primitive(PrimitiveKind::U8).unwrap(),
            Primitive::U8(7)
        );
        let err = input.decode_primitive(PrimitiveKind::U8).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Malformed { at, .. } if at.0 == Some(Position::Token(1))
        ));
    }

    #[test]
    fn end_of_input() {
        let mut input = TokenDecoder::new(vec![]);
        assert!(input.decode_null().is_err());
        assert!(input.next_field().is_err());
    }
}
