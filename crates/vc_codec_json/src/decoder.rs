use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use vc_codec::format::{Capabilities, Decoder, Primitive, PrimitiveKind};
use vc_codec::{CodecError, Position};

use crate::{Node, TYPE_FIELD, VALUE_FIELD};

enum Frame {
    Object {
        members: vec::IntoIter<(String, Node)>,
        key: Option<String>,
    },
    Array {
        items: vec::IntoIter<Node>,
        index: Option<usize>,
    },
}

/// Walks a [`Node`] for a codec.
///
/// Errors carry the path of the offending value, e.g. `$.items[2].name`.
pub struct JsonDecoder {
    /// The next value to be consumed.
    pending: Option<Node>,
    stack: Vec<Frame>,
}

impl JsonDecoder {
    #[inline]
    pub fn new(root: Node) -> Self {
        Self {
            pending: Some(root),
            stack: Vec::new(),
        }
    }

    /// Returns `true` once the root value has been consumed.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.pending.is_none() && self.stack.is_empty()
    }

    fn path(&self) -> String {
        let mut path = String::from("$");
        for frame in &self.stack {
            match frame {
                Frame::Object { key: Some(key), .. } => {
                    let _ = write!(path, ".{key}");
                }
                Frame::Array { index: Some(index), .. } => {
                    let _ = write!(path, "[{index}]");
                }
                _ => {}
            }
        }
        path
    }

    fn take(&mut self, expected: &str) -> Result<Node, CodecError> {
        self.pending
            .take()
            .ok_or_else(|| CodecError::malformed(expected, "no value", self.position()))
    }

    fn mismatch(&self, expected: impl Into<String>, found: &Node) -> CodecError {
        CodecError::malformed(expected, found.describe(), self.position())
    }

    fn float(&self, kind: PrimitiveKind, node: &Node) -> Option<Primitive<'static>> {
        let value = match node {
            Node::Float(v) => *v,
            Node::Int(v) => *v as f64,
            Node::UInt(v) => *v as f64,
            Node::Str(s) => match s.as_str() {
                "NaN" => f64::NAN,
                "Infinity" => f64::INFINITY,
                "-Infinity" => f64::NEG_INFINITY,
                _ => return None,
            },
            _ => return None,
        };
        Primitive::float(kind, value)
    }
}

impl Decoder for JsonDecoder {
    #[inline]
    fn capabilities(&self) -> Capabilities {
        Capabilities::DEFAULT
    }

    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<Primitive<'static>, CodecError> {
        let node = match self.take(kind.name())? {
            Node::Str(s) if kind == PrimitiveKind::Str => return Ok(Primitive::Str(Cow::Owned(s))),
            node => node,
        };
        let value = match (&node, kind) {
            (Node::Bool(v), PrimitiveKind::Bool) => Some(Primitive::Bool(*v)),
            (Node::Int(v), _) if kind.is_integer() => Primitive::integer(kind, (*v).into()),
            (Node::UInt(v), _) if kind.is_integer() => Primitive::integer(kind, (*v).into()),
            (_, _) if kind.is_float() => self.float(kind, &node),
            (Node::Str(s), PrimitiveKind::Char) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Primitive::Char(c)),
                    _ => None,
                }
            }
            _ => None,
        };
        value.ok_or_else(|| self.mismatch(kind.name(), &node))
    }

    fn decode_null(&mut self) -> Result<bool, CodecError> {
        match &self.pending {
            Some(Node::Null) => {
                self.pending = None;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(CodecError::malformed("a value", "no value", self.position())),
        }
    }

    fn decode_dynamic_type(&mut self) -> Result<Option<String>, CodecError> {
        let Some(Node::Object(members)) = &mut self.pending else {
            return Ok(None);
        };
        if members.first().is_none_or(|(key, _)| key != TYPE_FIELD) {
            return Ok(None);
        }

        let (_, tag) = members.remove(0);
        let Node::Str(tag) = tag else {
            let found = tag.describe();
            return Err(CodecError::malformed("a type name", found, self.position()));
        };

        // `{"@type": .., "@value": ..}` wraps a value that is not an object.
        if members.len() == 1 && members[0].0 == VALUE_FIELD {
            let (_, value) = members.remove(0);
            self.pending = Some(value);
        }
        Ok(Some(tag))
    }

    fn begin_object(&mut self) -> Result<(), CodecError> {
        match self.take("an object")? {
            Node::Object(members) => {
                self.stack.push(Frame::Object {
                    members: members.into_iter(),
                    key: None,
                });
                Ok(())
            }
            other => Err(self.mismatch("an object", &other)),
        }
    }

    fn next_field(&mut self) -> Result<Option<String>, CodecError> {
        if self.pending.is_some() {
            return Err(CodecError::custom(format!(
                "value of field at {} was not consumed",
                self.path()
            )));
        }
        let Some(Frame::Object { members, key }) = self.stack.last_mut() else {
            return Err(CodecError::custom("field requested outside of an object"));
        };
        match members.next() {
            Some((name, value)) => {
                *key = Some(name.clone());
                self.pending = Some(value);
                Ok(Some(name))
            }
            None => {
                *key = None;
                Ok(None)
            }
        }
    }

    fn end_object(&mut self) -> Result<(), CodecError> {
        let at = self.position();
        match self.stack.pop() {
            Some(Frame::Object { mut members, .. }) => match members.next() {
                None => Ok(()),
                Some((name, _)) => Err(CodecError::malformed(
                    "end of object",
                    format!("field `{name}`"),
                    at,
                )),
            },
            _ => Err(CodecError::custom("unbalanced end of object")),
        }
    }

    fn begin_array(&mut self) -> Result<Option<usize>, CodecError> {
        match self.take("an array")? {
            Node::Array(items) => {
                let len = items.len();
                self.stack.push(Frame::Array {
                    items: items.into_iter(),
                    index: None,
                });
                Ok(Some(len))
            }
            other => Err(self.mismatch("an array", &other)),
        }
    }

    fn has_next_element(&mut self) -> Result<bool, CodecError> {
        if self.pending.is_some() {
            return Ok(true);
        }
        let Some(Frame::Array { items, index }) = self.stack.last_mut() else {
            return Err(CodecError::custom("element requested outside of an array"));
        };
        match items.next() {
            Some(item) => {
                *index = Some(index.map_or(0, |i| i + 1));
                self.pending = Some(item);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn end_array(&mut self) -> Result<(), CodecError> {
        let at = self.position();
        match self.stack.pop() {
            Some(Frame::Array { items, .. }) if items.as_slice().is_empty() && self.pending.is_none() => Ok(()),
            Some(Frame::Array { .. }) => Err(CodecError::malformed("end of array", "more elements", at)),
            _ => Err(CodecError::custom("unbalanced end of array")),
        }
    }

    fn skip_value(&mut self) -> Result<(), CodecError> {
        self.take("a value").map(drop)
    }

    #[inline]
    fn position(&self) -> Option<Position> {
        Some(Position::Path(self.path()))
    }
}
