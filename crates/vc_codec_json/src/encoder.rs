use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use vc_codec::CodecError;
use vc_codec::format::{Capabilities, Encoder, Primitive};

use crate::{Node, TYPE_FIELD, VALUE_FIELD};

enum Frame {
    Object {
        members: Vec<(String, Node)>,
        key: Option<String>,
    },
    Array {
        items: Vec<Node>,
        /// Tag announced for the array itself.
        tag: Option<String>,
    },
}

/// Builds a [`Node`] from encoder calls.
///
/// A type tag becomes the first member `"@type"` of a tagged object. Other
/// tagged values are wrapped as `{"@type": name, "@value": value}`.
#[derive(Default)]
pub struct JsonEncoder {
    stack: Vec<Frame>,
    root: Option<Node>,
    tag: Option<String>,
}

impl JsonEncoder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the finished document.
    pub fn finish(self) -> Result<Node, CodecError> {
        if !self.stack.is_empty() {
            return Err(CodecError::custom("unterminated object or array"));
        }
        self.root
            .ok_or_else(|| CodecError::custom("no value was encoded"))
    }

    fn wrap(tag: Option<String>, node: Node) -> Node {
        match tag {
            Some(tag) => Node::Object(vec![
                (TYPE_FIELD.to_string(), Node::Str(tag)),
                (VALUE_FIELD.to_string(), node),
            ]),
            None => node,
        }
    }

    /// Places a complete value into its parent.
    fn place(&mut self, node: Node) -> Result<(), CodecError> {
        match self.stack.last_mut() {
            None if self.root.is_none() => {
                self.root = Some(node);
                Ok(())
            }
            None => Err(CodecError::custom("a document holds a single root value")),
            Some(Frame::Array { items, .. }) => {
                items.push(node);
                Ok(())
            }
            Some(Frame::Object { members, key }) => match key.take() {
                Some(key) => {
                    members.push((key, node));
                    Ok(())
                }
                None => Err(CodecError::custom("object value without a field name")),
            },
        }
    }

    fn float(value: f64) -> Node {
        if value.is_finite() {
            Node::Float(value)
        } else if value.is_nan() {
            Node::Str("NaN".into())
        } else if value > 0.0 {
            Node::Str("Infinity".into())
        } else {
            Node::Str("-Infinity".into())
        }
    }
}

impl Encoder for JsonEncoder {
    #[inline]
    fn capabilities(&self) -> Capabilities {
        Capabilities::DEFAULT
    }

    fn encode_primitive(&mut self, value: Primitive<'_>) -> Result<(), CodecError> {
        let node = match value {
            Primitive::Bool(v) => Node::Bool(v),
            Primitive::I8(v) => Node::Int(v.into()),
            Primitive::I16(v) => Node::Int(v.into()),
            Primitive::I32(v) => Node::Int(v.into()),
            Primitive::I64(v) => Node::Int(v),
            Primitive::U8(v) => Node::Int(v.into()),
            Primitive::U16(v) => Node::Int(v.into()),
            Primitive::U32(v) => Node::Int(v.into()),
            Primitive::U64(v) => Node::from(v),
            Primitive::F32(v) => Self::float(v.into()),
            Primitive::F64(v) => Self::float(v),
            Primitive::Char(v) => Node::Str(v.to_string()),
            Primitive::Str(v) => Node::Str(v.into_owned()),
        };
        let node = Self::wrap(self.tag.take(), node);
        self.place(node)
    }

    fn encode_null(&mut self) -> Result<(), CodecError> {
        let node = Self::wrap(self.tag.take(), Node::Null);
        self.place(node)
    }

    fn encode_dynamic_type(&mut self, name: &str) -> Result<(), CodecError> {
        self.tag = Some(name.to_string());
        Ok(())
    }

    fn begin_object(&mut self, len: usize) -> Result<(), CodecError> {
        let mut members = Vec::with_capacity(len + 1);
        if let Some(tag) = self.tag.take() {
            members.push((TYPE_FIELD.to_string(), Node::Str(tag)));
        }
        self.stack.push(Frame::Object { members, key: None });
        Ok(())
    }

    fn encode_field(&mut self, name: &str) -> Result<(), CodecError> {
        match self.stack.last_mut() {
            Some(Frame::Object { key, .. }) if key.is_none() => {
                *key = Some(name.to_string());
                Ok(())
            }
            _ => Err(CodecError::custom("field name outside of an object")),
        }
    }

    fn end_object(&mut self) -> Result<(), CodecError> {
        match self.stack.pop() {
            Some(Frame::Object { members, key: None }) => self.place(Node::Object(members)),
            _ => Err(CodecError::custom("unbalanced end of object")),
        }
    }

    fn begin_array(&mut self, len: usize) -> Result<(), CodecError> {
        self.stack.push(Frame::Array {
            items: Vec::with_capacity(len),
            tag: self.tag.take(),
        });
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), CodecError> {
        match self.stack.pop() {
            Some(Frame::Array { items, tag }) => self.place(Self::wrap(tag, Node::Array(items))),
            _ => Err(CodecError::custom("unbalanced end of array")),
        }
    }
}
