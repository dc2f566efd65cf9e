#![doc = include_str!("../README.md")]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod decoder;
mod encoder;
mod marker;

// -----------------------------------------------------------------------------
// Exports

pub use bytes::Bytes;
pub use decoder::BinaryDecoder;
pub use encoder::BinaryEncoder;

use vc_codec::format::{Capabilities, Decoder};
use vc_codec::{CodecCore, CodecError, Describe};

/// Objects are written with every declared field, so decoding expects
/// exactly those.
pub const CAPABILITIES: Capabilities = Capabilities {
    dynamic_types: true,
    string_keys_only: false,
    exact_fields: true,
};

// -----------------------------------------------------------------------------
// Helpers

/// Encodes `value` into a byte buffer.
pub fn to_bytes<T: Describe>(core: &CodecCore, value: &T) -> Result<Bytes, CodecError> {
    let mut out = BinaryEncoder::new();
    core.encode(value, &mut out)?;
    out.finish()
}

/// Decodes a `T` that must span all of `bytes`.
pub fn from_bytes<T: Describe>(core: &CodecCore, bytes: impl Into<Bytes>) -> Result<T, CodecError> {
    let mut input = BinaryDecoder::new(bytes);
    let value = core.decode(&mut input)?;
    if !input.is_done() {
        return Err(CodecError::malformed("end of input", "trailing bytes", input.position()));
    }
    Ok(value)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashSet;

    use vc_codec::dynamic::Dynamic;
    use vc_codec::format::Decoder;
    use vc_codec::{CodecCore, CodecError, Describe, Position, dynamic_type};

    use super::{BinaryDecoder, Bytes, from_bytes, to_bytes};

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct Packet {
        id: u32,
        name: String,
        flags: [bool; 3],
        weights: Vec<f32>,
        origin: Option<char>,
        routes: BTreeMap<u16, String>,
        seen: HashSet<i64>,
    }

    fn packet() -> Packet {
        Packet {
            id: 7,
            name: "hello".into(),
            flags: [true, false, true],
            weights: vec![0.5, -1.25],
            origin: Some('λ'),
            routes: BTreeMap::from([(80, "http".into()), (443, "https".into())]),
            seen: HashSet::from([-3, 9]),
        }
    }

    #[test]
    fn packets() {
        let core = CodecCore::new();
        let bytes = to_bytes(&core, &packet()).unwrap();
        assert_eq!(from_bytes::<Packet>(&core, bytes).unwrap(), packet());
    }

    #[test]
    fn layout() {
        let core = CodecCore::new();
        let bytes = to_bytes(&core, &vec![Some(1_u16), None]).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[0x0F, 2, 0, 0, 0, 0x07, 1, 0, 0x00][..],
        );
    }

    #[test]
    fn truncated_input() {
        let core = CodecCore::new();
        let bytes = to_bytes(&core, &packet()).unwrap();
        let cut = bytes.slice(..bytes.len() - 3);

        let err = from_bytes::<Packet>(&core, cut).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Malformed { ref found, at, .. }
                if found == "end of input" && matches!(at.0, Some(Position::Offset(_)))
        ));
    }

    #[test]
    fn trailing_bytes() {
        let core = CodecCore::new();
        let mut bytes = to_bytes(&core, &5_u8).unwrap().to_vec();
        bytes.push(0);
        let err = from_bytes::<u8>(&core, bytes).unwrap_err();
        assert_eq!(err.to_string(), "expected end of input, found trailing bytes at byte 2");
    }

    #[test]
    fn wrong_marker() {
        let core = CodecCore::new();
        let err = from_bytes::<Vec<u8>>(&core, Bytes::from_static(&[0x01, 1])).unwrap_err();
        assert_eq!(err.to_string(), "expected array, found bool at byte 0");

        let err = from_bytes::<u8>(&core, Bytes::from_static(&[0x09, 0, 1, 0, 0, 0, 0, 0, 0])).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
        assert_eq!(from_bytes::<u8>(&core, Bytes::from_static(&[0x09, 9, 0, 0, 0, 0, 0, 0, 0])).unwrap(), 9);
    }

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct Pair {
        left: u8,
        right: u8,
    }

    #[test]
    fn fields_must_be_complete() {
        let core = CodecCore::new();
        // { "left": u8 1 }
        let bytes = Bytes::from_static(&[
            0x0E, 1, 0, 0, 0, //
            4, 0, 0, 0, b'l', b'e', b'f', b't', //
            0x06, 1,
        ]);
        let err = from_bytes::<Pair>(&core, bytes).unwrap_err();
        assert!(matches!(err, CodecError::FieldSetMismatch { ref missing, .. } if missing == &["right"]));
    }

    #[test]
    fn skipping() {
        let core = CodecCore::new();
        let mut bytes = to_bytes(&core, &packet()).unwrap().to_vec();
        bytes.extend_from_slice(&to_bytes(&core, &42_i32).unwrap());

        let mut input = BinaryDecoder::new(bytes);
        input.skip_value().unwrap();
        assert_eq!(core.decode::<i32>(&mut input).unwrap(), 42);
        assert!(input.is_done());
    }

    trait Tool: Dynamic + core::fmt::Debug {
        fn weight(&self) -> u32;
    }

    dynamic_type!(dyn Tool);

    #[derive(Describe, Debug, Default)]
    #[codec(default)]
    struct Hammer {
        grams: u32,
    }

    #[derive(Describe, Debug, Default)]
    #[codec(default)]
    struct Saw {
        teeth: u32,
    }

    impl Tool for Hammer {
        fn weight(&self) -> u32 {
            self.grams
        }
    }

    impl Tool for Saw {
        fn weight(&self) -> u32 {
            self.teeth * 2
        }
    }

    #[test]
    fn tagged_values() {
        let core = CodecCore::builder()
            .default_subtype::<dyn Tool, Hammer>(|h| Box::new(h))
            .subtype_named::<dyn Tool, Saw>("saw", |s| Box::new(s))
            .build()
            .unwrap();
        let tools: Vec<Box<dyn Tool>> = vec![Box::new(Hammer { grams: 500 }), Box::new(Saw { teeth: 40 })];

        let bytes = to_bytes(&core, &tools).unwrap();
        let decoded: Vec<Box<dyn Tool>> = from_bytes(&core, bytes).unwrap();
        let weights: Vec<u32> = decoded.iter().map(|t| t.weight()).collect();
        assert_eq!(weights, [500, 80]);
    }
}
