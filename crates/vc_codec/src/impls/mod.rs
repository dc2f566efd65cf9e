//! [`Describe`](crate::Describe) for standard types.
//!
//! Primitives map one to one onto [`PrimitiveKind`](crate::format::PrimitiveKind);
//! `usize` and `isize` travel as 64-bit integers. `Option` uses null for
//! `None`, `Box` is transparent, and the std collections go through
//! [`container`](crate::container).

// -----------------------------------------------------------------------------
// Modules

mod collections;
mod enums;
mod primitives;
mod wrappers;

// -----------------------------------------------------------------------------
// Exports

pub use enums::EnumCodec;
pub use primitives::PrimitiveCodec;
pub use wrappers::{BoxCodec, OptionCodec};

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::fmt::Debug;

    use crate::format::tokens::{Token, TokenDecoder, TokenEncoder};
    use crate::format::{Primitive, PrimitiveKind};
    use crate::{CodecCore, CodecError, Describe};

    fn encode<T: Describe>(value: &T) -> Vec<Token> {
        let mut out = TokenEncoder::new();
        CodecCore::new().encode(value, &mut out).unwrap();
        out.into_tokens()
    }

    fn decode<T: Describe>(tokens: Vec<Token>) -> Result<T, CodecError> {
        CodecCore::new().decode(&mut TokenDecoder::new(tokens))
    }

    fn round_trip<T: Describe + PartialEq + Debug>(value: T) {
        assert_eq!(decode::<T>(encode(&value)).unwrap(), value);
    }

    #[test]
    fn primitives() {
        round_trip(true);
        round_trip(i8::MIN);
        round_trip(i16::MAX);
        round_trip(-7_i32);
        round_trip(i64::MIN);
        round_trip(u8::MAX);
        round_trip(u16::MAX);
        round_trip(u32::MAX);
        round_trip(u64::MAX);
        round_trip(1.25_f32);
        round_trip(f64::MIN_POSITIVE);
        round_trip('λ');
        round_trip(String::from("text"));
        round_trip(usize::MAX);
        round_trip(isize::MIN);

        assert_eq!(encode(&7_usize), [Token::value(7_u64)]);
    }

    #[test]
    fn primitive_ops() {
        let ops = u8::primitive().unwrap();
        assert_eq!(ops.kind, PrimitiveKind::U8);
        assert_eq!((ops.write)(&3), Primitive::U8(3));
        assert_eq!((ops.read)(Primitive::Bool(true)), None);
        assert!(<Vec<u8>>::primitive().is_none());
    }

    #[test]
    fn integers_are_coerced_within_range() {
        assert_eq!(decode::<u16>(vec![Token::value(300_i64)]).unwrap(), 300);
        assert!(decode::<u8>(vec![Token::value(300_i64)]).is_err());
        assert!(decode::<bool>(vec![Token::value(1_i32)]).is_err());
    }

    #[test]
    fn options_and_boxes() {
        assert_eq!(encode(&None::<u8>), [Token::Null]);
        assert_eq!(encode(&Some(5_u8)), [Token::value(5_u8)]);
        round_trip(Some(String::from("x")));
        round_trip(Box::new(3.5_f64));
        round_trip(vec![Some(Box::new('a')), None]);
    }

    #[test]
    fn nested_options_are_rejected() {
        let core = CodecCore::new();
        let mut out = TokenEncoder::new();
        let err = core.encode(&Some(None::<u8>), &mut out).unwrap_err();
        assert!(matches!(err, CodecError::Unsupported { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);

        assert!(core.get_codec::<Option<Box<Option<u8>>>>().is_err());
        assert!(core.get_codec::<Vec<Option<Option<u8>>>>().is_err());
        assert!(core.get_codec::<Option<Box<u8>>>().is_ok());
    }

    #[derive(Describe, Debug, PartialEq, Clone, Copy)]
    enum Weekday {
        Mon,
        Tue,
        #[codec(rename = "wednesday")]
        Wed,
    }

    #[test]
    fn fieldless_enums() {
        assert_eq!(encode(&Weekday::Tue), [Token::value("Tue")]);
        assert_eq!(encode(&Weekday::Wed), [Token::value("wednesday")]);
        round_trip(vec![Weekday::Mon, Weekday::Wed]);

        let err = decode::<Weekday>(vec![Token::value("Sun")]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidVariant { ref name, .. } if name == "Sun"));
    }
}
