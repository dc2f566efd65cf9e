//! Sequences, sets, fixed-size arrays and maps.
//!
//! A container is encoded through the items it yields and decoded through
//! a proxy that collects items before building the container. The proxy
//! decides what a valid item stream is: sets and maps reject duplicates,
//! arrays reject the wrong item count.
//!
//! Maps keyed by `String` are encoded as objects. Other maps are encoded
//! as arrays of `{key, value}` entry objects.

// -----------------------------------------------------------------------------
// Modules

mod map;
mod proxy;
mod sequence;

// -----------------------------------------------------------------------------
// Exports

pub use map::{EntryMapCodec, StringMapCodec};
pub use proxy::{ArrayProxy, BTreeMapProxy, BTreeSetProxy, HashMapProxy, HashSetProxy, ListProxy};
pub use proxy::{MapLike, MapProxy, SequenceLike, SequenceProxy};
pub use sequence::{PrimitiveArrayCodec, SequenceCodec};

use alloc::string::String;
use alloc::sync::Arc;
use core::any::TypeId;

use crate::registry::Derivation;
use crate::{Codec, CodecError, Describe};

// -----------------------------------------------------------------------------
// Derivation

/// Derives the codec of a sequence type.
///
/// Items with a primitive representation are handled inline.
pub fn derive_sequence<C: SequenceLike>(
    cx: &mut Derivation<'_>,
) -> Result<Arc<dyn Codec<C>>, CodecError> {
    if let Some(ops) = C::Item::primitive() {
        return Ok(Arc::new(PrimitiveArrayCodec::<C>::new(ops)));
    }
    Ok(Arc::new(SequenceCodec::<C>::new(cx.handle::<C::Item>()?)))
}

/// Derives the codec of a map type.
pub fn derive_map<M: MapLike>(cx: &mut Derivation<'_>) -> Result<Arc<dyn Codec<M>>, CodecError> {
    let value = cx.handle::<M::Value>()?;
    if TypeId::of::<M::Key>() == TypeId::of::<String>() {
        return Ok(Arc::new(StringMapCodec::<M>::new(value)));
    }
    let key = cx.handle::<M::Key>()?;
    Ok(Arc::new(EntryMapCodec::<M>::new(key, value)))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::{BTreeMap, BTreeSet, LinkedList, VecDeque};
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::{HashMap, HashSet};

    use crate::format::Capabilities;
    use crate::format::tokens::{Token, TokenDecoder, TokenEncoder};
    use crate::{CodecCore, CodecError, Config, Describe, ErrorKind};

    fn tokens<T: Describe>(core: &CodecCore, value: &T) -> Vec<Token> {
        let mut out = TokenEncoder::new();
        core.encode(value, &mut out).unwrap();
        out.into_tokens()
    }

    fn round_trip<T: Describe + PartialEq + core::fmt::Debug>(value: T) {
        let core = CodecCore::new();
        let encoded = tokens(&core, &value);
        let decoded: T = core.decode(&mut TokenDecoder::new(encoded)).unwrap();
        assert_eq!(decoded, value);
    }

    fn array_of<T: Into<crate::format::Primitive<'static>>>(items: Vec<T>) -> Vec<Token> {
        let mut tokens = vec![Token::Array(items.len())];
        tokens.extend(items.into_iter().map(Token::value));
        tokens.push(Token::EndArray);
        tokens
    }

    #[test]
    fn standard_collections() {
        round_trip(vec![1_u16, 2, 3]);
        round_trip(VecDeque::from([String::from("a"), String::from("b")]));
        round_trip(LinkedList::from([1.5_f64, -2.0]));
        round_trip(BTreeSet::from(['x', 'y']));
        round_trip(HashSet::<i64>::from([7, 8, 9]));
        round_trip(vec![Some(1_u8), None]);
        round_trip(vec![vec![true], vec![], vec![false, true]]);
        round_trip(Box::<[u32]>::from([4, 5]));
        round_trip([[1_i8; 3]; 2]);
    }

    #[test]
    fn items_are_written_in_order() {
        let core = CodecCore::new();
        assert_eq!(tokens(&core, &vec![3_u8, 1, 2]), array_of(vec![3_u8, 1, 2]));
    }

    #[test]
    fn duplicate_set_elements_are_rejected() {
        let core = CodecCore::new();
        let err = core
            .decode::<BTreeSet<u8>>(&mut TokenDecoder::new(array_of(vec![1_u8, 2, 1])))
            .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateKey { .. }));
        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(err.to_string().ends_with("at token 4"));
    }

    #[test]
    fn array_length_is_checked() {
        let core = CodecCore::new();
        let err = core
            .decode::<[u8; 3]>(&mut TokenDecoder::new(array_of(vec![1_u8, 2])))
            .unwrap_err();
        assert!(matches!(err, CodecError::LengthMismatch { expected: 3, found: 2, .. }));
    }

    #[test]
    fn string_keyed_maps_are_objects() {
        let core = CodecCore::new();
        let map = BTreeMap::from([(String::from("a"), 1_i32), (String::from("b"), 2)]);
        let encoded = tokens(&core, &map);
        assert_eq!(
            encoded,
            [
                Token::Object(2),
                Token::field("a"),
                Token::value(1),
                Token::field("b"),
                Token::value(2),
                Token::EndObject,
            ]
        );
        let decoded: BTreeMap<String, i32> = core.decode(&mut TokenDecoder::new(encoded)).unwrap();
        assert_eq!(decoded, map);

        round_trip(HashMap::from([(String::from("k"), vec![1_u8])]));
    }

    #[test]
    fn other_maps_are_entry_arrays() {
        let core = CodecCore::builder()
            .config(Config::default().with_map_fields("k", "v"))
            .build()
            .unwrap();
        let map = BTreeMap::from([(3_u32, String::from("three"))]);
        let encoded = tokens(&core, &map);
        assert_eq!(
            encoded,
            [
                Token::Array(1),
                Token::Object(2),
                Token::field("k"),
                Token::value(3_u32),
                Token::field("v"),
                Token::value("three"),
                Token::EndObject,
                Token::EndArray,
            ]
        );
        let decoded: BTreeMap<u32, String> = core.decode(&mut TokenDecoder::new(encoded)).unwrap();
        assert_eq!(decoded, map);

        round_trip(HashMap::from([(vec![1_u8, 2], true), (vec![], false)]));
    }

    #[test]
    fn broken_entries() {
        let core = CodecCore::new();
        let entry = |fields: &[(&str, u8)]| {
            let mut tokens = vec![Token::Array(1), Token::Object(fields.len())];
            for (name, value) in fields {
                tokens.push(Token::field(*name));
                tokens.push(Token::value(*value));
            }
            tokens.extend([Token::EndObject, Token::EndArray]);
            TokenDecoder::new(tokens)
        };

        let err = core
            .decode::<BTreeMap<u8, u8>>(&mut entry(&[("key", 1)]))
            .unwrap_err();
        assert!(matches!(err, CodecError::FieldSetMismatch { ref missing, .. } if missing == &["value"]));

        let err = core
            .decode::<BTreeMap<u8, u8>>(&mut entry(&[("key", 1), ("key", 2)]))
            .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateField { .. }));

        let err = core
            .decode::<BTreeMap<u8, u8>>(&mut entry(&[("key", 1), ("value", 2), ("extra", 3)]))
            .unwrap_err();
        assert!(matches!(err, CodecError::UnrecognisedField { .. }));
    }

    #[test]
    fn duplicate_map_keys_are_rejected() {
        let core = CodecCore::new();
        let tokens = vec![
            Token::Object(2),
            Token::field("a"),
            Token::value(true),
            Token::field("a"),
            Token::value(false),
            Token::EndObject,
        ];
        let err = core
            .decode::<HashMap<String, bool>>(&mut TokenDecoder::new(tokens))
            .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateKey { .. }));
    }

    #[test]
    fn string_only_formats_reject_other_keys() {
        let core = CodecCore::new();
        let caps = Capabilities {
            string_keys_only: true,
            ..Capabilities::DEFAULT
        };
        let mut out = TokenEncoder::with_capabilities(caps);
        let err = core.encode(&BTreeMap::from([(1_u8, 1_u8)]), &mut out).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedMapKey { key: "u8" }));
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let mut out = TokenEncoder::with_capabilities(caps);
        assert!(core.encode(&BTreeMap::from([(String::new(), 1_u8)]), &mut out).is_ok());
    }

    #[test]
    fn capacity_follows_reported_length() {
        let config = Config::default();
        assert_eq!(config.capacity_hint(Some(3)), 3);
        assert_eq!(config.capacity_hint(None), config.default_array_size);
    }
}
