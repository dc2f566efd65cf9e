//! Object types: named fields plus a construction strategy.
//!
//! [`ObjectBuilder`] describes a type during derivation. The resulting
//! [`ObjectMeta`] lists the fields with their codecs and external names;
//! [`ObjectCodec`] encodes them in order and decodes them into a fresh
//! [`ResultAccumulator`] per object.
//!
//! Values are built by the first available strategy:
//!
//! 1. a named constructor registered on the core, fed a [`FieldMap`];
//! 2. a positional constructor registered on the core, fed [`Args`];
//! 3. a [`FieldBuilder`] registered on the core;
//! 4. mutation of a default value, enabled by `#[codec(default)]`.
//!
//! A type with none of them cannot be derived.

// -----------------------------------------------------------------------------
// Modules

mod accumulator;
mod codec;
mod construct;
mod meta;

// -----------------------------------------------------------------------------
// Exports

pub use accumulator::{Accumulate, ResultAccumulator};
pub use codec::ObjectCodec;
pub use construct::{Args, FieldBuilder, FieldMap, FieldValue};
pub use meta::{Field, ObjectBuilder, ObjectMeta};

pub(crate) use construct::{Constructors, builder_fn};

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{Args, FieldBuilder, FieldMap, FieldValue};
    use crate::format::Capabilities;
    use crate::format::tokens::{Token, TokenDecoder, TokenEncoder};
    use crate::{CodecCore, CodecError, Config, Describe, ErrorKind, FieldNaming};

    fn encode<T: Describe>(core: &CodecCore, value: &T) -> Vec<Token> {
        let mut out = TokenEncoder::new();
        core.encode(value, &mut out).unwrap();
        out.into_tokens()
    }

    fn decode<T: Describe>(core: &CodecCore, tokens: Vec<Token>) -> Result<T, CodecError> {
        core.decode(&mut TokenDecoder::new(tokens))
    }

    #[derive(Describe, Debug, Default, PartialEq, Clone)]
    #[codec(default)]
    struct BooleanData {
        val: bool,
        val_arr: [bool; 2],
        list_val: Vec<bool>,
        map_str_val: BTreeMap<String, bool>,
    }

    #[test]
    fn boolean_data() {
        let core = CodecCore::new();
        let data = BooleanData {
            val: true,
            val_arr: [true, false],
            list_val: vec![false, true, false],
            map_str_val: BTreeMap::from([("f".into(), false), ("g".into(), true)]),
        };

        let tokens = encode(&core, &data);
        assert_eq!(tokens[0], Token::Object(4));
        assert_eq!(decode::<BooleanData>(&core, tokens).unwrap(), data);
    }

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct Recursive {
        next: Option<Box<Recursive>>,
        id: i32,
    }

    #[test]
    fn recursive_chain() {
        let core = CodecCore::new();
        let chain = Recursive {
            id: 1,
            next: Some(Box::new(Recursive {
                id: 2,
                next: Some(Box::new(Recursive { id: 3, next: None })),
            })),
        };

        let tokens = encode(&core, &chain);
        assert_eq!(tokens.iter().filter(|t| **t == Token::Null).count(), 1);
        assert_eq!(decode::<Recursive>(&core, tokens).unwrap(), chain);
    }

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct Entity {
        id: u64,
        name: String,
    }

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct Player {
        #[codec(parent)]
        base: Entity,
        name: String,
        level: u8,
        #[codec(skip)]
        session: u32,
    }

    #[test]
    fn parent_fields_are_inline() {
        let core = CodecCore::new();
        let codec = core.get_codec::<Player>().unwrap();
        let meta = codec.object_meta().unwrap();
        let names: Vec<_> = meta.field_names().collect();
        assert_eq!(names, ["id", "name", "_name", "level"]);
        assert_eq!(meta.parent(), Some("base"));

        let player = Player {
            base: Entity { id: 9, name: "entity".into() },
            name: "player".into(),
            level: 3,
            session: 77,
        };
        let tokens = encode(&core, &player);
        assert_eq!(tokens[0], Token::Object(4));

        let decoded = decode::<Player>(&core, tokens).unwrap();
        assert_eq!(decoded.base, player.base);
        assert_eq!(decoded.name, "player");
        assert_eq!(decoded.session, 0);
    }

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct Shadowing {
        #[codec(parent)]
        base: Player,
        _name: bool,
    }

    #[test]
    fn shadowing_is_repeated_until_unique() {
        let core = CodecCore::new();
        let codec = core.get_codec::<Shadowing>().unwrap();
        let names: Vec<_> = codec.object_meta().unwrap().field_names().collect();
        assert_eq!(names, ["id", "name", "_name", "level", "__name"]);
    }

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct Pair {
        left: i32,
        right: i32,
    }

    fn pair_tokens(fields: &[(&str, i32)]) -> Vec<Token> {
        let mut tokens = vec![Token::Object(fields.len())];
        for (name, value) in fields {
            tokens.push(Token::field(*name));
            tokens.push(Token::value(*value));
        }
        tokens.push(Token::EndObject);
        tokens
    }

    #[test]
    fn unknown_fields() {
        let strict = CodecCore::new();
        let tokens = pair_tokens(&[("left", 1), ("up", 5), ("right", 2)]);
        let err = decode::<Pair>(&strict, tokens.clone()).unwrap_err();
        assert!(matches!(err, CodecError::UnrecognisedField { ref field, .. } if field == "up"));
        assert_eq!(err.kind(), ErrorKind::Data);

        let lenient = CodecCore::builder()
            .config(Config::default().with_fail_on_unrecognised_fields(false))
            .build()
            .unwrap();
        assert_eq!(decode::<Pair>(&lenient, tokens).unwrap(), Pair { left: 1, right: 2 });

        // Nested values of unknown fields are skipped as a whole.
        let tokens = vec![
            Token::Object(2),
            Token::field("extra"),
            Token::Array(1),
            Token::Object(0),
            Token::EndObject,
            Token::EndArray,
            Token::field("left"),
            Token::value(4),
            Token::EndObject,
        ];
        assert_eq!(decode::<Pair>(&lenient, tokens).unwrap(), Pair { left: 4, right: 0 });
    }

    #[test]
    fn duplicate_fields_always_fail() {
        let tokens = pair_tokens(&[("left", 1), ("left", 2)]);
        for strict in [true, false] {
            let core = CodecCore::builder()
                .configure(|c| c.fail_on_unrecognised_fields = strict)
                .build()
                .unwrap();
            let err = decode::<Pair>(&core, tokens.clone()).unwrap_err();
            assert!(matches!(err, CodecError::DuplicateField { ref field, .. } if field == "left"));
        }
    }

    #[test]
    fn exact_field_sets() {
        let tokens = pair_tokens(&[("right", 1)]);
        assert!(decode::<Pair>(&CodecCore::new(), tokens.clone()).is_ok());

        let core = CodecCore::builder()
            .config(Config::default().with_require_exact_fields(true))
            .build()
            .unwrap();
        let err = decode::<Pair>(&core, tokens.clone()).unwrap_err();
        assert!(matches!(err, CodecError::FieldSetMismatch { ref missing, .. } if missing == &["left"]));

        // Formats may demand the check themselves.
        let caps = Capabilities {
            exact_fields: true,
            ..Capabilities::DEFAULT
        };
        let mut input = TokenDecoder::with_capabilities(tokens, caps);
        assert!(CodecCore::new().decode::<Pair>(&mut input).is_err());
    }

    #[test]
    fn field_naming_policy() {
        let core = CodecCore::builder()
            .config(Config::default().with_field_naming(FieldNaming::CamelCase))
            .build()
            .unwrap();
        let codec = core.get_codec::<BooleanData>().unwrap();
        let names: Vec<_> = codec.object_meta().unwrap().field_names().collect();
        assert_eq!(names, ["val", "valArr", "listVal", "mapStrVal"]);
    }

    #[derive(Describe, Debug, PartialEq)]
    struct Point {
        x: i32,
        #[codec(rename = "vertical")]
        y: i32,
    }

    #[test]
    fn positional_constructor() {
        let err = CodecCore::new().get_codec::<Point>().err().unwrap();
        assert!(matches!(err, CodecError::NoConstructor { .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let core = CodecCore::builder()
            .positional_constructor(|args: &mut Args| {
                Ok(Point {
                    x: args.next()?,
                    y: args.next()?,
                })
            })
            .build()
            .unwrap();

        let point = Point { x: -3, y: 8 };
        let tokens = encode(&core, &point);
        assert!(tokens.contains(&Token::field("vertical")));
        assert_eq!(decode::<Point>(&core, tokens).unwrap(), point);

        let err = decode::<Point>(&core, pair_tokens(&[("x", 1)])).unwrap_err();
        assert!(matches!(err, CodecError::MissingField { field: "y", .. }));
    }

    #[derive(Describe, Debug, PartialEq)]
    struct Account {
        owner: String,
        balance: i64,
    }

    #[derive(Default)]
    struct AccountBuilder {
        owner: Option<String>,
        balance: i64,
    }

    impl FieldBuilder<Account> for AccountBuilder {
        fn set_field(&mut self, name: &'static str, value: FieldValue) -> Result<(), CodecError> {
            match name {
                "owner" => self.owner = Some(value.take()?),
                "balance" => self.balance = value.take()?,
                _ => {}
            }
            Ok(())
        }

        fn build(self) -> Result<Account, CodecError> {
            Ok(Account {
                owner: self.owner.ok_or(CodecError::custom("an account needs an owner"))?,
                balance: self.balance,
            })
        }
    }

    #[test]
    fn builder_constructor() {
        let core = CodecCore::builder()
            .builder_constructor::<Account, AccountBuilder>()
            .build()
            .unwrap();
        let tokens = vec![
            Token::Object(1),
            Token::field("owner"),
            Token::value("ada"),
            Token::EndObject,
        ];
        let account = decode::<Account>(&core, tokens).unwrap();
        assert_eq!(account, Account { owner: "ada".into(), balance: 0 });

        let tokens = vec![Token::Object(0), Token::EndObject];
        let err = decode::<Account>(&core, tokens).unwrap_err();
        assert!(matches!(err, CodecError::Custom(_)));
    }

    #[test]
    fn named_constructor_wins() {
        let core = CodecCore::builder()
            .builder_constructor::<Account, AccountBuilder>()
            .named_constructor(|fields: &mut FieldMap| {
                Ok(Account {
                    balance: fields.take_or_default("balance")?,
                    owner: fields.take("owner")?,
                })
            })
            .build()
            .unwrap();
        let codec = core.get_codec::<Account>().unwrap();
        assert_eq!(codec.object_meta().unwrap().construction(), "named");

        let account = Account { owner: "bob".into(), balance: -5 };
        let tokens = encode(&core, &account);
        assert_eq!(decode::<Account>(&core, tokens).unwrap(), account);
    }

    #[test]
    fn parent_must_be_an_object() {
        #[derive(Describe, Default)]
        #[codec(default)]
        struct Wrapper {
            #[codec(parent)]
            inner: Vec<u8>,
        }

        let err = CodecCore::new().get_codec::<Wrapper>().err().unwrap();
        assert!(matches!(err, CodecError::InvalidParent { .. }));
    }
}
