#![doc = include_str!("../README.md")]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod decoder;
mod encoder;
mod node;

// -----------------------------------------------------------------------------
// Exports

pub use decoder::JsonDecoder;
pub use encoder::JsonEncoder;
pub use node::Node;

use alloc::string::String;

use vc_codec::{CodecCore, CodecError, Describe};

/// Member that carries the type tag of an object.
pub const TYPE_FIELD: &str = "@type";

/// Member that holds a tagged value that is not an object.
pub const VALUE_FIELD: &str = "@value";

// -----------------------------------------------------------------------------
// Helpers

/// Encodes `value` as a JSON tree.
pub fn to_node<T: Describe>(core: &CodecCore, value: &T) -> Result<Node, CodecError> {
    let mut out = JsonEncoder::new();
    core.encode(value, &mut out)?;
    out.finish()
}

/// Decodes a `T` from a JSON tree.
pub fn from_node<T: Describe>(core: &CodecCore, node: Node) -> Result<T, CodecError> {
    let mut input = JsonDecoder::new(node);
    let value = core.decode(&mut input)?;
    if !input.is_done() {
        return Err(CodecError::custom("the document was not fully consumed"));
    }
    Ok(value)
}

/// Encodes `value` as compact JSON text.
pub fn to_string<T: Describe>(core: &CodecCore, value: &T) -> Result<String, CodecError> {
    serde_json::to_string(&to_node(core, value)?).map_err(CodecError::format)
}

/// Encodes `value` as indented JSON text.
pub fn to_string_pretty<T: Describe>(core: &CodecCore, value: &T) -> Result<String, CodecError> {
    serde_json::to_string_pretty(&to_node(core, value)?).map_err(CodecError::format)
}

/// Decodes a `T` from JSON text.
pub fn from_str<T: Describe>(core: &CodecCore, text: &str) -> Result<T, CodecError> {
    let node: Node = serde_json::from_str(text).map_err(CodecError::format)?;
    from_node(core, node)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use core::fmt::Debug;

    use vc_codec::dynamic::Dynamic;
    use vc_codec::{CodecCore, CodecError, Config, Describe, ErrorKind, dynamic_type};

    use super::{from_str, to_string};

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct BooleanData {
        val: bool,
        val_arr: [bool; 2],
        list_val: Vec<bool>,
        map_str_val: BTreeMap<String, bool>,
    }

    #[test]
    fn boolean_data() {
        let core = CodecCore::builder()
            .config(Config::default().with_field_naming(vc_codec::FieldNaming::CamelCase))
            .build()
            .unwrap();
        let data = BooleanData {
            val: true,
            val_arr: [true, false],
            list_val: vec![false],
            map_str_val: BTreeMap::from([("f".into(), false), ("g".into(), true)]),
        };

        let text = to_string(&core, &data).unwrap();
        assert_eq!(
            text,
            r#"{"val":true,"valArr":[true,false],"listVal":[false],"mapStrVal":{"f":false,"g":true}}"#
        );
        assert_eq!(from_str::<BooleanData>(&core, &text).unwrap(), data);
    }

    trait Shape: Dynamic + Debug {
        fn area(&self) -> f64;
    }

    dynamic_type!(dyn Shape);

    #[derive(Describe, Debug, Default)]
    #[codec(default)]
    struct Circle {
        r: f64,
    }

    #[derive(Describe, Debug, Default)]
    #[codec(default)]
    struct Square {
        side: f64,
    }

    impl Shape for Circle {
        fn area(&self) -> f64 {
            3.0 * self.r * self.r
        }
    }

    impl Shape for Square {
        fn area(&self) -> f64 {
            self.side * self.side
        }
    }

    fn shapes(config: Config) -> CodecCore {
        CodecCore::builder()
            .config(config)
            .default_subtype::<dyn Shape, Circle>(|c| Box::new(c))
            .subtype_named::<dyn Shape, Square>("square", |s| Box::new(s))
            .build()
            .unwrap()
    }

    #[test]
    fn type_tags() {
        let core = shapes(Config::default());
        let list: Vec<Box<dyn Shape>> = vec![Box::new(Circle { r: 1.0 }), Box::new(Square { side: 2.0 })];

        let text = to_string(&core, &list).unwrap();
        assert_eq!(text, r#"[{"r":1.0},{"@type":"square","side":2.0}]"#);

        let decoded: Vec<Box<dyn Shape>> = from_str(&core, &text).unwrap();
        let areas: Vec<f64> = decoded.iter().map(|s| s.area()).collect();
        assert_eq!(areas, [3.0, 4.0]);
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let core = shapes(Config::default().allow_package("geometry"));
        let err = from_str::<Box<dyn Shape>>(&core, r#"{"@type":"evil::Payload"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Security);

        let err = from_str::<Box<dyn Shape>>(&core, r#"{"@type":"square","side":1}"#).unwrap_err();
        assert!(matches!(err, CodecError::DisallowedType { .. }));
    }

    #[test]
    fn tagged_values_that_are_not_objects() {
        let mut out = super::JsonEncoder::new();
        vc_codec::format::Encoder::encode_dynamic_type(&mut out, "n").unwrap();
        vc_codec::format::Encoder::encode_primitive(&mut out, 5_u8.into()).unwrap();
        let node = out.finish().unwrap();
        assert_eq!(serde_json::to_string(&node).unwrap(), r#"{"@type":"n","@value":5}"#);

        let mut input = super::JsonDecoder::new(node);
        let tag = vc_codec::format::Decoder::decode_dynamic_type(&mut input).unwrap();
        assert_eq!(tag.as_deref(), Some("n"));
        let value = vc_codec::format::Decoder::decode_primitive(&mut input, vc_codec::format::PrimitiveKind::U8);
        assert_eq!(value.unwrap(), vc_codec::format::Primitive::U8(5));
    }

    #[derive(Describe, Debug, Default, PartialEq)]
    #[codec(default)]
    struct Reading {
        label: Option<String>,
        values: Vec<f64>,
        tiny: i8,
    }

    #[test]
    fn options_and_floats() {
        let core = CodecCore::new();
        let reading = Reading {
            label: None,
            values: vec![f64::INFINITY, -0.5, f64::NEG_INFINITY],
            tiny: -3,
        };
        let text = to_string(&core, &reading).unwrap();
        assert_eq!(text, r#"{"label":null,"values":["Infinity",-0.5,"-Infinity"],"tiny":-3}"#);
        assert_eq!(from_str::<Reading>(&core, &text).unwrap(), reading);

        let nan: Vec<f32> = from_str(&core, r#"["NaN", 1]"#).unwrap();
        assert!(nan[0].is_nan());
        assert_eq!(nan[1], 1.0);
    }

    #[test]
    fn errors_carry_paths() {
        let core = CodecCore::new();
        let err = from_str::<Reading>(&core, r#"{"values":[1, true]}"#).unwrap_err();
        assert!(err.to_string().ends_with("at $.values[1]"), "{err}");

        let err = from_str::<Reading>(&core, r#"{"tiny":300}"#).unwrap_err();
        assert!(err.to_string().ends_with("at $.tiny"), "{err}");
        assert_eq!(err.kind(), ErrorKind::Data);

        let err = from_str::<Reading>(&core, r#"{"tiny":1,"tiny":2}"#).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateField { .. }));

        let err = from_str::<Reading>(&core, "{").unwrap_err();
        assert!(matches!(err, CodecError::Format(_)));
    }
}
