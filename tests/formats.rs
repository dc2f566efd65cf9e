//! The same types through every format.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use vc_serial::binary::{from_bytes, to_bytes};
use vc_serial::codec::dynamic::Dynamic;
use vc_serial::codec::object::Args;
use vc_serial::codec::{FieldNaming, dynamic_type};
use vc_serial::json::{from_str, to_string};
use vc_serial::{CodecCore, CodecError, Config, Describe, ErrorKind};

fn both<T>(core: &CodecCore, value: &T) -> (T, T)
where
    T: Describe + Debug + PartialEq,
{
    let text = to_string(core, value).unwrap();
    let bytes = to_bytes(core, value).unwrap();
    (from_str(core, &text).unwrap(), from_bytes(core, bytes).unwrap())
}

// -----------------------------------------------------------------------------
// Plain data

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
        .config(Config::default().with_field_naming(FieldNaming::CamelCase))
        .build()
        .unwrap();
    let data = BooleanData {
        val: true,
        val_arr: [false, true],
        list_val: vec![true, true, false],
        map_str_val: BTreeMap::from([("on".into(), true)]),
    };

    let (from_json, from_binary) = both(&core, &data);
    assert_eq!(from_json, data);
    assert_eq!(from_binary, data);
}

#[derive(Describe, Debug, Default, PartialEq)]
#[codec(default)]
struct Recursive {
    next: Option<Box<Recursive>>,
    id: u32,
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

    assert_eq!(
        to_string(&core, &chain).unwrap(),
        r#"{"next":{"next":{"next":null,"id":3},"id":2},"id":1}"#
    );
    let (from_json, from_binary) = both(&core, &chain);
    assert_eq!(from_json, chain);
    assert_eq!(from_binary, chain);
}

#[derive(Describe, Debug, Default, PartialEq)]
#[codec(default)]
struct Scores {
    by_round: HashMap<u32, Vec<i16>>,
    by_name: HashMap<String, Option<u8>>,
}

#[test]
fn maps() {
    let core = CodecCore::new();
    let scores = Scores {
        by_round: HashMap::from([(1, vec![-2, 5])]),
        by_name: HashMap::from([("ada".into(), None)]),
    };

    assert_eq!(
        to_string(&core, &scores).unwrap(),
        r#"{"by_round":[{"key":1,"value":[-2,5]}],"by_name":{"ada":null}}"#
    );
    let (from_json, from_binary) = both(&core, &scores);
    assert_eq!(from_json, scores);
    assert_eq!(from_binary, scores);
}

// -----------------------------------------------------------------------------
// Constructors

#[derive(Describe, Debug, PartialEq)]
struct Point {
    x: i32,
    #[codec(rename = "vertical")]
    y: i32,
}

#[test]
fn positional_constructor() {
    let core = CodecCore::builder()
        .positional_constructor(|args: &mut Args| Ok(Point { x: args.next()?, y: args.next()? }))
        .build()
        .unwrap();

    let point: Point = from_str(&core, r#"{"vertical":-4,"x":3}"#).unwrap();
    assert_eq!(point, Point { x: 3, y: -4 });

    let (from_json, from_binary) = both(&core, &point);
    assert_eq!(from_json, point);
    assert_eq!(from_binary, point);

    let err = from_str::<Point>(&core, r#"{"x":3}"#).unwrap_err();
    assert!(matches!(err, CodecError::MissingField { field: "y", .. }));
}

#[test]
fn missing_constructor() {
    let core = CodecCore::new();
    let err = from_str::<Point>(&core, r#"{"x":1,"vertical":2}"#).unwrap_err();
    assert!(matches!(err, CodecError::NoConstructor { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// -----------------------------------------------------------------------------
// Trait objects

trait Event: Dynamic + Debug + Send + Sync {
    fn describe(&self) -> String;
}

dynamic_type!(dyn Event);

#[derive(Describe, Debug, Default)]
#[codec(default)]
struct Login {
    user: String,
}

#[derive(Describe, Debug, Default)]
#[codec(default)]
struct Transfer {
    from: String,
    to: String,
    amount: u64,
}

impl Event for Login {
    fn describe(&self) -> String {
        format!("{} logged in", self.user)
    }
}

impl Event for Transfer {
    fn describe(&self) -> String {
        format!("{} sent {} to {}", self.from, self.amount, self.to)
    }
}

#[derive(Describe, Debug, Default)]
#[codec(default)]
struct Journal {
    events: Vec<Box<dyn Event>>,
}

fn journal_core(config: Config) -> CodecCore {
    CodecCore::builder()
        .config(config)
        .default_subtype::<dyn Event, Login>(|e| Box::new(e))
        .subtype::<dyn Event, Transfer>(|e| Box::new(e))
        .build()
        .unwrap()
}

fn journal() -> Journal {
    Journal {
        events: vec![
            Box::new(Login { user: "ada".into() }),
            Box::new(Transfer {
                from: "ada".into(),
                to: "bob".into(),
                amount: 3,
            }),
        ],
    }
}

fn descriptions(journal: &Journal) -> Vec<String> {
    journal.events.iter().map(|e| e.describe()).collect()
}

#[test]
fn default_subtype_is_untagged() {
    let core = journal_core(Config::default());
    let text = to_string(&core, &journal()).unwrap();
    assert_eq!(
        text,
        r#"{"events":[{"user":"ada"},{"@type":"formats::Transfer","from":"ada","to":"bob","amount":3}]}"#
    );

    let expected = ["ada logged in", "ada sent 3 to bob"];
    assert_eq!(descriptions(&from_str(&core, &text).unwrap()), expected);

    let bytes = to_bytes(&core, &journal()).unwrap();
    assert_eq!(descriptions(&from_bytes(&core, bytes).unwrap()), expected);
}

#[test]
fn tags_outside_allowed_packages() {
    let core = journal_core(Config::default().allow_package("bank"));

    let err = from_str::<Journal>(
        &core,
        r#"{"events":[{"@type":"formats::Transfer","from":"a","to":"b","amount":1}]}"#,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Security);

    let err = from_str::<Journal>(&core, r#"{"events":[{"@type":"std::process::Command"}]}"#)
        .unwrap_err();
    assert!(matches!(err, CodecError::DisallowedType { .. }));

    // Untagged values never name a type.
    let journal: Journal = from_str(&core, r#"{"events":[{"user":"eve"}]}"#).unwrap();
    assert_eq!(descriptions(&journal), ["eve logged in"]);
}

#[test]
fn tags_can_be_turned_off() {
    let core = journal_core(Config::default().with_dynamic_types(false));
    let err = to_string(&core, &journal()).unwrap_err();
    assert!(matches!(err, CodecError::DynamicTypesDisabled { .. }));

    let only_logins = Journal {
        events: vec![Box::new(Login { user: "ada".into() })],
    };
    assert_eq!(to_string(&core, &only_logins).unwrap(), r#"{"events":[{"user":"ada"}]}"#);
}

// -----------------------------------------------------------------------------
// Config

#[test]
fn config_from_a_file() {
    let config: Config = serde_json::from_str(
        r#"{
            "field_naming": "kebab_case",
            "fail_on_unrecognised_fields": false,
            "map_key_field": "k",
            "map_value_field": "v"
        }"#,
    )
    .unwrap();
    let core = CodecCore::builder().config(config).build().unwrap();

    let scores = Scores {
        by_round: HashMap::from([(2, vec![1])]),
        by_name: HashMap::new(),
    };
    let text = to_string(&core, &scores).unwrap();
    assert_eq!(text, r#"{"by-round":[{"k":2,"v":[1]}],"by-name":{}}"#);

    let lenient: Scores =
        from_str(&core, r#"{"by-round":[],"by-name":{},"extra":[1,{"a":null}]}"#).unwrap();
    assert!(lenient.by_round.is_empty());
}

#[test]
fn invalid_config() {
    let config = Config::default().with_map_fields("same", "same");
    let err = CodecCore::builder().config(config).build().unwrap_err();
    assert!(matches!(err, CodecError::InvalidConfig(_)));
}
