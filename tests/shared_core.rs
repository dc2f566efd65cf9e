//! One core used by many threads at once.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use vc_serial::{CodecCore, Describe};

#[derive(Describe, Debug, Default, PartialEq, Clone)]
#[codec(default)]
struct Reading {
    sensor: String,
    samples: Vec<f64>,
    tags: BTreeSet<String>,
}

fn reading(n: usize) -> Reading {
    Reading {
        sensor: format!("s{n}"),
        samples: (0..n).map(|i| i as f64 / 2.0).collect(),
        tags: BTreeSet::from([format!("t{}", n % 3)]),
    }
}

#[test]
fn threads_share_codecs() {
    let core = CodecCore::new();

    let codecs = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let core = &core;
                s.spawn(move || {
                    let value = reading(n);
                    let text = vc_serial::json::to_string(core, &value).unwrap();
                    let bytes = vc_serial::binary::to_bytes(core, &value).unwrap();
                    assert_eq!(vc_serial::json::from_str::<Reading>(core, &text).unwrap(), value);
                    assert_eq!(vc_serial::binary::from_bytes::<Reading>(core, bytes).unwrap(), value);
                    core.get_codec::<Reading>().unwrap()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert!(codecs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert!(core.contains::<Vec<f64>>());
}
