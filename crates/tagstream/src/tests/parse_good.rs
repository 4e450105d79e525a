use alloc::vec;

use super::utils::{events, events_of};
use crate::{decode_json, ParseEvent, ParseOptions, SemanticTag, Value};

#[test]
fn literals() {
    assert_eq!(
        events("true"),
        vec![ParseEvent::Bool {
            value: true,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("false"),
        vec![ParseEvent::Bool {
            value: false,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("null"),
        vec![ParseEvent::Null {
            tag: SemanticTag::None
        }]
    );
}

#[test]
fn array_of_literals() {
    assert_eq!(
        events("[true, false, null]"),
        vec![
            ParseEvent::BeginArray {
                length: None,
                tag: SemanticTag::None
            },
            ParseEvent::Bool {
                value: true,
                tag: SemanticTag::None
            },
            ParseEvent::Bool {
                value: false,
                tag: SemanticTag::None
            },
            ParseEvent::Null {
                tag: SemanticTag::None
            },
            ParseEvent::EndArray,
        ]
    );
}

#[test]
fn empty_containers() {
    assert_eq!(
        events("{}"),
        vec![
            ParseEvent::BeginObject {
                length: None,
                tag: SemanticTag::None
            },
            ParseEvent::EndObject,
        ]
    );
    assert_eq!(
        events("[]"),
        vec![
            ParseEvent::BeginArray {
                length: None,
                tag: SemanticTag::None
            },
            ParseEvent::EndArray,
        ]
    );
}

#[test]
fn nested_object() {
    let value = decode_json(br#"{"a": {"b": [1, 2]}, "c": null}"#, ParseOptions::default())
        .unwrap();
    assert_eq!(value["a"]["b"][1], Value::from(2i64));
    assert!(value["c"].is_null());
}

#[test]
fn surrounding_whitespace() {
    assert_eq!(
        events(" \t\r\n [ 1 ] \n"),
        vec![
            ParseEvent::BeginArray {
                length: None,
                tag: SemanticTag::None
            },
            ParseEvent::Int64 {
                value: 1,
                tag: SemanticTag::None
            },
            ParseEvent::EndArray,
        ]
    );
}

#[test]
fn comments_allowed() {
    let options = ParseOptions {
        allow_comments: true,
        ..Default::default()
    };
    let evs = events_of("// leading\n[1, /* inner\n spanning */ 2]", options);
    assert_eq!(evs.len(), 4);
    assert_eq!(
        evs[2],
        ParseEvent::Int64 {
            value: 2,
            tag: SemanticTag::None
        }
    );
}

#[test]
fn trailing_comma_allowed() {
    let options = ParseOptions {
        allow_trailing_comma: true,
        ..Default::default()
    };
    assert_eq!(events_of("[1, 2, ]", options.clone()).len(), 4);
    assert_eq!(events_of(r#"{"a": 1, }"#, options).len(), 4);
}

#[test]
fn nan_and_infinity_literals() {
    let options = ParseOptions {
        nan_literal: Some("NaN".into()),
        inf_literal: Some("Infinity".into()),
        neg_inf_literal: Some("-Infinity".into()),
        ..Default::default()
    };
    let evs = events_of(r#"["NaN", "Infinity", "-Infinity", "plain"]"#, options);
    assert!(
        matches!(evs[1], ParseEvent::Double { value, .. } if value.is_nan())
    );
    assert_eq!(
        evs[2],
        ParseEvent::Double {
            value: f64::INFINITY,
            tag: SemanticTag::None
        }
    );
    assert_eq!(
        evs[3],
        ParseEvent::Double {
            value: f64::NEG_INFINITY,
            tag: SemanticTag::None
        }
    );
    assert_eq!(
        evs[4],
        ParseEvent::String {
            value: "plain".into(),
            tag: SemanticTag::None
        }
    );
}

#[test]
fn special_literal_not_applied_to_keys() {
    let options = ParseOptions {
        nan_literal: Some("NaN".into()),
        ..Default::default()
    };
    let evs = events_of(r#"{"NaN": 1}"#, options);
    assert_eq!(evs[1], ParseEvent::Key("NaN".into()));
}

#[test]
fn parser_reuse_after_reset() {
    use crate::{EventCapture, JsonParser};

    let mut parser = JsonParser::new(ParseOptions::default());
    let mut capture = EventCapture::new();
    parser.update(b"[1]");
    parser.finish_parse(&mut capture).unwrap();
    assert!(parser.done());

    parser.reset();
    let mut capture = EventCapture::new();
    parser.update(b"{\"a\":2}");
    parser.finish_parse(&mut capture).unwrap();
    assert!(parser.done());
    assert_eq!(capture.len(), 4);
}

#[test]
fn duplicate_keys_are_appended() {
    let value = decode_json(br#"{"k": 1, "k": 2}"#, ParseOptions::default()).unwrap();
    let members = value.as_object().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].1, Value::from(1i64));
    assert_eq!(members[1].1, Value::from(2i64));
}

#[test]
fn insertion_order_preserved() {
    let value = decode_json(br#"{"z": 1, "a": 2, "m": 3}"#, ParseOptions::default()).unwrap();
    let keys: alloc::vec::Vec<&str> = value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, _)| k.as_str())
        .collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}
