use alloc::vec::Vec;

use crate::cbor::{CborEncodeOptions, CborEncoder};
use crate::{EventSink, SemanticTag, SerContext};

fn ctx() -> SerContext {
    SerContext::default()
}

fn packed() -> CborEncodeOptions {
    CborEncodeOptions {
        pack_strings: true,
        ..Default::default()
    }
}

#[test]
fn repeated_strings_become_references() {
    let mut bytes = Vec::new();
    {
        let mut enc = CborEncoder::with_options(&mut bytes, packed());
        enc.begin_array_with_length(3, SemanticTag::None, &ctx())
            .unwrap();
        enc.string_value("aaa".into(), SemanticTag::None, &ctx())
            .unwrap();
        enc.string_value("aaa".into(), SemanticTag::None, &ctx())
            .unwrap();
        enc.string_value("bbb".into(), SemanticTag::None, &ctx())
            .unwrap();
        enc.end_array(&ctx()).unwrap();
    }
    assert_eq!(
        bytes,
        [
            0xd9, 0x01, 0x00, // tag 256, the stringref namespace
            0x83, // array(3)
            0x63, 0x61, 0x61, 0x61, // "aaa", assigned index 0
            0xd8, 0x19, 0x00, // tag 25, reference to index 0
            0x63, 0x62, 0x62, 0x62, // "bbb", assigned index 1
        ]
    );
}

#[test]
fn short_strings_are_never_referenced() {
    let mut bytes = Vec::new();
    {
        let mut enc = CborEncoder::with_options(&mut bytes, packed());
        enc.begin_array_with_length(2, SemanticTag::None, &ctx())
            .unwrap();
        enc.string_value("ab".into(), SemanticTag::None, &ctx())
            .unwrap();
        enc.string_value("ab".into(), SemanticTag::None, &ctx())
            .unwrap();
        enc.end_array(&ctx()).unwrap();
    }
    assert_eq!(
        bytes,
        [
            0xd9, 0x01, 0x00,
            0x82,
            0x62, 0x61, 0x62,
            0x62, 0x61, 0x62,
        ]
    );
}

#[test]
fn keys_participate_in_packing() {
    let mut bytes = Vec::new();
    {
        let mut enc = CborEncoder::with_options(&mut bytes, packed());
        enc.begin_array_with_length(2, SemanticTag::None, &ctx())
            .unwrap();
        enc.begin_object_with_length(1, SemanticTag::None, &ctx())
            .unwrap();
        enc.key("name".into(), &ctx()).unwrap();
        enc.uint64_value(1, SemanticTag::None, &ctx()).unwrap();
        enc.end_object(&ctx()).unwrap();
        enc.begin_object_with_length(1, SemanticTag::None, &ctx())
            .unwrap();
        enc.key("name".into(), &ctx()).unwrap();
        enc.uint64_value(2, SemanticTag::None, &ctx()).unwrap();
        enc.end_object(&ctx()).unwrap();
        enc.end_array(&ctx()).unwrap();
    }
    assert_eq!(
        bytes,
        [
            0xd9, 0x01, 0x00,
            0x82,
            0xa1, 0x64, 0x6e, 0x61, 0x6d, 0x65, 0x01,
            0xa1, 0xd8, 0x19, 0x00, 0x02,
        ]
    );
}

#[test]
fn byte_strings_pack_separately_from_text() {
    let mut bytes = Vec::new();
    {
        let mut enc = CborEncoder::with_options(&mut bytes, packed());
        enc.begin_array_with_length(3, SemanticTag::None, &ctx())
            .unwrap();
        enc.byte_string_value(&[1, 2, 3], SemanticTag::None, &ctx())
            .unwrap();
        enc.byte_string_value(&[1, 2, 3], SemanticTag::None, &ctx())
            .unwrap();
        // Same bytes as text are a distinct entry.
        enc.string_value("abc".into(), SemanticTag::None, &ctx())
            .unwrap();
        enc.end_array(&ctx()).unwrap();
    }
    assert_eq!(
        bytes,
        [
            0xd9, 0x01, 0x00,
            0x83,
            0x43, 0x01, 0x02, 0x03,
            0xd8, 0x19, 0x00,
            0x63, 0x61, 0x62, 0x63,
        ]
    );
}

#[test]
fn ext_tagged_byte_strings_pack() {
    let mut bytes = Vec::new();
    {
        let mut enc = CborEncoder::with_options(&mut bytes, packed());
        enc.begin_array_with_length(2, SemanticTag::None, &ctx())
            .unwrap();
        enc.byte_string_with_tag(&[9, 9, 9], 70, &ctx()).unwrap();
        enc.byte_string_with_tag(&[9, 9, 9], 70, &ctx()).unwrap();
        enc.end_array(&ctx()).unwrap();
    }
    assert_eq!(
        bytes,
        [
            0xd9, 0x01, 0x00,
            0x82,
            0xd8, 0x46, 0x43, 0x09, 0x09, 0x09,
            0xd8, 0x19, 0x00,
        ]
    );
}

#[test]
fn reset_clears_the_reference_table() {
    let mut bytes = Vec::new();
    {
        let mut enc = CborEncoder::with_options(&mut bytes, packed());
        enc.string_value("aaa".into(), SemanticTag::None, &ctx())
            .unwrap();
        enc.reset();
        enc.string_value("aaa".into(), SemanticTag::None, &ctx())
            .unwrap();
    }
    // Both occurrences are literals: the table did not survive the reset.
    assert_eq!(
        bytes,
        [
            0xd9, 0x01, 0x00,
            0x63, 0x61, 0x61, 0x61,
            0x63, 0x61, 0x61, 0x61,
        ]
    );
}
