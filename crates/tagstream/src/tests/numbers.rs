use alloc::vec;

use super::utils::{events, events_of};
use crate::{ParseEvent, ParseOptions, SemanticTag};

#[test]
fn integer_type_boundaries() {
    assert_eq!(
        events("9223372036854775807"),
        vec![ParseEvent::Int64 {
            value: i64::MAX,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("9223372036854775808"),
        vec![ParseEvent::UInt64 {
            value: 9_223_372_036_854_775_808,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("18446744073709551615"),
        vec![ParseEvent::UInt64 {
            value: u64::MAX,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("18446744073709551616"),
        vec![ParseEvent::String {
            value: "18446744073709551616".into(),
            tag: SemanticTag::BigInt
        }]
    );
}

#[test]
fn negative_boundaries() {
    assert_eq!(
        events("-9223372036854775808"),
        vec![ParseEvent::Int64 {
            value: i64::MIN,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("-9223372036854775809"),
        vec![ParseEvent::String {
            value: "-9223372036854775809".into(),
            tag: SemanticTag::BigInt
        }]
    );
}

#[test]
fn fraction_and_exponent_forms() {
    assert_eq!(
        events("-0.5e2"),
        vec![ParseEvent::Double {
            value: -50.0,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("0.25"),
        vec![ParseEvent::Double {
            value: 0.25,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("1E3"),
        vec![ParseEvent::Double {
            value: 1000.0,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("0"),
        vec![ParseEvent::Int64 {
            value: 0,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("-0"),
        vec![ParseEvent::Int64 {
            value: 0,
            tag: SemanticTag::None
        }]
    );
}

#[test]
fn lossless_number_preserves_text() {
    let options = ParseOptions {
        lossless_number: true,
        ..Default::default()
    };
    assert_eq!(
        events_of("3.140", options.clone()),
        vec![ParseEvent::String {
            value: "3.140".into(),
            tag: SemanticTag::BigDec
        }]
    );
    // Integers are unaffected.
    assert_eq!(
        events_of("42", options),
        vec![ParseEvent::Int64 {
            value: 42,
            tag: SemanticTag::None
        }]
    );
}

#[test]
fn overflowing_fraction_defaults_to_infinity() {
    assert_eq!(
        events("1e999"),
        vec![ParseEvent::Double {
            value: f64::INFINITY,
            tag: SemanticTag::None
        }]
    );
    assert_eq!(
        events("-1e999"),
        vec![ParseEvent::Double {
            value: f64::NEG_INFINITY,
            tag: SemanticTag::None
        }]
    );
}

#[test]
fn overflowing_fraction_with_lossless_bignum() {
    let options = ParseOptions {
        lossless_bignum: true,
        ..Default::default()
    };
    assert_eq!(
        events_of("1e999", options),
        vec![ParseEvent::String {
            value: "1e999".into(),
            tag: SemanticTag::BigDec
        }]
    );
}
