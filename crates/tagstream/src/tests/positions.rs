use alloc::vec::Vec;

use super::utils::events_with_ctx;
use crate::{EventCapture, JsonParser, ParseEvent, ParseOptions, SerContext};

#[test]
fn token_begin_positions() {
    let captured = events_with_ctx("[true, false, null]", ParseOptions::default());
    let begins: Vec<usize> = captured
        .iter()
        .map(|(_, ctx)| ctx.begin_position())
        .collect();
    // `[` at 0, `true` at 1, `false` at 7, `null` at 14, `]` at 18.
    assert_eq!(begins, [0, 1, 7, 14, 18]);
}

#[test]
fn closing_bracket_position() {
    let captured = events_with_ctx("{\"a\": 1}", ParseOptions::default());
    let (event, ctx) = captured.last().unwrap();
    assert_eq!(event, &ParseEvent::EndObject);
    assert_eq!(ctx.begin_position(), 7);
    assert_eq!(ctx.end_position(), 8);
}

#[test]
fn line_and_column_tracking() {
    let captured = events_with_ctx("[\n  1,\n  2\n]", ParseOptions::default());
    let positions: Vec<(usize, usize)> = captured
        .iter()
        .map(|(_, ctx)| (ctx.line(), ctx.column()))
        .collect();
    // Columns are measured just past the consumed token.
    assert_eq!(positions[0], (1, 2));
    assert_eq!(positions[1].0, 2);
    assert_eq!(positions[2].0, 3);
    assert_eq!(positions[3].0, 4);
}

#[test]
fn crlf_counts_one_line_break() {
    let captured = events_with_ctx("[\r\n1,\r2,\n3]", ParseOptions::default());
    let lines: Vec<usize> = captured.iter().map(|(_, ctx)| ctx.line()).collect();
    assert_eq!(lines, [1, 2, 3, 4, 4]);
}

#[test]
fn cr_split_across_chunks_counts_once() {
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut capture = EventCapture::new();
    parser.update(b"[1,\r");
    parser.parse_some(&mut capture).unwrap();
    parser.update(b"\n2]");
    parser.finish_parse(&mut capture).unwrap();
    assert_eq!(parser.line(), 2);

    // A carriage return that is the final byte of the input still counts.
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut capture = EventCapture::new();
    parser.update(b"[1,2]\r");
    parser.finish_parse(&mut capture).unwrap();
    parser.check_done().unwrap();
    assert_eq!(parser.line(), 1);
}

#[test]
fn cr_at_end_of_input_still_counts() {
    use crate::JsonErrorKind;

    let mut parser = JsonParser::new(ParseOptions::default());
    let mut capture = EventCapture::new();
    parser.update(b"[1,\r");
    parser.parse_some(&mut capture).unwrap();
    // Settle the suspended line break, then hit the open array.
    parser.parse_some(&mut capture).unwrap();
    let err = parser.parse_some(&mut capture).unwrap_err();
    assert_eq!(err.kind(), Some(JsonErrorKind::UnexpectedEof));
    assert_eq!(parser.line(), 2);
}

#[test]
fn position_monotonicity() {
    let doc = "{\"a\": [1, 2.5, \"x\"], \"b\": {\"c\": null}}";
    let captured = events_with_ctx(doc, ParseOptions::default());
    let mut previous: Option<&SerContext> = None;
    for (_, ctx) in &captured {
        assert!(ctx.begin_position() <= ctx.end_position());
        if let Some(prev) = previous {
            assert!(ctx.line() >= prev.line());
            assert!(ctx.end_position() > prev.begin_position());
        }
        previous = Some(ctx);
    }
}
