use crate::{
    EventCapture, EventCursor, JsonErrorKind, JsonParser, ParseEvent, ParseOptions, SemanticTag,
};

#[test]
fn pull_iteration() {
    let mut cursor = EventCursor::from_slice(br#"{"a": [1, "two"]}"#, ParseOptions::default());
    let mut events = alloc::vec::Vec::new();
    while let Some(event) = cursor.next_event().unwrap() {
        events.push(event);
    }
    assert_eq!(
        events,
        alloc::vec![
            ParseEvent::BeginObject {
                length: None,
                tag: SemanticTag::None
            },
            ParseEvent::Key("a".into()),
            ParseEvent::BeginArray {
                length: None,
                tag: SemanticTag::None
            },
            ParseEvent::Int64 {
                value: 1,
                tag: SemanticTag::None
            },
            ParseEvent::String {
                value: "two".into(),
                tag: SemanticTag::None
            },
            ParseEvent::EndArray,
            ParseEvent::EndObject,
        ]
    );
    assert!(cursor.done());
}

#[test]
fn scalar_root() {
    let mut cursor = EventCursor::from_slice(b"42", ParseOptions::default());
    assert_eq!(
        cursor.next_event().unwrap(),
        Some(ParseEvent::Int64 {
            value: 42,
            tag: SemanticTag::None
        })
    );
    assert_eq!(cursor.next_event().unwrap(), None);
    assert!(cursor.done());
}

#[test]
fn streaming_yields_none_until_finish() {
    let mut cursor = EventCursor::new(ParseOptions::default());
    cursor.update(b"[1");
    assert_eq!(
        cursor.next_event().unwrap(),
        Some(ParseEvent::BeginArray {
            length: None,
            tag: SemanticTag::None
        })
    );
    // The array element may still grow ("1" could continue as "12"), so
    // nothing more can be produced yet.
    assert_eq!(cursor.next_event().unwrap(), None);
    cursor.update(b"2]");
    cursor.finish();
    assert_eq!(
        cursor.next_event().unwrap(),
        Some(ParseEvent::Int64 {
            value: 12,
            tag: SemanticTag::None
        })
    );
    assert_eq!(cursor.next_event().unwrap(), Some(ParseEvent::EndArray));
    assert_eq!(cursor.next_event().unwrap(), None);
}

#[test]
fn incomplete_document_errors_after_finish() {
    let mut cursor = EventCursor::new(ParseOptions::default());
    cursor.update(b"[1,");
    assert!(cursor.next_event().unwrap().is_some());
    assert!(cursor.next_event().unwrap().is_some());
    assert_eq!(cursor.next_event().unwrap(), None);
    cursor.finish();
    let err = cursor.next_event().unwrap_err();
    assert_eq!(err.kind(), Some(JsonErrorKind::UnexpectedEof));
}

#[test]
fn mark_level_bounds_subtree_traversal() {
    let mut parser = JsonParser::new(ParseOptions::default());
    let mut capture = EventCapture::new();
    parser.update(b"[[1, 2], 3]");
    parser.set_mark_level(2);
    parser.finish_parse(&mut capture).unwrap();
    // Suspended when the inner array closed back to the mark.
    assert!(parser.stopped());
    assert!(!parser.done());
    assert_eq!(capture.len(), 5);

    parser.restart();
    parser.finish_parse(&mut capture).unwrap();
    assert_eq!(capture.len(), 7);
}
