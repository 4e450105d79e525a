//! An event sink that assembles a [`Value`] tree.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::Infallible;

use crate::context::SerContext;
use crate::event::{EventSink, Text};
use crate::num::half_to_f64;
use crate::tag::{BytesTag, SemanticTag};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StructureKind {
    Root,
    Array,
    Object,
}

#[derive(Debug)]
struct Structure {
    kind: StructureKind,
    /// Index of the container's placeholder item.
    container_index: usize,
}

#[derive(Debug)]
struct Item {
    key: Option<String>,
    value: Value,
}

/// Assembles events into a tagged [`Value`] tree.
///
/// Scalars append to a flat item buffer; closing a container drains the open
/// slice into the container's placeholder. Object insertion order is
/// preserved and duplicate keys are appended, not merged. `half` events are
/// widened to doubles.
///
/// # Examples
///
/// ```rust
/// use tagstream::{JsonParser, ParseOptions, TreeDecoder, Value};
///
/// let mut parser = JsonParser::new(ParseOptions::default());
/// let mut decoder = TreeDecoder::new();
/// parser.update(br#"{"a": [1, 2]}"#);
/// parser.finish_parse(&mut decoder).unwrap();
/// let value = decoder.get_result().unwrap();
/// assert_eq!(value["a"][1], Value::from(2i64));
/// ```
#[derive(Debug)]
pub struct TreeDecoder {
    items: Vec<Item>,
    structures: Vec<Structure>,
    name: Option<String>,
    result: Option<Value>,
}

impl Default for TreeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        let mut structures = Vec::with_capacity(16);
        structures.push(Structure {
            kind: StructureKind::Root,
            container_index: 0,
        });
        Self {
            items: Vec::new(),
            structures,
            name: None,
            result: None,
        }
    }

    /// Returns `true` once a complete root value has been assembled.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.result.is_some()
    }

    /// Transfers ownership of the assembled root to the caller.
    ///
    /// Callable once per complete value; returns `None` until a root value
    /// has been assembled.
    pub fn get_result(&mut self) -> Option<Value> {
        self.result.take()
    }

    /// Clears all state so the decoder can assemble a new value.
    pub fn reset(&mut self) {
        self.items.clear();
        self.structures.clear();
        self.structures.push(Structure {
            kind: StructureKind::Root,
            container_index: 0,
        });
        self.name = None;
        self.result = None;
    }

    fn at_root(&self) -> bool {
        matches!(
            self.structures.last(),
            Some(Structure {
                kind: StructureKind::Root,
                ..
            })
        ) || self.structures.is_empty()
    }

    fn begin_structure(&mut self, kind: StructureKind, placeholder: Value) {
        if self.at_root() {
            self.items.clear();
            self.result = None;
        }
        let key = self.name.take();
        self.items.push(Item {
            key,
            value: placeholder,
        });
        self.structures.push(Structure {
            kind,
            container_index: self.items.len() - 1,
        });
    }

    fn end_structure(&mut self, kind: StructureKind) {
        debug_assert!(matches!(self.structures.last(), Some(s) if s.kind == kind));
        let Some(structure) = self.structures.pop() else {
            return;
        };
        let container_index = structure.container_index;
        let drained: Vec<Item> = self.items.split_off(container_index + 1);
        match kind {
            StructureKind::Object => {
                let members: Vec<(String, Value)> = drained
                    .into_iter()
                    .map(|item| (item.key.unwrap_or_default(), item.value))
                    .collect();
                if let Some(slot) = self.items.get_mut(container_index) {
                    slot.value = Value::Object(members);
                }
            }
            StructureKind::Array => {
                let elements: Vec<Value> = drained.into_iter().map(|item| item.value).collect();
                if let Some(slot) = self.items.get_mut(container_index) {
                    slot.value = Value::Array(elements);
                }
            }
            StructureKind::Root => {}
        }
        if self.at_root() {
            if let Some(root) = self.items.pop() {
                self.result = Some(root.value);
            }
        }
    }

    fn push_value(&mut self, value: Value) {
        if self.at_root() {
            self.result = Some(value);
        } else {
            let key = self.name.take();
            self.items.push(Item { key, value });
        }
    }
}

impl EventSink for TreeDecoder {
    type Error = Infallible;

    fn begin_object(&mut self, _tag: SemanticTag, _ctx: &SerContext) -> Result<bool, Infallible> {
        self.begin_structure(StructureKind::Object, Value::Object(Vec::new()));
        Ok(true)
    }

    fn end_object(&mut self, _ctx: &SerContext) -> Result<bool, Infallible> {
        self.end_structure(StructureKind::Object);
        Ok(true)
    }

    fn begin_array(&mut self, _tag: SemanticTag, _ctx: &SerContext) -> Result<bool, Infallible> {
        self.begin_structure(StructureKind::Array, Value::Array(Vec::new()));
        Ok(true)
    }

    fn end_array(&mut self, _ctx: &SerContext) -> Result<bool, Infallible> {
        self.end_structure(StructureKind::Array);
        Ok(true)
    }

    fn key(&mut self, name: Text<'_>, _ctx: &SerContext) -> Result<bool, Infallible> {
        self.name = Some(name.to_string());
        Ok(true)
    }

    fn string_value(
        &mut self,
        value: Text<'_>,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.push_value(Value::String(value.to_string(), tag));
        Ok(true)
    }

    fn byte_string_value(
        &mut self,
        value: &[u8],
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.push_value(Value::Bytes(value.to_vec(), BytesTag::Semantic(tag)));
        Ok(true)
    }

    fn byte_string_with_tag(
        &mut self,
        value: &[u8],
        ext_tag: u64,
        _ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.push_value(Value::Bytes(value.to_vec(), BytesTag::Ext(ext_tag)));
        Ok(true)
    }

    fn int64_value(
        &mut self,
        value: i64,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.push_value(Value::Int(value, tag));
        Ok(true)
    }

    fn uint64_value(
        &mut self,
        value: u64,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.push_value(Value::UInt(value, tag));
        Ok(true)
    }

    fn double_value(
        &mut self,
        value: f64,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.push_value(Value::Double(value, tag));
        Ok(true)
    }

    fn half_value(
        &mut self,
        value: u16,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.push_value(Value::Double(half_to_f64(value), tag));
        Ok(true)
    }

    fn bool_value(
        &mut self,
        value: bool,
        tag: SemanticTag,
        _ctx: &SerContext,
    ) -> Result<bool, Infallible> {
        self.push_value(Value::Bool(value, tag));
        Ok(true)
    }

    fn null_value(&mut self, tag: SemanticTag, _ctx: &SerContext) -> Result<bool, Infallible> {
        self.push_value(Value::Null(tag));
        Ok(true)
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}
