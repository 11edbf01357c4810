//! 集合编解码器：`list<T>`、`set<T>` 与 `map<K, V>`。
//!
//! # 线格式（What）
//! - 元素个数以 `u16` 大端写出，随后每个元素（映射则为每个键、每个值）写出 `u16` 长度与负载；
//! - 个数或单个元素体积超过 [`MAX_COLLECTION_LENGTH`] 时，在写出任何字节前返回
//!   [`CodecError::Oversize`]；
//! - 解码拒绝截断与尾随字节。
//!
//! # 去重规则
//! - 集合按元素的序列化形式去重并保留首次出现的位置，序列化与反序列化都执行；
//! - 映射反序列化遇到重复键时保留首个键的位置与最后一个值。

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::literal::{split_collection, split_entry};
use super::{TypeCodec, type_mismatch};
use crate::error::{CodecError, MAX_COLLECTION_LENGTH, OversizeKind, Result};
use crate::host::HostType;
use crate::value::Value;
use crate::wire::WireType;

/// `list<T>` 编解码器，宿主类型为 `List<T>`。
#[derive(Clone, Debug)]
pub struct ListCodec {
    wire: WireType,
    host: HostType,
    element: Arc<dyn TypeCodec>,
}

impl ListCodec {
    /// 以元素编解码器组合出列表编解码器。
    pub fn new(element: Arc<dyn TypeCodec>) -> Self {
        Self {
            wire: WireType::list(element.wire_type().clone()),
            host: HostType::list(element.host_type().clone()),
            element,
        }
    }

    /// 元素编解码器。
    pub fn element(&self) -> &Arc<dyn TypeCodec> {
        &self.element
    }
}

impl TypeCodec for ListCodec {
    fn wire_type(&self) -> &WireType {
        &self.wire
    }

    fn host_type(&self) -> &HostType {
        &self.host
    }

    fn accepts_value(&self, value: &Value) -> bool {
        match value {
            Value::List(elements) => elements
                .first()
                .is_none_or(|first| self.element.accepts_value(first)),
            _ => false,
        }
    }

    fn serialize(&self, value: &Value) -> Result<Bytes> {
        let Value::List(elements) = value else {
            return Err(type_mismatch(self, value));
        };
        ensure_count(elements.len())?;
        let encoded = encode_all(self.element.as_ref(), elements)?;
        Ok(write_frame(encoded.len(), &encoded))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        let mut reader = FrameReader::new(&self.wire, bytes);
        let count = reader.read_count()?;
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            elements.push(self.element.deserialize(reader.read_element()?)?);
        }
        reader.finish()?;
        Ok(Value::List(elements))
    }

    fn format(&self, value: &Value) -> Result<String> {
        let Value::List(elements) = value else {
            return Err(type_mismatch(self, value));
        };
        format_sequence(self.element.as_ref(), elements, '[', ']')
    }

    fn parse(&self, text: &str) -> Result<Value> {
        let elements = split_collection(text, '[', ']')?
            .into_iter()
            .map(|item| self.element.parse(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::List(elements))
    }
}

/// `set<T>` 编解码器，宿主类型为 `Set<T>`。
#[derive(Clone, Debug)]
pub struct SetCodec {
    wire: WireType,
    host: HostType,
    element: Arc<dyn TypeCodec>,
}

impl SetCodec {
    /// 以元素编解码器组合出集合编解码器。
    pub fn new(element: Arc<dyn TypeCodec>) -> Self {
        Self {
            wire: WireType::set(element.wire_type().clone()),
            host: HostType::set(element.host_type().clone()),
            element,
        }
    }

    /// 元素编解码器。
    pub fn element(&self) -> &Arc<dyn TypeCodec> {
        &self.element
    }

    /// 序列化并去重，返回保留下来的元素及其编码。
    fn encode_distinct<'v>(&self, elements: &'v [Value]) -> Result<Vec<(&'v Value, Bytes)>> {
        let mut seen = std::collections::HashSet::with_capacity(elements.len());
        let mut distinct = Vec::with_capacity(elements.len());
        for element in elements {
            let encoded = encode_element(self.element.as_ref(), element)?;
            if seen.insert(encoded.clone()) {
                distinct.push((element, encoded));
            }
        }
        Ok(distinct)
    }
}

impl TypeCodec for SetCodec {
    fn wire_type(&self) -> &WireType {
        &self.wire
    }

    fn host_type(&self) -> &HostType {
        &self.host
    }

    fn accepts_value(&self, value: &Value) -> bool {
        match value {
            Value::Set(elements) => elements
                .first()
                .is_none_or(|first| self.element.accepts_value(first)),
            _ => false,
        }
    }

    fn serialize(&self, value: &Value) -> Result<Bytes> {
        let Value::Set(elements) = value else {
            return Err(type_mismatch(self, value));
        };
        let encoded: Vec<Bytes> = self
            .encode_distinct(elements)?
            .into_iter()
            .map(|(_, bytes)| bytes)
            .collect();
        ensure_count(encoded.len())?;
        Ok(write_frame(encoded.len(), &encoded))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        let mut reader = FrameReader::new(&self.wire, bytes);
        let count = reader.read_count()?;
        let mut seen = std::collections::HashSet::with_capacity(count);
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let raw = reader.read_element()?;
            if seen.insert(raw) {
                elements.push(self.element.deserialize(raw)?);
            }
        }
        reader.finish()?;
        Ok(Value::Set(elements))
    }

    fn format(&self, value: &Value) -> Result<String> {
        let Value::Set(elements) = value else {
            return Err(type_mismatch(self, value));
        };
        let distinct: Vec<Value> = self
            .encode_distinct(elements)?
            .into_iter()
            .map(|(element, _)| element.clone())
            .collect();
        format_sequence(self.element.as_ref(), &distinct, '{', '}')
    }

    fn parse(&self, text: &str) -> Result<Value> {
        let parsed = split_collection(text, '{', '}')?
            .into_iter()
            .map(|item| self.element.parse(item))
            .collect::<Result<Vec<_>>>()?;
        let distinct = self
            .encode_distinct(&parsed)?
            .into_iter()
            .map(|(element, _)| element.clone())
            .collect();
        Ok(Value::Set(distinct))
    }
}

/// `map<K, V>` 编解码器，宿主类型为 `Map<K, V>`。
#[derive(Clone, Debug)]
pub struct MapCodec {
    wire: WireType,
    host: HostType,
    key: Arc<dyn TypeCodec>,
    value: Arc<dyn TypeCodec>,
}

impl MapCodec {
    /// 以键、值编解码器组合出映射编解码器。
    pub fn new(key: Arc<dyn TypeCodec>, value: Arc<dyn TypeCodec>) -> Self {
        Self {
            wire: WireType::map(key.wire_type().clone(), value.wire_type().clone()),
            host: HostType::map(key.host_type().clone(), value.host_type().clone()),
            key,
            value,
        }
    }

    /// 键编解码器。
    pub fn key(&self) -> &Arc<dyn TypeCodec> {
        &self.key
    }

    /// 值编解码器。
    pub fn value(&self) -> &Arc<dyn TypeCodec> {
        &self.value
    }
}

impl TypeCodec for MapCodec {
    fn wire_type(&self) -> &WireType {
        &self.wire
    }

    fn host_type(&self) -> &HostType {
        &self.host
    }

    fn accepts_value(&self, value: &Value) -> bool {
        match value {
            Value::Map(entries) => entries.first().is_none_or(|(key, value)| {
                self.key.accepts_value(key) && self.value.accepts_value(value)
            }),
            _ => false,
        }
    }

    fn serialize(&self, value: &Value) -> Result<Bytes> {
        let Value::Map(entries) = value else {
            return Err(type_mismatch(self, value));
        };
        ensure_count(entries.len())?;
        let mut encoded = Vec::with_capacity(entries.len() * 2);
        for (key, value) in entries {
            encoded.push(encode_element(self.key.as_ref(), key)?);
            encoded.push(encode_element(self.value.as_ref(), value)?);
        }
        Ok(write_frame(entries.len(), &encoded))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        let mut reader = FrameReader::new(&self.wire, bytes);
        let count = reader.read_count()?;
        let mut positions: HashMap<&[u8], usize> = HashMap::with_capacity(count);
        let mut entries: Vec<(Value, Value)> = Vec::with_capacity(count);
        for _ in 0..count {
            let raw_key = reader.read_element()?;
            let raw_value = reader.read_element()?;
            let value = self.value.deserialize(raw_value)?;
            match positions.entry(raw_key) {
                Entry::Occupied(slot) => entries[*slot.get()].1 = value,
                Entry::Vacant(slot) => {
                    slot.insert(entries.len());
                    entries.push((self.key.deserialize(raw_key)?, value));
                }
            }
        }
        reader.finish()?;
        Ok(Value::Map(entries))
    }

    fn format(&self, value: &Value) -> Result<String> {
        let Value::Map(entries) = value else {
            return Err(type_mismatch(self, value));
        };
        let mut literal = String::from("{");
        for (idx, (key, value)) in entries.iter().enumerate() {
            if idx > 0 {
                literal.push(',');
            }
            literal.push_str(&self.key.format(key)?);
            literal.push(':');
            literal.push_str(&self.value.format(value)?);
        }
        literal.push('}');
        Ok(literal)
    }

    fn parse(&self, text: &str) -> Result<Value> {
        let entries = split_collection(text, '{', '}')?
            .into_iter()
            .map(|item| {
                let (key, value) = split_entry(item)?;
                Ok((self.key.parse(key)?, self.value.parse(value)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Map(entries))
    }
}

fn ensure_count(count: usize) -> Result<()> {
    if count > MAX_COLLECTION_LENGTH {
        return Err(CodecError::Oversize {
            kind: OversizeKind::Collection,
            size: count,
            limit: MAX_COLLECTION_LENGTH,
        });
    }
    Ok(())
}

fn encode_element(codec: &dyn TypeCodec, element: &Value) -> Result<Bytes> {
    let encoded = codec.serialize(element)?;
    if encoded.len() > MAX_COLLECTION_LENGTH {
        return Err(CodecError::Oversize {
            kind: OversizeKind::Element,
            size: encoded.len(),
            limit: MAX_COLLECTION_LENGTH,
        });
    }
    Ok(encoded)
}

fn encode_all(codec: &dyn TypeCodec, elements: &[Value]) -> Result<Vec<Bytes>> {
    elements
        .iter()
        .map(|element| encode_element(codec, element))
        .collect()
}

/// 写出帧；调用方已完成全部尺寸检查，此处的 `u16` 截断不会发生。
fn write_frame(count: usize, parts: &[Bytes]) -> Bytes {
    let body: usize = parts.iter().map(|part| 2 + part.len()).sum();
    let mut buf = BytesMut::with_capacity(2 + body);
    buf.put_u16(count as u16);
    for part in parts {
        buf.put_u16(part.len() as u16);
        buf.put_slice(part);
    }
    buf.freeze()
}

fn format_sequence(
    codec: &dyn TypeCodec,
    elements: &[Value],
    open: char,
    close: char,
) -> Result<String> {
    let mut literal = String::new();
    literal.push(open);
    for (idx, element) in elements.iter().enumerate() {
        if idx > 0 {
            literal.push(',');
        }
        literal.push_str(&codec.format(element)?);
    }
    literal.push(close);
    Ok(literal)
}

/// 基于 `u16` 长度前缀的帧读取器。
struct FrameReader<'a> {
    wire: &'a WireType,
    buf: &'a [u8],
}

impl<'a> FrameReader<'a> {
    fn new(wire: &'a WireType, buf: &'a [u8]) -> Self {
        Self { wire, buf }
    }

    fn read_count(&mut self) -> Result<usize> {
        self.read_u16("element count")
    }

    fn read_element(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u16("element length")?;
        if self.buf.remaining() < len {
            return Err(CodecError::invalid_bytes(
                self.wire,
                format!(
                    "truncated element: expected {len} bytes, {} remaining",
                    self.buf.remaining()
                ),
            ));
        }
        let (element, rest) = self.buf.split_at(len);
        self.buf = rest;
        Ok(element)
    }

    fn finish(self) -> Result<()> {
        if self.buf.has_remaining() {
            return Err(CodecError::invalid_bytes(
                self.wire,
                format!("{} trailing bytes after collection", self.buf.remaining()),
            ));
        }
        Ok(())
    }

    fn read_u16(&mut self, what: &str) -> Result<usize> {
        if self.buf.remaining() < 2 {
            return Err(CodecError::invalid_bytes(
                self.wire,
                format!("truncated {what}"),
            ));
        }
        Ok(usize::from(self.buf.get_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PrimitiveCodec;

    fn primitive(wire: WireType) -> Arc<dyn TypeCodec> {
        Arc::new(PrimitiveCodec::for_wire(&wire).expect("primitive"))
    }

    #[test]
    fn list_wire_form_is_count_then_length_prefixed_elements() {
        let codec = ListCodec::new(primitive(WireType::Int));
        let value = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let bytes = codec.serialize(&value).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[0, 2, 0, 4, 0, 0, 0, 1, 0, 4, 0, 0, 0, 2]
        );
        assert_eq!(codec.deserialize(&bytes).unwrap(), value);
        assert_eq!(codec.format(&value).unwrap(), "[1,2]");
        assert_eq!(codec.parse(" [ 1 , 2 ] ").unwrap(), value);
    }

    #[test]
    fn truncated_and_trailing_bytes_are_rejected() {
        let codec = ListCodec::new(primitive(WireType::Int));
        let err = codec.deserialize(&[0, 1, 0, 4, 0, 0]).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::CODEC_INVALID_BYTES);
        let err = codec.deserialize(&[0, 0, 9]).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::CODEC_INVALID_BYTES);
        assert!(codec.deserialize(&[0]).is_err());
    }

    #[test]
    fn set_keeps_first_occurrence() {
        let codec = SetCodec::new(primitive(WireType::Text));
        let value = Value::Set(vec![Value::from("b"), Value::from("a"), Value::from("b")]);
        let bytes = codec.serialize(&value).unwrap();
        assert_eq!(&bytes[..2], &[0, 2]);
        assert_eq!(
            codec.deserialize(&bytes).unwrap(),
            Value::Set(vec![Value::from("b"), Value::from("a")])
        );
        assert_eq!(codec.format(&value).unwrap(), "{'b','a'}");
        assert_eq!(
            codec.parse("{'a','a'}").unwrap(),
            Value::Set(vec![Value::from("a")])
        );
    }

    #[test]
    fn map_duplicate_keys_keep_first_position_and_last_value() {
        let codec = MapCodec::new(primitive(WireType::Text), primitive(WireType::Int));
        // 手工构造含重复键的负载：{'a':1, 'b':2, 'a':3}
        let mut raw = vec![0, 3];
        for (key, value) in [("a", 1i32), ("b", 2), ("a", 3)] {
            raw.extend_from_slice(&[0, 1]);
            raw.extend_from_slice(key.as_bytes());
            raw.extend_from_slice(&[0, 4]);
            raw.extend_from_slice(&value.to_be_bytes());
        }
        assert_eq!(
            codec.deserialize(&raw).unwrap(),
            Value::Map(vec![
                (Value::from("a"), Value::Int(3)),
                (Value::from("b"), Value::Int(2)),
            ])
        );
    }

    #[test]
    fn map_literals_respect_quotes() {
        let codec = MapCodec::new(primitive(WireType::Text), primitive(WireType::Inet));
        let value = Value::Map(vec![(
            Value::from("k:1"),
            Value::Inet("::1".parse().unwrap()),
        )]);
        let literal = codec.format(&value).unwrap();
        assert_eq!(literal, "{'k:1':'::1'}");
        assert_eq!(codec.parse(&literal).unwrap(), value);
    }

    #[test]
    fn accepts_value_inspects_first_element_only() {
        let codec = ListCodec::new(primitive(WireType::Int));
        assert!(codec.accepts_value(&Value::List(Vec::new())));
        assert!(codec.accepts_value(&Value::List(vec![Value::Int(1), Value::from("x")])));
        assert!(!codec.accepts_value(&Value::List(vec![Value::from("x")])));
        assert!(!codec.accepts_value(&Value::Set(Vec::new())));
    }

    #[test]
    fn element_size_limit_is_enforced_before_writing() {
        let codec = ListCodec::new(primitive(WireType::Blob));
        let oversized = Value::Bytes(Bytes::from(vec![0u8; MAX_COLLECTION_LENGTH + 1]));
        let err = codec.serialize(&Value::List(vec![oversized])).unwrap_err();
        assert_eq!(
            err,
            CodecError::Oversize {
                kind: OversizeKind::Element,
                size: MAX_COLLECTION_LENGTH + 1,
                limit: MAX_COLLECTION_LENGTH,
            }
        );
    }
}
