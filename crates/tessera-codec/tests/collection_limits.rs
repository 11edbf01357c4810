//! 集合长度前缀上限的集成测试：超限输入必须在产生任何输出前被拒绝。

use bytes::Bytes;
use tessera_codec::{
    CodecError, CodecRegistry, MAX_COLLECTION_LENGTH, OversizeKind, Value, WireType, codes,
};

#[test]
fn list_with_too_many_elements_is_rejected() {
    let codec = CodecRegistry::default_instance()
        .resolve(&WireType::list(WireType::Int))
        .unwrap();
    let value = Value::List((0..=MAX_COLLECTION_LENGTH as i32).map(Value::Int).collect());

    let err = codec.serialize(&value).unwrap_err();
    assert_eq!(
        err,
        CodecError::Oversize {
            kind: OversizeKind::Collection,
            size: 65_536,
            limit: 65_535,
        }
    );
    assert_eq!(err.code(), codes::CODEC_OVERSIZE);
}

#[test]
fn list_at_the_limit_is_accepted() {
    let codec = CodecRegistry::default_instance()
        .resolve(&WireType::list(WireType::Boolean))
        .unwrap();
    let value = Value::List(vec![Value::Boolean(true); MAX_COLLECTION_LENGTH]);
    let bytes = codec.serialize(&value).unwrap();
    assert_eq!(&bytes[..2], &[0xff, 0xff]);
    assert_eq!(bytes.len(), 2 + MAX_COLLECTION_LENGTH * 3);
    assert_eq!(codec.deserialize(&bytes).unwrap(), value);
}

#[test]
fn oversized_string_element_is_rejected() {
    let codec = CodecRegistry::default_instance()
        .resolve(&WireType::list(WireType::Varchar))
        .unwrap();
    let value = Value::List(vec![Value::Text("x".repeat(65_536))]);

    let err = codec.serialize(&value).unwrap_err();
    assert_eq!(
        err,
        CodecError::Oversize {
            kind: OversizeKind::Element,
            size: 65_536,
            limit: 65_535,
        }
    );
}

#[test]
fn oversized_map_value_is_rejected() {
    let codec = CodecRegistry::default_instance()
        .resolve(&WireType::map(WireType::Int, WireType::Blob))
        .unwrap();
    let value = Value::Map(vec![
        (Value::Int(1), Value::Bytes(Bytes::from_static(b"ok"))),
        (
            Value::Int(2),
            Value::Bytes(Bytes::from(vec![0u8; MAX_COLLECTION_LENGTH + 1])),
        ),
    ]);
    assert_eq!(
        codec.serialize(&value).unwrap_err().code(),
        codes::CODEC_OVERSIZE
    );
}

#[test]
fn set_limit_applies_after_deduplication() {
    let codec = CodecRegistry::default_instance()
        .resolve(&WireType::set(WireType::Int))
        .unwrap();
    // 65536 个元素去重后只剩一个，不超限。
    let value = Value::Set(vec![Value::Int(7); MAX_COLLECTION_LENGTH + 1]);
    let bytes = codec.serialize(&value).unwrap();
    assert_eq!(codec.deserialize(&bytes).unwrap(), Value::Set(vec![Value::Int(7)]));
}
