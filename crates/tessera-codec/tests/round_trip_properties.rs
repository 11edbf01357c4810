//! 内置编解码器的往返性质。
//!
//! 对每种原生线类型，在其声明值域内随机生成宿主值，断言二进制形式与字面量形式都能还原原值；
//! 集合编解码器在随机元素上复用同一性质。

use std::net::IpAddr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use proptest::prelude::*;
use tessera_codec::{CodecRegistry, Decimal, TypeCodec, Value, WireType};

fn resolve(wire: &WireType) -> std::sync::Arc<dyn TypeCodec> {
    CodecRegistry::default_instance()
        .resolve(wire)
        .expect("default codec")
}

fn assert_round_trips(wire: &WireType, value: &Value) -> Result<(), TestCaseError> {
    let codec = resolve(wire);
    let bytes = codec
        .serialize(value)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    prop_assert_eq!(&codec.deserialize(&bytes).unwrap(), value);

    let literal = codec
        .format(value)
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
    prop_assert_eq!(&codec.parse(&literal).unwrap(), value, "literal {}", literal);
    Ok(())
}

fn primitive_value() -> impl Strategy<Value = (WireType, Value)> {
    prop_oneof![
        any::<bool>().prop_map(|v| (WireType::Boolean, Value::Boolean(v))),
        any::<i32>().prop_map(|v| (WireType::Int, Value::Int(v))),
        any::<i64>().prop_map(|v| (WireType::Bigint, Value::Long(v))),
        any::<i64>().prop_map(|v| (WireType::Counter, Value::Long(v))),
        any::<f32>()
            .prop_filter("NaN has no equality", |v| !v.is_nan())
            .prop_map(|v| (WireType::Float, Value::Float(v))),
        any::<f64>()
            .prop_filter("NaN has no equality", |v| !v.is_nan())
            .prop_map(|v| (WireType::Double, Value::Double(v))),
        any::<i128>().prop_map(|v| (WireType::Varint, Value::Varint(BigInt::from(v)))),
        (any::<i64>(), any::<i32>()).prop_map(|(unscaled, scale)| {
            (
                WireType::Decimal,
                Value::Decimal(Decimal::new(BigInt::from(unscaled), scale)),
            )
        }),
        ".*".prop_map(|v| (WireType::Text, Value::Text(v))),
        ".*".prop_map(|v| (WireType::Varchar, Value::Text(v))),
        "[ -~]*".prop_map(|v| (WireType::Ascii, Value::Text(v))),
        (DateTime::<Utc>::MIN_UTC.timestamp_millis()..=DateTime::<Utc>::MAX_UTC.timestamp_millis())
            .prop_map(|millis| {
                let instant = DateTime::from_timestamp_millis(millis).expect("in range");
                (WireType::Timestamp, Value::Timestamp(instant))
            }),
        any::<[u8; 16]>()
            .prop_map(|raw| (WireType::Uuid, Value::Uuid(uuid::Uuid::from_bytes(raw)))),
        any::<[u8; 16]>().prop_map(|raw| {
            let v1 = uuid::Builder::from_bytes(raw)
                .with_version(uuid::Version::Mac)
                .into_uuid();
            (WireType::Timeuuid, Value::Uuid(v1))
        }),
        any::<[u8; 4]>().prop_map(|raw| (WireType::Inet, Value::Inet(IpAddr::from(raw)))),
        any::<[u8; 16]>().prop_map(|raw| (WireType::Inet, Value::Inet(IpAddr::from(raw)))),
        proptest::collection::vec(any::<u8>(), 0..64)
            .prop_map(|raw| (WireType::Blob, Value::Bytes(Bytes::from(raw)))),
    ]
}

proptest! {
    #[test]
    fn primitive_codecs_round_trip((wire, value) in primitive_value()) {
        assert_round_trips(&wire, &value)?;
    }

    #[test]
    fn int_lists_round_trip(numbers in proptest::collection::vec(any::<i32>(), 0..32)) {
        let value = Value::List(numbers.into_iter().map(Value::Int).collect());
        assert_round_trips(&WireType::list(WireType::Int), &value)?;
    }

    #[test]
    fn text_sets_round_trip(words in proptest::collection::btree_set("[a-z']{0,8}", 0..16)) {
        let value = Value::Set(words.into_iter().map(Value::Text).collect());
        assert_round_trips(&WireType::set(WireType::Text), &value)?;
    }

    #[test]
    fn text_to_uuid_maps_round_trip(
        entries in proptest::collection::btree_map("[a-z:, ]{0,8}", any::<[u8; 16]>(), 0..16)
    ) {
        let value = Value::Map(
            entries
                .into_iter()
                .map(|(key, raw)| (Value::Text(key), Value::Uuid(uuid::Uuid::from_bytes(raw))))
                .collect(),
        );
        assert_round_trips(&WireType::map(WireType::Text, WireType::Uuid), &value)?;
    }
}
