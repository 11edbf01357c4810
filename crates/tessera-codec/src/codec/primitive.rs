//! 内置原生类型编解码器。
//!
//! 所有原生编解码器共享同一个结构体，按线类型标签分派；宿主类型由线类型唯一确定。

use core::str::FromStr;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use num_bigint::BigInt;
use uuid::Uuid;

use super::literal::{quote, unquote};
use super::{TypeCodec, type_mismatch};
use crate::error::{CodecError, Result};
use crate::host::HostType;
use crate::value::{Decimal, Value};
use crate::wire::WireType;

/// 内置原生类型编解码器。
///
/// | 线类型 | 宿主类型 |
/// |---|---|
/// | `boolean` | `Boolean` |
/// | `int` | `Int` |
/// | `bigint`, `counter` | `Long` |
/// | `float`, `double` | `Float`, `Double` |
/// | `varint`, `decimal` | `Varint`, `Decimal` |
/// | `text`, `varchar`, `ascii` | `Text` |
/// | `timestamp` | `Timestamp` |
/// | `uuid`, `timeuuid` | `Uuid` |
/// | `inet` | `Inet` |
/// | `blob` | `Bytes` |
#[derive(Clone, Debug)]
pub struct PrimitiveCodec {
    wire: WireType,
    host: HostType,
}

impl PrimitiveCodec {
    /// 为原生线类型构造编解码器；集合与自定义类型返回 `None`。
    pub fn for_wire(wire: &WireType) -> Option<Self> {
        let host = match wire {
            WireType::Boolean => HostType::Boolean,
            WireType::Int => HostType::Int,
            WireType::Bigint | WireType::Counter => HostType::Long,
            WireType::Float => HostType::Float,
            WireType::Double => HostType::Double,
            WireType::Varint => HostType::Varint,
            WireType::Decimal => HostType::Decimal,
            WireType::Text | WireType::Varchar | WireType::Ascii => HostType::Text,
            WireType::Timestamp => HostType::Timestamp,
            WireType::Uuid | WireType::Timeuuid => HostType::Uuid,
            WireType::Inet => HostType::Inet,
            WireType::Blob => HostType::Bytes,
            WireType::List(_) | WireType::Set(_) | WireType::Map(..) | WireType::Custom(_) => {
                return None;
            }
        };
        Some(Self {
            wire: wire.clone(),
            host,
        })
    }

    /// 按默认注册顺序返回全部 16 个内置原生编解码器。
    pub fn all() -> Vec<PrimitiveCodec> {
        WireType::primitives()
            .iter()
            .filter_map(PrimitiveCodec::for_wire)
            .collect()
    }

    fn fixed<const N: usize>(&self, bytes: &[u8]) -> Result<[u8; N]> {
        <[u8; N]>::try_from(bytes).map_err(|_| {
            CodecError::invalid_bytes(
                &self.wire,
                format!("expected {N} bytes, got {}", bytes.len()),
            )
        })
    }

    fn literal_error(&self, text: &str, cause: impl core::fmt::Display) -> CodecError {
        CodecError::invalid_literal(text, format!("not a valid {} literal: {cause}", self.wire))
    }
}

impl TypeCodec for PrimitiveCodec {
    fn wire_type(&self) -> &WireType {
        &self.wire
    }

    fn host_type(&self) -> &HostType {
        &self.host
    }

    fn accepts_value(&self, value: &Value) -> bool {
        match (&self.wire, value) {
            (WireType::Timeuuid, Value::Uuid(uuid)) => uuid.get_version_num() == 1,
            (WireType::Ascii, Value::Text(text)) => text.is_ascii(),
            (WireType::Timestamp, Value::Timestamp(instant)) => is_whole_millis(instant),
            _ => value.host_type() == self.host,
        }
    }

    fn serialize(&self, value: &Value) -> Result<Bytes> {
        let bytes = match (&self.wire, value) {
            (WireType::Boolean, Value::Boolean(flag)) => Bytes::copy_from_slice(&[u8::from(*flag)]),
            (WireType::Int, Value::Int(number)) => Bytes::copy_from_slice(&number.to_be_bytes()),
            (WireType::Bigint | WireType::Counter, Value::Long(number)) => {
                Bytes::copy_from_slice(&number.to_be_bytes())
            }
            (WireType::Float, Value::Float(number)) => {
                Bytes::copy_from_slice(&number.to_be_bytes())
            }
            (WireType::Double, Value::Double(number)) => {
                Bytes::copy_from_slice(&number.to_be_bytes())
            }
            (WireType::Varint, Value::Varint(number)) => Bytes::from(number.to_signed_bytes_be()),
            (WireType::Decimal, Value::Decimal(decimal)) => {
                let unscaled = decimal.unscaled().to_signed_bytes_be();
                let mut buf = BytesMut::with_capacity(4 + unscaled.len());
                buf.put_i32(decimal.scale());
                buf.put_slice(&unscaled);
                buf.freeze()
            }
            (WireType::Text | WireType::Varchar, Value::Text(text)) => {
                Bytes::copy_from_slice(text.as_bytes())
            }
            (WireType::Ascii, Value::Text(text)) => {
                if !text.is_ascii() {
                    return Err(CodecError::invalid_value(
                        &self.wire,
                        "string contains non-ASCII characters",
                    ));
                }
                Bytes::copy_from_slice(text.as_bytes())
            }
            (WireType::Timestamp, Value::Timestamp(instant)) => {
                if !is_whole_millis(instant) {
                    return Err(CodecError::invalid_value(
                        &self.wire,
                        format!("{instant} has sub-millisecond precision"),
                    ));
                }
                Bytes::copy_from_slice(&instant.timestamp_millis().to_be_bytes())
            }
            (WireType::Uuid, Value::Uuid(uuid)) => Bytes::copy_from_slice(uuid.as_bytes()),
            (WireType::Timeuuid, Value::Uuid(uuid)) => {
                if uuid.get_version_num() != 1 {
                    return Err(CodecError::invalid_value(
                        &self.wire,
                        format!("{uuid} is not a time-based (version 1) UUID"),
                    ));
                }
                Bytes::copy_from_slice(uuid.as_bytes())
            }
            (WireType::Inet, Value::Inet(IpAddr::V4(addr))) => {
                Bytes::copy_from_slice(&addr.octets())
            }
            (WireType::Inet, Value::Inet(IpAddr::V6(addr))) => {
                Bytes::copy_from_slice(&addr.octets())
            }
            (WireType::Blob, Value::Bytes(bytes)) => bytes.clone(),
            _ => return Err(type_mismatch(self, value)),
        };
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        let value = match &self.wire {
            WireType::Boolean => Value::Boolean(self.fixed::<1>(bytes)?[0] != 0),
            WireType::Int => Value::Int(i32::from_be_bytes(self.fixed(bytes)?)),
            WireType::Bigint | WireType::Counter => {
                Value::Long(i64::from_be_bytes(self.fixed(bytes)?))
            }
            WireType::Float => Value::Float(f32::from_be_bytes(self.fixed(bytes)?)),
            WireType::Double => Value::Double(f64::from_be_bytes(self.fixed(bytes)?)),
            WireType::Varint => {
                if bytes.is_empty() {
                    return Err(CodecError::invalid_bytes(&self.wire, "empty varint"));
                }
                Value::Varint(BigInt::from_signed_bytes_be(bytes))
            }
            WireType::Decimal => {
                if bytes.len() < 5 {
                    return Err(CodecError::invalid_bytes(
                        &self.wire,
                        format!("expected at least 5 bytes, got {}", bytes.len()),
                    ));
                }
                let (scale, unscaled) = bytes.split_at(4);
                let scale = i32::from_be_bytes(self.fixed(scale)?);
                Value::Decimal(Decimal::new(BigInt::from_signed_bytes_be(unscaled), scale))
            }
            WireType::Text | WireType::Varchar => Value::Text(
                String::from_utf8(bytes.to_vec())
                    .map_err(|err| CodecError::invalid_bytes(&self.wire, err))?,
            ),
            WireType::Ascii => {
                if !bytes.is_ascii() {
                    return Err(CodecError::invalid_bytes(
                        &self.wire,
                        "payload contains non-ASCII bytes",
                    ));
                }
                Value::Text(
                    String::from_utf8(bytes.to_vec())
                        .map_err(|err| CodecError::invalid_bytes(&self.wire, err))?,
                )
            }
            WireType::Timestamp => {
                let millis = i64::from_be_bytes(self.fixed(bytes)?);
                let instant = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                    CodecError::invalid_bytes(&self.wire, format!("{millis} ms is out of range"))
                })?;
                Value::Timestamp(instant)
            }
            WireType::Uuid | WireType::Timeuuid => {
                Value::Uuid(Uuid::from_bytes(self.fixed(bytes)?))
            }
            WireType::Inet => match bytes.len() {
                4 => Value::Inet(IpAddr::V4(Ipv4Addr::from(self.fixed::<4>(bytes)?))),
                16 => Value::Inet(IpAddr::V6(Ipv6Addr::from(self.fixed::<16>(bytes)?))),
                len => {
                    return Err(CodecError::invalid_bytes(
                        &self.wire,
                        format!("expected 4 or 16 bytes, got {len}"),
                    ));
                }
            },
            WireType::Blob => Value::Bytes(Bytes::copy_from_slice(bytes)),
            WireType::List(_) | WireType::Set(_) | WireType::Map(..) | WireType::Custom(_) => {
                return Err(CodecError::Unsupported {
                    wire: self.wire.clone(),
                    operation: "primitive deserialization",
                });
            }
        };
        Ok(value)
    }

    fn format(&self, value: &Value) -> Result<String> {
        if !self.accepts_value(value) {
            // 走一遍序列化以复用值域检查给出的具体错误。
            self.serialize(value)?;
            return Err(type_mismatch(self, value));
        }
        let literal = match value {
            Value::Boolean(flag) => flag.to_string(),
            Value::Int(number) => number.to_string(),
            Value::Long(number) => number.to_string(),
            Value::Float(number) => format_float(f64::from(*number), number.to_string()),
            Value::Double(number) => format_float(*number, number.to_string()),
            Value::Varint(number) => number.to_string(),
            Value::Decimal(decimal) => decimal.to_string(),
            Value::Text(text) => quote(text),
            Value::Timestamp(instant) => format_timestamp(instant),
            Value::Uuid(uuid) => uuid.hyphenated().to_string(),
            Value::Inet(addr) => quote(&addr.to_string()),
            Value::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
            Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Custom(_) => {
                return Err(type_mismatch(self, value));
            }
        };
        Ok(literal)
    }

    fn parse(&self, text: &str) -> Result<Value> {
        let trimmed = text.trim();
        let value = match &self.wire {
            WireType::Boolean => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Value::Boolean(true)
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Value::Boolean(false)
                } else {
                    return Err(self.literal_error(text, "expected true or false"));
                }
            }
            WireType::Int => Value::Int(
                trimmed
                    .parse()
                    .map_err(|err| self.literal_error(text, err))?,
            ),
            WireType::Bigint | WireType::Counter => Value::Long(
                trimmed
                    .parse()
                    .map_err(|err| self.literal_error(text, err))?,
            ),
            WireType::Float => Value::Float(
                trimmed
                    .parse()
                    .map_err(|err| self.literal_error(text, err))?,
            ),
            WireType::Double => Value::Double(
                trimmed
                    .parse()
                    .map_err(|err| self.literal_error(text, err))?,
            ),
            WireType::Varint => Value::Varint(
                BigInt::from_str(trimmed.strip_prefix('+').unwrap_or(trimmed))
                    .map_err(|err| self.literal_error(text, err))?,
            ),
            WireType::Decimal => {
                Value::Decimal(parse_decimal(trimmed).map_err(|err| self.literal_error(text, err))?)
            }
            WireType::Text | WireType::Varchar => Value::Text(unquote(text)?),
            WireType::Ascii => {
                let unquoted = unquote(text)?;
                if !unquoted.is_ascii() {
                    return Err(self.literal_error(text, "non-ASCII characters"));
                }
                Value::Text(unquoted)
            }
            WireType::Timestamp => Value::Timestamp(self.parse_timestamp(text, trimmed)?),
            WireType::Uuid | WireType::Timeuuid => {
                let uuid = Uuid::parse_str(trimmed).map_err(|err| self.literal_error(text, err))?;
                if self.wire == WireType::Timeuuid && uuid.get_version_num() != 1 {
                    return Err(self.literal_error(text, "not a time-based (version 1) UUID"));
                }
                Value::Uuid(uuid)
            }
            WireType::Inet => Value::Inet(
                IpAddr::from_str(&unquote(text)?).map_err(|err| self.literal_error(text, err))?,
            ),
            WireType::Blob => {
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .ok_or_else(|| self.literal_error(text, "expected 0x prefix"))?;
                Value::Bytes(Bytes::from(
                    hex::decode(digits).map_err(|err| self.literal_error(text, err))?,
                ))
            }
            WireType::List(_) | WireType::Set(_) | WireType::Map(..) | WireType::Custom(_) => {
                return Err(CodecError::Unsupported {
                    wire: self.wire.clone(),
                    operation: "primitive literal parsing",
                });
            }
        };
        Ok(value)
    }
}

impl PrimitiveCodec {
    /// 时间戳字面量：带引号的 ISO-8601，或不带引号的毫秒整数。
    fn parse_timestamp(&self, text: &str, trimmed: &str) -> Result<DateTime<Utc>> {
        if trimmed.starts_with('\'') {
            let iso = unquote(trimmed)?;
            return DateTime::parse_from_rfc3339(&iso)
                .map(|instant| instant.with_timezone(&Utc))
                .map_err(|err| self.literal_error(text, err));
        }
        let millis: i64 = trimmed
            .parse()
            .map_err(|err| self.literal_error(text, err))?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| self.literal_error(text, "timestamp out of range"))
    }
}

fn is_whole_millis(instant: &DateTime<Utc>) -> bool {
    instant.timestamp_subsec_nanos() % 1_000_000 == 0
}

/// 四位年份内输出带引号的 ISO-8601，其余时刻输出毫秒整数，二者都能被 `parse` 读回。
fn format_timestamp(instant: &DateTime<Utc>) -> String {
    if (0..=9999).contains(&instant.year()) {
        quote(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    } else {
        instant.timestamp_millis().to_string()
    }
}

fn format_float(number: f64, shortest: String) -> String {
    if number.is_nan() {
        "NaN".to_owned()
    } else if number == f64::INFINITY {
        "Infinity".to_owned()
    } else if number == f64::NEG_INFINITY {
        "-Infinity".to_owned()
    } else {
        shortest
    }
}

/// 解析十进制字面量：可选符号、整数部分、小数部分与 `E` 指数。
fn parse_decimal(text: &str) -> core::result::Result<Decimal, String> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(idx) => {
            let exponent: i64 = text[idx + 1..]
                .parse()
                .map_err(|err| format!("invalid exponent: {err}"))?;
            (&text[..idx], exponent)
        }
        None => (text, 0),
    };

    let (sign, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int_part.len() + frac_part.len() == 0 || !all_digits(int_part) || !all_digits(frac_part) {
        return Err("malformed mantissa".to_owned());
    }

    let unscaled = BigInt::from_str(&format!("{sign}{int_part}{frac_part}"))
        .map_err(|err| err.to_string())?;
    let scale = i64::try_from(frac_part.len())
        .ok()
        .and_then(|digits| digits.checked_sub(exponent))
        .and_then(|scale| i32::try_from(scale).ok())
        .ok_or_else(|| "scale out of range".to_owned())?;
    Ok(Decimal::new(unscaled, scale))
}
