//! 动态宿主值。
//!
//! [`Value`] 是类型擦除层（[`crate::codec::TypeCodec`]）在编解码时流转的宿主值；
//! 泛型层通过 [`crate::codec::HostValue`] 在具体 Rust 类型与 `Value` 之间互转。
//! 空值（null）不进入编解码器，由调用方以 `Option<Value>` 表达。

use core::any::Any;
use core::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use uuid::Uuid;

use crate::host::HostType;

/// 任意精度十进制数：`unscaled × 10^(-scale)`。
///
/// 与 `BigDecimal` 相同，相等性区分标度：`1.0` 与 `1.00` 不相等。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i32,
}

impl Decimal {
    /// 以非标度值与标度构造十进制数。
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    /// 非标度整数部分。
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// 标度，即小数点右移的位数。
    pub fn scale(&self) -> i32 {
        self.scale
    }
}

impl fmt::Display for Decimal {
    /// 与 `BigDecimal::toString` 一致的记数法选择。
    ///
    /// 调整指数 `len(digits) - 1 - scale` 不小于 -6 且标度非负时输出普通记数法（`123.45`），
    /// 否则输出科学记数法（`1.2E+4`、`1E-200000000`），输出长度只随有效数字增长。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_string();
        let sign = if self.unscaled.sign() == num_bigint::Sign::Minus {
            "-"
        } else {
            ""
        };
        let scale = i64::from(self.scale);
        let adjusted = digits.len() as i64 - 1 - scale;

        if scale >= 0 && adjusted >= -6 {
            let scale = self.scale as usize;
            if scale == 0 {
                return write!(f, "{sign}{digits}");
            }
            return if digits.len() > scale {
                let (int_part, frac_part) = digits.split_at(digits.len() - scale);
                write!(f, "{sign}{int_part}.{frac_part}")
            } else {
                let zeros = "0".repeat(scale - digits.len());
                write!(f, "{sign}0.{zeros}{digits}")
            };
        }

        let (lead, rest) = digits.split_at(1);
        write!(f, "{sign}{lead}")?;
        if !rest.is_empty() {
            write!(f, ".{rest}")?;
        }
        if adjusted != 0 {
            write!(f, "E{adjusted:+}")?;
        }
        Ok(())
    }
}

/// 用户自定义宿主类型的值载荷。
///
/// 任何 `Debug + PartialEq` 的 `'static` 类型都自动实现本 trait，相等性要求具体类型一致。
pub trait CustomPayload: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn eq_payload(&self, other: &dyn CustomPayload) -> bool;
}

impl<T> CustomPayload for T
where
    T: Any + Send + Sync + fmt::Debug + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_payload(&self, other: &dyn CustomPayload) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// 带宿主类型名的自定义值，对应 [`HostType::Custom`]。
#[derive(Clone, Debug)]
pub struct CustomValue {
    type_name: Arc<str>,
    payload: Arc<dyn CustomPayload>,
}

impl CustomValue {
    pub fn new<T: CustomPayload>(type_name: impl Into<Arc<str>>, payload: T) -> Self {
        Self {
            type_name: type_name.into(),
            payload: Arc::new(payload),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// 对应的宿主类型描述符。
    pub fn host_type(&self) -> HostType {
        HostType::Custom(Arc::clone(&self.type_name))
    }

    /// 以具体类型读取载荷；类型不符时返回 `None`。
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.payload).as_any().downcast_ref::<T>()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && (*self.payload).eq_payload(&*other.payload)
    }
}

/// 宿主侧的动态值。
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Varint(BigInt),
    Decimal(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Inet(IpAddr),
    Bytes(Bytes),
    /// 有序列表。
    List(Vec<Value>),
    /// 集合；编解码器保证元素去重并保留首次出现的位置。
    Set(Vec<Value>),
    /// 映射；条目保持插入顺序。
    Map(Vec<(Value, Value)>),
    /// 用户自定义宿主类型的值，仅由用户编解码器产出与消费。
    Custom(CustomValue),
}

impl Value {
    /// 运行时宿主类型。
    ///
    /// 容器的类型参数取自首个元素，空容器报告为 `Object`，等价于类型擦除后的信息。
    pub fn host_type(&self) -> HostType {
        match self {
            Value::Boolean(_) => HostType::Boolean,
            Value::Int(_) => HostType::Int,
            Value::Long(_) => HostType::Long,
            Value::Float(_) => HostType::Float,
            Value::Double(_) => HostType::Double,
            Value::Varint(_) => HostType::Varint,
            Value::Decimal(_) => HostType::Decimal,
            Value::Text(_) => HostType::Text,
            Value::Timestamp(_) => HostType::Timestamp,
            Value::Uuid(_) => HostType::Uuid,
            Value::Inet(_) => HostType::Inet,
            Value::Bytes(_) => HostType::Bytes,
            Value::List(elements) => HostType::list(first_host_type(elements.first())),
            Value::Set(elements) => HostType::set(first_host_type(elements.first())),
            Value::Map(entries) => match entries.first() {
                Some((key, value)) => HostType::map(key.host_type(), value.host_type()),
                None => HostType::map(HostType::Object, HostType::Object),
            },
            Value::Custom(custom) => custom.host_type(),
        }
    }
}

fn first_host_type(value: Option<&Value>) -> HostType {
    value.map_or(HostType::Object, Value::host_type)
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<IpAddr> for Value {
    fn from(value: IpAddr) -> Self {
        Value::Inet(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_display_handles_scales() {
        assert_eq!(Decimal::new(BigInt::from(12345), 2).to_string(), "123.45");
        assert_eq!(Decimal::new(BigInt::from(-5), 3).to_string(), "-0.005");
        assert_eq!(Decimal::new(BigInt::from(12), -3).to_string(), "1.2E+4");
        assert_eq!(Decimal::new(BigInt::from(7), 0).to_string(), "7");
        assert_eq!(Decimal::new(BigInt::from(1), 6).to_string(), "0.000001");
        assert_eq!(Decimal::new(BigInt::from(1), 7).to_string(), "1E-7");
        assert_eq!(Decimal::new(BigInt::from(-15), 8).to_string(), "-1.5E-7");
        assert_eq!(Decimal::new(BigInt::from(0), -2).to_string(), "0E+2");
        assert_eq!(
            Decimal::new(BigInt::from(1), i32::MAX).to_string(),
            "1E-2147483647"
        );
    }

    #[derive(Debug, PartialEq)]
    struct Point(i32, i32);

    #[test]
    fn custom_values_compare_by_type_name_and_payload() {
        let point = Value::Custom(CustomValue::new("Point", Point(1, 2)));
        assert_eq!(point, Value::Custom(CustomValue::new("Point", Point(1, 2))));
        assert_ne!(point, Value::Custom(CustomValue::new("Point", Point(2, 1))));
        assert_ne!(point, Value::Custom(CustomValue::new("Other", Point(1, 2))));
        assert_ne!(point, Value::Custom(CustomValue::new("Point", 7_i32)));
        assert_eq!(point.host_type(), HostType::Custom("Point".into()));

        let Value::Custom(custom) = point else {
            unreachable!("constructed as custom");
        };
        assert_eq!(custom.downcast_ref::<Point>(), Some(&Point(1, 2)));
        assert!(custom.downcast_ref::<String>().is_none());
    }

    #[test]
    fn container_host_type_is_inferred_from_first_element() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list.host_type(), HostType::list(HostType::Int));
        assert_eq!(
            Value::Map(Vec::new()).host_type(),
            HostType::map(HostType::Object, HostType::Object)
        );
    }
}
