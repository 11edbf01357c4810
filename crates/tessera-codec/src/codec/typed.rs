//! 泛型编解码层。
//!
//! # 设计背景（Why）
//! - 注册中心以 `Arc<dyn TypeCodec>` 存放编解码器，输入输出均为动态的 [`Value`]；
//! - 调用方通常持有具体的 Rust 类型，需要一层零成本的适配把 `T` 与 `Value` 对接起来。
//!
//! # 结构说明（How）
//! - [`HostValue`] 声明静态宿主类型并负责 `T <-> Value` 的转换；
//! - [`TypedCodec<T>`] 包装解析得到的类型擦除编解码器，对外暴露以 `T` 为参数的四个操作。

use core::fmt;
use core::marker::PhantomData;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::net::IpAddr;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use uuid::Uuid;

use super::TypeCodec;
use crate::error::{CodecError, Result};
use crate::host::HostType;
use crate::value::{Decimal, Value};
use crate::wire::WireType;

/// 可以经由注册中心编解码的具体 Rust 类型。
pub trait HostValue: Sized + Send + Sync + 'static {
    /// 静态宿主类型描述符。
    fn host_type() -> HostType;

    /// 转换为动态值。
    fn to_value(&self) -> Value;

    /// 从动态值还原；类型不符时返回 [`CodecError::TypeMismatch`]。
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T: HostValue>(value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: T::host_type(),
        actual: value.host_type(),
    }
}

macro_rules! scalar_host_value {
    ($ty:ty, $host:ident, $variant:ident) => {
        impl HostValue for $ty {
            fn host_type() -> HostType {
                HostType::$host
            }

            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(mismatch::<Self>(&other)),
                }
            }
        }
    };
}

scalar_host_value!(bool, Boolean, Boolean);
scalar_host_value!(i32, Int, Int);
scalar_host_value!(i64, Long, Long);
scalar_host_value!(f32, Float, Float);
scalar_host_value!(f64, Double, Double);
scalar_host_value!(BigInt, Varint, Varint);
scalar_host_value!(Decimal, Decimal, Decimal);
scalar_host_value!(String, Text, Text);
scalar_host_value!(DateTime<Utc>, Timestamp, Timestamp);
scalar_host_value!(Uuid, Uuid, Uuid);
scalar_host_value!(IpAddr, Inet, Inet);
scalar_host_value!(Bytes, Bytes, Bytes);

impl<T: HostValue> HostValue for Vec<T> {
    fn host_type() -> HostType {
        HostType::list(T::host_type())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(HostValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(elements) => elements.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: HostValue + Eq + Hash> HostValue for HashSet<T> {
    fn host_type() -> HostType {
        HostType::set(T::host_type())
    }

    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(HostValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Set(elements) => elements.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<K: HostValue + Eq + Hash, V: HostValue> HostValue for HashMap<K, V> {
    fn host_type() -> HostType {
        HostType::map(K::host_type(), V::host_type())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.to_value(), value.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(key, value)| Ok((K::from_value(key)?, V::from_value(value)?)))
                .collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

/// 以具体类型 `T` 为接口的编解码器视图。
///
/// 内部持有注册中心解析出的 `Arc<dyn TypeCodec>`，克隆成本为一次引用计数递增。
pub struct TypedCodec<T> {
    inner: Arc<dyn TypeCodec>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: HostValue> TypedCodec<T> {
    /// 包装类型擦除编解码器；其宿主类型必须能承接 `T`。
    pub fn new(inner: Arc<dyn TypeCodec>) -> Result<Self> {
        let host = T::host_type();
        if !inner.accepts_host(&host) {
            return Err(CodecError::TypeMismatch {
                expected: host,
                actual: inner.host_type().clone(),
            });
        }
        Ok(Self {
            inner,
            _marker: PhantomData,
        })
    }

    /// 底层的类型擦除编解码器。
    pub fn inner(&self) -> &Arc<dyn TypeCodec> {
        &self.inner
    }

    /// 线类型。
    pub fn wire_type(&self) -> &WireType {
        self.inner.wire_type()
    }

    pub fn serialize(&self, value: &T) -> Result<Bytes> {
        self.inner.serialize(&value.to_value())
    }

    pub fn deserialize(&self, bytes: &[u8]) -> Result<T> {
        T::from_value(self.inner.deserialize(bytes)?)
    }

    pub fn format(&self, value: &T) -> Result<String> {
        self.inner.format(&value.to_value())
    }

    pub fn parse(&self, text: &str) -> Result<T> {
        T::from_value(self.inner.parse(text)?)
    }
}

impl<T> Clone for TypedCodec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCodec")
            .field("inner", &self.inner)
            .field("target", &core::any::type_name::<T>())
            .finish()
    }
}
