//! 编解码契约与内置实现。
//!
//! # 结构说明（How）
//! - [`TypeCodec`]：对象安全的类型擦除契约，注册中心以 `Arc<dyn TypeCodec>` 存放；
//! - [`PrimitiveCodec`]：16 种内置原生线类型；
//! - [`ListCodec`]/[`SetCodec`]/[`MapCodec`]：由元素编解码器组合而成的集合编解码器；
//! - [`CustomCodec`]：服务端自定义类型的不透明字节编解码器；
//! - [`HostValue`]/[`TypedCodec`]：泛型层，负责具体 Rust 类型与 [`Value`] 的互转。

use core::fmt;

use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::host::HostType;
use crate::value::Value;
use crate::wire::WireType;

mod collection;
mod custom;
mod literal;
mod primitive;
mod typed;

pub use collection::{ListCodec, MapCodec, SetCodec};
pub use custom::CustomCodec;
pub use primitive::PrimitiveCodec;
pub use typed::{HostValue, TypedCodec};

/// `TypeCodec` 描述一个线类型与一个宿主类型之间的双向转换单元。
///
/// # 契约说明（What）
/// - `wire_type`/`host_type` 在构造时确定，之后不可变；
/// - 实现必须无状态、`Send + Sync`，可被任意数量的并发调用方共享；
/// - `serialize`/`deserialize` 在声明接受的值域内互为逆运算，`format`/`parse` 同理；
/// - 对不在值域内的输入返回 [`CodecError`]，不得 panic。
///
/// # 匹配规则
/// - `accepts_wire`：线类型结构化相等；
/// - `accepts_host`：协变匹配，编解码器宿主类型可由查询类型赋值即可；
/// - `accepts_value`：运行时值与编解码器兼容，供按值查找使用。
pub trait TypeCodec: Send + Sync + fmt::Debug + 'static {
    /// 编解码器处理的线类型。
    fn wire_type(&self) -> &WireType;

    /// 编解码器产出的宿主类型。
    fn host_type(&self) -> &HostType;

    /// 能否处理给定线类型。
    fn accepts_wire(&self, wire: &WireType) -> bool {
        self.wire_type() == wire
    }

    /// 宿主类型能否承接给定查询类型。
    fn accepts_host(&self, host: &HostType) -> bool {
        self.host_type().is_assignable_from(host)
    }

    /// 同时检查两项约束，缺省的一半视为 ANY。
    fn accepts(&self, wire: Option<&WireType>, host: Option<&HostType>) -> bool {
        wire.is_none_or(|wire| self.accepts_wire(wire))
            && host.is_none_or(|host| self.accepts_host(host))
    }

    /// 运行时值是否与编解码器兼容。
    fn accepts_value(&self, value: &Value) -> bool;

    /// 编码为二进制线格式。
    fn serialize(&self, value: &Value) -> Result<Bytes>;

    /// 从二进制线格式解码。
    fn deserialize(&self, bytes: &[u8]) -> Result<Value>;

    /// 输出 CQL 字面量。
    fn format(&self, value: &Value) -> Result<String>;

    /// 解析 CQL 字面量。
    fn parse(&self, text: &str) -> Result<Value>;
}

/// 为不匹配编解码器宿主类型的输入构造统一错误。
pub(crate) fn type_mismatch(codec: &dyn TypeCodec, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected: codec.host_type().clone(),
        actual: value.host_type(),
    }
}
