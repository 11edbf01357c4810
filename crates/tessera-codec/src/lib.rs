//! `tessera-codec` 提供分区数据库客户端驱动的类型编解码层。
//!
//! # 背景（Why）
//! - 驱动需要在服务端的线类型（`int`、`list<text>`、自定义类型……）与 Rust 侧的宿主值之间双向转换，
//!   同时支持二进制协议格式与 CQL 字面量格式；
//! - 线类型与宿主类型之间是多对多关系，必须通过一个有序、可扩展、带缓存的注册中心确定唯一的编解码器。
//!
//! # 使用概览（How）
//! - 默认场景直接使用 [`CodecRegistry::default_instance`]，按线类型或宿主类型查找；
//! - 自定义编解码器实现 [`TypeCodec`]，经 [`CodecRegistryBuilder::with_codecs`] 注册后覆盖同范围的默认实现；
//! - 持有具体 Rust 类型的调用方使用 [`CodecRegistry::codec_for`] 获得 [`TypedCodec`]；
//! - 配置驱动的场景通过 [`RegistrySettings::from_toml_str`] 加载。
//!
//! # 合约说明（What）
//! - 所有错误均为 [`CodecError`]，并通过 `code()` 暴露 [`codes`] 中的稳定错误码；
//! - 编解码器与注册中心均为不可变、`Send + Sync`，可在任意线程间共享；
//! - 集合的元素个数与单个元素体积受 16 位长度前缀约束，上限为 [`MAX_COLLECTION_LENGTH`]。

#![deny(unsafe_code)]

pub mod codec;
pub mod error;
pub mod host;
pub mod registry;
pub mod value;
pub mod wire;

pub use crate::codec::{
    CustomCodec, HostValue, ListCodec, MapCodec, PrimitiveCodec, SetCodec, TypeCodec, TypedCodec,
};
pub use crate::error::{CodecError, MAX_COLLECTION_LENGTH, OversizeKind, Result, codes};
pub use crate::host::HostType;
pub use crate::registry::{
    CodecRegistry, CodecRegistryBuilder, DEFAULT_CACHE_CAPACITY, RegistrySettings,
};
pub use crate::value::{CustomPayload, CustomValue, Decimal, Value};
pub use crate::wire::WireType;
