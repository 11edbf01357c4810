//! `tessera-ring` 提供分区哈希环上的 Token 与 TokenRange 运算。
//!
//! # 背景（Why）
//! - 驱动按分区键把请求路由到负责该 Token 的副本节点，需要与服务端一致的分区器哈希；
//! - 集群元数据以环形区间描述所有权，路由与并行扫描需要包含、相交、合并、拆分与切分运算。
//!
//! # 使用概览（How）
//! - 通过 [`factory_for`] 按分区器名称取得 [`TokenFactory`]，用 `hash` 计算分区键的 Token；
//! - 以 [`TokenRange::new`] 构造区间，调用 `contains`/`intersects`/`merge_with`/`unwrap`/`split_evenly`。
//!
//! # 合约说明（What）
//! - 所有错误均为 [`RingError`]，`code()` 返回 [`codes`] 中的稳定错误码；
//! - Token 与区间均为不可变值，`Clone + Send + Sync`。

#![deny(unsafe_code)]

pub mod error;
pub mod factory;
pub mod range;
pub mod token;

pub use crate::error::{Result, RingError, codes};
pub use crate::factory::{
    ByteOrderedFactory, Murmur3Factory, RandomFactory, TokenFactory, factory_for,
};
pub use crate::range::TokenRange;
pub use crate::token::Token;
