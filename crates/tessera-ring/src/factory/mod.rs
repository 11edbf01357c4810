//! 分区器对应的 Token 工厂。
//!
//! # 契约说明（What）
//! - [`TokenFactory`] 为对象安全 trait，[`crate::TokenRange`] 以 `Arc<dyn TokenFactory>` 持有；
//! - 每个工厂只承认自己哈希空间内的 Token，其他空间的 Token 一律视为不兼容；
//! - [`factory_for`] 接受分区器的完整类名或末段短名。

use core::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use tracing::debug;

use crate::error::{Result, RingError};
use crate::token::Token;

mod byte_ordered;
mod murmur3;
mod random;

pub use byte_ordered::ByteOrderedFactory;
pub use murmur3::Murmur3Factory;
pub use random::RandomFactory;

/// 一个分区器的 Token 工厂：定义哈希空间、最小哨兵与分区键哈希。
pub trait TokenFactory: Send + Sync + fmt::Debug + 'static {
    /// 分区器完整类名。
    fn name(&self) -> &'static str;

    /// 最小哨兵 Token，环的起点。
    fn min_token(&self) -> Token;

    /// 计算分区键所在的 Token。
    fn hash(&self, partition_key: &[u8]) -> Token;

    /// 解析 Token 的文本形式。
    fn from_string(&self, text: &str) -> Result<Token>;

    /// Token 是否属于本工厂的哈希空间。
    fn owns(&self, token: &Token) -> bool;

    /// 返回把 `]start, end]` 等分为 `parts` 份所需的 `parts - 1` 个内部边界，按顺时针排列。
    ///
    /// `start == end` 表示整个环。
    fn split(&self, start: &Token, end: &Token, parts: usize) -> Result<Vec<Token>>;
}

/// 按分区器名称解析工厂，完整类名与短名均可。
pub fn factory_for(partitioner: &str) -> Result<Arc<dyn TokenFactory>> {
    let trimmed = partitioner.trim();
    let short = trimmed.rsplit('.').next().unwrap_or(trimmed);
    let factory: Arc<dyn TokenFactory> = match short {
        "Murmur3Partitioner" => Arc::new(Murmur3Factory),
        "RandomPartitioner" => Arc::new(RandomFactory),
        "ByteOrderedPartitioner" => Arc::new(ByteOrderedFactory),
        _ => {
            debug!(partitioner = trimmed, "unknown partitioner");
            return Err(RingError::UnknownPartitioner {
                name: trimmed.to_owned(),
            });
        }
    };
    Ok(factory)
}

/// 在长度为 `ring` 的环上把 `]start, end]` 等分，返回内部边界；超过 `max` 的值回绕。
pub(crate) fn split_arc(
    start: &BigInt,
    end: &BigInt,
    ring: &BigInt,
    max: &BigInt,
    parts: usize,
) -> Result<Vec<BigInt>> {
    if parts == 0 {
        return Err(RingError::InvalidSplit {
            parts,
            reason: "at least one part is required".to_owned(),
        });
    }

    let mut range = end - start;
    if range <= BigInt::from(0) {
        range += ring;
    }
    let divisor = BigInt::from(parts);
    if range < divisor {
        return Err(RingError::InvalidSplit {
            parts,
            reason: format!("range of {range} tokens is too small"),
        });
    }

    Ok((1..parts)
        .map(|idx| {
            let boundary = start + &range * BigInt::from(idx) / &divisor;
            if &boundary > max {
                boundary - ring
            } else {
                boundary
            }
        })
        .collect())
}
