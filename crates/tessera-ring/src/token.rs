//! 哈希环上的 Token。

use core::cmp::Ordering;
use core::fmt;

use bytes::Bytes;
use num_bigint::BigInt;

use crate::error::{Result, RingError};

/// 哈希环上的一个位置。
///
/// # 契约说明（What）
/// - 每个变体对应一个哈希空间，不同空间的 Token 之间没有顺序：
///   [`PartialOrd::partial_cmp`] 返回 `None`，[`Token::try_cmp`] 返回
///   [`RingError::IncompatibleTokens`]；
/// - `ByteOrdered` 按无符号字节的字典序比较。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Token {
    /// Murmur3 分区器的 64 位有符号 Token。
    Murmur3(i64),
    /// Random 分区器的 Token，取值 `0..=2^127`，最小哨兵为 `-1`。
    Random(BigInt),
    /// ByteOrdered 分区器的 Token，即分区键本身；空字节串为最小哨兵。
    ByteOrdered(Bytes),
}

impl Token {
    /// 哈希空间名称。
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Murmur3(_) => "Murmur3",
            Token::Random(_) => "Random",
            Token::ByteOrdered(_) => "ByteOrdered",
        }
    }

    /// 比较同一哈希空间内的两个 Token。
    pub fn try_cmp(&self, other: &Token) -> Result<Ordering> {
        match (self, other) {
            (Token::Murmur3(left), Token::Murmur3(right)) => Ok(left.cmp(right)),
            (Token::Random(left), Token::Random(right)) => Ok(left.cmp(right)),
            (Token::ByteOrdered(left), Token::ByteOrdered(right)) => Ok(left.cmp(right)),
            _ => Err(RingError::IncompatibleTokens {
                left: self.kind(),
                right: other.kind(),
            }),
        }
    }

    pub(crate) fn same_space(&self, other: &Token) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Murmur3(value) => write!(f, "{value}"),
            Token::Random(value) => write!(f, "{value}"),
            Token::ByteOrdered(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_of_different_spaces_are_unordered() {
        let murmur = Token::Murmur3(1);
        let random = Token::Random(BigInt::from(1));
        assert_eq!(murmur.partial_cmp(&random), None);
        assert_eq!(
            murmur.try_cmp(&random).unwrap_err(),
            RingError::IncompatibleTokens {
                left: "Murmur3",
                right: "Random",
            }
        );
    }

    #[test]
    fn byte_ordered_tokens_compare_unsigned() {
        let low = Token::ByteOrdered(Bytes::from_static(&[0x7f]));
        let high = Token::ByteOrdered(Bytes::from_static(&[0x80]));
        let empty = Token::ByteOrdered(Bytes::new());
        assert!(low < high);
        assert!(empty < low);
        assert_eq!(high.to_string(), "0x80");
        assert_eq!(empty.to_string(), "0x");
    }
}
