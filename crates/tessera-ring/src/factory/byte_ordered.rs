use bytes::Bytes;
use num_bigint::{BigInt, Sign};

use super::{TokenFactory, split_arc};
use crate::error::{Result, RingError};
use crate::token::Token;

/// `org.apache.cassandra.dht.ByteOrderedPartitioner` 的 Token 工厂。
///
/// Token 即分区键字节本身，按无符号字典序排列；空字节串为最小哨兵。
/// 文本形式为 `0x` 加十六进制。
#[derive(Clone, Copy, Debug, Default)]
pub struct ByteOrderedFactory;

impl ByteOrderedFactory {
    pub const NAME: &'static str = "org.apache.cassandra.dht.ByteOrderedPartitioner";

    fn bytes(token: &Token) -> Result<&Bytes> {
        match token {
            Token::ByteOrdered(bytes) => Ok(bytes),
            other => Err(RingError::IncompatibleTokens {
                left: "ByteOrdered",
                right: other.kind(),
            }),
        }
    }
}

impl TokenFactory for ByteOrderedFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_token(&self) -> Token {
        Token::ByteOrdered(Bytes::new())
    }

    fn hash(&self, partition_key: &[u8]) -> Token {
        Token::ByteOrdered(Bytes::copy_from_slice(partition_key))
    }

    fn from_string(&self, text: &str) -> Result<Token> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| RingError::InvalidToken {
                partitioner: "ByteOrdered",
                text: text.to_owned(),
                reason: "expected 0x prefix".to_owned(),
            })?;
        let raw = hex::decode(digits).map_err(|err| RingError::InvalidToken {
            partitioner: "ByteOrdered",
            text: text.to_owned(),
            reason: err.to_string(),
        })?;
        Ok(Token::ByteOrdered(Bytes::from(raw)))
    }

    fn owns(&self, token: &Token) -> bool {
        matches!(token, Token::ByteOrdered(_))
    }

    /// 把两端补零到相同宽度后视为无符号大端整数进行等分；宽度不足以区分 `parts` 份时逐字节加宽。
    fn split(&self, start: &Token, end: &Token, parts: usize) -> Result<Vec<Token>> {
        let start = Self::bytes(start)?;
        let end = Self::bytes(end)?;
        let mut width = start.len().max(end.len());
        loop {
            let ring = BigInt::from(1u8) << (8 * width);
            let low = padded_value(start, width);
            let high = padded_value(end, width);
            let mut range = &high - &low;
            if range <= BigInt::from(0) {
                range += &ring;
            }
            if range >= BigInt::from(parts) {
                let max = &ring - BigInt::from(1u8);
                return split_arc(&low, &high, &ring, &max, parts).map(|boundaries| {
                    boundaries
                        .into_iter()
                        .map(|value| Token::ByteOrdered(encode(&value, width)))
                        .collect()
                });
            }
            width += 1;
        }
    }
}

fn padded_value(bytes: &[u8], width: usize) -> BigInt {
    let mut padded = bytes.to_vec();
    padded.resize(width, 0);
    BigInt::from_bytes_be(Sign::Plus, &padded)
}

fn encode(value: &BigInt, width: usize) -> Bytes {
    let (_, magnitude) = value.to_bytes_be();
    let mut out = vec![0u8; width.saturating_sub(magnitude.len())];
    out.extend_from_slice(&magnitude);
    Bytes::from(out)
}
