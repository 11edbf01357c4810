use num_bigint::BigInt;

use super::{TokenFactory, split_arc};
use crate::error::{Result, RingError};
use crate::token::Token;

/// `org.apache.cassandra.dht.Murmur3Partitioner` 的 Token 工厂。
///
/// Token 取 MurmurHash3 x64/128（种子 0）结果的前 64 位；尾部字节按有符号字节参与运算，
/// 与服务端实现逐位一致。`i64::MIN` 保留为最小哨兵，哈希结果若恰为该值则归一为 `i64::MAX`。
#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur3Factory;

impl Murmur3Factory {
    pub const NAME: &'static str = "org.apache.cassandra.dht.Murmur3Partitioner";

    fn value(token: &Token) -> Result<i64> {
        match token {
            Token::Murmur3(value) => Ok(*value),
            other => Err(RingError::IncompatibleTokens {
                left: "Murmur3",
                right: other.kind(),
            }),
        }
    }
}

impl TokenFactory for Murmur3Factory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_token(&self) -> Token {
        Token::Murmur3(i64::MIN)
    }

    fn hash(&self, partition_key: &[u8]) -> Token {
        let hashed = murmur3_x64_128_first(partition_key);
        Token::Murmur3(if hashed == i64::MIN { i64::MAX } else { hashed })
    }

    fn from_string(&self, text: &str) -> Result<Token> {
        text.trim()
            .parse()
            .map(Token::Murmur3)
            .map_err(|err| RingError::InvalidToken {
                partitioner: "Murmur3",
                text: text.to_owned(),
                reason: format!("{err}"),
            })
    }

    fn owns(&self, token: &Token) -> bool {
        matches!(token, Token::Murmur3(_))
    }

    fn split(&self, start: &Token, end: &Token, parts: usize) -> Result<Vec<Token>> {
        let start = BigInt::from(Self::value(start)?);
        let end = BigInt::from(Self::value(end)?);
        let ring = BigInt::from(1u8) << 64usize;
        let max = BigInt::from(i64::MAX);
        split_arc(&start, &end, &ring, &max, parts)?
            .into_iter()
            .map(|boundary| {
                i64::try_from(&boundary)
                    .map(Token::Murmur3)
                    .map_err(|err| RingError::InvalidSplit {
                        parts,
                        reason: err.to_string(),
                    })
            })
            .collect()
    }
}

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// MurmurHash3 x64/128 的前 64 位，解释为有符号整数。
pub(crate) fn murmur3_x64_128_first(key: &[u8]) -> i64 {
    let mut h1: u64 = 0;
    let mut h2: u64 = 0;

    let mut blocks = key.chunks_exact(16);
    for block in &mut blocks {
        let (low, high) = block.split_at(8);
        h1 ^= mix_k1(read_u64_le(low));
        h1 = h1
            .rotate_left(27)
            .wrapping_add(h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dc_e729);
        h2 ^= mix_k2(read_u64_le(high));
        h2 = h2
            .rotate_left(31)
            .wrapping_add(h1)
            .wrapping_mul(5)
            .wrapping_add(0x3849_5ab5);
    }

    let tail = blocks.remainder();
    let mut k1: u64 = 0;
    let mut k2: u64 = 0;
    for (idx, &byte) in tail.iter().enumerate() {
        // 尾部字节先做符号扩展再移位。
        let signed = i64::from(byte as i8) as u64;
        if idx >= 8 {
            k2 ^= signed << (8 * (idx - 8));
        } else {
            k1 ^= signed << (8 * idx);
        }
    }
    if tail.len() > 8 {
        h2 ^= mix_k2(k2);
    }
    if !tail.is_empty() {
        h1 ^= mix_k1(k1);
    }

    let len = key.len() as u64;
    h1 ^= len;
    h2 ^= len;
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    h1 = fmix64(h1);
    h2 = fmix64(h2);
    h1 = h1.wrapping_add(h2);
    h1 as i64
}

fn read_u64_le(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}
