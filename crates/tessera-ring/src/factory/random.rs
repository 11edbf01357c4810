use md5::{Digest, Md5};
use num_bigint::{BigInt, Sign};

use super::{TokenFactory, split_arc};
use crate::error::{Result, RingError};
use crate::token::Token;

/// `org.apache.cassandra.dht.RandomPartitioner` 的 Token 工厂。
///
/// Token 为分区键 MD5 摘要按有符号大端整数读取后的绝对值，取值 `0..=2^127`；
/// `-1` 为最小哨兵。
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomFactory;

impl RandomFactory {
    pub const NAME: &'static str = "org.apache.cassandra.dht.RandomPartitioner";

    /// 哈希空间的上界 `2^127`，同时作为切分时的环长。
    pub fn max_value() -> BigInt {
        BigInt::from(1u8) << 127usize
    }

    fn value(token: &Token) -> Result<&BigInt> {
        match token {
            Token::Random(value) => Ok(value),
            other => Err(RingError::IncompatibleTokens {
                left: "Random",
                right: other.kind(),
            }),
        }
    }

    fn invalid(text: &str, reason: impl Into<String>) -> RingError {
        RingError::InvalidToken {
            partitioner: "Random",
            text: text.to_owned(),
            reason: reason.into(),
        }
    }
}

impl TokenFactory for RandomFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_token(&self) -> Token {
        Token::Random(BigInt::from(-1))
    }

    fn hash(&self, partition_key: &[u8]) -> Token {
        let digest = Md5::digest(partition_key);
        let signed = BigInt::from_signed_bytes_be(digest.as_slice());
        let magnitude = BigInt::from_biguint(Sign::Plus, signed.magnitude().clone());
        Token::Random(magnitude)
    }

    fn from_string(&self, text: &str) -> Result<Token> {
        let value: BigInt = text
            .trim()
            .parse()
            .map_err(|err| Self::invalid(text, format!("{err}")))?;
        let token = Token::Random(value);
        if !self.owns(&token) {
            return Err(Self::invalid(text, "outside of -1..=2^127"));
        }
        Ok(token)
    }

    fn owns(&self, token: &Token) -> bool {
        match token {
            Token::Random(value) => *value >= BigInt::from(-1) && *value <= Self::max_value(),
            _ => false,
        }
    }

    fn split(&self, start: &Token, end: &Token, parts: usize) -> Result<Vec<Token>> {
        let max = Self::max_value();
        Ok(
            split_arc(Self::value(start)?, Self::value(end)?, &max, &max, parts)?
                .into_iter()
                .map(Token::Random)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_absolute_md5_value() {
        let factory = RandomFactory;
        let cases = [
            (&b"hello"[..], "123957004363873451094272536567338222994"),
            (&b"a"[..], "16955237001963240173058271559858726497"),
            (&b""[..], "58332598431525814501020785164969033090"),
        ];
        for (key, expected) in cases {
            assert_eq!(factory.hash(key).to_string(), expected);
        }
    }

    #[test]
    fn text_form_is_bounded() {
        let factory = RandomFactory;
        assert_eq!(factory.from_string("-1").unwrap(), factory.min_token());
        let max = RandomFactory::max_value().to_string();
        assert!(factory.from_string(&max).is_ok());
        assert!(factory.from_string("-2").is_err());
        assert!(factory.from_string("abc").is_err());
    }
}
