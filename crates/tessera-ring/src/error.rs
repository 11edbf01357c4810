//! 哈希环运算的错误语义。

use thiserror::Error;

/// 环运算错误码常量命名空间。
pub mod codes {
    /// 比较或组合了属于不同哈希空间的 Token。
    pub const RING_INCOMPATIBLE_TOKENS: &str = "ring.incompatible_tokens";
    /// Token 文本无法解析或超出哈希空间。
    pub const RING_INVALID_TOKEN: &str = "ring.invalid_token";
    /// 未知的分区器名称。
    pub const RING_UNKNOWN_PARTITIONER: &str = "ring.unknown_partitioner";
    /// 区间无法按请求的份数切分。
    pub const RING_INVALID_SPLIT: &str = "ring.invalid_split";
}

/// 哈希环运算的统一错误类型。
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RingError {
    /// 两个 Token 分属不同的哈希空间，无法比较。
    #[error("tokens belong to different hash spaces: {left} vs {right}")]
    IncompatibleTokens {
        left: &'static str,
        right: &'static str,
    },

    /// Token 文本无效。
    #[error("invalid {partitioner} token `{text}`: {reason}")]
    InvalidToken {
        partitioner: &'static str,
        text: String,
        reason: String,
    },

    /// 分区器名称未知。
    #[error("unknown partitioner `{name}`")]
    UnknownPartitioner { name: String },

    /// 区间切分失败。
    #[error("cannot split range into {parts} parts: {reason}")]
    InvalidSplit { parts: usize, reason: String },
}

impl RingError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            RingError::IncompatibleTokens { .. } => codes::RING_INCOMPATIBLE_TOKENS,
            RingError::InvalidToken { .. } => codes::RING_INVALID_TOKEN,
            RingError::UnknownPartitioner { .. } => codes::RING_UNKNOWN_PARTITIONER,
            RingError::InvalidSplit { .. } => codes::RING_INVALID_SPLIT,
        }
    }
}

/// 统一的返回值别名。
pub type Result<T, E = RingError> = core::result::Result<T, E>;
