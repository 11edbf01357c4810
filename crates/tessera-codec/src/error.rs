//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义编解码子系统对外暴露的错误语义：解析失败、超限、类型不匹配、查找失败等；
//! - 每个变体都映射到 [`codes`] 中的稳定错误码，调用方可以据此做告警或决定是否终止当前请求。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error`，可直接参与 `?` 传播；
//! - 错误携带排障所需的上下文（未命中的类型对、超限尺寸与上限、原始字面量文本）；
//! - 本模块不包含任何重试逻辑，是否致命由上层决定。

use core::fmt;

use thiserror::Error;

use crate::host::HostType;
use crate::wire::WireType;

/// 编解码错误码常量命名空间。
///
/// 错误码采用 `<域>.<语义>` 的点分形式，对外承诺稳定。
pub mod codes {
    /// 注册中心中不存在满足条件的编解码器。
    pub const CODEC_NOT_FOUND: &str = "codec.not_found";
    /// 线类型与宿主类型同时缺省的非法查询。
    pub const CODEC_MISSING_TYPE_ARGUMENTS: &str = "codec.missing_type_arguments";
    /// 集合元素个数或单个元素体积超过 16 位长度前缀的上限。
    pub const CODEC_OVERSIZE: &str = "codec.oversize";
    /// 文本字面量无法解析。
    pub const CODEC_INVALID_LITERAL: &str = "codec.invalid_literal";
    /// 二进制负载与线类型约定不符。
    pub const CODEC_INVALID_BYTES: &str = "codec.invalid_bytes";
    /// 宿主值处于编解码器声明的值域之外。
    pub const CODEC_INVALID_VALUE: &str = "codec.invalid_value";
    /// 宿主值的运行时类型与编解码器不一致。
    pub const CODEC_TYPE_MISMATCH: &str = "codec.type_mismatch";
    /// 编解码器不支持该操作（例如自定义类型的文本形式）。
    pub const CODEC_UNSUPPORTED: &str = "codec.unsupported";
    /// 线类型名称无法解析。
    pub const CODEC_INVALID_TYPE_NAME: &str = "codec.invalid_type_name";
    /// 注册中心配置无法加载。
    pub const CODEC_INVALID_SETTINGS: &str = "codec.invalid_settings";
}

/// 集合长度前缀允许的最大值：元素个数与单个元素字节数共用同一上限。
pub const MAX_COLLECTION_LENGTH: usize = u16::MAX as usize;

/// 超限发生的位置。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OversizeKind {
    /// 集合元素个数超限。
    Collection,
    /// 单个元素序列化后的字节数超限。
    Element,
}

impl fmt::Display for OversizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OversizeKind::Collection => f.write_str("collection element count"),
            OversizeKind::Element => f.write_str("collection element size"),
        }
    }
}

/// 编解码子系统的统一错误类型。
///
/// # 契约说明（What）
/// - 所有变体均为 `Clone + Send + Sync + 'static`，可跨线程传播与缓存；
/// - [`CodecError::code`] 返回 [`codes`] 中的稳定错误码；
/// - 查找失败（`NotFound`/`NotFoundForValue`）永远不会被注册中心缓存。
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CodecError {
    /// 按类型对查找时未命中任何编解码器。
    #[error(
        "codec not found for requested pair: wire type {} <-> host type {}",
        display_or_any(.wire),
        display_or_any(.host)
    )]
    NotFound {
        wire: Option<WireType>,
        host: Option<HostType>,
    },

    /// 按运行时值查找时未命中任何编解码器。
    #[error("codec not found for requested value of host type {host}")]
    NotFoundForValue { host: HostType },

    /// 线类型与宿主类型同时缺省。
    #[error("at least one of wire type or host type must be specified")]
    MissingTypeArguments,

    /// 集合超过 16 位长度前缀的容量，在写出任何字节之前被拒绝。
    #[error("{kind} {size} exceeds the maximum of {limit}")]
    Oversize {
        kind: OversizeKind,
        size: usize,
        limit: usize,
    },

    /// 文本字面量解析失败。
    #[error("invalid literal `{text}`: {cause}")]
    InvalidLiteral { text: String, cause: String },

    /// 二进制负载不符合线类型约定。
    #[error("invalid bytes for wire type {wire}: {reason}")]
    InvalidBytes { wire: WireType, reason: String },

    /// 宿主值超出编解码器的值域。
    #[error("invalid value for wire type {wire}: {reason}")]
    InvalidValue { wire: WireType, reason: String },

    /// 宿主值的运行时类型与期望不一致。
    #[error("expected host type {expected}, got {actual}")]
    TypeMismatch { expected: HostType, actual: HostType },

    /// 编解码器不支持请求的操作。
    #[error("wire type {wire} does not support {operation}")]
    Unsupported {
        wire: WireType,
        operation: &'static str,
    },

    /// 线类型名称无法解析。
    #[error("invalid wire type name `{text}`: {reason}")]
    InvalidTypeName { text: String, reason: String },

    /// 注册中心配置无效。
    #[error("invalid codec registry settings: {reason}")]
    InvalidSettings { reason: String },
}

impl CodecError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::NotFound { .. } | CodecError::NotFoundForValue { .. } => {
                codes::CODEC_NOT_FOUND
            }
            CodecError::MissingTypeArguments => codes::CODEC_MISSING_TYPE_ARGUMENTS,
            CodecError::Oversize { .. } => codes::CODEC_OVERSIZE,
            CodecError::InvalidLiteral { .. } => codes::CODEC_INVALID_LITERAL,
            CodecError::InvalidBytes { .. } => codes::CODEC_INVALID_BYTES,
            CodecError::InvalidValue { .. } => codes::CODEC_INVALID_VALUE,
            CodecError::TypeMismatch { .. } => codes::CODEC_TYPE_MISMATCH,
            CodecError::Unsupported { .. } => codes::CODEC_UNSUPPORTED,
            CodecError::InvalidTypeName { .. } => codes::CODEC_INVALID_TYPE_NAME,
            CodecError::InvalidSettings { .. } => codes::CODEC_INVALID_SETTINGS,
        }
    }

    /// 构造字面量解析错误。
    pub fn invalid_literal(text: &str, cause: impl fmt::Display) -> Self {
        CodecError::InvalidLiteral {
            text: text.to_owned(),
            cause: cause.to_string(),
        }
    }

    /// 构造二进制负载错误。
    pub fn invalid_bytes(wire: &WireType, reason: impl fmt::Display) -> Self {
        CodecError::InvalidBytes {
            wire: wire.clone(),
            reason: reason.to_string(),
        }
    }

    /// 构造值域错误。
    pub fn invalid_value(wire: &WireType, reason: impl fmt::Display) -> Self {
        CodecError::InvalidValue {
            wire: wire.clone(),
            reason: reason.to_string(),
        }
    }

    /// 是否属于查找失败。
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CodecError::NotFound { .. } | CodecError::NotFoundForValue { .. }
        )
    }
}

/// 统一的返回值别名。
pub type Result<T, E = CodecError> = core::result::Result<T, E>;

fn display_or_any<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "ANY".to_owned(),
    }
}
