//! 宿主类型描述符。
//!
//! # 设计背景（Why）
//! - 注册中心需要回答“某编解码器的宿主类型能否承接查询类型”这一协变问题；
//! - Rust 没有运行时反射，因此以一个封闭的小型层级显式建模：顶层 `Object`、数值父类型 `Number`、
//!   具体原生类型、参数化容器与按名称区分的用户自定义类型。
//!
//! # 契约说明（What）
//! - [`HostType::is_assignable_from`] 是唯一的可赋值性判定入口；
//! - 容器的类型参数保持不变性（invariant），与泛型容器的语义一致。

use core::fmt;
use std::sync::Arc;

/// 宿主侧类型描述符。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum HostType {
    /// 所有宿主类型的父类型。
    Object,
    /// 所有数值宿主类型的父类型。
    Number,
    Boolean,
    /// 32 位有符号整数。
    Int,
    /// 64 位有符号整数。
    Long,
    Float,
    Double,
    /// 任意精度整数。
    Varint,
    /// 任意精度十进制数。
    Decimal,
    Text,
    Timestamp,
    Uuid,
    Inet,
    /// 未解释的字节序列。
    Bytes,
    List(Box<HostType>),
    Set(Box<HostType>),
    Map(Box<HostType>, Box<HostType>),
    /// 用户自定义宿主类型，以名称区分，值为 [`crate::value::CustomValue`]。
    Custom(Arc<str>),
}

impl HostType {
    /// 构造 `List<element>`。
    pub fn list(element: HostType) -> Self {
        HostType::List(Box::new(element))
    }

    /// 构造 `Set<element>`。
    pub fn set(element: HostType) -> Self {
        HostType::Set(Box::new(element))
    }

    /// 构造 `Map<key, value>`。
    pub fn map(key: HostType, value: HostType) -> Self {
        HostType::Map(Box::new(key), Box::new(value))
    }

    /// 构造名为 `name` 的自定义宿主类型。
    pub fn custom(name: impl Into<Arc<str>>) -> Self {
        HostType::Custom(name.into())
    }

    /// 是否为数值类型。
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            HostType::Int
                | HostType::Long
                | HostType::Float
                | HostType::Double
                | HostType::Varint
                | HostType::Decimal
        )
    }

    /// 判断 `other` 的值能否赋给当前类型。
    ///
    /// # 契约说明（What）
    /// - `Object` 接受一切类型；
    /// - `Number` 接受自身与所有数值原生类型；
    /// - 具体原生类型与自定义类型仅接受自身（自定义类型按名称比较）；
    /// - 容器要求类型参数完全相等，`List<Object>` 不接受 `List<Int>`。
    pub fn is_assignable_from(&self, other: &HostType) -> bool {
        match self {
            HostType::Object => true,
            HostType::Number => *other == HostType::Number || other.is_numeric(),
            _ => self == other,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Object => f.write_str("Object"),
            HostType::Number => f.write_str("Number"),
            HostType::Boolean => f.write_str("Boolean"),
            HostType::Int => f.write_str("Integer"),
            HostType::Long => f.write_str("Long"),
            HostType::Float => f.write_str("Float"),
            HostType::Double => f.write_str("Double"),
            HostType::Varint => f.write_str("BigInteger"),
            HostType::Decimal => f.write_str("BigDecimal"),
            HostType::Text => f.write_str("String"),
            HostType::Timestamp => f.write_str("Timestamp"),
            HostType::Uuid => f.write_str("UUID"),
            HostType::Inet => f.write_str("InetAddress"),
            HostType::Bytes => f.write_str("Bytes"),
            HostType::List(element) => write!(f, "List<{element}>"),
            HostType::Set(element) => write!(f, "Set<{element}>"),
            HostType::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            HostType::Custom(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_and_number_are_covariant_supertypes() {
        assert!(HostType::Object.is_assignable_from(&HostType::list(HostType::Text)));
        assert!(HostType::Number.is_assignable_from(&HostType::Decimal));
        assert!(HostType::Number.is_assignable_from(&HostType::Number));
        assert!(!HostType::Number.is_assignable_from(&HostType::Text));
        assert!(!HostType::Int.is_assignable_from(&HostType::Number));
    }

    #[test]
    fn containers_are_invariant() {
        let list_of_object = HostType::list(HostType::Object);
        assert!(!list_of_object.is_assignable_from(&HostType::list(HostType::Int)));
        assert!(
            HostType::map(HostType::Text, HostType::Int)
                .is_assignable_from(&HostType::map(HostType::Text, HostType::Int))
        );
    }

    #[test]
    fn custom_hosts_match_by_name_only() {
        let user = HostType::custom("User");
        assert!(user.is_assignable_from(&HostType::custom("User")));
        assert!(!user.is_assignable_from(&HostType::custom("Account")));
        assert!(!user.is_assignable_from(&HostType::Text));
        assert!(!HostType::Text.is_assignable_from(&user));
        assert!(HostType::Object.is_assignable_from(&user));
        assert_eq!(HostType::list(user).to_string(), "List<User>");
    }

    #[test]
    fn display_renders_generic_names() {
        let host = HostType::map(HostType::Text, HostType::list(HostType::Int));
        assert_eq!(host.to_string(), "Map<String, List<Integer>>");
    }
}
