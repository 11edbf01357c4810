//! 线协议类型描述符。
//!
//! [`WireType`] 描述一个值在二进制协议中的编码方式，集合类型通过类型参数递归组合。
//! 相等性是结构化的：`list<int>` 与 `list<text>` 互不相等。

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use crate::error::CodecError;

/// 数据库侧的线类型描述符。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum WireType {
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Inet,
    Int,
    Text,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    Timeuuid,
    List(Box<WireType>),
    Set(Box<WireType>),
    Map(Box<WireType>, Box<WireType>),
    /// 服务端自定义类型，以其完整类名标识；驱动对其结构一无所知。
    Custom(Arc<str>),
}

/// 内置原生线类型，顺序即默认注册顺序。
static PRIMITIVES: [WireType; 16] = [
    WireType::Blob,
    WireType::Boolean,
    WireType::Int,
    WireType::Bigint,
    WireType::Counter,
    WireType::Double,
    WireType::Float,
    WireType::Varint,
    WireType::Decimal,
    WireType::Text,
    WireType::Varchar,
    WireType::Ascii,
    WireType::Timestamp,
    WireType::Uuid,
    WireType::Timeuuid,
    WireType::Inet,
];

impl WireType {
    /// 构造 `list<element>`。
    pub fn list(element: WireType) -> Self {
        WireType::List(Box::new(element))
    }

    /// 构造 `set<element>`。
    pub fn set(element: WireType) -> Self {
        WireType::Set(Box::new(element))
    }

    /// 构造 `map<key, value>`。
    pub fn map(key: WireType, value: WireType) -> Self {
        WireType::Map(Box::new(key), Box::new(value))
    }

    /// 构造自定义类型。
    pub fn custom(class_name: impl Into<Arc<str>>) -> Self {
        WireType::Custom(class_name.into())
    }

    /// 内置原生线类型列表。
    pub fn primitives() -> &'static [WireType] {
        &PRIMITIVES
    }

    /// 是否为集合类型。
    pub fn is_collection(&self) -> bool {
        matches!(self, WireType::List(_) | WireType::Set(_) | WireType::Map(..))
    }

    /// 集合类型的类型参数；非集合类型返回空列表。
    pub fn type_arguments(&self) -> Vec<&WireType> {
        match self {
            WireType::List(element) | WireType::Set(element) => vec![element.as_ref()],
            WireType::Map(key, value) => vec![key.as_ref(), value.as_ref()],
            _ => Vec::new(),
        }
    }

    /// 原生协议中的类型选项编号。
    pub fn protocol_code(&self) -> u16 {
        match self {
            WireType::Custom(_) => 0x0000,
            WireType::Ascii => 0x0001,
            WireType::Bigint => 0x0002,
            WireType::Blob => 0x0003,
            WireType::Boolean => 0x0004,
            WireType::Counter => 0x0005,
            WireType::Decimal => 0x0006,
            WireType::Double => 0x0007,
            WireType::Float => 0x0008,
            WireType::Int => 0x0009,
            WireType::Text => 0x000A,
            WireType::Timestamp => 0x000B,
            WireType::Uuid => 0x000C,
            WireType::Varchar => 0x000D,
            WireType::Varint => 0x000E,
            WireType::Timeuuid => 0x000F,
            WireType::Inet => 0x0010,
            WireType::List(_) => 0x0020,
            WireType::Map(..) => 0x0021,
            WireType::Set(_) => 0x0022,
        }
    }

    fn keyword(&self) -> Option<&'static str> {
        let name = match self {
            WireType::Ascii => "ascii",
            WireType::Bigint => "bigint",
            WireType::Blob => "blob",
            WireType::Boolean => "boolean",
            WireType::Counter => "counter",
            WireType::Decimal => "decimal",
            WireType::Double => "double",
            WireType::Float => "float",
            WireType::Inet => "inet",
            WireType::Int => "int",
            WireType::Text => "text",
            WireType::Timestamp => "timestamp",
            WireType::Uuid => "uuid",
            WireType::Varchar => "varchar",
            WireType::Varint => "varint",
            WireType::Timeuuid => "timeuuid",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::List(element) => write!(f, "list<{element}>"),
            WireType::Set(element) => write!(f, "set<{element}>"),
            WireType::Map(key, value) => write!(f, "map<{key}, {value}>"),
            WireType::Custom(class_name) => write!(f, "'{class_name}'"),
            primitive => f.write_str(primitive.keyword().unwrap_or("unknown")),
        }
    }
}

impl FromStr for WireType {
    type Err = CodecError;

    /// 解析 CQL 类型拼写，例如 `map<text, list<int>>` 或 `'com.example.Foo'`。
    ///
    /// 未加引号但包含 `.` 的名称同样按自定义类名处理，便于在配置文件中书写。
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeNameParser { text, pos: 0 };
        let parsed = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos != text.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(parsed)
    }
}

struct TypeNameParser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> TypeNameParser<'a> {
    fn parse_type(&mut self) -> Result<WireType, CodecError> {
        self.skip_whitespace();
        if self.peek() == Some('\'') {
            return self.parse_quoted_custom();
        }

        let name = self.take_identifier();
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }
        if name.contains('.') {
            return Ok(WireType::custom(name));
        }

        match name.to_ascii_lowercase().as_str() {
            "ascii" => Ok(WireType::Ascii),
            "bigint" => Ok(WireType::Bigint),
            "blob" => Ok(WireType::Blob),
            "boolean" => Ok(WireType::Boolean),
            "counter" => Ok(WireType::Counter),
            "decimal" => Ok(WireType::Decimal),
            "double" => Ok(WireType::Double),
            "float" => Ok(WireType::Float),
            "inet" => Ok(WireType::Inet),
            "int" => Ok(WireType::Int),
            "text" => Ok(WireType::Text),
            "timestamp" => Ok(WireType::Timestamp),
            "uuid" => Ok(WireType::Uuid),
            "varchar" => Ok(WireType::Varchar),
            "varint" => Ok(WireType::Varint),
            "timeuuid" => Ok(WireType::Timeuuid),
            "list" => {
                self.expect('<')?;
                let element = self.parse_type()?;
                self.expect('>')?;
                Ok(WireType::list(element))
            }
            "set" => {
                self.expect('<')?;
                let element = self.parse_type()?;
                self.expect('>')?;
                Ok(WireType::set(element))
            }
            "map" => {
                self.expect('<')?;
                let key = self.parse_type()?;
                self.expect(',')?;
                let value = self.parse_type()?;
                self.expect('>')?;
                Ok(WireType::map(key, value))
            }
            other => Err(self.error(format!("unknown type `{other}`"))),
        }
    }

    fn parse_quoted_custom(&mut self) -> Result<WireType, CodecError> {
        // 跳过开头引号。
        self.pos += 1;
        let text = self.text;
        let rest = &text[self.pos..];
        match rest.find('\'') {
            Some(0) => Err(self.error("empty custom type name")),
            Some(end) => {
                let class_name = &rest[..end];
                self.pos += end + 1;
                Ok(WireType::custom(class_name))
            }
            None => Err(self.error("unterminated custom type name")),
        }
    }

    fn take_identifier(&mut self) -> &'a str {
        let text = self.text;
        let start = self.pos;
        let rest = &text[start..];
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$'))
            .unwrap_or(rest.len());
        self.pos += len;
        &text[start..start + len]
    }

    fn expect(&mut self, expected: char) -> Result<(), CodecError> {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`")))
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
    }

    fn error(&self, reason: impl Into<String>) -> CodecError {
        CodecError::InvalidTypeName {
            text: self.text.to_owned(),
            reason: format!("{} at offset {}", reason.into(), self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_cql_spelling() {
        let nested = WireType::map(WireType::Text, WireType::list(WireType::Int));
        assert_eq!(nested.to_string(), "map<text, list<int>>");
        assert_eq!(WireType::custom("com.example.Foo").to_string(), "'com.example.Foo'");
    }

    #[test]
    fn parse_accepts_nested_and_custom_names() {
        let parsed: WireType = "map< text , set<'com.example.Foo'> >".parse().unwrap();
        assert_eq!(
            parsed,
            WireType::map(WireType::Text, WireType::set(WireType::custom("com.example.Foo")))
        );
        let bare: WireType = "com.example.Bar".parse().unwrap();
        assert_eq!(bare, WireType::custom("com.example.Bar"));
        assert_eq!("INT".parse::<WireType>().unwrap(), WireType::Int);
    }

    #[test]
    fn parse_rejects_malformed_names() {
        for text in ["", "list<int", "map<int>", "frobnicate", "int extra", "''"] {
            let err = text.parse::<WireType>().unwrap_err();
            assert_eq!(err.code(), crate::error::codes::CODEC_INVALID_TYPE_NAME, "{text}");
        }
    }

    #[test]
    fn parameterized_equality_is_structural() {
        assert_ne!(WireType::list(WireType::Int), WireType::list(WireType::Text));
        assert_eq!(WireType::list(WireType::Int), WireType::list(WireType::Int));
        assert_eq!(WireType::primitives().len(), 16);
        assert_eq!(WireType::map(WireType::Int, WireType::Int).protocol_code(), 0x0021);
    }
}
