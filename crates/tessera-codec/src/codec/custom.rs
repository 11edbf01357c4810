use std::sync::Arc;

use bytes::Bytes;

use super::{TypeCodec, type_mismatch};
use crate::error::{CodecError, Result};
use crate::host::HostType;
use crate::value::Value;
use crate::wire::WireType;

/// 服务端自定义类型的不透明编解码器：负载原样透传为字节序列。
///
/// 驱动不了解自定义类型的结构，因此没有文本形式，`format`/`parse` 返回
/// [`CodecError::Unsupported`]。
#[derive(Clone, Debug)]
pub struct CustomCodec {
    wire: WireType,
    host: HostType,
}

impl CustomCodec {
    /// 以自定义类的完整类名构造。
    pub fn new(class_name: impl Into<Arc<str>>) -> Self {
        Self {
            wire: WireType::custom(class_name),
            host: HostType::Bytes,
        }
    }

    /// 由线类型构造；仅接受 [`WireType::Custom`]。
    pub fn for_wire(wire: &WireType) -> Option<Self> {
        match wire {
            WireType::Custom(class_name) => Some(Self::new(Arc::clone(class_name))),
            _ => None,
        }
    }
}

impl TypeCodec for CustomCodec {
    fn wire_type(&self) -> &WireType {
        &self.wire
    }

    fn host_type(&self) -> &HostType {
        &self.host
    }

    fn accepts_value(&self, value: &Value) -> bool {
        matches!(value, Value::Bytes(_))
    }

    fn serialize(&self, value: &Value) -> Result<Bytes> {
        match value {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            _ => Err(type_mismatch(self, value)),
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        Ok(Value::Bytes(Bytes::copy_from_slice(bytes)))
    }

    fn format(&self, _value: &Value) -> Result<String> {
        Err(CodecError::Unsupported {
            wire: self.wire.clone(),
            operation: "literal formatting",
        })
    }

    fn parse(&self, _text: &str) -> Result<Value> {
        Err(CodecError::Unsupported {
            wire: self.wire.clone(),
            operation: "literal parsing",
        })
    }
}
