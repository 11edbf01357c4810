use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use super::{CodecRegistry, RegistrySettings};
use crate::codec::{CustomCodec, ListCodec, MapCodec, PrimitiveCodec, SetCodec, TypeCodec};
use crate::error::{CodecError, Result};
use crate::wire::WireType;

/// 解析缓存的默认初始容量提示。
pub const DEFAULT_CACHE_CAPACITY: usize = 400;

static PRIMITIVE_CODECS: LazyLock<Vec<Arc<dyn TypeCodec>>> = LazyLock::new(|| {
    PrimitiveCodec::all()
        .into_iter()
        .map(|codec| Arc::new(codec) as Arc<dyn TypeCodec>)
        .collect()
});

/// 默认编解码器：16 个原生类型，随后对每个原生类型依次追加 list、set 与以其为键的全部 map。
static DEFAULT_CODECS: LazyLock<Vec<Arc<dyn TypeCodec>>> = LazyLock::new(|| {
    let primitives = &*PRIMITIVE_CODECS;
    let mut codecs = Vec::with_capacity(primitives.len() * (primitives.len() + 3));
    codecs.extend(primitives.iter().cloned());
    for key in primitives {
        codecs.push(Arc::new(ListCodec::new(Arc::clone(key))) as Arc<dyn TypeCodec>);
        codecs.push(Arc::new(SetCodec::new(Arc::clone(key))));
        for value in primitives {
            codecs.push(Arc::new(MapCodec::new(Arc::clone(key), Arc::clone(value))));
        }
    }
    codecs
});

/// [`CodecRegistry`] 的构建器。
///
/// # 契约说明（What）
/// - 编解码器按调用顺序追加，`build` 时反转，后追加者在查找中优先；
/// - 构建完成后注册中心内容不可变。
#[derive(Clone, Debug)]
pub struct CodecRegistryBuilder {
    codecs: Vec<Arc<dyn TypeCodec>>,
    cache_capacity: usize,
}

impl CodecRegistryBuilder {
    /// 创建空构建器。
    pub fn new() -> Self {
        Self {
            codecs: Vec::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// 按配置构建：可选追加默认编解码器，再依次注册自定义类型。
    ///
    /// `custom_types` 中的每一项按 CQL 类型名解析，且必须是自定义类型。
    pub fn from_settings(settings: &RegistrySettings) -> Result<Self> {
        let mut builder = Self::new().with_cache_capacity(settings.cache_initial_capacity);
        if settings.default_codecs {
            builder = builder.with_default_codecs();
        }
        for name in &settings.custom_types {
            let wire = WireType::from_str(name).map_err(|err| CodecError::InvalidSettings {
                reason: format!("custom_types entry `{name}`: {err}"),
            })?;
            builder = builder.with_custom_type(&wire)?;
        }
        Ok(builder)
    }

    /// 追加全部 304 个默认编解码器。
    pub fn with_default_codecs(mut self) -> Self {
        self.codecs.extend(DEFAULT_CODECS.iter().cloned());
        self
    }

    /// 追加用户编解码器；与已有编解码器范围重叠时覆盖之。
    pub fn with_codecs<I>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn TypeCodec>>,
    {
        self.codecs.extend(codecs);
        self
    }

    /// 追加单个用户编解码器。
    pub fn with_codec<C: TypeCodec>(mut self, codec: C) -> Self {
        self.codecs.push(Arc::new(codec));
        self
    }

    /// 为自定义类型追加所需的编解码器：自身、`list`、`set`，以及它与每个原生类型组成的两向 `map`。
    pub fn with_custom_type(mut self, wire: &WireType) -> Result<Self> {
        let custom: Arc<dyn TypeCodec> = match CustomCodec::for_wire(wire) {
            Some(codec) => Arc::new(codec),
            None => {
                return Err(CodecError::InvalidTypeName {
                    text: wire.to_string(),
                    reason: "not a custom type".to_owned(),
                });
            }
        };

        self.codecs.push(Arc::clone(&custom));
        self.codecs.push(Arc::new(ListCodec::new(Arc::clone(&custom))));
        self.codecs.push(Arc::new(SetCodec::new(Arc::clone(&custom))));
        for primitive in PRIMITIVE_CODECS.iter() {
            self.codecs.push(Arc::new(MapCodec::new(
                Arc::clone(primitive),
                Arc::clone(&custom),
            )));
            self.codecs.push(Arc::new(MapCodec::new(
                Arc::clone(&custom),
                Arc::clone(primitive),
            )));
        }
        debug!(wire = %wire, "custom type registered");
        Ok(self)
    }

    /// 设置解析缓存的初始容量提示。
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// 构建注册中心。
    pub fn build(self) -> CodecRegistry {
        let mut codecs = self.codecs;
        codecs.reverse();
        debug!(
            codecs = codecs.len(),
            cache_capacity = self.cache_capacity,
            "codec registry built"
        );
        CodecRegistry::from_lookup_order(codecs.into(), self.cache_capacity)
    }
}

impl Default for CodecRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
