//! 编解码注册中心。
//!
//! # 设计背景（Why）
//! - 驱动在解码结果列、绑定参数时需要根据“线类型、宿主类型或两者之一”找到唯一的编解码器；
//! - 注册中心本身是有序列表加逐项能力判定，查找结果按类型对记忆化，避免在热路径上反复线性扫描。
//!
//! # 契约说明（What）
//! - 查找顺序是追加顺序的逆序，先命中者胜出，后注册的编解码器覆盖先注册的；
//! - 缓存键为 `(线类型或 ANY, 宿主类型或 ANY)`；只缓存成功结果；
//! - 并发首次查找可能重复计算，但最先写入缓存的实例是之后所有调用方观察到的实例；
//! - 按值查找（[`CodecRegistry::resolve_by_value`]）不走缓存。
//!
//! # 结构说明（How）
//! - [`CodecRegistryBuilder`] 收集编解码器并在 `build` 时反转顺序；
//! - [`RegistrySettings`] 提供基于 TOML 的声明式构建入口。

use core::fmt;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::codec::{HostValue, TypeCodec, TypedCodec};
use crate::error::{CodecError, Result};
use crate::host::HostType;
use crate::value::Value;
use crate::wire::WireType;

mod builder;
mod settings;

pub use builder::{CodecRegistryBuilder, DEFAULT_CACHE_CAPACITY};
pub use settings::RegistrySettings;

type CacheKey = (Option<WireType>, Option<HostType>);

static DEFAULT_INSTANCE: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::default);

/// 不可变的编解码器集合与记忆化查找器。
pub struct CodecRegistry {
    /// 查找顺序（即追加顺序的逆序）。
    codecs: Arc<[Arc<dyn TypeCodec>]>,
    cache: DashMap<CacheKey, Arc<dyn TypeCodec>>,
}

impl CodecRegistry {
    /// 创建空构建器。
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::new()
    }

    /// 进程级默认注册中心，仅包含默认编解码器，首次访问时构建且永不销毁。
    pub fn default_instance() -> &'static CodecRegistry {
        &DEFAULT_INSTANCE
    }

    pub(crate) fn from_lookup_order(
        codecs: Arc<[Arc<dyn TypeCodec>]>,
        cache_capacity: usize,
    ) -> Self {
        Self {
            codecs,
            cache: DashMap::with_capacity(cache_capacity),
        }
    }

    /// 按线类型查找，宿主类型不受约束。
    pub fn resolve(&self, wire: &WireType) -> Result<Arc<dyn TypeCodec>> {
        self.resolve_pair(Some(wire), None)
    }

    /// 按类型对查找，缺省的一半视为 ANY，但两者不能同时缺省。
    pub fn resolve_pair(
        &self,
        wire: Option<&WireType>,
        host: Option<&HostType>,
    ) -> Result<Arc<dyn TypeCodec>> {
        if wire.is_none() && host.is_none() {
            return Err(CodecError::MissingTypeArguments);
        }

        let key: CacheKey = (wire.cloned(), host.cloned());
        if let Some(hit) = self.cache.get(&key) {
            trace!(wire = ?wire, host = ?host, "codec cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let Some(found) = self
            .codecs
            .iter()
            .find(|codec| codec.accepts(wire, host))
        else {
            debug!(
                wire = ?wire.map(ToString::to_string),
                host = ?host.map(ToString::to_string),
                "codec lookup failed"
            );
            return Err(CodecError::NotFound {
                wire: key.0,
                host: key.1,
            });
        };

        let cached = self.cache.entry(key).or_insert_with(|| Arc::clone(found));
        trace!(
            wire = %cached.wire_type(),
            host = %cached.host_type(),
            "codec cached"
        );
        Ok(Arc::clone(cached.value()))
    }

    /// 按运行时值查找首个接受该值的编解码器；结果不缓存。
    pub fn resolve_by_value(&self, value: &Value) -> Result<Arc<dyn TypeCodec>> {
        self.codecs
            .iter()
            .find(|codec| codec.accepts_value(value))
            .map(Arc::clone)
            .ok_or_else(|| {
                let host = value.host_type();
                debug!(host = %host, "codec lookup by value failed");
                CodecError::NotFoundForValue { host }
            })
    }

    /// 泛型查找：以 `T` 的静态宿主类型为约束，线类型可选。
    pub fn codec_for<T: HostValue>(&self, wire: Option<&WireType>) -> Result<TypedCodec<T>> {
        let codec = self.resolve_pair(wire, Some(&T::host_type()))?;
        TypedCodec::new(codec)
    }

    /// 编解码器数量。
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// 按查找顺序遍历编解码器。
    pub fn codecs(&self) -> impl Iterator<Item = &Arc<dyn TypeCodec>> + '_ {
        self.codecs.iter()
    }

    /// 当前缓存条目数，仅用于诊断。
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl Default for CodecRegistry {
    /// 构建仅包含默认编解码器的新实例，与 [`CodecRegistry::default_instance`] 等价但互不共享缓存。
    fn default() -> Self {
        CodecRegistryBuilder::new().with_default_codecs().build()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.codecs.len())
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_resolves_primitives_and_collections() {
        let registry = CodecRegistry::default_instance();
        assert_eq!(registry.len(), 304);

        let codec = registry.resolve(&WireType::Int).unwrap();
        assert_eq!(codec.host_type(), &HostType::Int);

        let wire = WireType::map(WireType::Text, WireType::list(WireType::Int));
        assert!(registry.resolve(&wire).unwrap_err().is_not_found());

        let wire = WireType::map(WireType::Text, WireType::Uuid);
        let codec = registry.resolve(&wire).unwrap();
        assert_eq!(codec.host_type(), &HostType::map(HostType::Text, HostType::Uuid));
    }

    #[test]
    fn both_halves_missing_is_rejected() {
        let registry = CodecRegistry::default();
        assert_eq!(
            registry.resolve_pair(None, None).unwrap_err(),
            CodecError::MissingTypeArguments
        );
    }

    #[test]
    fn host_only_lookup_takes_latest_matching_codec() {
        let registry = CodecRegistry::default();
        // text/varchar/ascii 都映射到 Text，最后追加的 ascii 优先。
        let codec = registry.resolve_pair(None, Some(&HostType::Text)).unwrap();
        assert_eq!(codec.wire_type(), &WireType::Ascii);
    }

    #[test]
    fn default_instance_is_shared() {
        let first = CodecRegistry::default_instance();
        let second = CodecRegistry::default_instance();
        assert!(core::ptr::eq(first, second));
    }
}
