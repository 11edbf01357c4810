//! 注册中心的声明式配置。
//!
//! 所有字段都有默认值，空文档等价于“仅默认编解码器”：
//!
//! ```toml
//! default_codecs = true
//! custom_types = ["'com.example.Point'"]
//! cache_initial_capacity = 400
//! ```

use serde::{Deserialize, Serialize};

use super::builder::DEFAULT_CACHE_CAPACITY;
use super::{CodecRegistry, CodecRegistryBuilder};
use crate::error::{CodecError, Result};

/// 注册中心配置。
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrySettings {
    /// 是否追加默认编解码器。
    pub default_codecs: bool,
    /// 需要注册的自定义类型，按 CQL 类型名书写。
    pub custom_types: Vec<String>,
    /// 解析缓存的初始容量提示。
    pub cache_initial_capacity: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            default_codecs: true,
            custom_types: Vec::new(),
            cache_initial_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl RegistrySettings {
    /// 从 TOML 文本加载。
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| CodecError::InvalidSettings {
            reason: err.to_string(),
        })
    }

    /// 按配置构建注册中心。
    pub fn build_registry(&self) -> Result<CodecRegistry> {
        Ok(CodecRegistryBuilder::from_settings(self)?.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = RegistrySettings::from_toml_str("").unwrap();
        assert_eq!(settings, RegistrySettings::default());
    }

    #[test]
    fn custom_types_are_registered() {
        let settings = RegistrySettings::from_toml_str(
            r#"
            default_codecs = false
            custom_types = ["'com.example.Point'", "org.example.Box"]
            cache_initial_capacity = 16
            "#,
        )
        .unwrap();
        let registry = settings.build_registry().unwrap();
        assert_eq!(registry.len(), 2 * (3 + 2 * 16));
    }

    #[test]
    fn invalid_documents_are_reported() {
        let err = RegistrySettings::from_toml_str("default_codecs = \"yes\"").unwrap_err();
        assert_eq!(err.code(), crate::error::codes::CODEC_INVALID_SETTINGS);

        let err = RegistrySettings::from_toml_str("unknown = 1").unwrap_err();
        assert_eq!(err.code(), crate::error::codes::CODEC_INVALID_SETTINGS);

        let settings = RegistrySettings {
            custom_types: vec!["int".to_owned()],
            ..RegistrySettings::default()
        };
        assert!(settings.build_registry().is_err());
    }
}
