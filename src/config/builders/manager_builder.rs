//! # 管理器配置构建器模块

use rat_logger::info;

use crate::config::core::ManagerConfig;
use crate::error::PoolResult;
use crate::pool::PoolConfig;
use crate::types::BackendKind;

/// 管理器配置构建器
///
/// 提供链式配置接口，支持流畅的API调用
#[derive(Debug, Default)]
pub struct ManagerConfigBuilder {
    embedded: Option<PoolConfig>,
    networked: Option<PoolConfig>,
}

impl ManagerConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置嵌入式存储连接池配置
    pub fn embedded(mut self, config: PoolConfig) -> Self {
        self.embedded = Some(config);
        self
    }

    /// 设置网络存储连接池配置
    pub fn networked(mut self, config: PoolConfig) -> Self {
        self.networked = Some(config);
        self
    }

    /// 按后端类型设置连接池配置
    ///
    /// # 参数
    ///
    /// * `kind` - 后端类型
    /// * `config` - 连接池配置
    pub fn pool(self, kind: BackendKind, config: PoolConfig) -> Self {
        match kind {
            BackendKind::Embedded => self.embedded(config),
            BackendKind::Networked => self.networked(config),
        }
    }

    /// 使用后端预设配置
    pub fn with_defaults(self, kind: BackendKind) -> Self {
        self.pool(kind, PoolConfig::for_backend(kind))
    }

    /// 构建管理器配置
    pub fn build(self) -> PoolResult<ManagerConfig> {
        let config = ManagerConfig {
            embedded: self.embedded,
            networked: self.networked,
        };
        config.validate()?;

        info!("创建管理器配置: 后端={:?}", config.backends());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_builder() {
        let config = ManagerConfig::builder()
            .with_defaults(BackendKind::Embedded)
            .networked(PoolConfig::builder().max_size(3).min_size(1).build().unwrap())
            .build()
            .unwrap();

        assert_eq!(config.embedded.as_ref().map(|c| c.max_size), Some(1));
        assert_eq!(config.networked.as_ref().map(|c| c.max_size), Some(3));
    }

    #[test]
    fn test_manager_builder_validates_pools() {
        let bad = PoolConfig {
            min_size: 4,
            max_size: 2,
            ..PoolConfig::default()
        };
        assert!(ManagerConfig::builder().networked(bad).build().is_err());
    }
}
