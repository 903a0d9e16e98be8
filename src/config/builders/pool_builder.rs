//! # 连接池配置构建器模块
//!
//! 提供连接池配置的构建器实现，支持链式调用和严格验证

use rat_logger::info;

use crate::error::PoolResult;
use crate::pool::PoolConfig;
use crate::types::BackendKind;

/// 连接池配置构建器
///
/// 未显式设置的项沿用起始配置（默认配置或后端预设）
#[derive(Debug, Clone)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfig {
    /// 创建连接池配置构建器
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }
}

impl PoolConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
        }
    }

    /// 以后端预设为起点创建构建器
    ///
    /// # 参数
    ///
    /// * `kind` - 后端类型
    pub fn for_backend(kind: BackendKind) -> Self {
        Self {
            config: PoolConfig::for_backend(kind),
        }
    }

    /// 设置最小连接数
    ///
    /// # 参数
    ///
    /// * `min_size` - 最小连接数
    pub fn min_size(mut self, min_size: usize) -> Self {
        self.config.min_size = min_size;
        self
    }

    /// 设置最大连接数
    ///
    /// # 参数
    ///
    /// * `max_size` - 最大连接数
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.config.max_size = max_size;
        self
    }

    /// 设置获取连接超时时间（毫秒）
    pub fn acquire_timeout_ms(mut self, timeout: u64) -> Self {
        self.config.acquire_timeout_ms = timeout;
        self
    }

    /// 设置空闲连接超时时间（秒）
    pub fn max_idle_seconds(mut self, seconds: u64) -> Self {
        self.config.max_idle_seconds = seconds;
        self
    }

    /// 设置单个连接的最大借出次数
    pub fn max_use_count(mut self, count: u64) -> Self {
        self.config.max_use_count = count;
        self
    }

    /// 设置查询缓存默认 TTL（秒）
    pub fn cache_ttl_seconds(mut self, seconds: u64) -> Self {
        self.config.cache_ttl_seconds = seconds;
        self
    }

    /// 设置查询缓存最大条目数
    pub fn cache_max_entries(mut self, entries: usize) -> Self {
        self.config.cache_max_entries = entries;
        self
    }

    /// 设置后台维护间隔（秒）
    pub fn maintenance_interval_secs(mut self, seconds: u64) -> Self {
        self.config.maintenance_interval_secs = seconds;
        self
    }

    pub fn health_check_on_acquire(mut self, enabled: bool) -> Self {
        self.config.health_check_on_acquire = enabled;
        self
    }

    /// 构建连接池配置
    ///
    /// # 错误
    ///
    /// 配置不合理时返回 `ConfigError`
    pub fn build(self) -> PoolResult<PoolConfig> {
        self.config.validate()?;

        info!(
            "创建连接池配置: 最小连接数={}, 最大连接数={}, 获取超时={}ms",
            self.config.min_size, self.config.max_size, self.config.acquire_timeout_ms
        );

        Ok(self.config)
    }
}

impl Default for PoolConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoolError;

    #[test]
    fn test_builder_overrides() {
        let config = PoolConfig::builder()
            .min_size(2)
            .max_size(4)
            .acquire_timeout_ms(100)
            .max_idle_seconds(10)
            .health_check_on_acquire(true)
            .build()
            .unwrap();

        assert_eq!(config.min_size, 2);
        assert_eq!(config.max_size, 4);
        assert_eq!(config.acquire_timeout_ms, 100);
        assert_eq!(config.max_idle_seconds, 10);
        assert!(config.health_check_on_acquire);
        assert_eq!(config.max_use_count, 1000);
    }

    #[test]
    fn test_builder_starts_from_backend_preset() {
        let config = PoolConfigBuilder::for_backend(BackendKind::Embedded)
            .cache_ttl_seconds(5)
            .build()
            .unwrap();
        assert_eq!(config.max_size, 1);
        assert_eq!(config.cache_ttl_seconds, 5);
    }

    #[test]
    fn test_builder_rejects_invalid_bounds() {
        let result = PoolConfig::builder().min_size(3).max_size(1).build();
        assert!(matches!(result, Err(PoolError::ConfigError { .. })));

        let result = PoolConfig::builder().cache_max_entries(0).build();
        assert!(result.is_err());
    }
}
