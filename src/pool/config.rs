//! 连接池配置模块

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PoolResult;
use crate::types::BackendKind;

fn default_min_size() -> usize {
    5
}

fn default_max_size() -> usize {
    20
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

fn default_max_idle_seconds() -> u64 {
    300
}

fn default_max_use_count() -> u64 {
    1000
}

fn default_cache_ttl_seconds() -> u64 {
    60
}

fn default_cache_max_entries() -> usize {
    1000
}

fn default_maintenance_interval_secs() -> u64 {
    30
}

/// 连接池配置
///
/// 所有字段都有默认值，配置文件中只需写出需要覆盖的项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// 最小连接数（预热目标）
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    /// 最大连接数
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// 获取连接超时（毫秒）
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    /// 空闲连接最长保留时间（秒）
    #[serde(default = "default_max_idle_seconds")]
    pub max_idle_seconds: u64,
    /// 单个连接最大借出次数
    #[serde(default = "default_max_use_count")]
    pub max_use_count: u64,
    /// 查询缓存默认 TTL（秒）
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    /// 查询缓存最大条目数
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
    /// 后台清理间隔（秒）
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,
    /// 借出空闲连接前是否做健康检查
    #[serde(default)]
    pub health_check_on_acquire: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: default_max_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            max_idle_seconds: default_max_idle_seconds(),
            max_use_count: default_max_use_count(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            cache_max_entries: default_cache_max_entries(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
            health_check_on_acquire: false,
        }
    }
}

impl PoolConfig {
    /// 嵌入式存储的默认配置：单连接，保证同一时刻只有一个写者
    pub fn embedded() -> Self {
        Self {
            min_size: 1,
            max_size: 1,
            ..Self::default()
        }
    }

    /// 网络存储的默认配置
    pub fn networked() -> Self {
        Self::default()
    }

    /// 按后端类型获取默认配置
    pub fn for_backend(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Embedded => Self::embedded(),
            BackendKind::Networked => Self::networked(),
        }
    }

    /// 校验配置合理性
    pub fn validate(&self) -> PoolResult<()> {
        if self.min_size == 0 {
            return Err(crate::quick_error!(config, "最小连接数必须大于0"));
        }
        if self.min_size > self.max_size {
            return Err(crate::quick_error!(
                config,
                format!(
                    "最小连接数({})不能大于最大连接数({})",
                    self.min_size, self.max_size
                )
            ));
        }
        if self.acquire_timeout_ms == 0 {
            return Err(crate::quick_error!(config, "获取连接超时时间不能为零"));
        }
        if self.max_use_count == 0 {
            return Err(crate::quick_error!(config, "连接最大借出次数不能为零"));
        }
        if self.cache_max_entries == 0 {
            return Err(crate::quick_error!(config, "缓存最大条目数不能为零"));
        }
        if self.maintenance_interval_secs == 0 {
            return Err(crate::quick_error!(config, "后台清理间隔不能为零"));
        }
        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn max_idle(&self) -> Duration {
        Duration::from_secs(self.max_idle_seconds)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = PoolConfig::default();
        assert_eq!(config.min_size, 5);
        assert_eq!(config.max_size, 20);
        assert_eq!(config.acquire_timeout(), Duration::from_millis(5000));
        assert_eq!(config.max_idle(), Duration::from_secs(300));
        assert_eq!(config.max_use_count, 1000);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.cache_max_entries, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_embedded_is_single_writer() {
        let config = PoolConfig::for_backend(BackendKind::Embedded);
        assert_eq!(config.max_size, 1);
        assert_eq!(config.min_size, 1);
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let config = PoolConfig {
            min_size: 0,
            ..PoolConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PoolConfig {
            min_size: 10,
            max_size: 5,
            ..PoolConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: PoolConfig = serde_json::from_str(r#"{"max_size": 8, "min_size": 2}"#).unwrap();
        assert_eq!(config.max_size, 8);
        assert_eq!(config.min_size, 2);
        assert_eq!(config.acquire_timeout_ms, 5000);
        assert!(!config.health_check_on_acquire);
    }
}
